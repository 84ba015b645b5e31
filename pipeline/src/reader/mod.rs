//! NDJSON record reader with encoding auto-detection.
//!
//! Each non-blank line of the input is one JSON object, deserialized into the
//! caller's raw record type. No cleaning happens here.

use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;

use crate::error::{ReadError, ReadResult};
use crate::logs::warning;

/// Result of reading with metadata
#[derive(Debug, Clone)]
pub struct ReadOutput<T> {
    /// Deserialized records, in file order
    pub records: Vec<T>,
    /// Detected encoding
    pub encoding: String,
    /// Number of lines in the file, blank ones included
    pub line_count: usize,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Latin-1 is decoded with the Windows-1252 table, which agrees with
/// ISO-8859-1 on every printable byte. Everything else is read as UTF-8;
/// invalid sequences become U+FFFD and are reported as a warning.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        // UTF-8 and anything unrecognized
        _ => match String::from_utf8_lossy(bytes) {
            Cow::Borrowed(text) => text.to_string(),
            Cow::Owned(text) => {
                warning(format!(
                    "input is not valid UTF-8; {} undecodable sequence(s) replaced with U+FFFD",
                    text.matches(char::REPLACEMENT_CHARACTER).count()
                ));
                text
            }
        },
    }
}

/// Parse NDJSON content into records.
///
/// Blank lines are skipped. Line numbers in errors are 1-based.
///
/// # Example
/// ```ignore
/// use promoclean::reader::parse_ndjson;
/// use promoclean::RawEvent;
///
/// let content = r#"{"person": "p1", "event": "transaction", "time": 0, "value": {"amount": 0.83}}"#;
/// let events: Vec<RawEvent> = parse_ndjson(content).unwrap();
/// assert_eq!(events.len(), 1);
/// ```
pub fn parse_ndjson<T: DeserializeOwned>(content: &str) -> ReadResult<Vec<T>> {
    let mut records = Vec::new();

    for (line_idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record = serde_json::from_str(line).map_err(|e| ReadError::Json {
            line: line_idx + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Read NDJSON bytes with encoding auto-detection.
pub fn read_bytes<T: DeserializeOwned>(bytes: &[u8]) -> ReadResult<ReadOutput<T>> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    // Strip a UTF-8 byte order mark if the exporter wrote one
    let content = content.strip_prefix('\u{feff}').unwrap_or(content.as_str());

    let records = parse_ndjson(content)?;
    if records.is_empty() {
        return Err(ReadError::Empty);
    }

    Ok(ReadOutput {
        records,
        encoding,
        line_count: content.lines().count(),
    })
}

/// Read an NDJSON file with encoding auto-detection.
pub fn read_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> ReadResult<ReadOutput<T>> {
    let bytes = std::fs::read(path.as_ref())?;
    read_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::{drain, subscribe, LogLevel};
    use crate::models::{RawCustomer, RawEvent, RawOffer};
    use std::io::Write;

    #[test]
    fn test_parse_offers() {
        let content = r#"{"reward": 10, "channels": ["email", "mobile", "social"], "difficulty": 10, "duration": 7, "offer_type": "bogo", "id": "ae264e3637204a6fb9bb56bc8210ddfd"}
{"reward": 0, "channels": ["web", "email", "mobile"], "difficulty": 0, "duration": 4, "offer_type": "informational", "id": "3f207df678b143eea3cee63160fa8bed"}"#;
        let offers: Vec<RawOffer> = parse_ndjson(content).unwrap();

        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].id, "ae264e3637204a6fb9bb56bc8210ddfd");
        assert_eq!(offers[0].channels, vec!["email", "mobile", "social"]);
        assert_eq!(offers[1].offer_type, "informational");
        assert_eq!(offers[1].duration, 4.0);
    }

    #[test]
    fn test_parse_customers_with_nulls() {
        let content = r#"{"gender": null, "age": 118, "id": "68be06ca386d4c31939f3a4f0e3dd783", "became_member_on": 20170212, "income": null}"#;
        let customers: Vec<RawCustomer> = parse_ndjson(content).unwrap();

        assert_eq!(customers[0].gender, None);
        assert_eq!(customers[0].age, Some(118));
        assert_eq!(customers[0].income, None);
    }

    #[test]
    fn test_empty_lines_skipped() {
        let content = "{\"person\": \"a\", \"event\": \"transaction\", \"time\": 0}\n\n   \n{\"person\": \"b\", \"event\": \"transaction\", \"time\": 6}\n";
        let events: Vec<RawEvent> = parse_ndjson(content).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[1].person, "b");
        assert!(events[0].value.is_none());
    }

    #[test]
    fn test_error_reports_line_number() {
        let content = "{\"person\": \"a\", \"event\": \"transaction\", \"time\": 0}\n\n{\"person\": \"b\"";
        let err = parse_ndjson::<RawEvent>(content).unwrap_err();

        match err {
            ReadError::Json { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_error() {
        let result = read_bytes::<RawEvent>(b"\n\n");
        assert!(matches!(result, Err(ReadError::Empty)));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        assert_eq!(decode_content(bytes, "iso-8859-1"), "Société");
        // Bytes where ISO-8859-15 would disagree
        assert_eq!(decode_content(&[0xA4, 0xA6, 0xBC], "iso-8859-1"), "¤¦¼");
    }

    #[test]
    fn test_read_bytes_detects_latin1() {
        let mut line = b"{\"id\": \"Soci".to_vec();
        line.extend_from_slice(&[0xE9, b't', 0xE9]);
        line.extend_from_slice(
            b"\", \"gender\": \"F\", \"age\": 40, \"income\": null, \"became_member_on\": 20170101}\n",
        );

        let out = read_bytes::<RawCustomer>(&line).unwrap();

        assert!(
            matches!(out.encoding.as_str(), "iso-8859-1" | "windows-1252"),
            "detected {}",
            out.encoding
        );
        assert_eq!(out.records[0].id, "Société");
    }

    #[test]
    fn test_invalid_utf8_is_replaced_with_warning() {
        let mut rx = subscribe();

        let decoded = decode_content(b"ab\xFFcd", "utf-8");

        assert_eq!(decoded, "ab\u{FFFD}cd");
        let warned = drain(&mut rx)
            .into_iter()
            .any(|e| e.level == LogLevel::Warning && e.message.contains("1 undecodable sequence(s)"));
        assert!(warned);
    }

    #[test]
    fn test_valid_utf8_decodes_without_warning() {
        let mut rx = subscribe();

        assert_eq!(decode_content("Zoë-7f3a".as_bytes(), "utf-8"), "Zoë-7f3a");
        let warned = drain(&mut rx)
            .into_iter()
            .any(|e| e.level == LogLevel::Warning && e.message.contains("undecodable"));
        assert!(!warned);
    }

    #[test]
    fn test_read_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"person": "p1", "event": "offer received", "time": 0, "value": {{"offer id": "o1"}}}}"#
        )
        .unwrap();

        let output = read_file::<RawEvent>(file.path()).unwrap();
        assert_eq!(output.records.len(), 1);
        assert_eq!(output.encoding, "utf-8");
        assert_eq!(output.line_count, 1);
        let payload = output.records[0].value.as_ref().unwrap();
        assert_eq!(payload.offer_id_spaced.as_deref(), Some("o1"));
    }

    #[test]
    fn test_missing_file() {
        let result = read_file::<RawEvent>("/nonexistent/transcript.json");
        assert!(matches!(result, Err(ReadError::Io(_))));
    }
}
