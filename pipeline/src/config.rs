//! Pipeline configuration.
//!
//! Defaults reproduce the conventional `./data` layout: three NDJSON inputs
//! next to their cleaned CSV outputs.

use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "./data";

pub const OFFERS_INPUT: &str = "portfolio.json";
pub const CUSTOMERS_INPUT: &str = "profile.json";
pub const TRANSCRIPT_INPUT: &str = "transcript.json";

pub const OFFERS_OUTPUT: &str = "portfolio_clean.csv";
pub const CUSTOMERS_OUTPUT: &str = "profile_clean.csv";
pub const TRANSCRIPT_OUTPUT: &str = "transcript_clean.csv";

/// Channel names that get their own 0/1 column, in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSet(Vec<String>);

impl ChannelSet {
    /// Build from names in declared order. Repeated names keep their first
    /// position only.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut declared: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !declared.contains(&name) {
                declared.push(name);
            }
        }
        Self(declared)
    }

    /// Parse a comma-separated list such as `"web, email,,mobile"`. Blank
    /// entries are skipped and names are trimmed.
    pub fn from_list(list: &str) -> Self {
        Self::new(list.split(',').map(str::trim).filter(|name| !name.is_empty()))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new(["web", "email", "mobile", "social"])
    }
}

/// Options for a full pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub offers_input: PathBuf,
    pub customers_input: PathBuf,
    pub transcript_input: PathBuf,

    pub offers_output: PathBuf,
    pub customers_output: PathBuf,
    pub transcript_output: PathBuf,

    /// Recognized offer channels
    pub channels: ChannelSet,

    /// Also write the dense id mappings here
    pub mappings_dir: Option<PathBuf>,
}

impl PipelineOptions {
    /// Conventional file names under an input and an output directory.
    pub fn from_dirs(data_dir: impl AsRef<Path>, out_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        let out_dir = out_dir.as_ref();
        Self {
            offers_input: data_dir.join(OFFERS_INPUT),
            customers_input: data_dir.join(CUSTOMERS_INPUT),
            transcript_input: data_dir.join(TRANSCRIPT_INPUT),
            offers_output: out_dir.join(OFFERS_OUTPUT),
            customers_output: out_dir.join(CUSTOMERS_OUTPUT),
            transcript_output: out_dir.join(TRANSCRIPT_OUTPUT),
            channels: ChannelSet::default(),
            mappings_dir: None,
        }
    }

    pub fn with_channels(mut self, channels: ChannelSet) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_mappings_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.mappings_dir = dir;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_dirs(DEFAULT_DATA_DIR, DEFAULT_DATA_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = PipelineOptions::default();
        assert_eq!(opts.offers_input, Path::new("./data/portfolio.json"));
        assert_eq!(opts.transcript_output, Path::new("./data/transcript_clean.csv"));
        assert_eq!(opts.channels.names(), ["web", "email", "mobile", "social"]);
        assert!(opts.mappings_dir.is_none());
    }

    #[test]
    fn test_channel_set_keeps_first_position() {
        let set = ChannelSet::new(["email", "web", "email"]);
        assert_eq!(set.names(), ["email", "web"]);
        assert!(set.contains("web"));
        assert!(!set.contains("fax"));
    }

    #[test]
    fn test_channel_list_parsing() {
        let set = ChannelSet::from_list(" mobile,web ,, mobile,");
        assert_eq!(set.names(), ["mobile", "web"]);

        assert!(ChannelSet::from_list("").is_empty());
        assert!(ChannelSet::from_list(" , ").is_empty());
        assert_eq!(ChannelSet::from_list("social").len(), 1);
    }

    #[test]
    fn test_options_from_dirs() {
        let opts = PipelineOptions::from_dirs("in", "out");
        assert_eq!(opts.customers_input, Path::new("in/profile.json"));
        assert_eq!(opts.customers_output, Path::new("out/profile_clean.csv"));
    }
}
