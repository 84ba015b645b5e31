//! CSV table writer.
//!
//! Tables are written with a header row and no index column. Missing values
//! become empty cells, dates are ISO `YYYY-MM-DD`, numbers use their shortest
//! round-trip form (`10`, `0.83`).

use std::fmt::Display;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::config::ChannelSet;
use crate::error::WriteResult;
use crate::models::{Customer, EntityId, Event, Offer};
use crate::transform::reconcile::IdMapping;

pub const CUSTOMER_COLUMNS: [&str; 5] = ["customer_id", "gender", "age", "income", "became_member_on"];

pub const TRANSCRIPT_COLUMNS: [&str; 6] = ["customer_id", "time", "event", "amount", "reward", "offer_id"];

pub const MAPPING_COLUMNS: [&str; 2] = ["dense_id", "source_id"];

/// Offer columns: id, one flag per channel, then the offer attributes.
pub fn offer_columns(channels: &ChannelSet) -> Vec<String> {
    let mut columns = vec!["offer_id".to_string()];
    columns.extend(channels.names().iter().cloned());
    columns.extend(
        ["offer_type", "duration", "difficulty", "reward"]
            .iter()
            .map(|c| c.to_string()),
    );
    columns
}

/// A cleaned record that can be written as one CSV row.
pub trait TableRow {
    fn record(&self) -> Vec<String>;
}

fn cell<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn id_cell(id: Option<&EntityId>) -> String {
    cell(id)
}

impl TableRow for Offer {
    fn record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(self.channels.len() + 5);
        record.push(self.offer_id.to_string());
        record.extend(self.channels.iter().map(|&on| String::from(if on { "1" } else { "0" })));
        record.push(self.offer_type.clone());
        record.push(self.duration_hours.to_string());
        record.push(self.difficulty.to_string());
        record.push(self.reward.to_string());
        record
    }
}

impl TableRow for Customer {
    fn record(&self) -> Vec<String> {
        vec![
            self.customer_id.to_string(),
            cell(self.gender.as_deref()),
            cell(self.age),
            cell(self.income),
            self.became_member_on.format("%Y-%m-%d").to_string(),
        ]
    }
}

impl TableRow for Event {
    fn record(&self) -> Vec<String> {
        vec![
            id_cell(self.customer_id.as_ref()),
            self.time.to_string(),
            self.kind.name().to_string(),
            cell(self.kind.amount()),
            cell(self.kind.reward()),
            id_cell(self.kind.offer_id()),
        ]
    }
}

/// Write a header and rows to any writer. Returns the number of data rows.
pub fn write_table<W, H, R>(writer: W, header: &[H], rows: R) -> WriteResult<usize>
where
    W: Write,
    H: AsRef<str>,
    R: IntoIterator<Item = Vec<String>>,
{
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(header.iter().map(|h| h.as_ref()))?;

    let mut count = 0;
    for row in rows {
        csv_writer.write_record(&row)?;
        count += 1;
    }
    csv_writer.flush()?;

    Ok(count)
}

/// Write a table to a file, creating parent directories.
pub fn write_table_file<H, R>(path: &Path, header: &[H], rows: R) -> WriteResult<usize>
where
    H: AsRef<str>,
    R: IntoIterator<Item = Vec<String>>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)?;
    write_table(file, header, rows)
}

pub fn write_offers(path: &Path, offers: &[Offer], channels: &ChannelSet) -> WriteResult<usize> {
    let header = offer_columns(channels);
    write_table_file(path, header.as_slice(), offers.iter().map(TableRow::record))
}

pub fn write_customers(path: &Path, customers: &[Customer]) -> WriteResult<usize> {
    write_table_file(path, &CUSTOMER_COLUMNS, customers.iter().map(TableRow::record))
}

pub fn write_transcript(path: &Path, events: &[Event]) -> WriteResult<usize> {
    write_table_file(path, &TRANSCRIPT_COLUMNS, events.iter().map(TableRow::record))
}

/// Write an id mapping as `dense_id,source_id` rows in key order.
pub fn write_mapping(path: &Path, mapping: &IdMapping) -> WriteResult<usize> {
    write_table_file(
        path,
        &MAPPING_COLUMNS,
        mapping
            .iter()
            .map(|(dense, source)| vec![dense.to_string(), source.to_string()]),
    )
}
