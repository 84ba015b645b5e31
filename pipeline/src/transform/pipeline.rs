//! High-level pipeline API.
//!
//! Combines all steps: reading, cleaning each table, reconciling offer and
//! customer ids against the transcript, and writing the cleaned tables.
//!
//! # Example
//!
//! ```rust,ignore
//! use promoclean::{run, PipelineOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = run(&PipelineOptions::from_dirs("./data", "./out"))?;
//!     println!("{} events written", summary.events);
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::Path;

use super::customers::clean_customers;
use super::offers::clean_offers;
use super::reconcile::{reconcile_ids, CustomerIds, IdMapping, OfferIds};
use super::transcript::clean_transcript;
use crate::config::{ChannelSet, PipelineOptions};
use crate::error::{CleanResult, PipelineError, PipelineResult};
use crate::logs::{done, step, TableLog};
use crate::models::{Customer, Event, Offer, RawCustomer, RawEvent, RawOffer};
use crate::reader::read_file;
use crate::writer::{write_customers, write_mapping, write_offers, write_transcript};

pub const OFFER_MAPPING_FILE: &str = "offer_ids.csv";
pub const CUSTOMER_MAPPING_FILE: &str = "customer_ids.csv";

/// The three cleaned, reconciled tables
#[derive(Debug, Clone)]
pub struct CleanTables {
    pub offers: Vec<Offer>,
    pub customers: Vec<Customer>,
    pub events: Vec<Event>,
    pub offer_ids: IdMapping,
    pub customer_ids: IdMapping,
    /// Transcript offer references with no catalog entry
    pub unmapped_offer_refs: usize,
    /// Transcript people missing from the roster
    pub unmapped_customer_refs: usize,
}

/// Counts reported after a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub offers: usize,
    pub customers: usize,
    pub events: usize,
    pub distinct_offer_ids: usize,
    pub distinct_customer_ids: usize,
    pub unmapped_offer_refs: usize,
    pub unmapped_customer_refs: usize,
}

impl CleanTables {
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            offers: self.offers.len(),
            customers: self.customers.len(),
            events: self.events.len(),
            distinct_offer_ids: self.offer_ids.len(),
            distinct_customer_ids: self.customer_ids.len(),
            unmapped_offer_refs: self.unmapped_offer_refs,
            unmapped_customer_refs: self.unmapped_customer_refs,
        }
    }
}

/// Clean the three raw tables and reconcile their ids, all in memory.
///
/// Offer ids are reconciled first, then customer ids; each gets its own
/// `1..=N` keyspace.
pub fn clean_and_reconcile(
    raw_offers: Vec<RawOffer>,
    raw_customers: Vec<RawCustomer>,
    raw_events: Vec<RawEvent>,
    channels: &ChannelSet,
) -> CleanResult<CleanTables> {
    step("🧹 Cleaning tables...");
    let offers = clean_offers(raw_offers, channels);
    let customers = clean_customers(raw_customers)?;
    let events = clean_transcript(raw_events)?;

    step("🔑 Reconciling ids...");
    let by_offer = reconcile_ids::<OfferIds, _, _>(offers, events);
    let unmapped_offer_refs = by_offer.unmapped;
    let (offers, events, offer_ids) = by_offer.into_parts();

    let by_customer = reconcile_ids::<CustomerIds, _, _>(customers, events);
    let unmapped_customer_refs = by_customer.unmapped;
    let (customers, events, customer_ids) = by_customer.into_parts();

    Ok(CleanTables {
        offers,
        customers,
        events,
        offer_ids,
        customer_ids,
        unmapped_offer_refs,
        unmapped_customer_refs,
    })
}

/// Run the whole pipeline from files to files.
///
/// Any failure aborts the run; outputs already written stay on disk.
pub fn run(options: &PipelineOptions) -> PipelineResult<RunSummary> {
    step("📖 Reading inputs...");
    let raw_offers = read_table::<RawOffer>("offers", &options.offers_input)?;
    let raw_customers = read_table::<RawCustomer>("customers", &options.customers_input)?;
    let raw_events = read_table::<RawEvent>("transcript", &options.transcript_input)?;

    let tables = clean_and_reconcile(raw_offers, raw_customers, raw_events, &options.channels)?;

    step("💾 Writing outputs...");
    write_offers(&options.offers_output, &tables.offers, &options.channels)?;
    done(format!("Wrote {}", options.offers_output.display()));
    write_customers(&options.customers_output, &tables.customers)?;
    done(format!("Wrote {}", options.customers_output.display()));
    write_transcript(&options.transcript_output, &tables.events)?;
    done(format!("Wrote {}", options.transcript_output.display()));

    if let Some(ref dir) = options.mappings_dir {
        write_mapping(&dir.join(OFFER_MAPPING_FILE), &tables.offer_ids)?;
        write_mapping(&dir.join(CUSTOMER_MAPPING_FILE), &tables.customer_ids)?;
        done(format!("Wrote id mappings to {}", dir.display()));
    }

    Ok(tables.summary())
}

fn read_table<T: serde::de::DeserializeOwned>(
    table: &'static str,
    path: &Path,
) -> PipelineResult<Vec<T>> {
    let output = read_file::<T>(path).map_err(PipelineError::read(table))?;
    TableLog::new(table).done(format!(
        "{} records from {} ({})",
        output.records.len(),
        path.display(),
        output.encoding
    ));
    Ok(output.records)
}
