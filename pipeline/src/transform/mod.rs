//! Transformation module.
//!
//! - Offers: channel flags and hour durations
//! - Customers: age sentinel and membership dates
//! - Transcript: event names and payload merging
//! - Reconcile: dense ids shared across tables
//! - Pipeline: read, clean, reconcile, write

pub mod customers;
pub mod offers;
pub mod pipeline;
pub mod reconcile;
pub mod transcript;

pub use customers::{clean_customer, clean_customers, parse_member_since, AGE_NOT_PROVIDED};
pub use offers::{channel_flags, clean_offer, clean_offers, duration_hours};
pub use pipeline::*;
pub use reconcile::{
    reconcile_ids, CustomerIds, ForeignKey, IdMapping, IdNamespace, OfferIds, PrimaryKey,
    Reconciled,
};
pub use transcript::{clean_event, clean_transcript, count_by_kind, merge_payload, normalize_event_name};
