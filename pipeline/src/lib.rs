//! # Promoclean - promotional-offer dataset cleaning
//!
//! Promoclean turns three raw newline-delimited JSON datasets (an offer
//! catalog, a customer roster and an event transcript) into clean CSV tables
//! whose ids are dense integer keys shared across tables.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  JSON lines │────▶│   Reader    │────▶│    Clean    │────▶│  Reconcile  │────▶│  CSV tables │
//! │  (3 files)  │     │  (auto-enc) │     │ (per table) │     │ (dense ids) │     │ (+ mappings)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use promoclean::{run, PipelineOptions};
//!
//! fn main() {
//!     let summary = run(&PipelineOptions::from_dirs("./data", "./out")).unwrap();
//!     println!("Cleaned {} events", summary.events);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Raw and cleaned records (Offer, Customer, Event)
//! - [`config`] - Channels, file names and run options
//! - [`reader`] - JSON-lines reading with encoding detection
//! - [`transform`] - Per-table cleaning, id reconciliation and the pipeline
//! - [`writer`] - CSV output
//! - [`logs`] - Progress logging with subscribers

// Core modules
pub mod error;
pub mod models;

// Configuration
pub mod config;

// Logging
pub mod logs;

// Input
pub mod reader;

// Transformation
pub mod transform;

// Output
pub mod writer;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CleanError, CleanResult, PipelineError, PipelineResult, ReadError, ReadResult, WriteError,
    WriteResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Customer, DenseId, EntityId, Event, EventKind, MemberSince, Offer, Payload, RawCustomer,
    RawEvent, RawOffer, RawPayload,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{ChannelSet, PipelineOptions, DEFAULT_DATA_DIR};

// =============================================================================
// Re-exports - Reader
// =============================================================================

pub use reader::{decode_content, detect_encoding, parse_ndjson, read_bytes, read_file, ReadOutput};

// =============================================================================
// Re-exports - Cleaning and reconciliation
// =============================================================================

pub use transform::{
    clean_customers, clean_offers, clean_transcript, reconcile_ids, CustomerIds, ForeignKey,
    IdMapping, IdNamespace, OfferIds, PrimaryKey, Reconciled,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{clean_and_reconcile, run, CleanTables, RunSummary};

// =============================================================================
// Re-exports - Writer
// =============================================================================

pub use writer::{
    offer_columns, write_customers, write_mapping, write_offers, write_table, write_transcript,
    TableRow, CUSTOMER_COLUMNS, TRANSCRIPT_COLUMNS,
};

// =============================================================================
// Re-exports - Logs
// =============================================================================

pub use logs::{subscribe, LogEntry, LogLevel, TableLog};
