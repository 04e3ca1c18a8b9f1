//! OpenLibrary Harvester - Collect rated books from OpenLibrary into a CSV dataset.
//!
//! The harvester scans topical search queries, keeps works with a minimum
//! number of ratings, enriches each one from its work resource and an
//! editions snapshot, and writes the result as a spreadsheet-friendly CSV.
//!
//! # Example
//!
//! ```
//! use openlibrary_harvester::extract::language_codes;
//! use serde_json::json;
//!
//! let languages = json!([{"key": "/languages/eng"}]);
//! assert_eq!(language_codes(Some(&languages)), vec!["eng"]);
//! ```
//!
//! # Architecture
//!
//! The harvester is organized into several modules:
//!
//! - [`config`]: Harvest settings, constants and endpoint URLs
//! - [`error`]: Error types and Result alias
//! - [`http`]: HTTP client and the fail-soft JSON fetch
//! - [`source`]: Catalog endpoint abstraction and its HTTP implementation
//! - [`types`]: Core data types (CandidateDocument, WorkDetail, OutputRow, etc.)
//! - [`extract`]: Pure field extractors
//! - [`lookup`]: Ratings, work, editions and author lookups
//! - [`enrich`]: Merging lookups into output rows
//! - [`harvester`]: Main harvest loop
//! - [`export`]: CSV output
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod enrich;
pub mod error;
pub mod export;
pub mod extract;
pub mod harvester;
pub mod http;
pub mod lookup;
pub mod source;
pub mod types;

// Re-export main functions
pub use export::{export_rows, write_csv};
pub use harvester::{harvest, HarvestState, HarvestStats, Pacer, ThreadPacer};

// Re-export commonly used items
pub use config::HarvestConfig;
pub use error::{HarvesterError, Result};
pub use source::{CatalogSource, OpenLibraryClient};
pub use types::{CandidateDocument, EditionAggregate, OutputRow, RatingsSummary, WorkDetail};
