//! Match file ingestion.
//!
//! Raw Cricsheet JSON is parsed into [`Delivery`](crate::models::Delivery) rows,
//! checked against innings limits, and stored one match per transaction.

mod parse;
mod raw;
mod season;
mod validate;

use std::path::PathBuf;

use thiserror::Error;

pub use parse::{match_id_for, parse_match, read_match_file};
pub use raw::{RawDelivery, RawInnings, RawMatch, RawOver};
pub use season::{ingest_season, IngestOptions};
pub use validate::{validate, InningsSummary, ValidationError, Violation, MAX_LEGAL_BALLS, MAX_WICKETS};

use crate::repository::StoreError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed match file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no match id for {0}: file stem is not numeric and event.match_number is absent")]
    MissingMatchId(PathBuf),

    #[error("no match files (*.json) in {0}")]
    NoMatchFiles(PathBuf),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of an [`ingest_season`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub files: usize,
    pub ingested: usize,
    pub skipped: usize,
    pub failed: usize,
    pub deliveries_added: usize,
    pub players_added: usize,
}
