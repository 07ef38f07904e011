use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("input file {0} not found")]
    NotFound(PathBuf),

    #[error("missing required column {0:?}")]
    MissingColumn(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that can go wrong while asking the provider for results.
/// The validator folds every variant into the `error` verdict.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by search provider")]
    RateLimited,

    #[error("search provider returned {0}")]
    Status(StatusCode),

    #[error("invalid selector {0}")]
    Selector(String),

    #[error("invalid search url: {0}")]
    Url(String),
}
