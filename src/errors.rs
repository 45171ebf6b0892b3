//!
//! src/errors.rs
//!
//! Defines the error enum and conversions for everything
//! the source resolver can fail with
//!
//!

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("source is not bound to a host search yet")]
    NotReady,
    #[error("query is required")]
    EmptyQuery,
    #[error("config error: {0}")]
    Config(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self { SourceError::Http(e.to_string()) }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self { SourceError::Parse(e.to_string()) }
}
