//!
//! src/lib.rs
//!
//! Apple Music source resolver for a media-playback orchestrator:
//! classifies queries, fetches catalog entities, and normalizes them
//! into one uniform track shape, falling back to the wrapped host
//! search for everything else
//!

pub mod config;
pub mod errors;
pub mod logging;

pub mod fetch;
pub mod types;
pub mod resolver;
pub mod search;

pub use crate::config::{load_config, AppConfig, AppleConfig, HttpConfig, LoggingConfig};
pub use crate::errors::SourceError;
pub use crate::fetch::{CatalogClient, CatalogFetch};
pub use crate::resolver::Resolver;
pub use crate::search::{classify, AppleSource, CatalogRef, HostSearch, UrlEntity};
pub use crate::types::{
    EntityKind, LoadKind, NormalizedTrack, Resolved, SearchOptions, SearchResult
};
