use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Origin tag stamped on every track this source produces
pub const SOURCE_NAME: &str = "apple";

/// Author the orchestrator shows when the catalog omits the artist
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// The four catalog object kinds the resolver can fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Track,
    Artist,
    Album,
    Playlist
}

/// Uniform track shape handed to the playback orchestrator. Field names
/// serialize to what the orchestrator's wire contract expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTrack {
    pub source_name: String,
    pub identifier: String,
    pub is_seekable: bool,
    pub author: String,
    pub duration_ms: u64,
    pub is_stream: bool,
    pub title: String,
    pub uri: String,
    pub artwork_url: String,
    /// Opaque slot the orchestrator fills downstream; always empty here
    pub plugin_info: Option<Value>,
    /// Requester context attached verbatim from the search options
    pub requester: Option<Value>
}

/// Intermediate resolver output, never exposed past the dispatcher
#[derive(Debug, Clone)]
pub struct Resolved {
    pub tracks: Vec<NormalizedTrack>,
    pub name: Option<String>
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoadKind {
    Track,
    Playlist,
    Search
}

/// Public return shape of `AppleSource::search`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub playlist_name: Option<String>,
    pub tracks: Vec<NormalizedTrack>,
    pub kind: LoadKind
}

impl SearchResult {
    pub fn new(
        playlist_name: Option<String>,
        tracks: Vec<NormalizedTrack>,
        kind: LoadKind
    ) -> Self {
        Self { playlist_name, tracks, kind }
    }

    /// Fail-soft outcome for URL-classified lookups whose fetch failed
    pub fn empty() -> Self {
        Self { playlist_name: None, tracks: Vec::new(), kind: LoadKind::Search }
    }
}

/// Options the host passes through `search`
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub requester: Option<Value>,
    pub engine: Option<String>
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_kind_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&LoadKind::Track).unwrap(), "\"TRACK\"");
        assert_eq!(serde_json::to_string(&LoadKind::Playlist).unwrap(), "\"PLAYLIST\"");
        assert_eq!(serde_json::to_string(&LoadKind::Search).unwrap(), "\"SEARCH\"");
    }

    #[test]
    fn empty_result_is_search_kind() {
        let out = SearchResult::empty();
        assert!(out.playlist_name.is_none());
        assert!(out.tracks.is_empty());
        assert_eq!(out.kind, LoadKind::Search);
    }
}
