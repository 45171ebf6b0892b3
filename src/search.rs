//!
//! src/search.rs
//!
//! The query dispatcher: classifies an incoming query as a catalog
//! URL, an apple-scoped text search, or something for the wrapped
//! host search, and routes it accordingly
//!

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::config::{AppleConfig, HttpConfig};
use crate::fetch::{CatalogClient, CatalogFetch};
use crate::resolver::Resolver;
use crate::types::{
    EntityKind, LoadKind, SearchOptions, SearchResult, SOURCE_NAME
};
use crate::SourceError;

const CATALOG_HOST: &str = "music.apple.com";
const CATALOG_URL_PREFIX: &str = "https://music.apple.com/";

/// The wrapped host search capability this source falls back to
#[async_trait]
pub trait HostSearch: Send + Sync {
    async fn search(&self, query: &str, options: &SearchOptions) ->
        Result<SearchResult, SourceError>;
}

/// Entity tokens recognized inside catalog web URLs. Note this is a
/// wider set than the resolver handles: music-video is recognized
/// but has no fetch operation and falls through to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlEntity {
    Artist,
    Album,
    MusicVideo,
    Playlist
}

impl UrlEntity {
    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "artist"      => Some(UrlEntity::Artist),
            "album"       => Some(UrlEntity::Album),
            "music-video" => Some(UrlEntity::MusicVideo),
            "playlist"    => Some(UrlEntity::Playlist),
            _ => None
        }
    }

    /// Resolver operation for this outer entity, if one exists
    fn operation(self) -> Option<EntityKind> {
        match self {
            UrlEntity::Artist     => Some(EntityKind::Artist),
            UrlEntity::Album      => Some(EntityKind::Album),
            UrlEntity::Playlist   => Some(EntityKind::Playlist),
            UrlEntity::MusicVideo => None
        }
    }
}

/// What a catalog URL names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRef {
    /// .../<entity>/<slug>/<id>
    Collection { entity: UrlEntity, id: String },
    /// Same shape plus a trailing ?key=value naming a track inside
    /// the collection; the parameter value is the track id
    TrackInCollection { entity: UrlEntity, track_id: String }
}

/// Structured classification of a query string as a catalog web URL.
/// The URL may sit anywhere inside the query; matching starts at the
/// catalog prefix and stops at the first whitespace. The stricter
/// track matcher is tested first: a collection URL carrying a
/// trailing parameter always resolves as a track, never as its outer
/// collection type.
pub fn classify(query: &str) -> Option<CatalogRef> {
    let start = query.find(CATALOG_URL_PREFIX)?;
    let candidate = query[start..].split_whitespace().next()?;
    let url = Url::parse(candidate).ok()?;
    if url.scheme() != "https" || url.host_str() != Some(CATALOG_HOST) {
        return None;
    }

    let segments: Vec<&str> = url.path_segments()?
        .filter(|s| !s.is_empty())
        .collect();

    let (pos, entity) = segments.iter()
        .enumerate()
        .find_map(|(i, s)| UrlEntity::from_segment(s).map(|e| (i, e)))?;

    // the entity token must be followed by a slug and an id
    let rest = &segments[pos + 1..];
    if rest.len() < 2 {
        return None;
    }
    let id = rest[rest.len() - 1];

    if let Some((_, value)) = url.query_pairs().next() {
        if !value.is_empty() {
            return Some(CatalogRef::TrackInCollection {
                entity,
                track_id: value.into_owned()
            });
        }
    }

    Some(CatalogRef::Collection { entity, id: id.to_string() })
}

fn is_url(query: &str) -> bool {
    query.starts_with("http://") || query.starts_with("https://")
}

/// Host delegate binding, set exactly once
enum HostBinding {
    Unbound,
    Bound(Arc<dyn HostSearch>)
}

pub struct AppleSource {
    resolver: Resolver,
    host: HostBinding
}

impl AppleSource {
    pub fn new(http: &HttpConfig, apple: &AppleConfig) -> Result<Self, SourceError> {
        let client = CatalogClient::new(http, apple)?;
        Ok( Self::with_fetch(Arc::new(client), apple) )
    }

    /// Seam for tests and alternative transports
    pub fn with_fetch(fetch: Arc<dyn CatalogFetch>, apple: &AppleConfig) -> Self {
        Self {
            resolver: Resolver::new(fetch, apple),
            host: HostBinding::Unbound
        }
    }

    /// Capture the host's own search. First binding wins; later
    /// calls leave the original delegate untouched.
    pub fn bind(mut self, host: Arc<dyn HostSearch>) -> Self {
        if let HostBinding::Unbound = self.host {
            self.host = HostBinding::Bound(host);
        }
        self
    }

    /// Classify and route one query. URL-classified catalog failures
    /// are swallowed into an empty SEARCH outcome; free-text catalog
    /// search failures surface to the caller.
    pub async fn search(&self, query: &str, options: &SearchOptions) ->
        Result<SearchResult, SourceError> {

        let host = match &self.host {
            HostBinding::Bound(h) => h.clone(),
            HostBinding::Unbound  => return Err(SourceError::NotReady)
        };
        if query.is_empty() {
            return Err(SourceError::EmptyQuery);
        }

        if let Some(reference) = classify(query) {
            debug!(reference = ?reference, "search.classify");
            let entity = match &reference {
                CatalogRef::Collection { entity, .. } => *entity,
                CatalogRef::TrackInCollection { entity, .. } => *entity
            };

            if let Some(operation) = entity.operation() {
                let (kind, id, load) = match &reference {
                    CatalogRef::Collection { id, .. } =>
                        (operation, id.as_str(), LoadKind::Playlist),
                    CatalogRef::TrackInCollection { track_id, .. } =>
                        (EntityKind::Track, track_id.as_str(), LoadKind::Track)
                };

                return match self.resolver
                    .resolve(kind, id, options.requester.as_ref())
                    .await
                {
                    Ok(resolved) => Ok(SearchResult::new(
                        resolved.name,
                        resolved.tracks,
                        load
                    )),
                    Err(e) => {
                        warn!(error = %e, id = %id, "search.url.failed");
                        Ok(SearchResult::empty())
                    }
                };
            }
            // recognized token without a fetch operation (music-video)
            // behaves like an unmatched URL
            debug!(entity = ?entity, "search.url.unroutable");
        }

        if options.engine.as_deref() == Some(SOURCE_NAME) && !is_url(query) {
            let resolved = self.resolver
                .search_songs(query, options.requester.as_ref())
                .await?;
            return Ok(SearchResult::new(None, resolved.tracks, LoadKind::Search));
        }

        host.search(query, options).await
    }
}
