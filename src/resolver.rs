//!
//! src/resolver.rs
//!
//! Turns an entity kind plus catalog id into normalized tracks by
//! fetching the matching catalog object and flattening its shape
//!

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::AppleConfig;
use crate::fetch::CatalogFetch;
use crate::types::{EntityKind, NormalizedTrack, Resolved, SOURCE_NAME, UNKNOWN_AUTHOR};
use crate::SourceError;

pub struct Resolver {
    fetch: Arc<dyn CatalogFetch>,
    image_width: u32,
    image_height: u32
}

impl Resolver {
    pub fn new(fetch: Arc<dyn CatalogFetch>, cfg: &AppleConfig) -> Self {
        Self {
            fetch,
            image_width: cfg.image_width,
            image_height: cfg.image_height
        }
    }

    /// Resolve one catalog entity into tracks. Collection kinds carry
    /// their display name; single-item kinds do not.
    pub async fn resolve(
        &self,
        kind: EntityKind,
        id: &str,
        requester: Option<&Value>
    ) -> Result<Resolved, SourceError> {
        debug!(kind = ?kind, id = %id, "resolve.start");
        match kind {
            EntityKind::Track    => self.track(id, requester).await,
            EntityKind::Artist   => self.artist(id, requester).await,
            EntityKind::Album    => {
                self.collection(&format!("/albums/{id}"), requester).await
            }
            EntityKind::Playlist => {
                self.collection(&format!("/playlists/{id}"), requester).await
            }
        }
    }

    /// GET /songs/{id}
    async fn track(&self, id: &str, requester: Option<&Value>) ->
        Result<Resolved, SourceError> {
        let body = self.fetch.get_json(&format!("/songs/{id}")).await?;
        let item = first_item(&body, &format!("songs/{id}"))?;
        Ok( Resolved {
            tracks: vec![self.build_track(item, requester)],
            name: None
        })
    }

    /// GET /artists/{id}/view/top-songs
    ///
    /// Contract: only the first top-song is returned, as a single
    /// track. Callers wanting the full listing do not get it here.
    async fn artist(&self, id: &str, requester: Option<&Value>) ->
        Result<Resolved, SourceError> {
        let body = self.fetch.get_json(
            &format!("/artists/{id}/view/top-songs")
        ).await?;
        let item = first_item(&body, &format!("artists/{id}/view/top-songs"))?;
        Ok( Resolved {
            tracks: vec![self.build_track(item, requester)],
            name: None
        })
    }

    /// GET /albums/{id} or /playlists/{id}; every entry of the track
    /// relationship in catalog order, null children dropped
    async fn collection(&self, path: &str, requester: Option<&Value>) ->
        Result<Resolved, SourceError> {
        let body = self.fetch.get_json(path).await?;
        let item = first_item(&body, path)?;

        let raw = item.get("relationships")
            .and_then(|r| r.get("tracks"))
            .and_then(|t| t.get("data"))
            .and_then(Value::as_array)
            .ok_or_else(|| SourceError::Parse(
                format!("{path}: missing relationships.tracks.data")
            ))?;

        let tracks = raw.iter()
            .filter(|t| !t.is_null())
            .map(|t| self.build_track(t, requester))
            .collect::<Vec<_>>();

        let name = item.get("attributes")
            .and_then(|a| a.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string);

        debug!(path = %path, tracks = tracks.len(), "resolve.collection");
        Ok( Resolved { tracks, name } )
    }

    /// GET /search?types=songs&term=... with the term lowercased and
    /// spaces folded to '+'
    pub async fn search_songs(&self, query: &str, requester: Option<&Value>) ->
        Result<Resolved, SourceError> {
        let term = query.replace(' ', "+").to_lowercase();
        let path = format!("/search?types=songs&term={term}");
        let body = self.fetch.get_json(&path).await?;

        let raw = body.get("results")
            .and_then(|r| r.get("songs"))
            .and_then(|s| s.get("data"))
            .and_then(Value::as_array)
            .ok_or_else(|| SourceError::Parse(
                format!("search '{term}': missing results.songs.data")
            ))?;

        let tracks = raw.iter()
            .map(|t| self.build_track(t, requester))
            .collect::<Vec<_>>();

        debug!(term = %term, tracks = tracks.len(), "resolve.search");
        Ok( Resolved { tracks, name: None } )
    }

    /// Flatten one raw catalog song into the uniform track shape.
    /// Identifier and duration come through verbatim; author and uri
    /// fall back to "Unknown" / "" when the catalog omits them.
    fn build_track(&self, raw: &Value, requester: Option<&Value>) -> NormalizedTrack {
        let attrs = raw.get("attributes");

        let template = attrs
            .and_then(|a| a.get("artwork"))
            .and_then(|a| a.get("url"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let artwork_url = template
            .replace("{w}", &self.image_width.to_string())
            .replace("{h}", &self.image_height.to_string());

        NormalizedTrack {
            source_name: SOURCE_NAME.to_string(),
            identifier: raw.get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            is_seekable: true,
            author: attrs
                .and_then(|a| a.get("artistName"))
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_AUTHOR)
                .to_string(),
            duration_ms: attrs
                .and_then(|a| a.get("durationInMillis"))
                .and_then(Value::as_u64)
                .unwrap_or(0),
            is_stream: false,
            title: attrs
                .and_then(|a| a.get("name"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            uri: attrs
                .and_then(|a| a.get("url"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            artwork_url,
            plugin_info: None,
            requester: requester.cloned()
        }
    }
}

fn first_item<'a>(body: &'a Value, what: &str) -> Result<&'a Value, SourceError> {
    body.get("data")
        .and_then(|d| d.get(0))
        .ok_or_else(|| SourceError::Parse(format!("{what}: missing data[0]")))
}
