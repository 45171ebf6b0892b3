//!
//! src/fetch.rs
//!
//! Defines the raw catalog fetch capability: a GET-JSON-at-path
//! trait the resolver consumes, and the reqwest-backed client that
//! implements it against the country-scoped catalog endpoint
//!

use async_trait::async_trait;
use reqwest::{Client, header, redirect};
use serde_json::Value;
use url::Url;

use crate::config::{AppleConfig, HttpConfig, CATALOG_ORIGIN};
use crate::SourceError;

/// Raw catalog access: GET the JSON body at a path relative to the
/// country-scoped base. Auth and origin headers are the implementor's
/// problem, not the caller's.
#[async_trait]
pub trait CatalogFetch: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<Value, SourceError>;
}

/// Client building functionality
fn client_helper(http: &HttpConfig) -> reqwest::ClientBuilder  {
    Client::builder()
        .timeout(http.timeout)
        .connect_timeout(http.connect_timeout)
        .pool_max_idle_per_host(http.pool_max_idle_per_host)
        .pool_idle_timeout(Some(http.pool_idle_timeout))
        .redirect(redirect::Policy::limited(http.max_redirects as usize))
}

fn client_with_headers(http: &HttpConfig, headers: header::HeaderMap) ->
    Result<Client, SourceError> {
    client_helper(http)
        .default_headers(headers)
        .build()
        .map_err(|e| SourceError::Http(format!("build client: {e}")))
}

#[derive(Clone, Debug)]
pub struct CatalogClient {
    pub http: Client,
    pub base: Url
}

impl CatalogClient {
    pub fn new(http_config: &HttpConfig, cfg: &AppleConfig) ->
        Result<Self, SourceError> {

        // Bearer header is sent even with an empty credential; the
        // catalog rejects requests without it outright
        let mut h = header::HeaderMap::new();
        h.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        h.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", cfg.media_token))
                .map_err(|e| SourceError::Config(
                    format!("invalid media token {e}")
                ))?
        );
        h.insert(
            header::ORIGIN,
            header::HeaderValue::from_static(CATALOG_ORIGIN)
        );

        let http = client_with_headers(http_config, h)?;
        let base = cfg.catalog_base()?;
        Ok( Self { http, base } )
    }
}

#[async_trait]
impl CatalogFetch for CatalogClient {
    /// GET {base}{path}, e.g. /songs/{id} or /search?types=songs&term=...
    async fn get_json(&self, path: &str) -> Result<Value, SourceError> {
        let url = Url::parse(
            &format!("{}{path}", self.base.as_str().trim_end_matches('/'))
        ).map_err(|e| SourceError::Http(format!("catalog url {path}: {e}")))?;

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SourceError::Http(
                format!("catalog returned {status} for {path}: {body}")
            ));
        }
        let v = resp.json::<Value>().await?;
        Ok(v)
    }
}
