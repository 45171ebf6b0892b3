use url::Url;
use std::time;
use crate::SourceError;

/// Constants for HTTP Config
pub const HTTP_TIMEOUT: u64 = 8000;
pub const HTTP_CONNECT_TIMEOUT: u64 = 2000;
pub const HTTP_POOL_MAX_IDLE: usize = 16;
pub const HTTP_POOL_IDLE_TIMEOUT: u64 = 90000;
pub const HTTP_MAX_REDIRECTS: u8 = 4;

/// Defaults the catalog assumes when the host configures nothing
pub const DEFAULT_COUNTRY_CODE: &str = "us";
pub const DEFAULT_IMAGE_WIDTH: u32 = 600;
pub const DEFAULT_IMAGE_HEIGHT: u32 = 900;

pub const CATALOG_API_BASE: &str = "https://amp-api.music.apple.com/v1/catalog/";
pub const CATALOG_ORIGIN: &str = "https://music.apple.com";

/// Ensures that url is https
fn ensure_https(url: &Url) -> Result<(), String> {
    if url.scheme() == "https" {
        Ok(())
    } else {
        Err(format!("URL must be https: {url}"))
    }
}

fn ensure_host(url: &Url, expected_host: &str) -> Result<(), String> {
    match url.host_str() {
        Some(h) if h.eq_ignore_ascii_case(expected_host) => Ok(()),
        Some(h) => Err(
            format!("Unexpected host for {url} (got {h}, expected {expected_host})")
        ),
        None => Err(format!("URL missing host: {url}"))
    }
}

///
/// Configuration the host hands over at construction time
///
#[derive(Debug, Clone)]
pub struct AppleConfig {
    pub country_code: String,  // storefront, default "us"
    pub media_token: String,   // bearer credential, may be empty
    pub image_width: u32,      // substituted for {w} in artwork templates
    pub image_height: u32,     // substituted for {h}
    pub api_base: Url          // country-less catalog root
}

impl Default for AppleConfig {
    fn default() -> Self {
        Self {
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            media_token: String::new(),
            image_width: DEFAULT_IMAGE_WIDTH,
            image_height: DEFAULT_IMAGE_HEIGHT,
            api_base: Url::parse(CATALOG_API_BASE).unwrap()
        }
    }
}

impl AppleConfig {
    /// Country-scoped catalog endpoint all relative fetch paths hang off of.
    /// The base is normalized to a trailing slash here so a hand-built
    /// config cannot lose its last path segment in the join.
    pub fn catalog_base(&self) -> Result<Url, SourceError> {
        let mut base = self.api_base.clone();
        if !base.path().ends_with('/') {
            let mut path = base.path().to_string();
            path.push('/');
            base.set_path(&path);
        }
        base.join(&format!("{}/", self.country_code))
            .map_err(|e| SourceError::Config(
                format!("catalog base for {}: {e}", self.country_code)
            ))
    }
}

fn build_apple() -> Result<AppleConfig, SourceError> {
    let env_to_uint = |s: &str, default: u32| -> u32 {
        match std::env::var(s) {
            Ok(s) => {
                match s.parse::<u32>() {
                    Ok(value) => value,
                    _ => default
                }
            },
            Err(_) => default
        }
    };

    let country_code = std::env::var("APPLE_COUNTRY_CODE")
        .unwrap_or_else(|_| DEFAULT_COUNTRY_CODE.to_string());
    let media_token  = std::env::var("APPLE_MEDIA_TOKEN").unwrap_or_default();
    let image_width  = env_to_uint("APPLE_IMAGE_WIDTH", DEFAULT_IMAGE_WIDTH);
    let image_height = env_to_uint("APPLE_IMAGE_HEIGHT", DEFAULT_IMAGE_HEIGHT);

    let api_base = std::env::var("APPLE_API_BASE")
        .unwrap_or_else(|_| CATALOG_API_BASE.to_string());

    let mut api_base = Url::parse(&api_base)
        .map_err(|e| SourceError::Config(
            format!("APPLE_API_BASE invalid {e}")
        ))?;

    // https and hostname check
    ensure_https(&api_base)
        .map_err(SourceError::Config)?;
    ensure_host(&api_base, "amp-api.music.apple.com")
        .map_err(SourceError::Config)?;

    // ensure trailing slash
    if !api_base.path().ends_with('/') {
        let mut path = api_base.path().to_string();
        path.push('/');
        api_base.set_path(&path);
    }

    Ok( AppleConfig {
        country_code,
        media_token,
        image_width,
        image_height,
        api_base
    })
}

///
/// Configuration for Http timeouts, pooling, etc.
///
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: time::Duration,
    pub connect_timeout: time::Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: time::Duration,
    pub max_redirects: u8
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: time::Duration::from_millis(HTTP_TIMEOUT),
            connect_timeout: time::Duration::from_millis(HTTP_CONNECT_TIMEOUT),
            pool_max_idle_per_host: HTTP_POOL_MAX_IDLE,
            pool_idle_timeout: time::Duration::from_millis(HTTP_POOL_IDLE_TIMEOUT),
            max_redirects: HTTP_MAX_REDIRECTS
        }
    }
}

///
/// Configuration for Logger
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter_directives: String,
    pub format: LogFormat,
    pub include_file_line: bool,
    pub include_target: bool
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter_directives: "info,rs_apple_source=debug,reqwest=warn".to_string(),
            format: LogFormat::Json,
            include_file_line: true,
            include_target: true
        }
    }
}

///
/// AppConfig which holds everything the fetch module and the source need
///
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub apple: AppleConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig
}

///
/// Return all environment variables to caller at program start.
///
pub fn load_config() -> Result<AppConfig, SourceError> {
    dotenvy::dotenv().ok();

    let apple   = build_apple()?;
    let http    = HttpConfig::default();
    let logging = LoggingConfig::default();

    Ok( AppConfig { apple, http, logging } )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_storefront_contract() {
        let cfg = AppleConfig::default();
        assert_eq!(cfg.country_code, "us");
        assert_eq!(cfg.image_width, 600);
        assert_eq!(cfg.image_height, 900);
        assert!(cfg.media_token.is_empty());
    }

    #[test]
    fn catalog_base_is_country_scoped() {
        let mut cfg = AppleConfig::default();
        cfg.country_code = "fr".to_string();
        let base = cfg.catalog_base().unwrap();
        assert_eq!(
            base.as_str(),
            "https://amp-api.music.apple.com/v1/catalog/fr/"
        );
    }

    #[test]
    fn catalog_base_survives_missing_trailing_slash() {
        let mut cfg = AppleConfig::default();
        cfg.country_code = "jp".to_string();
        cfg.api_base = Url::parse("https://amp-api.music.apple.com/v1/catalog").unwrap();
        let base = cfg.catalog_base().unwrap();
        assert_eq!(
            base.as_str(),
            "https://amp-api.music.apple.com/v1/catalog/jp/"
        );
    }

    fn set(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) };
    }

    fn unset(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn clear_apple_env() {
        for key in [
            "APPLE_COUNTRY_CODE",
            "APPLE_MEDIA_TOKEN",
            "APPLE_IMAGE_WIDTH",
            "APPLE_IMAGE_HEIGHT",
            "APPLE_API_BASE"
        ] {
            unset(key);
        }
    }

    // One test owns every APPLE_* variable; splitting these up would
    // race under the parallel test runner
    #[test]
    fn env_overrides_and_base_validation() {
        clear_apple_env();

        // happy overrides
        set("APPLE_COUNTRY_CODE", "de");
        set("APPLE_MEDIA_TOKEN", "token-123");
        set("APPLE_IMAGE_WIDTH", "256");
        set("APPLE_IMAGE_HEIGHT", "384");
        let cfg = build_apple().unwrap();
        assert_eq!(cfg.country_code, "de");
        assert_eq!(cfg.media_token, "token-123");
        assert_eq!(cfg.image_width, 256);
        assert_eq!(cfg.image_height, 384);

        // non-numeric dimensions fall back to the defaults
        set("APPLE_IMAGE_WIDTH", "wide");
        set("APPLE_IMAGE_HEIGHT", "");
        let cfg = build_apple().unwrap();
        assert_eq!(cfg.image_width, DEFAULT_IMAGE_WIDTH);
        assert_eq!(cfg.image_height, DEFAULT_IMAGE_HEIGHT);

        // base overrides must be https on the expected host
        set("APPLE_API_BASE", "http://amp-api.music.apple.com/v1/catalog/");
        assert!(matches!(build_apple(), Err(SourceError::Config(_))));

        set("APPLE_API_BASE", "https://example.com/v1/catalog/");
        assert!(matches!(build_apple(), Err(SourceError::Config(_))));

        // accepted override gains a trailing slash
        set("APPLE_API_BASE", "https://amp-api.music.apple.com/v1/catalog");
        let cfg = build_apple().unwrap();
        assert_eq!(
            cfg.api_base.as_str(),
            "https://amp-api.music.apple.com/v1/catalog/"
        );

        clear_apple_env();
    }
}
