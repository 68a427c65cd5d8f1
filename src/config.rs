/// Configuration for the skin resolver
use crate::error::{SkinError, SkinResult};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;

/// Resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkinCacheConfig {
    /// Lifetime of id → skin entries in seconds
    pub skin_ttl_secs: u64,
    /// Lifetime of name → id entries in seconds
    pub id_ttl_secs: u64,
    /// Suppress warning logs on provider failures
    pub disable_fetch_warnings: bool,
    /// Whether the name path still uses an id entry once it has expired
    pub trust_expired_ids: bool,
    /// Interval between cache sweeps in seconds
    pub sweep_interval_secs: u64,
    /// Per-request HTTP timeout in seconds
    pub request_timeout_secs: u64,
    /// User-Agent header for HTTP requests
    pub user_agent: String,
    pub endpoints: EndpointConfig,
}

/// Base URLs of the remote services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Name → id service
    pub mojang_api: String,
    /// Id → profile service
    pub session_server: String,
    /// Name → id + skin fallback service
    pub fallback_api: String,
    /// Texture upload service
    pub mineskin_api: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            mojang_api: "https://api.mojang.com".to_string(),
            session_server: "https://sessionserver.mojang.com".to_string(),
            fallback_api: "https://api.ashcon.app".to_string(),
            mineskin_api: "https://api.mineskin.org".to_string(),
        }
    }
}

impl Default for SkinCacheConfig {
    fn default() -> Self {
        Self {
            skin_ttl_secs: 3600,
            id_ttl_secs: 3600,
            disable_fetch_warnings: false,
            trust_expired_ids: true,
            sweep_interval_secs: 60,
            request_timeout_secs: 10,
            user_agent: format!("skin-resolver/{}", env!("CARGO_PKG_VERSION")),
            endpoints: EndpointConfig::default(),
        }
    }
}

impl SkinCacheConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> SkinResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key source
    ///
    /// Missing keys fall back to defaults; present but unparsable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> SkinResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let default_endpoints = EndpointConfig::default();

        let config = Self {
            skin_ttl_secs: parse_or(&lookup, "SKIN_CACHE_TTL", defaults.skin_ttl_secs)?,
            id_ttl_secs: parse_or(&lookup, "SKIN_ID_CACHE_TTL", defaults.id_ttl_secs)?,
            disable_fetch_warnings: parse_or(
                &lookup,
                "SKIN_DISABLE_FETCH_WARNINGS",
                defaults.disable_fetch_warnings,
            )?,
            trust_expired_ids: parse_or(
                &lookup,
                "SKIN_TRUST_EXPIRED_IDS",
                defaults.trust_expired_ids,
            )?,
            sweep_interval_secs: parse_or(
                &lookup,
                "SKIN_SWEEP_INTERVAL",
                defaults.sweep_interval_secs,
            )?,
            request_timeout_secs: parse_or(
                &lookup,
                "SKIN_HTTP_TIMEOUT",
                defaults.request_timeout_secs,
            )?,
            user_agent: lookup("SKIN_USER_AGENT").unwrap_or(defaults.user_agent),
            endpoints: EndpointConfig {
                mojang_api: lookup("SKIN_MOJANG_API_URL").unwrap_or(default_endpoints.mojang_api),
                session_server: lookup("SKIN_SESSION_SERVER_URL")
                    .unwrap_or(default_endpoints.session_server),
                fallback_api: lookup("SKIN_FALLBACK_API_URL")
                    .unwrap_or(default_endpoints.fallback_api),
                mineskin_api: lookup("SKIN_MINESKIN_API_URL")
                    .unwrap_or(default_endpoints.mineskin_api),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> SkinResult<()> {
        self.skin_ttl()?;
        self.id_ttl()?;

        if self.sweep_interval_secs == 0 {
            return Err(SkinError::Config("Sweep interval must be non-zero".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(SkinError::Config("HTTP timeout must be non-zero".to_string()));
        }

        for (name, url) in [
            ("mojang_api", &self.endpoints.mojang_api),
            ("session_server", &self.endpoints.session_server),
            ("fallback_api", &self.endpoints.fallback_api),
            ("mineskin_api", &self.endpoints.mineskin_api),
        ] {
            reqwest::Url::parse(url)
                .map_err(|e| SkinError::Config(format!("Invalid {} URL {}: {}", name, url, e)))?;
        }

        Ok(())
    }

    /// TTL of the id → skin cache
    pub fn skin_ttl(&self) -> SkinResult<Duration> {
        ttl_from_secs("skin", self.skin_ttl_secs)
    }

    /// TTL of the name → id cache
    pub fn id_ttl(&self) -> SkinResult<Duration> {
        ttl_from_secs("id", self.id_ttl_secs)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

fn ttl_from_secs(cache: &str, secs: u64) -> SkinResult<Duration> {
    if secs == 0 {
        return Err(SkinError::Config(format!("The {} cache TTL must be non-zero", cache)));
    }

    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| SkinError::Config(format!("The {} cache TTL is out of range", cache)))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> SkinResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| SkinError::Config(format!("Invalid value for {}: {}", key, raw))),
        None => Ok(default),
    }
}
