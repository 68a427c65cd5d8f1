/// Remote skin providers
///
/// Each remote service sits behind its own trait so the resolver can be
/// driven by the HTTP clients below or by any host-supplied implementation.
/// Providers report an explicit "not found" as `Ok(None)` and every other
/// failure as `Err`.

pub mod ashcon;
pub mod mineskin;
pub mod mojang;

pub use ashcon::AshconClient;
pub use mineskin::MineSkinClient;
pub use mojang::{MojangClient, SessionClient};

use crate::{
    config::SkinCacheConfig,
    error::{SkinError, SkinResult},
    skin::{Skin, SkinVariant},
};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::{DeserializeOwned, Deserializer, IgnoredAny};
use serde::Deserialize;
use std::sync::Arc;

/// Name → id lookup
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn lookup_id(&self, name: &str) -> SkinResult<Option<String>>;
}

/// Id → skin lookup
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    async fn fetch_profile(&self, id: &str) -> SkinResult<Option<Skin>>;
}

/// Name → id + skin lookup in a single request
#[async_trait]
pub trait FallbackProvider: Send + Sync {
    async fn lookup(&self, name: &str) -> SkinResult<Option<FallbackProfile>>;
}

/// Generates a signed texture from an arbitrary image URL
#[async_trait]
pub trait TextureUploader: Send + Sync {
    async fn generate(&self, url: &Url, variant: SkinVariant) -> SkinResult<Option<Skin>>;
}

/// Result of a fallback lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackProfile {
    pub id: String,
    pub skin: Skin,
}

/// The set of providers consulted by the resolver
#[derive(Clone)]
pub struct ProviderChain {
    pub identity: Arc<dyn IdentityProvider>,
    pub profile: Arc<dyn ProfileProvider>,
    pub fallback: Arc<dyn FallbackProvider>,
    pub uploader: Arc<dyn TextureUploader>,
}

impl ProviderChain {
    /// Build the HTTP provider chain from configuration
    pub fn from_config(config: &SkinCacheConfig) -> SkinResult<Self> {
        let http_client = build_http_client(config)?;
        let endpoints = &config.endpoints;

        Ok(Self {
            identity: Arc::new(MojangClient::new(
                http_client.clone(),
                &endpoints.mojang_api,
            )),
            profile: Arc::new(SessionClient::new(
                http_client.clone(),
                &endpoints.session_server,
            )),
            fallback: Arc::new(AshconClient::new(
                http_client.clone(),
                &endpoints.fallback_api,
            )),
            uploader: Arc::new(MineSkinClient::new(http_client, &endpoints.mineskin_api)),
        })
    }
}

/// Build the shared HTTP client
pub(crate) fn build_http_client(config: &SkinCacheConfig) -> SkinResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| SkinError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Join a base URL and a path without doubling slashes
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Response bodies that can carry an explicit error marker
pub(crate) trait ErrorMarked {
    fn has_error(&self) -> bool;
}

/// Deserialize a field as "present", whatever its value
///
/// Used with `#[serde(default)]` so that `"error": null` still counts as an
/// error marker while an absent field does not.
pub(crate) fn present<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    IgnoredAny::deserialize(deserializer).map(|_| true)
}

/// Read a provider response
///
/// An empty body or a body carrying the provider's error marker is a
/// "not found". Unparsable bodies and other non-success statuses are errors.
pub(crate) async fn read_json<T>(
    provider: &'static str,
    response: reqwest::Response,
) -> SkinResult<Option<T>>
where
    T: DeserializeOwned + ErrorMarked,
{
    let status = response.status();
    let body = response.text().await?;

    if body.trim().is_empty() {
        return if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            Err(SkinError::UnexpectedStatus {
                provider,
                status: status.as_u16(),
            })
        };
    }

    let parsed: T = match serde_json::from_str(&body) {
        Ok(parsed) => parsed,
        Err(e) if status.is_success() => return Err(e.into()),
        Err(_) => {
            return Err(SkinError::UnexpectedStatus {
                provider,
                status: status.as_u16(),
            })
        }
    };

    if parsed.has_error() {
        return Ok(None);
    }

    if !status.is_success() {
        return Err(SkinError::UnexpectedStatus {
            provider,
            status: status.as_u16(),
        });
    }

    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joining() {
        assert_eq!(
            endpoint("https://api.mojang.com/", "/users/profiles/minecraft/Notch"),
            "https://api.mojang.com/users/profiles/minecraft/Notch"
        );
        assert_eq!(
            endpoint("http://127.0.0.1:8080", "generate/url"),
            "http://127.0.0.1:8080/generate/url"
        );
    }

    #[derive(Debug, Deserialize)]
    struct Marked {
        #[serde(default, deserialize_with = "present")]
        error: bool,
    }

    #[test]
    fn test_error_marker_presence() {
        let parse = |body: &str| serde_json::from_str::<Marked>(body).unwrap().error;

        assert!(!parse(r#"{}"#));
        assert!(parse(r#"{"error": null}"#));
        assert!(parse(r#"{"error": "Not Found"}"#));
        assert!(parse(r#"{"error": {"code": 404}}"#));
    }

    #[test]
    fn test_chain_from_default_config() {
        let chain = ProviderChain::from_config(&SkinCacheConfig::default());
        assert!(chain.is_ok());
    }
}
