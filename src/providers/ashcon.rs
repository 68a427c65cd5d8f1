/// Fallback identity service returning id and textures in one response
use super::{endpoint, present, read_json, ErrorMarked, FallbackProfile, FallbackProvider};
use crate::{
    error::{SkinError, SkinResult},
    skin::{canonical_id, Skin},
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const PROVIDER: &str = "ashcon";

#[derive(Debug, Deserialize)]
struct UserResponse {
    uuid: Option<String>,
    textures: Option<Textures>,
    #[serde(default, deserialize_with = "present")]
    error: bool,
}

#[derive(Debug, Deserialize)]
struct Textures {
    raw: Option<RawTexture>,
}

#[derive(Debug, Deserialize)]
struct RawTexture {
    value: String,
    signature: String,
}

impl ErrorMarked for UserResponse {
    fn has_error(&self) -> bool {
        self.error
    }
}

/// Client for the fallback user endpoint
#[derive(Clone)]
pub struct AshconClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl AshconClient {
    pub fn new(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl FallbackProvider for AshconClient {
    async fn lookup(&self, name: &str) -> SkinResult<Option<FallbackProfile>> {
        let url = endpoint(
            &self.base_url,
            &format!("mojang/v2/user/{}", urlencoding::encode(name)),
        );
        debug!("Looking up {} on fallback service at {}", name, url);

        let response = self.http_client.get(&url).send().await?;
        let Some(body) = read_json::<UserResponse>(PROVIDER, response).await? else {
            return Ok(None);
        };

        let id = body
            .uuid
            .ok_or_else(|| SkinError::malformed(PROVIDER, "response has no uuid"))?;
        let raw = body
            .textures
            .and_then(|t| t.raw)
            .ok_or_else(|| SkinError::malformed(PROVIDER, "response has no raw textures"))?;

        Ok(Some(FallbackProfile {
            id: canonical_id(&id),
            skin: Skin::new(raw.value, raw.signature),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_error_is_a_marker() {
        let body: UserResponse =
            serde_json::from_str(r#"{"code": 404, "error": null, "reason": "No user"}"#).unwrap();
        assert!(body.has_error());

        let body: UserResponse = serde_json::from_str(
            r#"{"uuid": "853c80ef-3c37-49fd-aa49-938b674adae6", "textures": {"raw": null}}"#,
        )
        .unwrap();
        assert!(!body.has_error());
    }
}
