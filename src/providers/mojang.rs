/// Mojang identity services
///
/// `MojangClient` resolves names to ids against the public API;
/// `SessionClient` fetches signed profiles from the session server.
use super::{endpoint, present, read_json, ErrorMarked, IdentityProvider, ProfileProvider};
use crate::{
    error::{SkinError, SkinResult},
    skin::{canonical_id, GameProfile, ProfileProperty, Skin},
};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

const PROVIDER: &str = "mojang";
const SESSION_PROVIDER: &str = "session";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NameLookupResponse {
    id: Option<String>,
    #[serde(default, deserialize_with = "present")]
    error_message: bool,
}

impl ErrorMarked for NameLookupResponse {
    fn has_error(&self) -> bool {
        self.error_message
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileResponse {
    id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    properties: Vec<ProfileProperty>,
    #[serde(default, deserialize_with = "present")]
    error_message: bool,
}

impl ErrorMarked for ProfileResponse {
    fn has_error(&self) -> bool {
        self.error_message
    }
}

/// Client for the name → id endpoint
#[derive(Clone)]
pub struct MojangClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl MojangClient {
    pub fn new(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for MojangClient {
    async fn lookup_id(&self, name: &str) -> SkinResult<Option<String>> {
        let url = endpoint(
            &self.base_url,
            &format!("users/profiles/minecraft/{}", urlencoding::encode(name)),
        );
        debug!("Looking up id for {} at {}", name, url);

        let response = self.http_client.get(&url).send().await?;
        let Some(body) = read_json::<NameLookupResponse>(PROVIDER, response).await? else {
            return Ok(None);
        };

        body.id
            .map(|id| Some(canonical_id(&id)))
            .ok_or_else(|| SkinError::malformed(PROVIDER, "response has no id"))
    }
}

/// Client for the id → profile endpoint
#[derive(Clone)]
pub struct SessionClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl SessionClient {
    pub fn new(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl ProfileProvider for SessionClient {
    async fn fetch_profile(&self, id: &str) -> SkinResult<Option<Skin>> {
        let url = endpoint(
            &self.base_url,
            &format!(
                "session/minecraft/profile/{}?unsigned=false",
                urlencoding::encode(id)
            ),
        );
        debug!("Fetching profile {} from {}", id, url);

        let response = self.http_client.get(&url).send().await?;
        let Some(body) = read_json::<ProfileResponse>(SESSION_PROVIDER, response).await? else {
            return Ok(None);
        };

        let profile = GameProfile {
            id: body
                .id
                .ok_or_else(|| SkinError::malformed(SESSION_PROVIDER, "profile has no id"))?,
            name: body.name,
            properties: body.properties,
        };

        Skin::from_profile(&profile).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_marks_not_found() {
        let body: NameLookupResponse = serde_json::from_str(
            r#"{"path": "/users/profiles/minecraft/x", "errorMessage": null}"#,
        )
        .unwrap();
        assert!(body.has_error());

        let body: NameLookupResponse =
            serde_json::from_str(r#"{"id": "069a79f444e94726a5befca90e38aaf5", "name": "Notch"}"#)
                .unwrap();
        assert!(!body.has_error());
        assert_eq!(body.id.as_deref(), Some("069a79f444e94726a5befca90e38aaf5"));

        let body: ProfileResponse = serde_json::from_str(r#"{"errorMessage": null}"#).unwrap();
        assert!(body.has_error());
    }
}
