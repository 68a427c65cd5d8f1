/// Texture generation from arbitrary image URLs
use super::{endpoint, present, read_json, ErrorMarked, TextureUploader};
use crate::{
    error::SkinResult,
    skin::{Skin, SkinVariant},
};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

const PROVIDER: &str = "mineskin";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    variant: SkinVariant,
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    data: Option<GeneratedData>,
    #[serde(default, deserialize_with = "present")]
    error: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedData {
    texture: GeneratedTexture,
}

#[derive(Debug, Deserialize)]
struct GeneratedTexture {
    value: String,
    signature: String,
}

impl ErrorMarked for GenerateResponse {
    fn has_error(&self) -> bool {
        self.error
    }
}

/// Client for the URL upload endpoint
#[derive(Clone)]
pub struct MineSkinClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl MineSkinClient {
    pub fn new(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl TextureUploader for MineSkinClient {
    async fn generate(&self, url: &Url, variant: SkinVariant) -> SkinResult<Option<Skin>> {
        let api_url = endpoint(&self.base_url, "generate/url");
        debug!("Generating {} texture from {}", variant, url);

        let response = self
            .http_client
            .post(&api_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&GenerateRequest {
                variant,
                url: url.as_str(),
            })
            .send()
            .await?;

        let Some(body) = read_json::<GenerateResponse>(PROVIDER, response).await? else {
            return Ok(None);
        };

        // A response without data carries no texture
        Ok(body
            .data
            .map(|data| Skin::new(data.texture.value, data.texture.signature)))
    }
}
