/// Skin descriptors and the expiring cache entries that hold them
use crate::error::{SkinError, SkinResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Name of the profile property carrying skin textures
pub const TEXTURES_PROPERTY: &str = "textures";

/// A cached value stamped with its creation time and lifetime
///
/// Entries are never mutated; refreshing a key means inserting a new entry.
#[derive(Debug, Clone)]
pub struct Expiring<T> {
    value: T,
    created_at: DateTime<Utc>,
    ttl: Duration,
}

impl<T> Expiring<T> {
    /// Wrap a value created now
    pub fn new(value: T, ttl: Duration) -> Self {
        Self::created_at(value, Utc::now(), ttl)
    }

    /// Wrap a value with an explicit creation time
    pub fn created_at(value: T, created_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            value,
            created_at,
            ttl,
        }
    }

    pub fn payload(&self) -> &T {
        &self.value
    }

    pub fn into_payload(self) -> T {
        self.value
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > self.ttl
    }
}

/// Texture value and signature describing a player's appearance
///
/// Both fields are opaque to this crate and passed through as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skin {
    pub value: String,
    pub signature: String,
}

impl Skin {
    pub fn new(value: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            signature: signature.into(),
        }
    }

    /// Build a skin from a session-server profile
    pub fn from_profile(profile: &GameProfile) -> SkinResult<Self> {
        let textures = profile
            .properties
            .iter()
            .find(|p| p.name == TEXTURES_PROPERTY)
            .ok_or_else(|| SkinError::malformed("session", "profile has no textures property"))?;

        let signature = textures
            .signature
            .as_ref()
            .ok_or_else(|| SkinError::malformed("session", "textures property is unsigned"))?;

        Ok(Self::new(textures.value.clone(), signature.clone()))
    }

    /// Build a skin from a live session's property map
    ///
    /// Returns `None` when no signed textures property is present.
    pub fn from_properties<'a, I>(properties: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a ProfileProperty>,
    {
        properties
            .into_iter()
            .filter(|p| p.name == TEXTURES_PROPERTY)
            .find_map(|p| {
                p.signature
                    .as_ref()
                    .map(|signature| Self::new(p.value.clone(), signature.clone()))
            })
    }
}

/// A resolved identifier for a player name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedId {
    pub id: String,
}

impl CachedId {
    pub fn new(id: &str) -> Self {
        Self {
            id: canonical_id(id),
        }
    }
}

/// Profile returned by the session server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameProfile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: Vec<ProfileProperty>,
}

/// A single signed profile property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileProperty {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub signature: Option<String>,
}

/// Body model a generated texture is made for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinVariant {
    Classic,
    Slim,
}

impl SkinVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkinVariant::Classic => "classic",
            SkinVariant::Slim => "slim",
        }
    }
}

impl fmt::Display for SkinVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkinVariant {
    type Err = SkinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" | "default" | "wide" => Ok(SkinVariant::Classic),
            "slim" => Ok(SkinVariant::Slim),
            other => Err(SkinError::Config(format!("Unknown skin variant: {}", other))),
        }
    }
}

/// Canonical form of a player identifier
///
/// UUIDs (dashed or not) become lowercase dash-less strings, so both forms
/// share one cache key. Anything else is trimmed and lowercased.
pub fn canonical_id(id: &str) -> String {
    let trimmed = id.trim();
    match Uuid::try_parse(trimmed) {
        Ok(uuid) => uuid.simple().to_string(),
        Err(_) => trimmed.to_ascii_lowercase(),
    }
}

/// Cache key for a player name
///
/// Names are case-insensitive but otherwise kept exactly as given.
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textures(value: &str, signature: Option<&str>) -> ProfileProperty {
        ProfileProperty {
            name: TEXTURES_PROPERTY.to_string(),
            value: value.to_string(),
            signature: signature.map(str::to_string),
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let created = Utc::now() - Duration::seconds(60);
        let entry = Expiring::created_at("v", created, Duration::seconds(60));

        assert!(!entry.is_expired_at(created + Duration::seconds(60)));
        assert!(entry.is_expired_at(created + Duration::seconds(61)));
        assert_eq!(*entry.payload(), "v");
    }

    #[test]
    fn test_fresh_entry_not_expired() {
        let entry = Expiring::new(1u8, Duration::minutes(5));
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_skin_from_profile() {
        let profile: GameProfile = serde_json::from_str(
            r#"{
                "id": "069a79f444e94726a5befca90e38aaf5",
                "name": "Notch",
                "properties": [
                    {"name": "textures", "value": "dGV4dHVyZXM=", "signature": "c2ln"}
                ]
            }"#,
        )
        .unwrap();

        let skin = Skin::from_profile(&profile).unwrap();
        assert_eq!(skin, Skin::new("dGV4dHVyZXM=", "c2ln"));
    }

    #[test]
    fn test_skin_from_profile_without_textures() {
        let profile = GameProfile {
            id: "abc".to_string(),
            name: None,
            properties: vec![],
        };
        assert!(matches!(
            Skin::from_profile(&profile),
            Err(SkinError::MalformedResponse { .. })
        ));

        let unsigned = GameProfile {
            id: "abc".to_string(),
            name: None,
            properties: vec![textures("v", None)],
        };
        assert!(Skin::from_profile(&unsigned).is_err());
    }

    #[test]
    fn test_skin_from_properties_skips_unsigned() {
        let other = ProfileProperty {
            name: "cape".to_string(),
            value: "x".to_string(),
            signature: Some("y".to_string()),
        };
        let props = vec![other, textures("unsigned", None), textures("v", Some("s"))];

        assert_eq!(Skin::from_properties(&props), Some(Skin::new("v", "s")));
        assert_eq!(Skin::from_properties(&props[..2]), None);
    }

    #[test]
    fn test_canonical_id() {
        assert_eq!(
            canonical_id("069A79F4-44E9-4726-A5BE-FCA90E38AAF5"),
            "069a79f444e94726a5befca90e38aaf5"
        );
        assert_eq!(
            canonical_id("069a79f444e94726a5befca90e38aaf5"),
            "069a79f444e94726a5befca90e38aaf5"
        );
        // Not a UUID: kept verbatim apart from case
        assert_eq!(
            canonical_id("069a79f444e94726a5befca90e38aca"),
            "069a79f444e94726a5befca90e38aca"
        );
    }

    #[test]
    fn test_name_key_only_folds_case() {
        assert_eq!(name_key("Notch"), "notch");
        assert_eq!(name_key("jeb_"), "jeb_");
        assert_eq!(name_key(" Notch "), " notch ");
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("slim".parse::<SkinVariant>().unwrap(), SkinVariant::Slim);
        assert_eq!("CLASSIC".parse::<SkinVariant>().unwrap(), SkinVariant::Classic);
        assert!("tall".parse::<SkinVariant>().is_err());
        assert_eq!(serde_json::to_string(&SkinVariant::Slim).unwrap(), r#""slim""#);
    }
}
