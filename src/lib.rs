//! Skin Resolver
//!
//! Resolves player names and ids to signed skin textures. Live sessions are
//! consulted first, then two expiring caches (name → id, id → skin), then the
//! remote identity services with an ordered fallback chain.

pub mod config;
pub mod error;
pub mod jobs;
pub mod live;
pub mod metrics;
pub mod providers;
pub mod resolver;
pub mod skin;

pub use config::{EndpointConfig, SkinCacheConfig};
pub use error::{SkinError, SkinResult};
pub use jobs::SweepJob;
pub use live::{LiveSessions, NoLiveSessions, SessionRegistry, Subject};
pub use providers::{
    FallbackProfile, FallbackProvider, IdentityProvider, ProfileProvider, ProviderChain,
    TextureUploader,
};
pub use resolver::{ResolverSettings, SkinResolver, SweepStats};
pub use skin::{CachedId, Expiring, GameProfile, ProfileProperty, Skin, SkinVariant};
