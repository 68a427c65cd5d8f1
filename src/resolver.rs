/// Skin Resolver - Orchestrates live lookups, caching and provider fallback
use crate::{
    config::SkinCacheConfig,
    error::{SkinError, SkinResult},
    live::{LiveSessions, Subject},
    metrics,
    providers::ProviderChain,
    skin::{canonical_id, name_key, CachedId, Expiring, Skin, SkinVariant},
};
use chrono::Duration;
use dashmap::DashMap;
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, info, warn};

const IDENTITY: &str = "identity";
const PROFILE: &str = "profile";
const FALLBACK: &str = "fallback";
const UPLOAD: &str = "upload";

/// Resolver behaviour settings
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    /// Lifetime of id → skin entries
    pub skin_ttl: Duration,
    /// Lifetime of name → id entries
    pub id_ttl: Duration,
    /// Suppress warning logs on provider failures
    pub disable_fetch_warnings: bool,
    /// Keep using an expired name → id entry until the sweep removes it
    pub trust_expired_ids: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            skin_ttl: Duration::hours(1),
            id_ttl: Duration::hours(1),
            disable_fetch_warnings: false,
            trust_expired_ids: true,
        }
    }
}

impl ResolverSettings {
    pub fn from_config(config: &SkinCacheConfig) -> SkinResult<Self> {
        Ok(Self {
            skin_ttl: config.skin_ttl()?,
            id_ttl: config.id_ttl()?,
            disable_fetch_warnings: config.disable_fetch_warnings,
            trust_expired_ids: config.trust_expired_ids,
        })
    }
}

/// Entries evicted by one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub ids: usize,
    pub skins: usize,
}

impl SweepStats {
    pub fn total(&self) -> usize {
        self.ids + self.skins
    }
}

/// Resolves player names and ids to skins
///
/// Resolution order:
/// 1. Live sessions in the host (no I/O)
/// 2. The name → id and id → skin caches
/// 3. Remote providers, with results written back to the caches
///
/// One instance is shared (behind an `Arc`) by every caller in the process.
/// Lookups never fail: provider errors are logged and resolve to `None`.
pub struct SkinResolver {
    ids: DashMap<String, Expiring<CachedId>>,
    skins: DashMap<String, Expiring<Skin>>,
    providers: ProviderChain,
    live: Arc<dyn LiveSessions>,
    settings: ResolverSettings,
}

impl SkinResolver {
    pub fn new(
        providers: ProviderChain,
        live: Arc<dyn LiveSessions>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            ids: DashMap::new(),
            skins: DashMap::new(),
            providers,
            live,
            settings,
        }
    }

    /// Create a resolver backed by the HTTP providers
    pub fn from_config(config: &SkinCacheConfig, live: Arc<dyn LiveSessions>) -> SkinResult<Self> {
        config.validate()?;
        let providers = ProviderChain::from_config(config)?;
        let settings = ResolverSettings::from_config(config)?;
        Ok(Self::new(providers, live, settings))
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolve a player name to a skin
    ///
    /// A cached id short-circuits to [`resolve_by_id`](Self::resolve_by_id).
    /// Otherwise the identity provider is asked for the id; if that fails,
    /// reports the name unknown, or the id yields no skin, the fallback
    /// provider is consulted once.
    pub async fn resolve_by_name(&self, name: &str) -> Option<Skin> {
        if let Some(skin) = self.try_live(Subject::Name(name)) {
            return Some(skin);
        }

        let key = name_key(name);
        if let Some(id) = self.cached_id(&key) {
            return self.resolve_by_id(&id).await;
        }

        match self.providers.identity.lookup_id(name).await {
            Ok(Some(id)) => {
                metrics::record_provider(IDENTITY, "found");
                self.ids
                    .insert(key, Expiring::new(CachedId::new(&id), self.settings.id_ttl));

                if let Some(skin) = self.resolve_by_id(&id).await {
                    return Some(skin);
                }
                debug!("No skin for {} ({}), trying fallback", name, id);
            }
            Ok(None) => {
                metrics::record_provider(IDENTITY, "not_found");
                debug!("Identity provider does not know {}, trying fallback", name);
            }
            Err(e) => {
                metrics::record_provider(IDENTITY, "error");
                self.warn_failure("Failed to get id from player name, trying fallback", &e);
            }
        }

        self.fallback_lookup(name).await
    }

    /// Resolve a player name through the fallback provider only
    pub async fn resolve_via_fallback(&self, name: &str) -> Option<Skin> {
        if let Some(skin) = self.try_live(Subject::Name(name)) {
            return Some(skin);
        }
        self.fallback_lookup(name).await
    }

    /// Resolve a player id to a skin
    ///
    /// There is no fallback for id lookups.
    pub async fn resolve_by_id(&self, id: &str) -> Option<Skin> {
        if let Some(skin) = self.try_live(Subject::Id(id)) {
            return Some(skin);
        }

        let key = canonical_id(id);
        if let Some(skin) = self.cached_skin(&key) {
            return Some(skin);
        }

        match self.providers.profile.fetch_profile(&key).await {
            Ok(Some(skin)) => {
                metrics::record_provider(PROFILE, "found");
                self.skins
                    .insert(key, Expiring::new(skin.clone(), self.settings.skin_ttl));
                Some(skin)
            }
            Ok(None) => {
                metrics::record_provider(PROFILE, "not_found");
                debug!("No profile for id {}", key);
                None
            }
            Err(e) => {
                metrics::record_provider(PROFILE, "error");
                self.warn_failure("Failed to fetch skin by id", &e);
                None
            }
        }
    }

    /// Generate a skin from an image URL
    ///
    /// Each call is a new generation request and is not cached.
    pub async fn resolve_by_url(&self, url: &Url, variant: SkinVariant) -> Option<Skin> {
        match self.providers.uploader.generate(url, variant).await {
            Ok(Some(skin)) => {
                metrics::record_provider(UPLOAD, "found");
                Some(skin)
            }
            Ok(None) => {
                metrics::record_provider(UPLOAD, "not_found");
                debug!("Texture service returned no texture for {}", url);
                None
            }
            Err(e) => {
                metrics::record_provider(UPLOAD, "error");
                self.warn_failure("Failed to get skin from url", &e);
                None
            }
        }
    }

    /// Whether both the id and the skin for a name are cached and fresh
    pub fn is_fully_cached(&self, name: &str) -> bool {
        self.get_fully_cached(name).is_some()
    }

    /// The skin for a name if both cache entries are present and fresh
    pub fn get_fully_cached(&self, name: &str) -> Option<Skin> {
        let id = {
            let entry = self.ids.get(&name_key(name))?;
            if entry.is_expired() {
                return None;
            }
            entry.payload().id.clone()
        };

        let skin = self.skins.get(&id)?;
        if skin.is_expired() {
            return None;
        }
        Some(skin.payload().clone())
    }

    /// Remove every expired entry from both caches
    ///
    /// Each entry is checked against its own timestamp while its shard is
    /// locked, so entries refreshed during a sweep survive it.
    pub fn sweep(&self) -> SweepStats {
        let mut stats = SweepStats::default();

        self.skins.retain(|_, entry| {
            let expired = entry.is_expired();
            if expired {
                stats.skins += 1;
            }
            !expired
        });

        self.ids.retain(|_, entry| {
            let expired = entry.is_expired();
            if expired {
                stats.ids += 1;
            }
            !expired
        });

        metrics::record_sweep("skin", stats.skins, self.skins.len());
        metrics::record_sweep("id", stats.ids, self.ids.len());

        if stats.total() > 0 {
            info!(
                "Skin cache sweep evicted {} skins and {} ids",
                stats.skins, stats.ids
            );
        }

        stats
    }

    /// Forget the cached id for a name
    pub fn invalidate_name(&self, name: &str) -> bool {
        self.ids.remove(&name_key(name)).is_some()
    }

    /// Forget the cached skin for an id
    pub fn invalidate_id(&self, id: &str) -> bool {
        self.skins.remove(&canonical_id(id)).is_some()
    }

    /// Current number of (id, skin) cache entries
    pub fn cached_counts(&self) -> (usize, usize) {
        (self.ids.len(), self.skins.len())
    }

    fn try_live(&self, subject: Subject<'_>) -> Option<Skin> {
        let skin = self.live.try_local_skin(subject)?;
        metrics::record_lookup("live", "hit");
        debug!("Resolved {:?} from live session", subject);
        Some(skin)
    }

    fn cached_id(&self, key: &str) -> Option<String> {
        let Some(entry) = self.ids.get(key) else {
            metrics::record_lookup("id", "miss");
            return None;
        };

        if entry.is_expired() {
            metrics::record_lookup("id", "expired");
            if !self.settings.trust_expired_ids {
                return None;
            }
        } else {
            metrics::record_lookup("id", "hit");
        }

        Some(entry.payload().id.clone())
    }

    fn cached_skin(&self, key: &str) -> Option<Skin> {
        let Some(entry) = self.skins.get(key) else {
            metrics::record_lookup("skin", "miss");
            return None;
        };

        if entry.is_expired() {
            metrics::record_lookup("skin", "expired");
            return None;
        }

        metrics::record_lookup("skin", "hit");
        debug!("Skin cache hit for {}", key);
        Some(entry.payload().clone())
    }

    async fn fallback_lookup(&self, name: &str) -> Option<Skin> {
        match self.providers.fallback.lookup(name).await {
            Ok(Some(profile)) => {
                metrics::record_provider(FALLBACK, "found");
                let id = canonical_id(&profile.id);
                self.ids.insert(
                    name_key(name),
                    Expiring::new(CachedId::new(&id), self.settings.id_ttl),
                );
                self.skins.insert(
                    id,
                    Expiring::new(profile.skin.clone(), self.settings.skin_ttl),
                );
                Some(profile.skin)
            }
            Ok(None) => {
                metrics::record_provider(FALLBACK, "not_found");
                debug!("Fallback provider does not know {}", name);
                None
            }
            Err(e) => {
                metrics::record_provider(FALLBACK, "error");
                self.warn_failure("Failed to fetch skin from fallback server", &e);
                None
            }
        }
    }

    fn warn_failure(&self, context: &str, error: &SkinError) {
        if !self.settings.disable_fetch_warnings {
            warn!("{}: {}", context, error);
        }
    }

    #[cfg(test)]
    pub(crate) fn seed_id(&self, name: &str, entry: Expiring<CachedId>) {
        self.ids.insert(name_key(name), entry);
    }

    #[cfg(test)]
    pub(crate) fn seed_skin(&self, id: &str, entry: Expiring<Skin>) {
        self.skins.insert(canonical_id(id), entry);
    }
}
