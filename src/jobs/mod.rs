use crate::{config::SkinCacheConfig, resolver::SkinResolver};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

/// Periodic cache sweep for hosts without their own scheduler
pub struct SweepJob {
    resolver: Arc<SkinResolver>,
    every: Duration,
}

impl SweepJob {
    pub fn new(resolver: Arc<SkinResolver>, every: Duration) -> Self {
        Self { resolver, every }
    }

    pub fn from_config(resolver: Arc<SkinResolver>, config: &SkinCacheConfig) -> Self {
        Self::new(resolver, config.sweep_interval())
    }

    /// Start sweeping `resolver` every `every`
    pub fn spawn(resolver: Arc<SkinResolver>, every: Duration) -> JoinHandle<()> {
        Self::new(resolver, every).start()
    }

    /// Spawn the sweep loop on the current runtime
    ///
    /// The loop runs until the returned handle is aborted.
    pub fn start(self) -> JoinHandle<()> {
        info!("Starting skin cache sweep every {:?}", self.every);
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut ticker = interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let stats = self.resolver.sweep();
            if stats.total() == 0 {
                debug!("Skin cache sweep: nothing expired");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::NoLiveSessions;
    use crate::skin::{CachedId, Expiring, Skin};
    use chrono::Utc;

    #[tokio::test]
    async fn test_job_sweeps_expired_entries() {
        let resolver = Arc::new(
            SkinResolver::from_config(&SkinCacheConfig::default(), Arc::new(NoLiveSessions))
                .unwrap(),
        );
        let ttl = chrono::Duration::seconds(1);
        let long_ago = Utc::now() - chrono::Duration::minutes(1);

        resolver.seed_id("notch", Expiring::created_at(CachedId::new("a"), long_ago, ttl));
        resolver.seed_skin("a", Expiring::created_at(Skin::new("v", "s"), long_ago, ttl));
        resolver.seed_skin("b", Expiring::new(Skin::new("v", "s"), chrono::Duration::hours(1)));

        let handle = SweepJob::spawn(resolver.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.abort();

        assert_eq!(resolver.cached_counts(), (0, 1));
    }

    #[tokio::test]
    async fn test_job_uses_configured_interval() {
        let config = SkinCacheConfig {
            sweep_interval_secs: 30,
            ..SkinCacheConfig::default()
        };
        let resolver = Arc::new(SkinResolver::from_config(&config, Arc::new(NoLiveSessions)).unwrap());

        let job = SweepJob::from_config(resolver, &config);
        assert_eq!(job.every, Duration::from_secs(30));
    }
}
