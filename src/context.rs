/// Application context and dependency injection
use crate::{
    config::MarkerConfig,
    error::MarkerResult,
    markers::SnapshotWriter,
    players::{FilePlayerSource, PlayerSource},
    profile::{
        mojang::build_http_client, MojangProfileRepository, MojangSessionService,
        ProfileResolver, ProfileResolverConfig,
    },
    rate_limit::LookupRateLimiter,
};
use std::{sync::Arc, time::Duration};
use tracing::info;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<MarkerConfig>,
    pub profile_resolver: Arc<ProfileResolver>,
    pub player_source: Arc<dyn PlayerSource>,
    pub snapshot_writer: Arc<SnapshotWriter>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub fn new(config: MarkerConfig) -> MarkerResult<Self> {
        // Validate configuration
        config.validate()?;

        let profiles = &config.profiles;
        let http_client = build_http_client(
            &profiles.user_agent,
            Duration::from_secs(profiles.http_timeout_secs),
        )?;

        let repository = Arc::new(MojangProfileRepository::new(
            http_client.clone(),
            &profiles.mojang_api_url,
            LookupRateLimiter::per_minute(profiles.name_lookups_per_minute),
        ));
        let sessions = Arc::new(MojangSessionService::new(
            http_client,
            &profiles.session_server_url,
        ));

        let resolver_config = ProfileResolverConfig {
            offline_resolve_textures: profiles.offline_resolve_textures,
            cache_ttl: chrono::Duration::seconds(profiles.cache_ttl_secs as i64),
        };
        let profile_resolver = Arc::new(ProfileResolver::new(repository, sessions, resolver_config));

        let feed = FilePlayerSource::new(config.players.path.clone());
        let snapshot_writer = Arc::new(SnapshotWriter::new(config.markers.path.clone()));

        info!(
            "Player feed: {}, marker file: {}",
            feed.path().display(),
            snapshot_writer.path().display()
        );
        let player_source: Arc<dyn PlayerSource> = Arc::new(feed);

        Ok(Self::from_parts(
            config,
            profile_resolver,
            player_source,
            snapshot_writer,
        ))
    }

    /// Assemble a context from already built services
    pub fn from_parts(
        config: MarkerConfig,
        profile_resolver: Arc<ProfileResolver>,
        player_source: Arc<dyn PlayerSource>,
        snapshot_writer: Arc<SnapshotWriter>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            profile_resolver,
            player_source,
            snapshot_writer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_default_config() {
        let ctx = AppContext::new(MarkerConfig::default()).unwrap();

        assert!(ctx.profile_resolver.cache().is_empty());
        assert_eq!(ctx.snapshot_writer.path(), ctx.config.markers.path.as_path());
    }

    #[test]
    fn test_oversized_ttl_is_rejected_before_use() {
        let mut config = MarkerConfig::default();
        config.profiles.cache_ttl_secs = u64::MAX;

        assert!(AppContext::new(config).is_err());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = MarkerConfig::default();
        config.profiles.mojang_api_url = "not a url".to_string();

        assert!(AppContext::new(config).is_err());
    }
}
