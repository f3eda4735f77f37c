/// Profile Resolver - cached offline-mode identity lookup with texture enrichment
use crate::{
    error::{MarkerError, MarkerResult},
    metrics,
    profile::{
        textures::{decode_textures, TEXTURES_PROPERTY},
        CachedProfile, GameProfile, ProfileCache, ProfileRepository, ResolvedProfile,
        SessionService, TextureMap,
    },
};
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, warn};

/// Profile resolution configuration
#[derive(Debug, Clone)]
pub struct ProfileResolverConfig {
    /// Look up real profiles for players on an offline-mode server
    pub offline_resolve_textures: bool,
    /// How long a resolved offline profile stays cached (default: 6 hours)
    pub cache_ttl: Duration,
}

impl Default for ProfileResolverConfig {
    fn default() -> Self {
        Self {
            offline_resolve_textures: true,
            cache_ttl: Duration::hours(6),
        }
    }
}

/// Resolves connected players to canonical profiles with textures
///
/// Never fails: lookup errors degrade to a name-only profile or an empty
/// texture mapping.
#[derive(Clone)]
pub struct ProfileResolver {
    cache: ProfileCache,
    repository: Arc<dyn ProfileRepository>,
    sessions: Arc<dyn SessionService>,
    config: ProfileResolverConfig,
}

impl ProfileResolver {
    /// Create a new profile resolver
    pub fn new(
        repository: Arc<dyn ProfileRepository>,
        sessions: Arc<dyn SessionService>,
        config: ProfileResolverConfig,
    ) -> Self {
        let cache = ProfileCache::new(config.cache_ttl);
        Self::with_cache(cache, repository, sessions, config)
    }

    /// Create a resolver around an existing cache
    pub fn with_cache(
        cache: ProfileCache,
        repository: Arc<dyn ProfileRepository>,
        sessions: Arc<dyn SessionService>,
        config: ProfileResolverConfig,
    ) -> Self {
        Self {
            cache,
            repository,
            sessions,
            config,
        }
    }

    pub fn cache(&self) -> &ProfileCache {
        &self.cache
    }

    /// Resolve a connected player's profile
    ///
    /// `player` is the live profile the server holds for the connection.
    /// Resolution order:
    /// 1. Online mode: textures of the live profile only, uncached
    /// 2. Offline mode with resolution disabled: live profile, no remote calls
    /// 3. Offline mode: cached name lookup and texture fill by canonical id
    ///
    /// With `allow_texture_fetch_failure` unset, unsigned textures are
    /// treated as a failed texture lookup. The check runs on every call, so
    /// callers with different settings can share a cached lookup.
    pub async fn resolve(
        &self,
        player: &GameProfile,
        offline_mode: bool,
        allow_texture_fetch_failure: bool,
    ) -> ResolvedProfile {
        let require_signed = !allow_texture_fetch_failure;

        if !offline_mode {
            let filled =
                fill_properties(self.sessions.as_ref(), player.clone(), require_signed).await;
            return ResolvedProfile {
                canonical_id: player.id,
                display_name: player.name.clone(),
                textures: textures_or_empty(&filled, require_signed),
            };
        }

        if !self.config.offline_resolve_textures {
            return ResolvedProfile {
                canonical_id: player.id,
                display_name: player.name.clone(),
                textures: textures_or_empty(player, require_signed),
            };
        }

        let entry = self
            .cache
            .get_or_load(&player.name, || {
                lookup_and_fill(self.repository.as_ref(), self.sessions.as_ref(), &player.name)
            })
            .await;

        resolved_from_entry(&entry, require_signed)
    }

    /// Cached resolution for `name`, if present, without any lookup
    pub async fn peek(
        &self,
        name: &str,
        allow_texture_fetch_failure: bool,
    ) -> Option<ResolvedProfile> {
        let entry = self.cache.get(name).await?;
        Some(resolved_from_entry(&entry, !allow_texture_fetch_failure))
    }
}

/// Name lookup followed by a texture fill, used as the cache loader
async fn lookup_and_fill(
    repository: &dyn ProfileRepository,
    sessions: &dyn SessionService,
    name: &str,
) -> Option<GameProfile> {
    let profile = match lookup_name(repository, name).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Name lookup failed for {}, using name only: {}", name, e);
            return None;
        }
    };

    // Signed properties satisfy both strict and lenient readers
    Some(fill_properties(sessions, profile, true).await)
}

async fn lookup_name(repository: &dyn ProfileRepository, name: &str) -> MarkerResult<GameProfile> {
    let profiles = repository.find_profiles_by_names(&[name.to_string()]).await?;

    profiles
        .into_iter()
        .filter(|profile| profile.id.is_some())
        .find(|profile| profile.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| MarkerError::NotFound(format!("No profile named {}", name)))
}

/// Fetch texture properties by canonical id when the profile carries none
///
/// A failed fetch leaves the profile unchanged.
async fn fill_properties(
    sessions: &dyn SessionService,
    profile: GameProfile,
    require_signed: bool,
) -> GameProfile {
    if profile.property(TEXTURES_PROPERTY).is_some() || profile.id.is_none() {
        return profile;
    }

    match sessions.fill_profile_properties(&profile, require_signed).await {
        Ok(filled) => {
            metrics::record_texture_lookup(true);
            filled
        }
        Err(e) => {
            warn!("Texture lookup failed for {}: {}", profile.name, e);
            metrics::record_texture_lookup(false);
            profile
        }
    }
}

fn resolved_from_entry(entry: &CachedProfile, require_signed: bool) -> ResolvedProfile {
    match &entry.profile {
        Some(profile) => ResolvedProfile {
            canonical_id: profile.id,
            display_name: profile.name.clone(),
            textures: textures_or_empty(profile, require_signed),
        },
        None => ResolvedProfile::name_only(&entry.name),
    }
}

fn textures_or_empty(profile: &GameProfile, require_signed: bool) -> TextureMap {
    decode_textures(profile, require_signed).unwrap_or_else(|e| {
        debug!("Discarding textures for {}: {}", profile.name, e);
        TextureMap::new()
    })
}
