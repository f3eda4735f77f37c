/// Mojang profile services - name lookup and session profile clients
use crate::{
    error::{MarkerError, MarkerResult},
    metrics,
    profile::GameProfile,
    rate_limit::LookupRateLimiter,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// Names accepted by a single bulk lookup request
pub const MAX_NAMES_PER_REQUEST: usize = 10;

/// Maps player names to canonical profiles
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Look up profiles for the given names
    ///
    /// Names with no account are absent from the result.
    async fn find_profiles_by_names(&self, names: &[String]) -> MarkerResult<Vec<GameProfile>>;
}

/// Fills profile properties (textures) for a canonical id
#[async_trait]
pub trait SessionService: Send + Sync {
    async fn fill_profile_properties(
        &self,
        profile: &GameProfile,
        require_signed: bool,
    ) -> MarkerResult<GameProfile>;
}

/// Build the shared HTTP client for profile services
pub fn build_http_client(user_agent: &str, timeout: Duration) -> MarkerResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| MarkerError::Internal(format!("Failed to create HTTP client: {}", e)))
}

fn retry_after(response: &reqwest::Response) -> Duration {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(60))
}

/// Bulk name lookup against the Mojang profile API
#[derive(Clone)]
pub struct MojangProfileRepository {
    http_client: reqwest::Client,
    api_url: String,
    rate_limiter: LookupRateLimiter,
}

impl MojangProfileRepository {
    pub fn new(http_client: reqwest::Client, api_url: &str, rate_limiter: LookupRateLimiter) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            rate_limiter,
        }
    }

    async fn lookup_batch(&self, names: &[String]) -> MarkerResult<Vec<GameProfile>> {
        if self.rate_limiter.try_acquire().is_err() {
            debug!("Name lookups throttled, waiting for a permit");
            self.rate_limiter.acquire().await;
        }

        let url = format!("{}/profiles/minecraft", self.api_url);
        debug!("Looking up {} profile name(s)", names.len());

        let response = self
            .http_client
            .post(&url)
            .json(names)
            .send()
            .await
            .map_err(|e| MarkerError::NameLookup(format!("Failed to reach profile API: {}", e)))?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => return Ok(Vec::new()),
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(MarkerError::RateLimitExceeded {
                    retry_after: retry_after(&response),
                })
            }
            status if !status.is_success() => {
                return Err(MarkerError::NameLookup(format!(
                    "Profile API returned error: {}",
                    status
                )))
            }
            _ => {}
        }

        response
            .json()
            .await
            .map_err(|e| MarkerError::NameLookup(format!("Invalid profile API response: {}", e)))
    }
}

#[async_trait]
impl ProfileRepository for MojangProfileRepository {
    async fn find_profiles_by_names(&self, names: &[String]) -> MarkerResult<Vec<GameProfile>> {
        let mut found = Vec::with_capacity(names.len());

        for batch in names.chunks(MAX_NAMES_PER_REQUEST) {
            match self.lookup_batch(batch).await {
                Ok(profiles) => {
                    metrics::record_name_lookup(true);
                    found.extend(profiles);
                }
                Err(e) => {
                    metrics::record_name_lookup(false);
                    return Err(e);
                }
            }
        }

        Ok(found)
    }
}

/// Session server client for profile properties
#[derive(Clone)]
pub struct MojangSessionService {
    http_client: reqwest::Client,
    session_url: String,
}

impl MojangSessionService {
    pub fn new(http_client: reqwest::Client, session_url: &str) -> Self {
        Self {
            http_client,
            session_url: session_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SessionService for MojangSessionService {
    async fn fill_profile_properties(
        &self,
        profile: &GameProfile,
        require_signed: bool,
    ) -> MarkerResult<GameProfile> {
        let id = profile.id.ok_or_else(|| {
            MarkerError::TextureLookup(format!("Profile {} has no id", profile.name))
        })?;

        // Session server expects the undashed form
        let url = format!(
            "{}/session/minecraft/profile/{}?unsigned={}",
            self.session_url,
            id.simple(),
            !require_signed
        );

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            MarkerError::TextureLookup(format!("Failed to reach session server: {}", e))
        })?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => {
                return Err(MarkerError::NotFound(format!("No session profile for {}", id)))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(MarkerError::RateLimitExceeded {
                    retry_after: retry_after(&response),
                })
            }
            status if !status.is_success() => {
                return Err(MarkerError::TextureLookup(format!(
                    "Session server returned error: {}",
                    status
                )))
            }
            _ => {}
        }

        let filled: GameProfile = response.json().await.map_err(|e| {
            MarkerError::TextureLookup(format!("Invalid session profile: {}", e))
        })?;

        Ok(GameProfile {
            id: Some(id),
            name: if filled.name.is_empty() {
                profile.name.clone()
            } else {
                filled.name
            },
            properties: filled.properties,
        })
    }
}
