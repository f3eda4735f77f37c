//! Test doubles for the profile services
use crate::{
    error::{MarkerError, MarkerResult},
    profile::{
        textures::{encode_textures, TEXTURES_PROPERTY},
        cache::Clock, GameProfile, ProfileProperty, ProfileRepository, SessionService,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};
use uuid::Uuid;

/// Clock that only moves when told to
pub(crate) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2020, 1, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// In-memory name lookup with a call counter
#[derive(Default)]
pub(crate) struct FakeProfileRepository {
    profiles: HashMap<String, GameProfile>,
    failing: bool,
    calls: AtomicUsize,
}

impl FakeProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_player(mut self, name: &str, id: Uuid) -> Self {
        self.profiles.insert(
            name.to_lowercase(),
            GameProfile {
                id: Some(id),
                name: name.to_string(),
                properties: vec![],
            },
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileRepository for FakeProfileRepository {
    async fn find_profiles_by_names(&self, names: &[String]) -> MarkerResult<Vec<GameProfile>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Stay in flight long enough for concurrent callers to pile up
        tokio::task::yield_now().await;

        if self.failing {
            return Err(MarkerError::NameLookup("service unavailable".to_string()));
        }

        Ok(names
            .iter()
            .filter_map(|name| self.profiles.get(&name.to_lowercase()).cloned())
            .collect())
    }
}

/// In-memory session service returning skin textures by id
#[derive(Default)]
pub(crate) struct FakeSessionService {
    skins: HashMap<Uuid, String>,
    unsigned: bool,
    failing: bool,
    calls: AtomicUsize,
}

impl FakeSessionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_skin(mut self, id: Uuid, url: &str) -> Self {
        self.skins.insert(id, url.to_string());
        self
    }

    /// Serve texture properties without signatures
    pub fn unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionService for FakeSessionService {
    async fn fill_profile_properties(
        &self,
        profile: &GameProfile,
        _require_signed: bool,
    ) -> MarkerResult<GameProfile> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing {
            return Err(MarkerError::TextureLookup("session server down".to_string()));
        }

        let id = profile
            .id
            .ok_or_else(|| MarkerError::TextureLookup("no id".to_string()))?;
        let skin = self
            .skins
            .get(&id)
            .ok_or_else(|| MarkerError::NotFound(id.to_string()))?;

        Ok(GameProfile {
            id: Some(id),
            name: profile.name.clone(),
            properties: vec![ProfileProperty {
                name: TEXTURES_PROPERTY.to_string(),
                value: encode_textures(&[("SKIN", skin)]),
                signature: (!self.unsigned).then(|| "c2lnbmF0dXJl".to_string()),
            }],
        })
    }
}
