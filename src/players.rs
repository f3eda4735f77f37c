/// Connected player state as reported by the game server
use crate::{
    error::{MarkerError, MarkerResult},
    profile::GameProfile,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// World environment a player is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Normal,
    Nether,
    TheEnd,
    Custom,
}

/// One connected player
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlinePlayer {
    /// Live profile held by the server for this connection
    pub profile: GameProfile,
    pub location: [f64; 3],
    pub world: String,
    pub dimension: Dimension,
    pub health: f64,
    #[serde(default)]
    pub saturation: f32,
    #[serde(default)]
    pub food: i32,
    /// Bed spawn block position
    #[serde(default)]
    pub bed: Option<[i32; 3]>,
    #[serde(default)]
    pub level: i32,
    /// Progress towards the next level, 0.0 to 1.0
    #[serde(default)]
    pub exp: f32,
}

impl OnlinePlayer {
    pub fn name(&self) -> &str {
        &self.profile.name
    }
}

/// Server snapshot: authentication mode and connected players
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerState {
    #[serde(default = "default_online_mode")]
    pub online_mode: bool,
    #[serde(default)]
    pub players: Vec<OnlinePlayer>,
}

fn default_online_mode() -> bool {
    true
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            online_mode: default_online_mode(),
            players: Vec::new(),
        }
    }
}

/// Source of connected player state
#[async_trait]
pub trait PlayerSource: Send + Sync {
    async fn server_state(&self) -> MarkerResult<ServerState>;
}

/// Reads the player feed JSON written by the server bridge
#[derive(Debug, Clone)]
pub struct FilePlayerSource {
    path: PathBuf,
}

impl FilePlayerSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PlayerSource for FilePlayerSource {
    async fn server_state(&self) -> MarkerResult<ServerState> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Player feed {} not present yet", self.path.display());
                return Ok(ServerState::default());
            }
            Err(e) => return Err(MarkerError::Io(e)),
        };

        Ok(serde_json::from_slice(&raw)?)
    }
}

/// Fixed server state
#[cfg(test)]
pub(crate) struct StaticPlayerSource(pub ServerState);

#[cfg(test)]
#[async_trait]
impl PlayerSource for StaticPlayerSource {
    async fn server_state(&self) -> MarkerResult<ServerState> {
        Ok(self.0.clone())
    }
}
