/// Profile Resolution System
///
/// Turns a connected player's identity into a canonical profile with
/// texture URLs, caching offline-mode name lookups.

pub mod cache;
pub mod mojang;
pub mod resolver;
pub mod textures;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::ProfileCache;
pub use mojang::{MojangProfileRepository, MojangSessionService, ProfileRepository, SessionService};
pub use resolver::{ProfileResolver, ProfileResolverConfig};
pub use textures::{TextureMap, TextureSlot};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single signed or unsigned profile property (e.g. `textures`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileProperty {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Game profile as held by the server or returned by the profile services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProfile {
    #[serde(default, with = "simple_uuid")]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub properties: Vec<ProfileProperty>,
}

impl GameProfile {
    /// Profile carrying only a name, used when no identity could be found
    pub fn name_only(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            properties: Vec::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&ProfileProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Profile with its canonical identity and texture URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedProfile {
    pub canonical_id: Option<Uuid>,
    pub display_name: String,
    pub textures: TextureMap,
}

impl ResolvedProfile {
    /// Degraded result: the given name, no identity, no textures
    pub fn name_only(name: &str) -> Self {
        Self {
            canonical_id: None,
            display_name: name.to_string(),
            textures: TextureMap::new(),
        }
    }
}

/// Cached name lookup
///
/// Holds the looked-up profile with its filled properties, or `None` when the
/// name could not be resolved. Textures are decoded from it on every read.
#[derive(Debug, Clone)]
pub struct CachedProfile {
    /// Player name the entry was looked up by
    pub name: String,
    pub profile: Option<GameProfile>,
    pub inserted_at: DateTime<Utc>,
}

/// Mojang encodes profile ids as 32 hex digits without dashes
mod simple_uuid {
    use serde::{Deserialize, Deserializer, Serializer};
    use uuid::Uuid;

    pub fn serialize<S: Serializer>(id: &Option<Uuid>, serializer: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => serializer.serialize_str(&id.simple().to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Uuid>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("") => Ok(None),
            Some(s) => Uuid::parse_str(s).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_profile_parses_simple_and_hyphenated_ids() {
        let simple: GameProfile =
            serde_json::from_str(r#"{"id":"069a79f444e94726a5befca90e38aaf5","name":"Notch"}"#)
                .unwrap();
        let hyphenated: GameProfile = serde_json::from_str(
            r#"{"id":"069a79f4-44e9-4726-a5be-fca90e38aaf5","name":"Notch"}"#,
        )
        .unwrap();

        assert_eq!(simple.id, hyphenated.id);
        assert!(simple.properties.is_empty());
    }

    #[test]
    fn test_game_profile_serializes_simple_id() {
        let profile = GameProfile {
            id: Some(Uuid::parse_str("069a79f444e94726a5befca90e38aaf5").unwrap()),
            name: "Notch".to_string(),
            properties: vec![],
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["id"], "069a79f444e94726a5befca90e38aaf5");
    }

    #[test]
    fn test_missing_id_is_none() {
        let profile: GameProfile = serde_json::from_str(r#"{"name":"Steve"}"#).unwrap();
        assert_eq!(profile, GameProfile::name_only("Steve"));
    }
}
