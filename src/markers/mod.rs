/// Player marker snapshots for the web map
///
/// The JSON layout is what the map's player marker script polls for.

pub mod writer;

pub use writer::SnapshotWriter;

use crate::{
    players::{Dimension, OnlinePlayer},
    profile::{ResolvedProfile, TextureMap},
};
use serde::{Deserialize, Serialize};

/// One player marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMarker {
    pub username: String,
    pub location: [f64; 3],
    pub world: String,
    pub dimension: Dimension,
    pub health: f64,
    pub saturation: f32,
    pub food: i32,
    pub bed: Option<[i32; 3]>,
    /// Level plus progress towards the next one
    pub level: f32,
    pub textures: TextureMap,
}

impl PlayerMarker {
    pub fn new(player: &OnlinePlayer, profile: ResolvedProfile) -> Self {
        Self {
            username: player.name().to_string(),
            location: player.location,
            world: player.world.clone(),
            dimension: player.dimension,
            health: player.health,
            saturation: player.saturation,
            food: player.food,
            bed: player.bed,
            level: player.level as f32 + player.exp,
            textures: profile.textures,
        }
    }
}

/// Marker file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerDocument {
    pub players: Vec<PlayerMarker>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{GameProfile, TextureSlot};
    use serde_json::json;

    fn player(bed: Option<[i32; 3]>) -> OnlinePlayer {
        OnlinePlayer {
            profile: GameProfile::name_only("Alex"),
            location: [1.5, 70.0, -20.25],
            world: "world".to_string(),
            dimension: Dimension::TheEnd,
            health: 18.5,
            saturation: 2.5,
            food: 17,
            bed,
            level: 3,
            exp: 0.25,
        }
    }

    #[test]
    fn test_marker_json_layout() {
        let mut profile = ResolvedProfile::name_only("Alex");
        profile
            .textures
            .insert(TextureSlot::Skin, "http://a/skin".to_string());

        let document = MarkerDocument {
            players: vec![PlayerMarker::new(&player(Some([4, 65, -19])), profile)],
        };

        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!({
                "players": [{
                    "username": "Alex",
                    "location": [1.5, 70.0, -20.25],
                    "world": "world",
                    "dimension": "THE_END",
                    "health": 18.5,
                    "saturation": 2.5,
                    "food": 17,
                    "bed": [4, 65, -19],
                    "level": 3.25,
                    "textures": { "SKIN": "http://a/skin" }
                }]
            })
        );
    }

    #[test]
    fn test_missing_bed_is_null() {
        let marker = PlayerMarker::new(&player(None), ResolvedProfile::name_only("Alex"));
        let json = serde_json::to_value(&marker).unwrap();

        assert!(json["bed"].is_null());
        assert_eq!(json["textures"], json!({}));
    }
}
