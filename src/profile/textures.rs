/// Texture property decoding
use crate::{
    error::{MarkerError, MarkerResult},
    profile::GameProfile,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Name of the profile property carrying the texture payload
pub const TEXTURES_PROPERTY: &str = "textures";

/// Named texture channel of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TextureSlot {
    Skin,
    Cape,
    Elytra,
}

impl TextureSlot {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SKIN" => Some(Self::Skin),
            "CAPE" => Some(Self::Cape),
            "ELYTRA" => Some(Self::Elytra),
            _ => None,
        }
    }
}

/// Texture slot to URL
pub type TextureMap = BTreeMap<TextureSlot, String>;

#[derive(Debug, Deserialize)]
struct TexturesPayload {
    #[serde(default)]
    textures: HashMap<String, TextureEntry>,
}

#[derive(Debug, Deserialize)]
struct TextureEntry {
    url: String,
}

/// Decode the texture URLs carried by a profile's `textures` property
///
/// A profile without the property has no textures. When `require_signed`
/// is set, a property lacking a signature is rejected.
pub fn decode_textures(profile: &GameProfile, require_signed: bool) -> MarkerResult<TextureMap> {
    let Some(property) = profile.property(TEXTURES_PROPERTY) else {
        return Ok(TextureMap::new());
    };

    if require_signed && property.signature.is_none() {
        return Err(MarkerError::TextureLookup(format!(
            "Unsigned textures for {}",
            profile.name
        )));
    }

    let raw = STANDARD
        .decode(property.value.trim())
        .map_err(|e| MarkerError::TextureLookup(format!("Invalid textures encoding: {}", e)))?;
    let payload: TexturesPayload = serde_json::from_slice(&raw)
        .map_err(|e| MarkerError::TextureLookup(format!("Invalid textures payload: {}", e)))?;

    Ok(payload
        .textures
        .into_iter()
        .filter_map(|(slot, entry)| TextureSlot::from_name(&slot).map(|slot| (slot, entry.url)))
        .collect())
}

/// Encode a texture map as a `textures` property value
#[cfg(test)]
pub(crate) fn encode_textures(textures: &[(&str, &str)]) -> String {
    let entries: serde_json::Map<String, serde_json::Value> = textures
        .iter()
        .map(|(slot, url)| (slot.to_string(), serde_json::json!({ "url": url })))
        .collect();
    let payload = serde_json::json!({
        "timestamp": 1_700_000_000_000u64,
        "profileName": "test",
        "textures": entries,
    });
    STANDARD.encode(payload.to_string())
}
