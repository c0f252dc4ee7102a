use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared kind of a location document. Unrecognised labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LocationType {
    City,
    Fortress,
    Village,
    Hamlet,
    Building,
    Dungeon,
    Camp,
    Landmark,
    Ruin,
    Other(String),
}

impl LocationType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::City => "Stadt",
            Self::Fortress => "Festung",
            Self::Village => "Dorf",
            Self::Hamlet => "Weiler",
            Self::Building => "Gebäude",
            Self::Dungeon => "Dungeon",
            Self::Camp => "Camp",
            Self::Landmark => "Landmark",
            Self::Ruin => "Ruine",
            Self::Other(label) => label,
        }
    }

    /// `(radius, strength)` of the zone of influence this kind projects.
    pub fn influence_profile(&self) -> (u32, f64) {
        match self {
            Self::City => (8, 90.0),
            Self::Fortress => (6, 80.0),
            Self::Village => (5, 70.0),
            Self::Hamlet => (3, 55.0),
            Self::Dungeon => (2, 45.0),
            Self::Building => (1, 40.0),
            Self::Camp => (2, 35.0),
            Self::Ruin => (2, 30.0),
            Self::Landmark => (1, 25.0),
            Self::Other(_) => (2, 30.0),
        }
    }

    pub fn default_icon(&self) -> &'static str {
        match self {
            Self::City => "🏙️",
            Self::Village => "🏘️",
            Self::Hamlet => "🏡",
            Self::Building => "🏢",
            Self::Dungeon => "⚔️",
            Self::Camp => "⛺",
            Self::Landmark => "🗿",
            Self::Ruin => "🏚️",
            Self::Fortress => "🏰",
            Self::Other(_) => "📍",
        }
    }
}

impl From<&str> for LocationType {
    fn from(label: &str) -> Self {
        match label.trim() {
            "Stadt" => Self::City,
            "Festung" => Self::Fortress,
            "Dorf" => Self::Village,
            "Weiler" => Self::Hamlet,
            "Gebäude" => Self::Building,
            "Dungeon" => Self::Dungeon,
            "Camp" => Self::Camp,
            "Landmark" => Self::Landmark,
            "Ruine" => Self::Ruin,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for LocationType {
    fn from(label: String) -> Self {
        Self::from(label.as_str())
    }
}

impl From<LocationType> for String {
    fn from(kind: LocationType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    Faction,
    Npc,
    #[default]
    None,
}

impl OwnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Faction => "faction",
            Self::Npc => "npc",
            Self::None => "none",
        }
    }
}

/// The slice of a location document the map engine consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    pub name: String,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_type: Option<OwnerType>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
}

impl LocationData {
    pub fn new(name: &str, location_type: impl Into<LocationType>, coordinates: &str) -> Self {
        Self {
            name: name.to_string(),
            location_type: location_type.into(),
            coordinates: Some(coordinates.to_string()),
            owner_type: None,
            owner_name: None,
        }
    }

    pub fn owned_by(mut self, owner_type: OwnerType, owner_name: &str) -> Self {
        self.owner_type = Some(owner_type);
        self.owner_name = Some(owner_name.to_string());
        self
    }
}
