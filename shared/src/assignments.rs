use serde::{Deserialize, Serialize};

use crate::coords::RawCoord;
use crate::location::{LocationType, OwnerType};

/// Territorial control of one cell by an owner (usually a faction).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlAssignment {
    #[serde(default)]
    pub coord: Option<RawCoord>,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

impl ControlAssignment {
    pub fn new(coord: impl Into<RawCoord>, owner_id: &str) -> Self {
        Self {
            coord: Some(coord.into()),
            owner_id: owner_id.to_string(),
            ..Self::default()
        }
    }
}

/// A point-of-interest marker pinned to one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerAssignment {
    #[serde(default)]
    pub coord: Option<RawCoord>,
    pub location_name: String,
    pub location_type: LocationType,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl MarkerAssignment {
    pub fn new(
        coord: impl Into<RawCoord>,
        location_name: &str,
        location_type: impl Into<LocationType>,
    ) -> Self {
        Self {
            coord: Some(coord.into()),
            location_name: location_name.to_string(),
            location_type: location_type.into(),
            icon: None,
            parent: None,
            color: None,
        }
    }
}

/// One cell of a location's zone of influence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluenceAssignment {
    #[serde(default)]
    pub coord: Option<RawCoord>,
    pub location_name: String,
    pub location_type: LocationType,
    /// 0..=100
    pub strength: f64,
    #[serde(default)]
    pub owner_type: OwnerType,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl InfluenceAssignment {
    pub fn new(
        coord: impl Into<RawCoord>,
        location_name: &str,
        location_type: impl Into<LocationType>,
        strength: f64,
    ) -> Self {
        Self {
            coord: Some(coord.into()),
            location_name: location_name.to_string(),
            location_type: location_type.into(),
            strength,
            owner_type: OwnerType::None,
            owner_name: None,
            color: None,
        }
    }

    pub fn owned_by(mut self, owner_type: OwnerType, owner_name: &str) -> Self {
        self.owner_type = owner_type;
        self.owner_name = Some(owner_name.to_string());
        self
    }
}
