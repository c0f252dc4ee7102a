use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assignments::{ControlAssignment, MarkerAssignment};
use crate::coords::OffsetCoord;
use crate::location::LocationData;

/// Everything needed to draw one map: its cells, their terrain colors and the
/// overlay sources. Persistence of these documents lives outside the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default)]
    pub cells: Vec<OffsetCoord>,
    /// `"r:c"` -> terrain color.
    #[serde(default)]
    pub terrain: BTreeMap<String, String>,
    #[serde(default)]
    pub control: Vec<ControlAssignment>,
    #[serde(default)]
    pub markers: Vec<MarkerAssignment>,
    #[serde(default)]
    pub locations: Vec<LocationData>,
}

impl MapDocument {
    pub fn from_json(text: &str) -> Result<Self, String> {
        serde_json::from_str(text).map_err(|e| format!("parse error: {e}"))
    }

    /// Terrain fills with valid keys; malformed keys are skipped.
    pub fn terrain_fills(&self) -> impl Iterator<Item = (OffsetCoord, &str)> + '_ {
        self.terrain
            .iter()
            .filter_map(|(key, color)| Some((OffsetCoord::from_key(key)?, color.as_str())))
    }

    /// Top-left-most cell, used as the layout anchor.
    pub fn base(&self) -> OffsetCoord {
        let min_r = self.cells.iter().map(|c| c.r).min().unwrap_or(0);
        let min_c = self.cells.iter().map(|c| c.c).min().unwrap_or(0);
        OffsetCoord::new(min_r, min_c)
    }
}
