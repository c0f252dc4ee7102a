use hexmap_shared::{InfluenceAssignment, LocationType, OffsetCoord, OwnerType, RawCoord};
use serde::Serialize;

use super::{OverlayKind, OverlayStore};
use crate::config::{INFLUENCE_FILL_OPACITY, INFLUENCE_STROKE_WIDTH};
use crate::scene::OverlayStyle;

const INFLUENCE_PALETTE: &[&str] = &[
    "#1F77B4", "#FF7F0E", "#2CA02C", "#D62728", "#9467BD", "#8C564B", "#E377C2", "#7F7F7F",
    "#BCBD22", "#17BECF",
];

/// Palette key for an influence owner. Unowned zones are colored per location.
pub fn influence_owner_key(
    owner_type: OwnerType,
    owner_name: Option<&str>,
    location_name: &str,
) -> String {
    match owner_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => format!("{}:{name}", owner_type.as_str()),
        None => format!("location:{}", location_name.trim()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfluenceEntry {
    pub coord: OffsetCoord,
    pub location_name: String,
    pub location_type: LocationType,
    pub strength: f64,
    pub owner_type: OwnerType,
    pub owner_name: Option<String>,
    pub color: String,
}

#[derive(Debug)]
pub enum InfluenceLayer {}

impl OverlayKind for InfluenceLayer {
    type Assignment = InfluenceAssignment;
    type Entry = InfluenceEntry;

    const LAYER: &'static str = "influence";

    fn coord(assignment: &InfluenceAssignment) -> Option<RawCoord> {
        assignment.coord
    }

    fn owner_key(assignment: &InfluenceAssignment) -> Option<String> {
        if assignment.location_name.trim().is_empty() || !assignment.strength.is_finite() {
            return None;
        }
        Some(influence_owner_key(
            assignment.owner_type,
            assignment.owner_name.as_deref(),
            &assignment.location_name,
        ))
    }

    fn color_override(assignment: &InfluenceAssignment) -> Option<&str> {
        assignment.color.as_deref()
    }

    fn make_entry(
        assignment: &InfluenceAssignment,
        coord: OffsetCoord,
        color: String,
    ) -> InfluenceEntry {
        InfluenceEntry {
            coord,
            location_name: assignment.location_name.trim().to_string(),
            location_type: assignment.location_type.clone(),
            strength: assignment.strength.clamp(0.0, 100.0),
            owner_type: assignment.owner_type,
            owner_name: assignment.owner_name.clone(),
            color,
        }
    }

    fn to_assignment(entry: &InfluenceEntry) -> InfluenceAssignment {
        InfluenceAssignment {
            coord: Some(entry.coord.into()),
            location_name: entry.location_name.clone(),
            location_type: entry.location_type.clone(),
            strength: entry.strength,
            owner_type: entry.owner_type,
            owner_name: entry.owner_name.clone(),
            color: Some(entry.color.clone()),
        }
    }

    /// Opacity scales with strength so zones fade toward their rim.
    fn style(entry: &InfluenceEntry) -> OverlayStyle {
        let owner = match entry.owner_name.as_deref() {
            Some(name) => format!(" [{name}]"),
            None => String::new(),
        };
        OverlayStyle {
            color: entry.color.clone(),
            stroke_width: INFLUENCE_STROKE_WIDTH,
            fill_opacity: INFLUENCE_FILL_OPACITY * entry.strength / 100.0,
            label: None,
            tooltip: Some(format!(
                "{}{owner}: {:.0}%",
                entry.location_name, entry.strength
            )),
        }
    }

    fn default_palette() -> &'static [&'static str] {
        INFLUENCE_PALETTE
    }
}

pub type InfluenceStore = OverlayStore<InfluenceLayer>;

impl OverlayStore<InfluenceLayer> {
    /// Color for a named owner of the given kind, pinned for later assignments.
    pub fn get_color_for_owner(&self, owner_name: &str, owner_type: OwnerType) -> String {
        self.pin_color(&influence_owner_key(owner_type, Some(owner_name), owner_name))
    }
}
