use hexmap_shared::{LocationType, MarkerAssignment, OffsetCoord, RawCoord};
use serde::Serialize;

use super::{OverlayKind, OverlayStore};
use crate::config::{MARKER_FILL_OPACITY, MARKER_STROKE_WIDTH};
use crate::scene::OverlayStyle;

const MARKER_PALETTE: &[&str] = &[
    "#FFD700", "#FF8C00", "#DC143C", "#8B4513", "#2E8B57", "#4682B4", "#6A5ACD", "#708090",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerEntry {
    pub coord: OffsetCoord,
    pub location_name: String,
    pub location_type: LocationType,
    /// Custom icon, or the type's default.
    pub icon: String,
    pub custom_icon: bool,
    pub parent: Option<String>,
    pub color: String,
}

#[derive(Debug)]
pub enum MarkerLayer {}

impl OverlayKind for MarkerLayer {
    type Assignment = MarkerAssignment;
    type Entry = MarkerEntry;

    const LAYER: &'static str = "markers";

    fn coord(assignment: &MarkerAssignment) -> Option<RawCoord> {
        assignment.coord
    }

    /// Markers share one color per location type.
    fn owner_key(assignment: &MarkerAssignment) -> Option<String> {
        if assignment.location_name.trim().is_empty() {
            return None;
        }
        Some(assignment.location_type.as_str().to_string())
    }

    fn color_override(assignment: &MarkerAssignment) -> Option<&str> {
        assignment.color.as_deref()
    }

    fn make_entry(assignment: &MarkerAssignment, coord: OffsetCoord, color: String) -> MarkerEntry {
        let custom = assignment
            .icon
            .as_deref()
            .map(str::trim)
            .filter(|icon| !icon.is_empty());
        MarkerEntry {
            coord,
            location_name: assignment.location_name.trim().to_string(),
            location_type: assignment.location_type.clone(),
            icon: custom
                .unwrap_or_else(|| assignment.location_type.default_icon())
                .to_string(),
            custom_icon: custom.is_some(),
            parent: assignment.parent.clone(),
            color,
        }
    }

    fn to_assignment(entry: &MarkerEntry) -> MarkerAssignment {
        MarkerAssignment {
            coord: Some(entry.coord.into()),
            location_name: entry.location_name.clone(),
            location_type: entry.location_type.clone(),
            icon: entry.custom_icon.then(|| entry.icon.clone()),
            parent: entry.parent.clone(),
            color: Some(entry.color.clone()),
        }
    }

    fn style(entry: &MarkerEntry) -> OverlayStyle {
        let tooltip = match &entry.parent {
            Some(parent) => format!("{} ({}, {parent})", entry.location_name, entry.location_type),
            None => format!("{} ({})", entry.location_name, entry.location_type),
        };
        OverlayStyle {
            color: entry.color.clone(),
            stroke_width: MARKER_STROKE_WIDTH,
            fill_opacity: MARKER_FILL_OPACITY,
            label: Some(format!("{} {}", entry.icon, entry.location_name)),
            tooltip: Some(tooltip),
        }
    }

    fn default_palette() -> &'static [&'static str] {
        MARKER_PALETTE
    }
}

pub type MarkerStore = OverlayStore<MarkerLayer>;

impl OverlayStore<MarkerLayer> {
    /// First marker whose location name matches after trimming.
    pub fn get_by_location_name(&self, name: &str) -> Option<MarkerEntry> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.state()
            .entries
            .values()
            .find(|entry| entry.location_name == name)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_and_custom_icons() {
        let store = MarkerStore::new();
        let mut tower = MarkerAssignment::new((1, 1), "Blackstaff Tower", "Gebäude");
        tower.icon = Some("🗼".to_string());
        store.set_assignments(&[MarkerAssignment::new((0, 0), "Waterdeep", "Stadt"), tower]);

        let city = store.get((0, 0)).expect("city marker");
        assert_eq!(city.icon, LocationType::City.default_icon());
        assert!(!city.custom_icon);
        let tower = store.get((1, 1)).expect("tower marker");
        assert_eq!(tower.icon, "🗼");
        assert_eq!(MarkerLayer::to_assignment(&tower).icon.as_deref(), Some("🗼"));
    }

    #[test]
    fn lookup_by_trimmed_name() {
        let store = MarkerStore::new();
        store.set_assignments(&[MarkerAssignment::new((3, 4), " Neverwinter ", "Stadt")]);
        let found = store.get_by_location_name("Neverwinter  ").expect("marker");
        assert_eq!(found.coord, OffsetCoord::new(3, 4));
        assert!(store.get_by_location_name("   ").is_none());
        assert!(store.get_by_location_name("Luskan").is_none());
    }

    #[test]
    fn same_type_shares_color() {
        let store = MarkerStore::new();
        store.set_assignments(&[
            MarkerAssignment::new((0, 0), "Waterdeep", "Stadt"),
            MarkerAssignment::new((0, 1), "Neverwinter", "Stadt"),
            MarkerAssignment::new((0, 2), "", "Stadt"),
        ]);
        assert_eq!(store.len(), 2);
        let a = store.get((0, 0)).map(|e| e.color);
        let b = store.get((0, 1)).map(|e| e.color);
        assert_eq!(a, b);
    }
}
