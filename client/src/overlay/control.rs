use std::collections::BTreeMap;

use hexmap_shared::{ControlAssignment, OffsetCoord, RawCoord};
use serde::Serialize;

use super::{OverlayKind, OverlayStore};
use crate::config::{CONTROL_FILL_OPACITY, CONTROL_STROKE_WIDTH};
use crate::scene::OverlayStyle;

const CONTROL_PALETTE: &[&str] = &[
    "#E6194B", "#3CB44B", "#4363D8", "#F58231", "#911EB4", "#46F0F0", "#F032E6", "#BCF60C",
    "#008080", "#9A6324", "#800000", "#000075",
];

/// Territorial control of one cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlEntry {
    pub coord: OffsetCoord,
    pub owner_id: String,
    pub owner_name: Option<String>,
    pub strength: Option<f64>,
    pub color: String,
    pub tags: Vec<String>,
    pub source_id: Option<String>,
}

impl ControlEntry {
    pub fn label(&self) -> &str {
        self.owner_name.as_deref().unwrap_or(&self.owner_id)
    }
}

#[derive(Debug)]
pub enum ControlLayer {}

impl OverlayKind for ControlLayer {
    type Assignment = ControlAssignment;
    type Entry = ControlEntry;

    const LAYER: &'static str = "control";

    fn coord(assignment: &ControlAssignment) -> Option<RawCoord> {
        assignment.coord
    }

    fn owner_key(assignment: &ControlAssignment) -> Option<String> {
        let owner = assignment.owner_id.trim();
        (!owner.is_empty()).then(|| owner.to_string())
    }

    fn color_override(assignment: &ControlAssignment) -> Option<&str> {
        assignment.color.as_deref()
    }

    fn make_entry(assignment: &ControlAssignment, coord: OffsetCoord, color: String) -> ControlEntry {
        ControlEntry {
            coord,
            owner_id: assignment.owner_id.trim().to_string(),
            owner_name: assignment.owner_name.clone(),
            strength: assignment.strength.filter(|s| s.is_finite()),
            color,
            tags: assignment.tags.clone(),
            source_id: assignment.source_id.clone(),
        }
    }

    fn to_assignment(entry: &ControlEntry) -> ControlAssignment {
        ControlAssignment {
            coord: Some(entry.coord.into()),
            owner_id: entry.owner_id.clone(),
            owner_name: entry.owner_name.clone(),
            strength: entry.strength,
            color: Some(entry.color.clone()),
            tags: entry.tags.clone(),
            source_id: entry.source_id.clone(),
        }
    }

    fn style(entry: &ControlEntry) -> OverlayStyle {
        let tooltip = match entry.strength {
            Some(strength) => format!("{} ({strength:.0}%)", entry.label()),
            None => entry.label().to_string(),
        };
        OverlayStyle {
            color: entry.color.clone(),
            stroke_width: CONTROL_STROKE_WIDTH,
            fill_opacity: CONTROL_FILL_OPACITY,
            label: Some(entry.label().to_string()),
            tooltip: Some(tooltip),
        }
    }

    fn default_palette() -> &'static [&'static str] {
        CONTROL_PALETTE
    }
}

pub type ControlStore = OverlayStore<ControlLayer>;

/// One row of the control legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendItem {
    pub owner_id: String,
    pub label: String,
    pub color: String,
    pub cells: usize,
}

impl OverlayStore<ControlLayer> {
    /// Color for an owner, pinned so later assignments reuse it.
    pub fn get_color_for_owner(&self, owner_id: &str) -> String {
        self.pin_color(owner_id.trim())
    }

    /// Owners by cell count (descending), ties by label.
    pub fn legend(&self) -> Vec<LegendItem> {
        let state = self.state();
        let mut items: BTreeMap<&str, LegendItem> = BTreeMap::new();
        for entry in state.entries.values() {
            items
                .entry(entry.owner_id.as_str())
                .and_modify(|item| item.cells += 1)
                .or_insert_with(|| LegendItem {
                    owner_id: entry.owner_id.clone(),
                    label: entry.label().to_string(),
                    color: entry.color.clone(),
                    cells: 1,
                });
        }
        let mut items: Vec<LegendItem> = items.into_values().collect();
        items.sort_by(|a, b| b.cells.cmp(&a.cells).then_with(|| a.label.cmp(&b.label)));
        items
    }
}
