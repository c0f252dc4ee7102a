use std::collections::BTreeMap;

use hexmap_shared::colors::{multiply_over, parse_hex_color, to_hex};
use hexmap_shared::{Bounds, HexLayout, OffsetCoord};
use serde::Serialize;
use tracing::debug;

use crate::config::{DEFAULT_STROKE, DEFAULT_STROKE_WIDTH, TERRAIN_FILL_OPACITY};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BlendMode {
    Normal,
    Multiply,
}

/// Styling a single overlay layer applies on top of a cell's terrain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayStyle {
    pub color: String,
    pub stroke_width: f64,
    pub fill_opacity: f64,
    pub label: Option<String>,
    pub tooltip: Option<String>,
}

/// Resolved visual state of one cell, ready for a rendering backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellStyle {
    pub fill: String,
    pub fill_opacity: f64,
    pub stroke: String,
    pub stroke_width: f64,
    pub stroke_opacity: f64,
    pub blend: BlendMode,
    pub label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HexCell {
    pub coord: OffsetCoord,
    pub center: (f64, f64),
    pub points: [(f64, f64); 6],
    terrain_fill: Option<String>,
    overlay: Option<OverlayStyle>,
    style: CellStyle,
}

impl HexCell {
    fn new(coord: OffsetCoord, layout: &HexLayout) -> Self {
        let center = layout.center_of(coord);
        let mut cell = Self {
            coord,
            center,
            points: hexmap_shared::hex::polygon_points(center.0, center.1, layout.radius),
            terrain_fill: None,
            overlay: None,
            style: CellStyle {
                fill: "transparent".to_string(),
                fill_opacity: 0.0,
                stroke: DEFAULT_STROKE.to_string(),
                stroke_width: DEFAULT_STROKE_WIDTH,
                stroke_opacity: 1.0,
                blend: BlendMode::Normal,
                label: None,
            },
        };
        cell.restyle();
        cell
    }

    pub fn terrain_fill(&self) -> Option<&str> {
        self.terrain_fill.as_deref()
    }

    pub fn overlay(&self) -> Option<&OverlayStyle> {
        self.overlay.as_ref()
    }

    pub fn style(&self) -> &CellStyle {
        &self.style
    }

    /// Flattened fill for backends without blend-mode support: the overlay
    /// multiplied over the terrain color.
    pub fn composite_fill(&self) -> Option<String> {
        let overlay = self.overlay.as_ref()?;
        let top = parse_hex_color(&overlay.color)?;
        let bottom = self
            .terrain_fill
            .as_deref()
            .and_then(parse_hex_color)
            .unwrap_or((255, 255, 255));
        let (r, g, b) = multiply_over(bottom, top, overlay.fill_opacity);
        Some(to_hex(r, g, b))
    }

    fn restyle(&mut self) {
        self.style = match &self.overlay {
            Some(overlay) => CellStyle {
                fill: overlay.color.clone(),
                fill_opacity: overlay.fill_opacity,
                stroke: overlay.color.clone(),
                stroke_width: overlay.stroke_width,
                stroke_opacity: 0.9,
                blend: BlendMode::Multiply,
                label: overlay.label.clone(),
            },
            None => {
                let (fill, fill_opacity) = match &self.terrain_fill {
                    Some(color) => (color.clone(), TERRAIN_FILL_OPACITY),
                    None => ("transparent".to_string(), 0.0),
                };
                CellStyle {
                    fill,
                    fill_opacity,
                    stroke: DEFAULT_STROKE.to_string(),
                    stroke_width: DEFAULT_STROKE_WIDTH,
                    stroke_opacity: 1.0,
                    blend: BlendMode::Normal,
                    label: None,
                }
            }
        };
    }
}

/// Integer-aligned viewport rectangle (`x y width height`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    fn padded(bounds: &Bounds, padding: f64) -> Self {
        let min_x = (bounds.min_x - padding).floor();
        let min_y = (bounds.min_y - padding).floor();
        let max_x = (bounds.max_x + padding).ceil();
        let max_y = (bounds.max_y + padding).ceil();
        Self {
            x: min_x,
            y: min_y,
            width: (max_x - min_x).max(1.0),
            height: (max_y - min_y).max(1.0),
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Retained hex grid: one cell per occupied coordinate, created lazily.
///
/// Bounds only ever grow. The view box is fixed the first time the scene
/// gets content and only moves again on [`Scene::refit`]; the hit frame
/// always tracks the current bounds.
#[derive(Debug)]
pub struct Scene {
    layout: HexLayout,
    cells: BTreeMap<OffsetCoord, HexCell>,
    bounds: Option<Bounds>,
    view_box: Option<ViewBox>,
    frame: Option<ViewBox>,
    selected: Option<OffsetCoord>,
    destroyed: bool,
}

impl Scene {
    pub fn new(layout: HexLayout, initial: impl IntoIterator<Item = OffsetCoord>) -> Self {
        let mut scene = Self {
            layout,
            cells: BTreeMap::new(),
            bounds: None,
            view_box: None,
            frame: None,
            selected: None,
            destroyed: false,
        };
        scene.ensure_polys(initial);
        scene
    }

    pub fn layout(&self) -> &HexLayout {
        &self.layout
    }

    /// Adds cells for coordinates not yet present. Returns how many were created.
    pub fn ensure_polys(&mut self, coords: impl IntoIterator<Item = OffsetCoord>) -> usize {
        if self.destroyed {
            return 0;
        }
        let mut added = 0;
        let mut skipped = 0usize;
        for coord in coords {
            if !coord.in_range() {
                skipped += 1;
                continue;
            }
            if self.cells.contains_key(&coord) {
                continue;
            }
            let bbox = self.layout.bbox_of(coord);
            self.bounds = Some(match self.bounds {
                Some(current) => current.union(&bbox),
                None => bbox,
            });
            self.cells.insert(coord, HexCell::new(coord, &self.layout));
            added += 1;
        }
        if skipped > 0 {
            debug!(skipped, "out-of-range cells ignored");
        }
        if added > 0 {
            self.apply_frame(false);
            debug!(added, total = self.cells.len(), "scene grew");
        }
        added
    }

    /// Re-derives the view box from the current bounds.
    pub fn refit(&mut self) {
        self.apply_frame(true);
    }

    fn apply_frame(&mut self, adjust_view_box: bool) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let frame = ViewBox::padded(&bounds, self.layout.padding);
        if adjust_view_box || self.view_box.is_none() {
            self.view_box = Some(frame);
        }
        self.frame = Some(frame);
    }

    /// Sets the terrain color. While an overlay is active the color is kept
    /// but stays hidden until the overlay is cleared.
    pub fn set_fill(&mut self, coord: OffsetCoord, color: &str) -> bool {
        let Some(cell) = self.cells.get_mut(&coord) else {
            return false;
        };
        let trimmed = color.trim();
        cell.terrain_fill = if trimmed.is_empty() || trimmed == "transparent" {
            None
        } else {
            Some(trimmed.to_string())
        };
        cell.restyle();
        true
    }

    /// Replaces the cell's overlay; `None` restores default stroke and terrain.
    pub fn set_overlay(&mut self, coord: OffsetCoord, overlay: Option<OverlayStyle>) -> bool {
        let Some(cell) = self.cells.get_mut(&coord) else {
            return false;
        };
        cell.overlay = overlay;
        cell.restyle();
        true
    }

    pub fn cell(&self, coord: OffsetCoord) -> Option<&HexCell> {
        self.cells.get(&coord)
    }

    pub fn cells(&self) -> impl Iterator<Item = &HexCell> {
        self.cells.values()
    }

    pub fn contains(&self, coord: OffsetCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn view_box(&self) -> Option<ViewBox> {
        self.view_box
    }

    /// Padded current bounds; the region that accepts pointer input.
    pub fn frame(&self) -> Option<ViewBox> {
        self.frame
    }

    pub fn select(&mut self, coord: Option<OffsetCoord>) {
        self.selected = coord.filter(|c| self.cells.contains_key(c));
    }

    pub fn selected(&self) -> Option<OffsetCoord> {
        self.selected
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Releases every retained cell. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        let released = self.cells.len();
        self.cells.clear();
        self.selected = None;
        debug!(released, "scene destroyed");
    }
}
