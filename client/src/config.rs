use serde::{Deserialize, Serialize};

pub const DEFAULT_CELL_RADIUS: f64 = 42.0;
pub const DEFAULT_PADDING: f64 = 12.0;
pub const DEFAULT_MIN_SCALE: f64 = 0.15;
pub const DEFAULT_MAX_SCALE: f64 = 16.0;
pub const DEFAULT_ZOOM_SPEED: f64 = 1.01;
/// Screen pixels a pointer may travel before a press stops counting as a click.
pub const DEFAULT_DRAG_THRESHOLD_PX: f64 = 5.0;
pub const DEFAULT_SURFACE_WIDTH: f64 = 1280.0;
pub const DEFAULT_SURFACE_HEIGHT: f64 = 800.0;
/// Half-width of the ring generated when a map has no cells yet.
pub const FALLBACK_GRID_RADIUS: u32 = 2;

// Overlay styling per layer.
pub const CONTROL_FILL_OPACITY: f64 = 0.55;
pub const CONTROL_STROKE_WIDTH: f64 = 3.0;
pub const INFLUENCE_FILL_OPACITY: f64 = 0.35;
pub const INFLUENCE_STROKE_WIDTH: f64 = 2.0;
pub const MARKER_FILL_OPACITY: f64 = 1.0;
pub const MARKER_STROKE_WIDTH: f64 = 3.0;

pub const DEFAULT_STROKE: &str = "#8A8A8A";
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;
pub const TERRAIN_FILL_OPACITY: f64 = 0.25;

fn positive_f64(name: &str) -> Option<f64> {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value > 0.0)
}

pub fn cell_radius() -> f64 {
    positive_f64("HEXMAP_CELL_RADIUS").unwrap_or(DEFAULT_CELL_RADIUS)
}

pub fn padding() -> f64 {
    std::env::var("HEXMAP_PADDING")
        .ok()
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value >= 0.0)
        .unwrap_or(DEFAULT_PADDING)
}

pub fn zoom_speed() -> f64 {
    positive_f64("HEXMAP_ZOOM_SPEED")
        .filter(|value| *value > 1.0)
        .unwrap_or(DEFAULT_ZOOM_SPEED)
}

pub fn drag_threshold_px() -> f64 {
    positive_f64("HEXMAP_DRAG_THRESHOLD_PX").unwrap_or(DEFAULT_DRAG_THRESHOLD_PX)
}

/// `(min, max)`; an inverted pair from the environment falls back to defaults.
pub fn scale_limits() -> (f64, f64) {
    let min = positive_f64("HEXMAP_MIN_SCALE").unwrap_or(DEFAULT_MIN_SCALE);
    let max = positive_f64("HEXMAP_MAX_SCALE").unwrap_or(DEFAULT_MAX_SCALE);
    if min > max {
        (DEFAULT_MIN_SCALE, DEFAULT_MAX_SCALE)
    } else {
        (min, max)
    }
}

pub fn surface_size() -> (f64, f64) {
    (
        positive_f64("HEXMAP_SURFACE_WIDTH").unwrap_or(DEFAULT_SURFACE_WIDTH),
        positive_f64("HEXMAP_SURFACE_HEIGHT").unwrap_or(DEFAULT_SURFACE_HEIGHT),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraOptions {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Scale multiplier per wheel delta unit.
    pub zoom_speed: f64,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            min_scale: DEFAULT_MIN_SCALE,
            max_scale: DEFAULT_MAX_SCALE,
            zoom_speed: DEFAULT_ZOOM_SPEED,
        }
    }
}

impl CameraOptions {
    pub fn from_env() -> Self {
        let (min_scale, max_scale) = scale_limits();
        Self {
            min_scale,
            max_scale,
            zoom_speed: zoom_speed(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub radius: f64,
    pub padding: f64,
    pub drag_threshold_px: f64,
    pub camera: CameraOptions,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_CELL_RADIUS,
            padding: DEFAULT_PADDING,
            drag_threshold_px: DEFAULT_DRAG_THRESHOLD_PX,
            camera: CameraOptions::default(),
        }
    }
}

impl SurfaceConfig {
    pub fn from_env() -> Self {
        Self {
            radius: cell_radius(),
            padding: padding(),
            drag_threshold_px: drag_threshold_px(),
            camera: CameraOptions::from_env(),
        }
    }
}
