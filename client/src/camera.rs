use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CameraOptions;
use crate::host::{ListenerId, ListenerKind, SurfaceHost, detach_all};

/// Pan/zoom transform from surface space (the fitted scene) to screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for CameraTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

impl CameraTransform {
    pub fn surface_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.scale + self.translate_x,
            y * self.scale + self.translate_y,
        )
    }

    pub fn screen_to_surface(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            (sx - self.translate_x) / self.scale,
            (sy - self.translate_y) / self.scale,
        )
    }
}

/// Continuous, pointer-anchored pan/zoom over the scene.
#[derive(Debug)]
pub struct CameraController {
    transform: CameraTransform,
    options: CameraOptions,
    drag_from: Option<(f64, f64)>,
    listeners: Vec<ListenerId>,
    destroyed: bool,
}

impl CameraController {
    pub fn new(options: CameraOptions) -> Self {
        Self {
            transform: CameraTransform::default(),
            options,
            drag_from: None,
            listeners: Vec::new(),
            destroyed: false,
        }
    }

    /// Registers wheel and pan listeners on the host.
    pub fn attach(&mut self, host: &mut dyn SurfaceHost) -> Result<(), String> {
        for kind in [ListenerKind::Wheel, ListenerKind::Pan] {
            self.listeners.push(host.attach(kind)?);
        }
        Ok(())
    }

    pub fn transform(&self) -> CameraTransform {
        self.transform
    }

    pub fn options(&self) -> CameraOptions {
        self.options
    }

    /// Pan by screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if self.destroyed {
            return;
        }
        self.transform.translate_x += dx;
        self.transform.translate_y += dy;
    }

    /// Zoom by a wheel delta around a screen point. Negative deltas zoom in.
    pub fn zoom_at(&mut self, delta: f64, screen_x: f64, screen_y: f64) {
        let factor = self.options.zoom_speed.powf(-delta);
        self.zoom_to(self.transform.scale * factor, screen_x, screen_y);
    }

    /// Sets the scale (clamped) while keeping the point under the cursor fixed.
    pub fn zoom_to(&mut self, scale: f64, screen_x: f64, screen_y: f64) {
        if self.destroyed || scale.is_nan() {
            return;
        }
        let new_scale = scale.clamp(self.options.min_scale, self.options.max_scale);
        let ratio = new_scale / self.transform.scale;

        // Adjust offset so the point under the cursor stays fixed
        self.transform.translate_x = screen_x - (screen_x - self.transform.translate_x) * ratio;
        self.transform.translate_y = screen_y - (screen_y - self.transform.translate_y) * ratio;
        self.transform.scale = new_scale;
    }

    /// Two-finger zoom: scales by the change in finger distance around their midpoint.
    pub fn pinch(&mut self, previous_distance: f64, distance: f64, center_x: f64, center_y: f64) {
        if previous_distance <= 0.0 || distance <= 0.0 {
            return;
        }
        let target = self.transform.scale * distance / previous_distance;
        self.zoom_to(target, center_x, center_y);
    }

    pub fn begin_drag(&mut self, screen_x: f64, screen_y: f64) {
        if self.destroyed {
            return;
        }
        self.drag_from = Some((screen_x, screen_y));
    }

    pub fn drag_to(&mut self, screen_x: f64, screen_y: f64) {
        let Some((last_x, last_y)) = self.drag_from else {
            return;
        };
        self.pan(screen_x - last_x, screen_y - last_y);
        self.drag_from = Some((screen_x, screen_y));
    }

    pub fn end_drag(&mut self) {
        self.drag_from = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_from.is_some()
    }

    /// Fit the camera so the given surface-space rectangle fills the screen with a margin.
    pub fn fit_bounds(
        &mut self,
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        screen_w: f64,
        screen_h: f64,
    ) {
        let world_w = max_x - min_x;
        let world_h = max_y - min_y;

        if self.destroyed || world_w <= 0.0 || world_h <= 0.0 || screen_w <= 0.0 || screen_h <= 0.0
        {
            return;
        }

        let padding = 0.05;
        let scale_x = screen_w / (world_w * (1.0 + padding * 2.0));
        let scale_y = screen_h / (world_h * (1.0 + padding * 2.0));
        self.transform.scale = scale_x
            .min(scale_y)
            .clamp(self.options.min_scale, self.options.max_scale);

        let center_x = (min_x + max_x) / 2.0;
        let center_y = (min_y + max_y) / 2.0;
        self.transform.translate_x = screen_w / 2.0 - center_x * self.transform.scale;
        self.transform.translate_y = screen_h / 2.0 - center_y * self.transform.scale;
    }

    pub fn reset(&mut self) {
        self.transform = CameraTransform::default();
        self.drag_from = None;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Detaches listeners. Detach failures are logged, never returned.
    pub fn destroy(&mut self, host: &mut dyn SurfaceHost) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.drag_from = None;
        detach_all(host, &mut self.listeners, "camera");
        debug!("camera destroyed");
    }
}
