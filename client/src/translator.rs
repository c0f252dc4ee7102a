use hexmap_shared::{HexLayout, OffsetCoord};

use crate::camera::CameraTransform;
use crate::scene::{Scene, ViewBox};

/// Uniform "meet" fit of a view box into a surface of the given size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportFit {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub view_box: ViewBox,
}

impl ViewportFit {
    pub fn new(view_box: ViewBox, width: f64, height: f64) -> Option<Self> {
        if width <= 0.0 || height <= 0.0 || view_box.width <= 0.0 || view_box.height <= 0.0 {
            return None;
        }
        let scale = (width / view_box.width).min(height / view_box.height);
        Some(Self {
            scale,
            offset_x: (width - view_box.width * scale) / 2.0,
            offset_y: (height - view_box.height * scale) / 2.0,
            view_box,
        })
    }

    pub fn content_to_surface(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.view_box.x) * self.scale + self.offset_x,
            (y - self.view_box.y) * self.scale + self.offset_y,
        )
    }

    pub fn surface_to_content(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            (sx - self.offset_x) / self.scale + self.view_box.x,
            (sy - self.offset_y) / self.scale + self.view_box.y,
        )
    }
}

/// Maps screen points into scene content space and on to hex cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateTranslator {
    size: Option<(f64, f64)>,
}

impl CoordinateTranslator {
    pub fn new(size: Option<(f64, f64)>) -> Self {
        Self { size }
    }

    pub fn set_size(&mut self, size: Option<(f64, f64)>) {
        self.size = size;
    }

    pub fn size(&self) -> Option<(f64, f64)> {
        self.size
    }

    pub fn fit(&self, scene: &Scene) -> Option<ViewportFit> {
        let (width, height) = self.size?;
        ViewportFit::new(scene.view_box()?, width, height)
    }

    /// Screen point to content space, or `None` while the surface is unsized
    /// or the scene has nothing to frame.
    pub fn to_content_point(
        &self,
        scene: &Scene,
        camera: &CameraTransform,
        screen_x: f64,
        screen_y: f64,
    ) -> Option<(f64, f64)> {
        if !screen_x.is_finite() || !screen_y.is_finite() || camera.scale <= 0.0 {
            return None;
        }
        let fit = self.fit(scene)?;
        let (sx, sy) = camera.screen_to_surface(screen_x, screen_y);
        Some(fit.surface_to_content(sx, sy))
    }

    pub fn to_screen_point(
        &self,
        scene: &Scene,
        camera: &CameraTransform,
        x: f64,
        y: f64,
    ) -> Option<(f64, f64)> {
        let fit = self.fit(scene)?;
        let (sx, sy) = fit.content_to_surface(x, y);
        Some(camera.surface_to_screen(sx, sy))
    }

    /// Cell under a screen point. Points outside the scene frame resolve to `None`.
    pub fn resolve(
        &self,
        scene: &Scene,
        camera: &CameraTransform,
        screen_x: f64,
        screen_y: f64,
    ) -> Option<OffsetCoord> {
        let (x, y) = self.to_content_point(scene, camera, screen_x, screen_y)?;
        if !scene.frame()?.contains(x, y) {
            return None;
        }
        Some(point_to_coord(scene.layout(), x, y))
    }
}

/// Nearest hex center to a content-space point. Packed rows overlap in
/// bounding-box space, so this rounds in cube space rather than by rectangle.
pub fn point_to_coord(layout: &HexLayout, x: f64, y: f64) -> OffsetCoord {
    layout.coord_at(x, y)
}
