use std::cell::{Ref, RefCell};
use std::rc::Rc;

use hexmap_shared::{HexLayout, OffsetCoord};
use tracing::{debug, info, warn};

use crate::camera::CameraController;
use crate::config::SurfaceConfig;
use crate::host::SurfaceHost;
use crate::interaction::{
    DefaultAction, InteractionController, InteractionDelegate, PointerButton, PointerEvent,
    PointerPhase,
};
use crate::lifecycle::Lifecycle;
use crate::registry::MapStores;
use crate::scene::Scene;
use crate::sync::{SceneHandle, SceneSync};
use crate::translator::CoordinateTranslator;

/// Scene, camera, translator and interaction mounted on one host region.
pub struct MapSurface<H: SurfaceHost> {
    host: H,
    scene: SceneHandle,
    camera: CameraController,
    translator: CoordinateTranslator,
    interaction: InteractionController,
    sync: Option<SceneSync>,
    lifecycle: Lifecycle,
    destroyed: bool,
}

impl<H: SurfaceHost> MapSurface<H> {
    pub fn mount(
        mut host: H,
        config: SurfaceConfig,
        base: OffsetCoord,
        initial: impl IntoIterator<Item = OffsetCoord>,
    ) -> Result<Self, String> {
        let layout = HexLayout::new(config.radius, base, config.padding);
        let scene = Scene::new(layout, initial);
        let mut camera = CameraController::new(config.camera);
        let mut interaction = InteractionController::new(config.drag_threshold_px);
        camera.attach(&mut host)?;
        interaction.attach(&mut host)?;
        let translator = CoordinateTranslator::new(host.size());
        info!(cells = scene.len(), radius = config.radius, "map surface mounted");
        Ok(Self {
            host,
            scene: Rc::new(RefCell::new(scene)),
            camera,
            translator,
            interaction,
            sync: None,
            lifecycle: Lifecycle::new(),
            destroyed: false,
        })
    }

    /// Mirrors `stores` onto the scene, replacing any previous binding.
    pub fn bind_stores(&mut self, stores: &MapStores) {
        if self.destroyed {
            return;
        }
        if let Some(mut previous) = self.sync.take() {
            previous.detach();
        }
        self.sync = Some(SceneSync::attach(&self.scene, stores));
    }

    pub fn set_fill(&mut self, coord: OffsetCoord, color: &str) -> bool {
        if self.destroyed {
            return false;
        }
        self.scene.borrow_mut().set_fill(coord, color)
    }

    pub fn ensure_polys(&mut self, coords: impl IntoIterator<Item = OffsetCoord>) -> usize {
        if self.destroyed {
            return 0;
        }
        self.scene.borrow_mut().ensure_polys(coords)
    }

    pub fn set_interaction_delegate(&mut self, delegate: Option<Box<dyn InteractionDelegate>>) {
        if self.destroyed {
            return;
        }
        self.interaction.set_delegate(delegate);
    }

    /// Routes a pointer sample: primary presses on cells go to the interaction
    /// controller, everything else pans the camera.
    pub fn dispatch(&mut self, event: PointerEvent) {
        if self.destroyed {
            return;
        }
        self.translator.set_size(self.host.size());

        if self.camera.is_dragging() {
            match event.phase {
                PointerPhase::Move => self.camera.drag_to(event.x, event.y),
                PointerPhase::Up | PointerPhase::Leave | PointerPhase::Cancel => {
                    self.camera.end_drag()
                }
                PointerPhase::Down => {}
            }
            return;
        }

        let coord = self.cell_at(event.x, event.y);
        if event.phase == PointerPhase::Down
            && self.interaction.is_idle()
            && (event.button != PointerButton::Primary || coord.is_none())
        {
            self.camera.begin_drag(event.x, event.y);
            return;
        }

        // The scene must not be borrowed here: delegates publish to stores
        // whose sync handlers restyle it.
        if let Some(DefaultAction::Select(selected)) = self.interaction.handle(&event, coord) {
            self.scene.borrow_mut().select(Some(selected));
            debug!(%selected, "cell selected");
        }
    }

    pub fn wheel(&mut self, delta: f64, x: f64, y: f64) {
        if !self.destroyed {
            self.camera.zoom_at(delta, x, y);
        }
    }

    pub fn pinch(&mut self, previous_distance: f64, distance: f64, x: f64, y: f64) {
        if !self.destroyed {
            self.camera.pinch(previous_distance, distance, x, y);
        }
    }

    /// Re-derives the view box from the grown bounds, then frames it with the
    /// camera's fit margin. An unsized host leaves the camera at identity.
    pub fn refit(&mut self) {
        if self.destroyed {
            return;
        }
        self.translator.set_size(self.host.size());
        let mut scene = self.scene.borrow_mut();
        scene.refit();
        self.camera.reset();

        let (Some(fit), Some(frame), Some((width, height))) =
            (self.translator.fit(&scene), scene.frame(), self.translator.size())
        else {
            return;
        };
        let (x0, y0) = fit.content_to_surface(frame.x, frame.y);
        let (x1, y1) = fit.content_to_surface(frame.x + frame.width, frame.y + frame.height);
        self.camera.fit_bounds(x0, y0, x1, y1, width, height);
        debug!(scale = self.camera.transform().scale, "surface refit");
    }

    pub fn cell_at(&self, x: f64, y: f64) -> Option<OffsetCoord> {
        let scene = self.scene.try_borrow().ok()?;
        self.translator
            .resolve(&scene, &self.camera.transform(), x, y)
    }

    pub fn scene(&self) -> Ref<'_, Scene> {
        self.scene.borrow()
    }

    pub fn scene_handle(&self) -> SceneHandle {
        Rc::clone(&self.scene)
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn translator(&self) -> &CoordinateTranslator {
        &self.translator
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.clone()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Tears everything down. Never fails and may be called repeatedly.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.lifecycle.cancel();
        if let Some(mut sync) = self.sync.take() {
            sync.detach();
        }
        self.interaction.destroy(&mut self.host);
        self.camera.destroy(&mut self.host);
        match self.scene.try_borrow_mut() {
            Ok(mut scene) => scene.destroy(),
            Err(e) => warn!(error = %e, "scene still borrowed during teardown"),
        }
        info!("map surface destroyed");
    }
}
