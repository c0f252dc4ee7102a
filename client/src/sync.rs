use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use hexmap_shared::OffsetCoord;
use tracing::{debug, warn};

use crate::overlay::{OverlayKind, OverlayState, OverlayStore, Subscription};
use crate::registry::MapStores;
use crate::scene::Scene;

pub type SceneHandle = Rc<RefCell<Scene>>;

type ClearGuard = Box<dyn Fn(OffsetCoord) -> bool>;

/// Per-layer diff state: the cells this layer styled on its last emission.
struct LayerSync<K: OverlayKind> {
    scene: SceneHandle,
    previous: RefCell<BTreeSet<OffsetCoord>>,
    keep: Option<ClearGuard>,
    _kind: std::marker::PhantomData<K>,
}

impl<K: OverlayKind> LayerSync<K> {
    fn apply(&self, state: &OverlayState<K::Entry>) {
        let Ok(mut scene) = self.scene.try_borrow_mut() else {
            warn!(layer = K::LAYER, "scene busy, overlay update skipped");
            return;
        };
        if scene.is_destroyed() {
            return;
        }

        scene.ensure_polys(state.entries.keys().copied());
        for (coord, entry) in &state.entries {
            scene.set_overlay(*coord, Some(K::style(entry)));
        }

        let current: BTreeSet<OffsetCoord> = state.entries.keys().copied().collect();
        let mut previous = self.previous.borrow_mut();
        let mut cleared = 0usize;
        for stale in previous.difference(&current) {
            if self.keep.as_ref().is_some_and(|keep| keep(*stale)) {
                continue;
            }
            scene.set_overlay(*stale, None);
            cleared += 1;
        }
        debug!(
            layer = K::LAYER,
            version = state.version,
            styled = current.len(),
            cleared,
            "overlay synced"
        );
        *previous = current;
    }
}

fn attach_layer<K: OverlayKind>(
    scene: &SceneHandle,
    store: &OverlayStore<K>,
    keep: Option<ClearGuard>,
) -> Subscription {
    let layer = Rc::new(LayerSync::<K> {
        scene: Rc::clone(scene),
        previous: RefCell::new(BTreeSet::new()),
        keep,
        _kind: std::marker::PhantomData,
    });
    layer.apply(&store.state());
    store.subscribe(move |state| layer.apply(state))
}

/// Keeps the scene's overlays in step with one map's stores.
///
/// Layers repaint in emission order, so the most recent publication wins on
/// shared cells. Influence never clears a cell the control layer owns.
#[derive(Debug, Default)]
pub struct SceneSync {
    subscriptions: Vec<Subscription>,
}

impl SceneSync {
    /// Subscribes to every store and applies their current state immediately.
    pub fn attach(scene: &SceneHandle, stores: &MapStores) -> Self {
        let control = stores.control.clone();
        let subscriptions = vec![
            attach_layer(scene, &stores.control, None),
            attach_layer(scene, &stores.markers, None),
            attach_layer(
                scene,
                &stores.influence,
                Some(Box::new(move |coord: OffsetCoord| control.contains(coord))),
            ),
        ];
        Self { subscriptions }
    }

    pub fn is_attached(&self) -> bool {
        self.subscriptions.iter().any(Subscription::is_active)
    }

    /// Stops listening. Scene styling is left as is.
    pub fn detach(&mut self) {
        for subscription in &mut self.subscriptions {
            subscription.unsubscribe();
        }
        self.subscriptions.clear();
    }
}

#[cfg(test)]
mod tests {
    use hexmap_shared::{ControlAssignment, HexLayout, InfluenceAssignment, MarkerAssignment};

    use super::*;

    fn scene() -> SceneHandle {
        Rc::new(RefCell::new(Scene::new(
            HexLayout::new(10.0, OffsetCoord::new(0, 0), 4.0),
            [],
        )))
    }

    fn overlay_color(scene: &SceneHandle, coord: OffsetCoord) -> Option<String> {
        scene
            .borrow()
            .cell(coord)
            .and_then(|cell| cell.overlay().map(|o| o.color.clone()))
    }

    fn red(coord: (i32, i32)) -> ControlAssignment {
        ControlAssignment {
            color: Some("#FF0000".to_string()),
            ..ControlAssignment::new(coord, "legion")
        }
    }

    fn blue(coord: (i32, i32), name: &str) -> InfluenceAssignment {
        InfluenceAssignment {
            color: Some("#0000FF".to_string()),
            ..InfluenceAssignment::new(coord, name, "Dorf", 60.0)
        }
    }

    #[test]
    fn emissions_create_cells_and_style_them() {
        let scene = scene();
        let stores = MapStores::new();
        let _sync = SceneSync::attach(&scene, &stores);
        stores.control.set_assignments(&[red((2, 2))]);
        assert!(scene.borrow().contains(OffsetCoord::new(2, 2)));
        assert_eq!(overlay_color(&scene, OffsetCoord::new(2, 2)).as_deref(), Some("#FF0000"));
    }

    #[test]
    fn existing_state_is_applied_on_attach() {
        let scene = scene();
        let stores = MapStores::new();
        stores
            .markers
            .set_assignments(&[MarkerAssignment::new((1, 1), "Waterdeep", "Stadt")]);
        let _sync = SceneSync::attach(&scene, &stores);
        assert!(overlay_color(&scene, OffsetCoord::new(1, 1)).is_some());
    }

    #[test]
    fn removed_entries_are_cleared() {
        let scene = scene();
        let stores = MapStores::new();
        let _sync = SceneSync::attach(&scene, &stores);
        stores.control.set_assignments(&[red((0, 0)), red((0, 1))]);
        stores.control.set_assignments(&[red((0, 1))]);
        assert_eq!(overlay_color(&scene, OffsetCoord::new(0, 0)), None);
        assert!(scene.borrow().contains(OffsetCoord::new(0, 0)));
        stores.control.clear();
        assert_eq!(overlay_color(&scene, OffsetCoord::new(0, 1)), None);
    }

    #[test]
    fn influence_does_not_clear_controlled_cells() {
        let scene = scene();
        let stores = MapStores::new();
        let _sync = SceneSync::attach(&scene, &stores);
        let shared = OffsetCoord::new(3, 3);

        stores.influence.set_assignments(&[blue((3, 3), "Phandalin"), blue((4, 4), "Phandalin")]);
        stores.control.set_assignments(&[red((3, 3))]);
        assert_eq!(overlay_color(&scene, shared).as_deref(), Some("#FF0000"));

        stores.influence.clear();
        assert_eq!(overlay_color(&scene, shared).as_deref(), Some("#FF0000"));
        assert_eq!(overlay_color(&scene, OffsetCoord::new(4, 4)), None);
    }

    #[test]
    fn most_recent_publication_wins() {
        let scene = scene();
        let stores = MapStores::new();
        let _sync = SceneSync::attach(&scene, &stores);
        stores.control.set_assignments(&[red((3, 3))]);
        stores.influence.set_assignments(&[blue((3, 3), "Phandalin")]);
        assert_eq!(overlay_color(&scene, OffsetCoord::new(3, 3)).as_deref(), Some("#0000FF"));
    }

    #[test]
    fn extreme_coordinates_do_not_blank_the_batch() {
        let scene = scene();
        let stores = MapStores::new();
        let _sync = SceneSync::attach(&scene, &stores);
        stores.control.set_assignments(&[
            red((0, 2)),
            ControlAssignment::new((0, i32::MIN), "bad"),
            ControlAssignment::new((i32::MAX, i32::MAX), "bad"),
        ]);
        assert_eq!(stores.control.len(), 1);
        assert_eq!(scene.borrow().len(), 1);
        assert_eq!(overlay_color(&scene, OffsetCoord::new(0, 2)).as_deref(), Some("#FF0000"));
    }

    #[test]
    fn detach_stops_updates() {
        let scene = scene();
        let stores = MapStores::new();
        let mut sync = SceneSync::attach(&scene, &stores);
        assert!(sync.is_attached());
        sync.detach();
        sync.detach();
        assert!(!sync.is_attached());
        stores.control.set_assignments(&[red((9, 9))]);
        assert!(!scene.borrow().contains(OffsetCoord::new(9, 9)));
        assert_eq!(stores.control.subscriber_count(), 0);
    }
}
