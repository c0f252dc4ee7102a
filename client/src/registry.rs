use std::collections::HashMap;

use tracing::debug;

use crate::overlay::{ControlStore, InfluenceStore, MarkerStore};

/// The overlay stores that belong to one open map.
#[derive(Debug, Clone, Default)]
pub struct MapStores {
    pub control: ControlStore,
    pub markers: MarkerStore,
    pub influence: InfluenceStore,
}

impl MapStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.control.clear();
        self.markers.clear();
        self.influence.clear();
    }
}

/// Store bundles keyed by `(session, resource)`, owned by the host application.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    stores: HashMap<(String, String), MapStores>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundle for this key, created on first use. Repeated calls share state.
    pub fn stores_for(&mut self, session: &str, resource: &str) -> MapStores {
        self.stores
            .entry((session.to_string(), resource.to_string()))
            .or_insert_with(|| {
                debug!(session, resource, "overlay stores created");
                MapStores::new()
            })
            .clone()
    }

    pub fn get(&self, session: &str, resource: &str) -> Option<MapStores> {
        self.stores
            .get(&(session.to_string(), resource.to_string()))
            .cloned()
    }

    /// Clears and forgets one bundle. Handles still held elsewhere see the cleared state.
    pub fn reset(&mut self, session: &str, resource: &str) -> bool {
        match self.stores.remove(&(session.to_string(), resource.to_string())) {
            Some(stores) => {
                stores.clear();
                true
            }
            None => false,
        }
    }

    /// Clears and forgets every bundle of a session. Returns how many were dropped.
    pub fn reset_session(&mut self, session: &str) -> usize {
        let keys: Vec<_> = self
            .stores
            .keys()
            .filter(|(s, _)| s == session)
            .cloned()
            .collect();
        for key in &keys {
            if let Some(stores) = self.stores.remove(key) {
                stores.clear();
            }
        }
        debug!(session, dropped = keys.len(), "session stores reset");
        keys.len()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use hexmap_shared::ControlAssignment;

    use super::*;

    #[test]
    fn same_key_shares_stores() {
        let mut registry = StoreRegistry::new();
        let a = registry.stores_for("vault", "Maps/Sword Coast.md");
        let b = registry.stores_for("vault", "Maps/Sword Coast.md");
        assert!(a.control.ptr_eq(&b.control));
        let other = registry.stores_for("vault", "Maps/Underdark.md");
        assert!(!a.control.ptr_eq(&other.control));
        let other_session = registry.stores_for("second", "Maps/Sword Coast.md");
        assert!(!a.influence.ptr_eq(&other_session.influence));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn reset_clears_and_forgets() {
        let mut registry = StoreRegistry::new();
        let held = registry.stores_for("vault", "map");
        held.control
            .set_assignments(&[ControlAssignment::new((0, 0), "legion")]);
        assert!(registry.reset("vault", "map"));
        assert!(!registry.reset("vault", "map"));
        assert!(held.control.is_empty());
        assert!(!held.control.state().loaded);
        let fresh = registry.stores_for("vault", "map");
        assert!(!fresh.control.ptr_eq(&held.control));
    }

    #[test]
    fn reset_session_only_touches_that_session() {
        let mut registry = StoreRegistry::new();
        registry.stores_for("a", "one");
        registry.stores_for("a", "two");
        registry.stores_for("b", "one");
        assert_eq!(registry.reset_session("a"), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("b", "one").is_some());
    }
}
