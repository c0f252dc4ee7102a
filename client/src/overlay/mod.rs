//! Reactive per-cell overlay stores.
//!
//! Each store holds at most one entry per normalized cell, resolves a stable
//! color per owner and publishes a fresh state to its subscribers after every
//! mutation. Dispatch is synchronous and in registration order.

mod control;
mod influence;
mod markers;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use hexmap_shared::colors::palette_color;
use hexmap_shared::{OffsetCoord, RawCoord};
use tracing::debug;

use crate::scene::OverlayStyle;

pub use control::{ControlEntry, ControlLayer, ControlStore, LegendItem};
pub use influence::{InfluenceEntry, InfluenceLayer, InfluenceStore, influence_owner_key};
pub use markers::{MarkerEntry, MarkerLayer, MarkerStore};

/// Last-resort color when a palette is empty.
const NEUTRAL_COLOR: &str = "#888888";

/// Describes one overlay concern: what its assignments look like and how
/// they become entries and cell styling.
pub trait OverlayKind: 'static {
    type Assignment: Clone + fmt::Debug;
    type Entry: Clone + fmt::Debug + PartialEq;

    const LAYER: &'static str;

    fn coord(assignment: &Self::Assignment) -> Option<RawCoord>;

    /// Palette key for the assignment. `None` marks it malformed.
    fn owner_key(assignment: &Self::Assignment) -> Option<String>;

    fn color_override(assignment: &Self::Assignment) -> Option<&str>;

    fn make_entry(assignment: &Self::Assignment, coord: OffsetCoord, color: String)
    -> Self::Entry;

    fn to_assignment(entry: &Self::Entry) -> Self::Assignment;

    fn style(entry: &Self::Entry) -> OverlayStyle;

    fn default_palette() -> &'static [&'static str];
}

/// Owner key to color, stable for the lifetime of a store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    colors: BTreeMap<String, String>,
}

impl Palette {
    pub fn get(&self, owner: &str) -> Option<&str> {
        self.colors.get(owner).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Override, else the pinned color, else a hashed pick from `fallback`.
    /// The result is pinned unless the owner already had a color.
    fn resolve(&mut self, owner: &str, color_override: Option<&str>, fallback: &[&str]) -> String {
        let color = match color_override.map(str::trim).filter(|c| !c.is_empty()) {
            Some(color) => color.to_string(),
            None => match self.colors.get(owner) {
                Some(pinned) => return pinned.clone(),
                None => palette_color(owner, fallback)
                    .unwrap_or(NEUTRAL_COLOR)
                    .to_string(),
            },
        };
        self.colors
            .entry(owner.to_string())
            .or_insert_with(|| color.clone());
        color
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayState<E> {
    pub loaded: bool,
    pub entries: BTreeMap<OffsetCoord, E>,
    pub palette: Palette,
    pub version: u64,
}

impl<E> Default for OverlayState<E> {
    fn default() -> Self {
        Self {
            loaded: false,
            entries: BTreeMap::new(),
            palette: Palette::default(),
            version: 0,
        }
    }
}

type Listener<E> = Rc<dyn Fn(&OverlayState<E>)>;

struct StoreInner<K: OverlayKind> {
    state: RefCell<Rc<OverlayState<K::Entry>>>,
    listeners: RefCell<Vec<(u64, Listener<K::Entry>)>>,
    next_listener: Cell<u64>,
}

/// Shared handle to one overlay store. Clones refer to the same store.
pub struct OverlayStore<K: OverlayKind> {
    inner: Rc<StoreInner<K>>,
}

impl<K: OverlayKind> Clone for OverlayStore<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K: OverlayKind> fmt::Debug for OverlayStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("OverlayStore")
            .field("layer", &K::LAYER)
            .field("loaded", &state.loaded)
            .field("entries", &state.entries.len())
            .field("version", &state.version)
            .finish()
    }
}

impl<K: OverlayKind> Default for OverlayStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: OverlayKind> OverlayStore<K> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(Rc::new(OverlayState::default())),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
            }),
        }
    }

    pub fn state(&self) -> Rc<OverlayState<K::Entry>> {
        Rc::clone(&self.inner.state.borrow())
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Replaces every entry. Duplicate cells keep their first assignment and
    /// malformed assignments are dropped. Publishes once.
    pub fn set_assignments(&self, assignments: &[K::Assignment]) {
        let previous = self.state();
        let mut palette = previous.palette.clone();
        let mut entries = BTreeMap::new();
        let mut dropped = 0usize;

        for assignment in assignments {
            let Some(coord) = K::coord(assignment).and_then(|raw| raw.normalize()) else {
                dropped += 1;
                continue;
            };
            let Some(owner) = K::owner_key(assignment) else {
                dropped += 1;
                continue;
            };
            if entries.contains_key(&coord) {
                dropped += 1;
                continue;
            }
            let color = palette.resolve(&owner, K::color_override(assignment), K::default_palette());
            entries.insert(coord, K::make_entry(assignment, coord, color));
        }

        if dropped > 0 {
            debug!(layer = K::LAYER, dropped, kept = entries.len(), "dropped overlay assignments");
        }

        self.publish(OverlayState {
            loaded: true,
            entries,
            palette,
            version: previous.version + 1,
        });
    }

    /// Inserts or replaces the entry at the assignment's cell.
    pub fn upsert(&self, assignment: K::Assignment) {
        let target = K::coord(&assignment).and_then(|raw| raw.normalize());
        let state = self.state();
        let mut batch = Vec::with_capacity(state.entries.len() + 1);
        batch.push(assignment);
        batch.extend(
            state
                .entries
                .iter()
                .filter(|(coord, _)| Some(**coord) != target)
                .map(|(_, entry)| K::to_assignment(entry)),
        );
        self.set_assignments(&batch);
    }

    /// Drops the entry at `coord`. Returns whether one existed.
    pub fn remove(&self, coord: OffsetCoord) -> bool {
        let state = self.state();
        if !state.entries.contains_key(&coord) {
            return false;
        }
        let batch: Vec<_> = state
            .entries
            .iter()
            .filter(|(c, _)| **c != coord)
            .map(|(_, entry)| K::to_assignment(entry))
            .collect();
        self.set_assignments(&batch);
        true
    }

    /// Back to the unloaded state; entries and palette are forgotten.
    pub fn clear(&self) {
        let version = self.state().version + 1;
        self.publish(OverlayState {
            version,
            ..OverlayState::default()
        });
    }

    pub fn get(&self, coord: impl Into<RawCoord>) -> Option<K::Entry> {
        let coord = coord.into().normalize()?;
        self.inner.state.borrow().entries.get(&coord).cloned()
    }

    pub fn contains(&self, coord: OffsetCoord) -> bool {
        self.inner.state.borrow().entries.contains_key(&coord)
    }

    pub fn list(&self) -> Vec<K::Entry> {
        self.inner.state.borrow().entries.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.borrow().entries.is_empty()
    }

    /// Resolves and pins a color for `owner` without publishing.
    pub(crate) fn pin_color(&self, owner: &str) -> String {
        let mut state = self.inner.state.borrow_mut();
        Rc::make_mut(&mut *state)
            .palette
            .resolve(owner, None, K::default_palette())
    }

    /// Registers a listener for every future publication.
    pub fn subscribe(&self, listener: impl Fn(&OverlayState<K::Entry>) + 'static) -> Subscription {
        let id = self.inner.next_listener.get();
        self.inner.next_listener.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let weak: Weak<StoreInner<K>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().retain(|(other, _)| *other != id);
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn publish(&self, next: OverlayState<K::Entry>) {
        let next = Rc::new(next);
        *self.inner.state.borrow_mut() = Rc::clone(&next);
        // Listeners may subscribe, unsubscribe or read the store re-entrantly.
        let listeners: Vec<Listener<K::Entry>> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&next);
        }
    }
}

/// Handle returned by [`OverlayStore::subscribe`]. Unsubscribes on drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stops delivery. Calling it again does nothing.
    pub fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
