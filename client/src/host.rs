use std::collections::BTreeMap;

use tracing::debug;

/// Input channels a controller can listen on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerKind {
    Pointer,
    Wheel,
    Pan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u32);

/// The region a map surface is mounted into.
///
/// Hosts own the real input plumbing; controllers only register and release
/// their interest in a channel, and receive events through
/// [`crate::surface::MapSurface::dispatch`].
pub trait SurfaceHost {
    /// Current pixel size, or `None` while the host has not been laid out.
    fn size(&self) -> Option<(f64, f64)>;

    fn attach(&mut self, kind: ListenerKind) -> Result<ListenerId, String>;

    fn detach(&mut self, id: ListenerId) -> Result<(), String>;
}

/// In-memory host used by the renderer and by tests.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    size: Option<(f64, f64)>,
    next_id: u32,
    listeners: BTreeMap<ListenerId, ListenerKind>,
    fail_detach: bool,
}

impl HeadlessHost {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Some((width, height)),
            ..Self::default()
        }
    }

    /// A host that has not been laid out yet.
    pub fn unsized_host() -> Self {
        Self::default()
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.size = (width > 0.0 && height > 0.0).then_some((width, height));
    }

    /// Makes every subsequent detach fail, to exercise teardown paths.
    pub fn fail_detach(&mut self, fail: bool) {
        self.fail_detach = fail;
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listeners_of(&self, kind: ListenerKind) -> usize {
        self.listeners.values().filter(|k| **k == kind).count()
    }
}

impl SurfaceHost for HeadlessHost {
    fn size(&self) -> Option<(f64, f64)> {
        self.size
    }

    fn attach(&mut self, kind: ListenerKind) -> Result<ListenerId, String> {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, kind);
        debug!(?kind, id = id.0, "listener attached");
        Ok(id)
    }

    fn detach(&mut self, id: ListenerId) -> Result<(), String> {
        if self.fail_detach {
            return Err(format!("listener {} could not be detached", id.0));
        }
        match self.listeners.remove(&id) {
            Some(_) => Ok(()),
            None => Err(format!("listener {} is not attached", id.0)),
        }
    }
}

/// Releases every listener in `ids`, logging failures instead of returning them.
pub(crate) fn detach_all(host: &mut dyn SurfaceHost, ids: &mut Vec<ListenerId>, owner: &str) {
    for id in ids.drain(..) {
        if let Err(e) = host.detach(id) {
            tracing::warn!(error = %e, owner, "listener detach failed during teardown");
        }
    }
}
