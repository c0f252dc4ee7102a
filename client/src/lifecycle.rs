use std::cell::Cell;
use std::rc::Rc;

/// Cancellation flag scoped to one map view.
///
/// Asynchronous loaders clone the token and check [`Lifecycle::is_live`]
/// before applying their results.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    live: Rc<Cell<bool>>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            live: Rc::new(Cell::new(true)),
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.get()
    }

    pub fn cancel(&self) {
        self.live.set(false);
    }

    /// Runs `apply` only while the view is alive.
    pub fn run_if_live<T>(&self, apply: impl FnOnce() -> T) -> Option<T> {
        self.is_live().then(apply)
    }
}
