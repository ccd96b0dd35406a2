use std::cell::Cell;
use std::rc::Rc;

/// Marks selection changes as made by the engine itself.
///
/// A same-thread counter, not a lock. The session holds one and the host's
/// selection listener holds a clone; while any [`GuardScope`] is alive the
/// listener must drop the change instead of reporting it back.
#[derive(Debug, Clone, Default)]
pub struct ReentrancyGuard {
    depth: Rc<Cell<u32>>,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self) -> bool {
        self.depth.get() > 0
    }

    /// Holds the guard until the returned scope is dropped, unwinding included.
    pub fn acquire(&self) -> GuardScope {
        self.depth.set(self.depth.get() + 1);
        GuardScope {
            depth: Rc::clone(&self.depth),
        }
    }

    /// Runs `f` with the guard held.
    pub fn hold<R>(&self, f: impl FnOnce() -> R) -> R {
        let _scope = self.acquire();
        f()
    }
}

#[must_use = "the guard is released as soon as the scope is dropped"]
#[derive(Debug)]
pub struct GuardScope {
    depth: Rc<Cell<u32>>,
}

impl Drop for GuardScope {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
