//! The active analysis.
//!
//! Components register into whichever analysis is active on the current
//! thread. Entering an analysis returns a guard that remembers the analysis
//! it displaced and puts it back when dropped, so scopes nest to any depth.

use std::cell::RefCell;

use tracing::debug;
use yr_core::{YrError, YrResult};

use crate::analysis::Analysis;

thread_local! {
    static ACTIVE: RefCell<Option<Analysis>> = const { RefCell::new(None) };
}

/// The active analysis on this thread.
pub fn current() -> YrResult<Analysis> {
    ACTIVE
        .with(|slot| slot.borrow().clone())
        .ok_or(YrError::NoActiveContext)
}

pub fn is_active() -> bool {
    ACTIVE.with(|slot| slot.borrow().is_some())
}

/// Keeps an analysis active; restores the previous one on drop.
#[must_use = "the analysis is only active while the guard is alive"]
pub struct ContextGuard {
    previous: Option<Analysis>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        debug!(restored = previous.is_some(), "analysis scope exited");
        // The slot may already be gone during thread teardown.
        let _ = ACTIVE.try_with(|slot| *slot.borrow_mut() = previous);
    }
}

impl Analysis {
    /// Make this analysis active until the guard is dropped.
    pub fn enter(&self) -> ContextGuard {
        let previous = ACTIVE.with(|slot| slot.replace(Some(self.clone())));
        debug!(nested = previous.is_some(), "analysis scope entered");
        ContextGuard { previous }
    }

    /// Run `f` with this analysis active.
    pub fn scope<R>(&self, f: impl FnOnce(&Analysis) -> R) -> R {
        let _guard = self.enter();
        f(self)
    }
}
