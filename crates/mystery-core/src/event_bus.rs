//! Event bus between a conversation session and its host.
//!
//! Single-threaded (WASM constraint), interior mutability via RefCell.
//! Events are buffered and drained by the host when it next renders.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use mystery_types::event::SessionEvent;

/// Shared event bus, clone-cheap via Rc.
#[derive(Clone)]
pub struct EventBus {
    inner: Rc<RefCell<VecDeque<SessionEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    pub fn emit(&self, event: SessionEvent) {
        self.inner.borrow_mut().push_back(event);
    }

    /// Take every pending event, oldest first.
    pub fn drain(&self) -> Vec<SessionEvent> {
        self.inner.borrow_mut().drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.borrow().is_empty()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
