//! Per-page record of mounts that have been initialized
//!
//! The registry replaces a marker stored on each mount element: a mount id
//! is marked once and never unmarked, so repeated visibility signals never
//! start a second pipeline.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::{AHashMap, AHashSet};

use molview_scene::ViewerSession;

/// A session shared between its init task and later page events
pub type SharedSession = Rc<tokio::sync::Mutex<ViewerSession>>;

#[derive(Default)]
struct Inner {
    initialized: AHashSet<String>,
    sessions: AHashMap<String, SharedSession>,
}

/// Cheap to clone; every clone sees the same record
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Rc<RefCell<Inner>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self, id: &str) -> bool {
        self.inner.borrow().initialized.contains(id)
    }

    /// Mark a mount initialized; `false` if it already was
    pub fn mark_initialized(&self, id: &str) -> bool {
        self.inner.borrow_mut().initialized.insert(id.to_string())
    }

    pub fn insert(&self, id: &str, session: SharedSession) {
        self.inner.borrow_mut().sessions.insert(id.to_string(), session);
    }

    pub fn get(&self, id: &str) -> Option<SharedSession> {
        self.inner.borrow().sessions.get(id).cloned()
    }

    /// Ids of every registered session, sorted
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.borrow().sessions.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
