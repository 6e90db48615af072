//! The page a loader runs in
//!
//! [`PageHost`] is the document as the loader sees it: mount elements found
//! by id, their attributes and visibility, an optional intersection
//! observer, and script elements.

use std::rc::Rc;

use molview_io::LocalFuture;
use molview_scene::MountSurface;
use molview_settings::MountAttributes;

use crate::error::ScriptResult;

/// Intersection observation parameters
#[derive(Debug, Clone, PartialEq)]
pub struct ObserveOptions {
    /// Margin around the viewport, so loading starts slightly early
    pub root_margin: String,
    /// Visible fraction that counts as intersecting
    pub threshold: f32,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        ObserveOptions {
            root_margin: "200px".to_string(),
            threshold: 0.01,
        }
    }
}

/// Document surface used by the page runtime
pub trait PageHost {
    /// Ids of every mount element currently in the document
    fn mount_ids(&self) -> Vec<String>;

    /// Raw attributes of a mount
    fn attributes(&self, id: &str) -> Option<MountAttributes>;

    /// Attached, with a non-empty box, and not hidden by style
    fn is_visible(&self, id: &str) -> bool;

    /// Render target for a mount
    fn surface(&self, id: &str) -> Option<Rc<dyn MountSurface>>;

    /// Whether intersection observation is available
    fn supports_intersection(&self) -> bool;

    /// Start observing a mount; intersections come back as page events
    fn observe(&self, id: &str, options: &ObserveOptions);

    fn unobserve(&self, id: &str);

    /// Whether the engine global is defined
    fn engine_present(&self) -> bool;

    /// Whether a script element with this `src` is already in the document
    fn has_script(&self, src: &str) -> bool;

    /// Wait for a script to load, inserting an element unless `existing`
    fn load_script<'a>(&'a self, src: &'a str, existing: bool) -> LocalFuture<'a, ScriptResult<()>>;

    /// Whether any mount asks for the engine's UI controls
    fn wants_ui(&self) -> bool {
        self.mount_ids()
            .iter()
            .filter_map(|id| self.attributes(id))
            .any(|attrs| attrs.wants_ui())
    }
}
