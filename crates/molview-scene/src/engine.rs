//! Rendering engine abstraction
//!
//! The engine is an external capability: create a viewer bound to a mount,
//! add a model of a given text format, apply a style, resize/zoom/render,
//! spin. These traits describe exactly that surface so sessions can drive
//! a browser engine, the [`HeadlessEngine`](crate::HeadlessEngine) or a
//! test double the same way.

use molview_io::{Format, LocalFuture};
use molview_settings::Style;

use crate::error::{EngineResult, InlineMessage};

/// Options passed when a viewer is created
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewerOptions {
    pub background_alpha: f32,
    pub disable_mouse: bool,
}

/// Argument shapes for the engine's native download
///
/// Engine releases disagree on where the format goes, so a caller may have
/// to try both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadCall {
    /// Format passed in the options object (`{ type: fmt }`)
    TypeOption(Format),
    /// Empty options, format as trailing argument
    TrailingFormat(Format),
}

impl DownloadCall {
    pub fn format(&self) -> Format {
        match self {
            DownloadCall::TypeOption(f) | DownloadCall::TrailingFormat(f) => *f,
        }
    }
}

/// One live engine viewer
pub trait MolViewer {
    /// Drop every loaded model
    fn remove_all_models(&mut self);

    /// Add `text` as a model of `format`
    ///
    /// A parser may reject the text with an error or accept it while
    /// producing no atoms; callers must check atom presence either way.
    fn add_model(&mut self, text: &str, format: Format) -> EngineResult<()>;

    /// Atom count of the active model, if any model is loaded
    fn active_atom_count(&self) -> Option<usize>;

    /// Atom count of the first model, if any model is loaded
    fn first_model_atom_count(&self) -> Option<usize>;

    fn set_background_color(&mut self, rgb: u32);

    fn remove_all_surfaces(&mut self);

    /// Clear every style back to nothing drawn
    fn reset_style(&mut self);

    /// Apply `style` to all atoms
    fn set_style(&mut self, style: &Style);

    fn resize(&mut self);

    fn zoom_to(&mut self);

    fn render(&mut self);

    /// Start continuous rotation
    fn spin(&mut self, axis: &str, speed: f64) -> EngineResult<()>;
}

/// Page element a session renders into
pub trait MountSurface {
    /// Stable identifier for logs and registries
    fn id(&self) -> &str;

    /// Whether the element is still part of the page
    fn is_attached(&self) -> bool;

    /// Replace the viewer area with a short message
    fn show_message(&self, message: InlineMessage);

    /// Remove messages left by an earlier attempt
    fn clear_messages(&self);

    /// Make the element a positioning context for the canvas
    fn ensure_positioned(&self);

    /// Let pointer events pass through the element
    fn disable_pointer_events(&self);
}

/// The rendering engine
pub trait Engine {
    /// Create a viewer bound to `mount`
    fn create_viewer(
        &self,
        mount: &dyn MountSurface,
        options: &ViewerOptions,
    ) -> EngineResult<Box<dyn MolViewer>>;

    /// Engine-native fetch-and-parse into `viewer`
    fn download<'a>(
        &'a self,
        url: &'a str,
        viewer: &'a mut dyn MolViewer,
        call: DownloadCall,
    ) -> LocalFuture<'a, EngineResult<()>>;
}

/// Guarantees the engine is present before a session uses it
pub trait Provisioner {
    fn ensure_engine(&self) -> LocalFuture<'_, EngineResult<()>>;
}

/// Provisioner for engines that are linked in rather than loaded
#[derive(Debug, Clone, Copy, Default)]
pub struct Ready;

impl Provisioner for Ready {
    fn ensure_engine(&self) -> LocalFuture<'_, EngineResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
