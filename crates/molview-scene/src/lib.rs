//! Viewer sessions over an abstract rendering engine
//!
//! - [`engine`] - the engine, viewer, mount and provisioner traits
//! - [`loader`] - candidate-format trial loading with atom checks
//! - [`session`] - the per-mount state machine with its fallback download
//! - [`headless`] - a reference engine built on the molview-io readers
//!
//! # Example
//!
//! ```no_run
//! use std::rc::Rc;
//! use molview_io::FileFetcher;
//! use molview_scene::{HeadlessEngine, Ready, SessionContext, ViewerSession};
//! # use molview_scene::{InlineMessage, MountSurface};
//! # struct Div;
//! # impl MountSurface for Div {
//! #     fn id(&self) -> &str { "viewer-1" }
//! #     fn is_attached(&self) -> bool { true }
//! #     fn show_message(&self, _: InlineMessage) {}
//! #     fn clear_messages(&self) {}
//! #     fn ensure_positioned(&self) {}
//! #     fn disable_pointer_events(&self) {}
//! # }
//! use molview_settings::{MountAttributes, ViewerRequest};
//!
//! # async fn run() {
//! let fetcher = Rc::new(FileFetcher);
//! let context = SessionContext::new(
//!     Rc::new(HeadlessEngine::new(fetcher.clone())),
//!     Rc::new(Ready),
//!     fetcher,
//! );
//! let request = ViewerRequest::from_attributes(&MountAttributes::with_url("1abc.pdb"));
//! let mut session = ViewerSession::new(request, Rc::new(Div), context);
//! session.initialize().await.ok();
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod headless;
pub mod loader;
pub mod session;

pub use engine::{DownloadCall, Engine, MolViewer, MountSurface, Provisioner, Ready, ViewerOptions};
pub use error::{EngineError, EngineResult, InlineMessage, SessionError, SessionResult};
pub use headless::{HeadlessEngine, HeadlessViewer, ViewerProbe};
pub use loader::{has_atoms, try_load, LoadAttempt};
pub use session::{
    InitOutcome, LoadPath, LoadReport, SessionContext, SessionState, ViewerSession,
    BACKGROUND_COLOR, SECOND_PASS_DELAY,
};
