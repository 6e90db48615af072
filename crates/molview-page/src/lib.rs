//! Page runtime for molecular viewers
//!
//! A page holds any number of mount elements, each of which gets its own
//! viewer session once it becomes visible. This crate supplies the parts
//! that are shared across a page:
//!
//! - [`PageHost`] - the document as seen by the loader
//! - [`ScriptCache`] / [`ScriptProvisioner`] - engine scripts loaded at most
//!   once per page, however many sessions ask
//! - [`VisibilityScheduler`] - intersection observation, page scans and the
//!   bounded hidden-mount poller
//! - [`PageLoader`] - turns [`PageEvent`]s into session work
//!
//! Everything runs on one thread. Drive a [`PageLoader`] from inside a
//! [`tokio::task::LocalSet`].

pub mod error;
pub mod host;
pub mod registry;
pub mod runtime;
pub mod scripts;
pub mod visibility;

pub use error::{ScriptError, ScriptResult};
pub use host::{ObserveOptions, PageHost};
pub use registry::{SessionRegistry, SharedSession};
pub use runtime::{PageEvent, PageLoader};
pub use scripts::{ScriptCache, ScriptLoadState, ScriptProvisioner};
pub use visibility::{MountInitializer, SchedulerConfig, VisibilityScheduler};
