//! Viewer settings
//!
//! Everything a viewer session is told before it starts:
//!
//! - [`ViewerRequest`] - the immutable per-mount request built from host
//!   attributes ([`MountAttributes`])
//! - [`Style`] - structured render options, with [`derive_style`] for the
//!   simple dropdown settings and a hardcoded fallback for unusable input
//! - [`SpinDirective`] - optional continuous rotation
//! - [`LoaderConfig`] - page-wide script URLs and the debug switch
//!
//! # Example
//!
//! ```rust
//! use molview_settings::{MountAttributes, ViewerRequest, Style};
//!
//! let attrs = MountAttributes {
//!     style: Some("not json".into()),
//!     spin: Some("true".into()),
//!     ..MountAttributes::with_url("https://example.org/1abc.pdb")
//! };
//! let request = ViewerRequest::from_attributes(&attrs);
//! assert_eq!(request.style, Style::fallback());
//! assert_eq!(request.spin.unwrap().axis, "y");
//! ```

mod config;
mod error;
mod number;
mod request;
mod spin;
pub mod style;

pub use config::{LoaderConfig, DEFAULT_CORE_SCRIPT_URL, DEFAULT_UI_SCRIPT_URL};
pub use error::{SettingError, SettingResult};
pub use request::{MountAttributes, ViewerRequest};
pub use spin::SpinDirective;
pub use style::{
    derive_style, resolve_style, ColorScheme, Representation, SimpleStyle, Style, StyleMode,
};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::{
        derive_style, LoaderConfig, MountAttributes, SpinDirective, Style, ViewerRequest,
    };
}
