//! Immutable viewer requests
//!
//! Hosts describe a mount with string attributes. They are read exactly
//! once into a [`ViewerRequest`], so nothing downstream re-reads mutable
//! host state mid-pipeline.

use serde::{Deserialize, Serialize};

use molview_io::DeclaredType;

use crate::number::leading_float;
use crate::spin::SpinDirective;
use crate::style::Style;

/// Raw mount attributes as the host page supplies them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountAttributes {
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub declared_type: Option<String>,
    pub style: Option<String>,
    pub ui: Option<String>,
    pub nomouse: Option<String>,
    pub bgalpha: Option<String>,
    pub spin: Option<String>,
    pub download: Option<String>,
}

impl MountAttributes {
    /// Attributes for a mount that only names its source
    pub fn with_url(url: impl Into<String>) -> Self {
        MountAttributes {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Whether the mount asks for the engine's UI controls
    pub fn wants_ui(&self) -> bool {
        is_true(self.ui.as_deref())
    }
}

/// Everything a viewer session needs to know about its mount
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerRequest {
    /// Structure file location; `None` when the host gave none
    pub source_url: Option<String>,
    pub declared_type: DeclaredType,
    pub style: Style,
    pub spin: Option<SpinDirective>,
    pub mouse_disabled: bool,
    pub background_alpha: f32,
    pub ui_controls: bool,
    /// Whether the host shows a download link under the viewer; the
    /// loader only carries it for the host
    pub download_link: bool,
}

impl ViewerRequest {
    /// Read the attributes once, leniently
    pub fn from_attributes(attrs: &MountAttributes) -> Self {
        let source_url = attrs
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        let background_alpha = attrs
            .bgalpha
            .as_deref()
            .and_then(leading_float)
            .map(|a| a as f32)
            .filter(|a| a.is_finite())
            .unwrap_or(0.0);

        ViewerRequest {
            source_url,
            declared_type: DeclaredType::parse_lenient(attrs.declared_type.as_deref().unwrap_or("")),
            style: Style::from_attribute(attrs.style.as_deref().unwrap_or("")),
            spin: attrs.spin.as_deref().and_then(SpinDirective::parse),
            mouse_disabled: is_true(attrs.nomouse.as_deref()),
            background_alpha,
            ui_controls: is_true(attrs.ui.as_deref()),
            download_link: is_true(attrs.download.as_deref()),
        }
    }

    /// The same request pointed at another source
    pub fn with_source(&self, url: impl Into<String>) -> Self {
        let url = url.into();
        ViewerRequest {
            source_url: Some(url).filter(|u| !u.trim().is_empty()),
            ..self.clone()
        }
    }
}

impl Default for ViewerRequest {
    fn default() -> Self {
        Self::from_attributes(&MountAttributes::default())
    }
}

fn is_true(value: Option<&str>) -> bool {
    value == Some("true")
}
