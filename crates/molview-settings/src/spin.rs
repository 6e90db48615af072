//! Spin directives
//!
//! A mount can ask for continuous rotation with a short attribute value:
//! `true` spins around `y` at unit speed, `axis:speed` chooses both.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::number::leading_float;

/// Rotation request for a rendered viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinDirective {
    pub axis: String,
    pub speed: f64,
}

impl SpinDirective {
    pub const DEFAULT_AXIS: &'static str = "y";
    pub const DEFAULT_SPEED: f64 = 1.0;

    /// Parse an attribute value
    ///
    /// Empty means no spin. Otherwise the axis is lowercased and defaults
    /// to `y`. The speed is the numeric prefix of the second field
    /// (`2.5rpm` spins at 2.5); a missing, non-numeric or zero speed
    /// becomes 1.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw == "true" {
            return Some(Self::default());
        }

        let mut parts = raw.split(':');
        let axis = parts.next().unwrap_or_default().trim().to_lowercase();
        let speed = parts
            .next()
            .and_then(leading_float)
            .filter(|s| s.is_finite() && *s != 0.0)
            .unwrap_or(Self::DEFAULT_SPEED);

        Some(SpinDirective {
            axis: if axis.is_empty() {
                Self::DEFAULT_AXIS.to_string()
            } else {
                axis
            },
            speed,
        })
    }
}

impl Default for SpinDirective {
    fn default() -> Self {
        SpinDirective {
            axis: Self::DEFAULT_AXIS.to_string(),
            speed: Self::DEFAULT_SPEED,
        }
    }
}

impl fmt::Display for SpinDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.axis, self.speed)
    }
}
