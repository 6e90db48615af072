//! Lenient number reading for attribute values
//!
//! Attribute numbers are read the way browsers read them: leading
//! whitespace is skipped and the longest numeric prefix counts, so
//! `2.5rpm` is 2.5 and `rpm` is no number at all.

use std::sync::LazyLock;

use regex::Regex;

static FLOAT_PREFIX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    match Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)") {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("number pattern failed to compile: {}", e);
            None
        }
    }
});

/// Numeric prefix of `raw`, if it starts with one
pub(crate) fn leading_float(raw: &str) -> Option<f64> {
    let raw = raw.trim_start();
    let matched = FLOAT_PREFIX.as_ref()?.find(raw)?.as_str();
    if matched.ends_with("Infinity") {
        return Some(if matched.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }
    matched.parse().ok()
}
