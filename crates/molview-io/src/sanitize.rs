//! Text repair applied before parsing
//!
//! Structure files that went through a mail gateway or a CMS that is not
//! 8-bit clean often come back quoted-printable encoded: soft line breaks
//! (`=` at end of line) and `=20` space escapes shift the fixed columns
//! that PDB and SDF depend on. The sanitizer undoes those artifacts and
//! trims trailing whitespace. It is best-effort and never fails.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::detect::has_pdb_keyword;

static SOFT_BREAK: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"=\r?\n"));
static TRAILING_WS: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?mR)[ \t]+$"));
static GLUED_CHARGE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?mR)^((?:ATOM|HETATM).{66})([A-Z][a-z]?)[+\-]\d[ \t]*$")
});

/// Compile a built-in pattern, logging instead of panicking on failure
pub(crate) fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            log::warn!("failed to compile pattern {:?}: {}", pattern, e);
            None
        }
    }
}

/// Remove transport artifacts from structure text
///
/// - soft line breaks (`=\n`, `=\r\n`) are joined
/// - `=20` escapes become spaces
/// - trailing spaces and tabs are trimmed on every line
///
/// If any pattern is unavailable the original text is returned unchanged.
pub fn sanitize(text: &str) -> String {
    let (Some(soft_break), Some(trailing)) = (SOFT_BREAK.as_ref(), TRAILING_WS.as_ref()) else {
        log::warn!("sanitize unavailable, using text as-is");
        return text.to_string();
    };

    let joined = soft_break.replace_all(text, "");
    let spaced = joined.replace("=20", " ");
    trailing.replace_all(&spaced, "").into_owned()
}

/// Repair ATOM/HETATM lines whose element symbol has a charge glued to it
///
/// Some writers emit `...  N+1` at the element column instead of a padded
/// two-character element field; the charge is dropped and the symbol is
/// padded back to two columns. Other lines are left untouched.
pub fn normalize_minimal_pdb(text: &str) -> Cow<'_, str> {
    let Some(glued) = GLUED_CHARGE.as_ref() else {
        return Cow::Borrowed(text);
    };

    glued.replace_all(text, |caps: &Captures| {
        format!("{}{:<2}", &caps[1], &caps[2])
    })
}

/// Sanitize, then apply the PDB repair when the text looks like PDB
///
/// The repair only runs when PDB record keywords are present, so it can
/// never corrupt other formats.
pub fn prepare(text: &str) -> String {
    let clean = sanitize(text);
    if has_pdb_keyword(&clean) {
        if let Cow::Owned(repaired) = normalize_minimal_pdb(&clean) {
            log::debug!("repaired glued element charges in PDB text");
            return repaired;
        }
    }
    clean
}
