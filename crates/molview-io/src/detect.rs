//! Format sniffing
//!
//! Classifies raw structure text by looking for format signatures in the
//! head of the file. Unique markers (MOL2, SDF, cube) are checked before
//! the PDB record keywords, and the weak XYZ heuristic comes last so a
//! leading integer in some other file cannot win over a real keyword.

use std::sync::LazyLock;

use regex::Regex;

use crate::format::Format;
use crate::sanitize::compile;

/// Number of characters inspected by [`sniff`]
pub const SNIFF_WINDOW: usize = 16_000;

static SDF_TERMINATOR: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?m)^\s*\$\$\$\$"));
static SDF_END_BLOCK: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"M[ \t]+END"));
static PDB_KEYWORD: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?i)\b(HEADER|TITLE|COMPND|ATOM|HETATM|REMARK|CONECT)\b"));

/// Best-guess format of `text`
///
/// Never fails: text without any recognisable signature is reported as PDB
/// so the loader always has a candidate to try.
pub fn sniff(text: &str) -> Format {
    let head = head(text);
    let upper = head.to_ascii_uppercase();

    if upper.contains("@<TRIPOS>") {
        return Format::Mol2;
    }

    if matches(&SDF_TERMINATOR, head) || matches(&SDF_END_BLOCK, head) {
        return Format::Sdf;
    }

    if upper.contains("CUBE") && upper.contains("ORIGIN") {
        return Format::Cube;
    }

    if has_pdb_keyword(head) {
        return Format::Pdb;
    }

    if is_xyz_format(head) {
        return Format::Xyz;
    }

    Format::Pdb
}

/// Whether the text carries any PDB record keyword
pub fn has_pdb_keyword(text: &str) -> bool {
    matches(&PDB_KEYWORD, text)
}

/// The first [`SNIFF_WINDOW`] characters of `text`
fn head(text: &str) -> &str {
    match text.char_indices().nth(SNIFF_WINDOW) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

fn matches(pattern: &LazyLock<Option<Regex>>, text: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(text))
}

/// Check if content looks like XYZ format
///
/// The first non-blank line must be a bare atom count and one of the two
/// lines after it (comment, first atom) must read `element x y z`.
fn is_xyz_format(text: &str) -> bool {
    let mut lines = text.lines().skip_while(|line| line.trim().is_empty());

    let count_line = match lines.next() {
        Some(line) => line.trim(),
        None => return false,
    };
    if count_line.is_empty() || !count_line.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    lines.take(2).any(is_xyz_atom_line)
}

fn is_xyz_atom_line(line: &str) -> bool {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return false;
    }

    // First part should be an element symbol (1-2 letters)
    let element = parts[0];
    if element.is_empty() || element.len() > 2 || !element.bytes().all(|b| b.is_ascii_alphabetic()) {
        return false;
    }

    parts[1..4].iter().all(|p| p.parse::<f64>().is_ok())
}
