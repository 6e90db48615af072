//! Model loader
//!
//! Tries candidate formats in order against a viewer until one yields
//! atoms. A parser rejecting text of the wrong format is expected, so
//! per-candidate failures are logged and skipped rather than propagated.

use molview_io::{DeclaredType, Format};

use crate::engine::MolViewer;

/// Ordered formats a loader is willing to try
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadAttempt {
    candidates: Vec<Format>,
}

impl LoadAttempt {
    /// Build the candidate list for a declared type and a sniffed guess
    ///
    /// An explicit type is tried alone. Otherwise PDB leads, then the
    /// guess, then every remaining format, without duplicates.
    pub fn new(declared: DeclaredType, guess: Format) -> Self {
        match declared {
            DeclaredType::Explicit(format) => LoadAttempt {
                candidates: vec![format],
            },
            DeclaredType::Auto => {
                let order = [Format::Pdb, guess, Format::Sdf, Format::Mol2, Format::Xyz, Format::Cube];
                Self::from_candidates(order)
            }
        }
    }

    /// Candidates in the given order, keeping the first of any duplicates
    pub fn from_candidates(formats: impl IntoIterator<Item = Format>) -> Self {
        let mut candidates = Vec::new();
        for format in formats {
            if !candidates.contains(&format) {
                candidates.push(format);
            }
        }
        LoadAttempt { candidates }
    }

    pub fn candidates(&self) -> &[Format] {
        &self.candidates
    }
}

/// Whether the viewer holds a model with atoms
///
/// Checks the active model, then the first one.
pub fn has_atoms(viewer: &dyn MolViewer) -> bool {
    viewer.active_atom_count().is_some_and(|n| n > 0)
        || viewer.first_model_atom_count().is_some_and(|n| n > 0)
}

/// Load `text` as the first candidate format that produces atoms
///
/// Each attempt starts from an empty viewer. A candidate that parses but
/// leaves no atoms counts as a failure.
pub fn try_load(viewer: &mut dyn MolViewer, text: &str, attempt: &LoadAttempt) -> Option<Format> {
    for &format in attempt.candidates() {
        viewer.remove_all_models();
        match viewer.add_model(text, format) {
            Ok(()) if has_atoms(viewer) => {
                log::debug!("loaded text as {}", format);
                return Some(format);
            }
            Ok(()) => log::debug!("{} parser found no atoms", format),
            Err(e) => log::warn!("add_model failed for {}: {}", format, e),
        }
    }
    None
}
