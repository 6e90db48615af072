//! Molecular structure text handling
//!
//! This crate covers everything between "bytes arrived" and "atoms parsed":
//!
//! - [`detect`] - guess the format of a text blob from its content
//! - [`sanitize`] - repair transport damage and minimal PDB dialects
//! - [`format`] - the closed set of formats and the declared-type attribute
//! - [`fetch`] - retrieval of raw text over HTTP or from disk
//! - Headless readers for **PDB**, **SDF/MOL**, **MOL2**, **XYZ** and
//!   **Gaussian cube** producing a flat [`Model`]
//!
//! # Quick Start
//!
//! ```
//! use molview_io::{parse_str, prepare, sniff, Format};
//!
//! let text = "3\nwater\nO 0.0 0.0 0.0\nH 0.96 0.0 0.0\nH -0.24 0.93 0.0\n";
//! let clean = prepare(text);
//! assert_eq!(sniff(&clean), Format::Xyz);
//! let model = parse_str(&clean, Format::Xyz).unwrap();
//! assert_eq!(model.atom_count(), 3);
//! ```
//!
//! # Features
//!
//! - `fetch` - HTTP retrieval through `reqwest` (enabled by default)

pub mod compress;
pub mod cube;
pub mod detect;
pub mod error;
pub mod fetch;
pub mod format;
pub mod model;
pub mod mol2;
pub mod pdb;
pub mod sanitize;
pub mod sdf;
pub mod traits;
pub mod xyz;

// Re-exports
pub use detect::{has_pdb_keyword, sniff};
pub use error::{IoError, IoResult};
pub use fetch::{cache_busted, now_stamp, FileFetcher, LocalFuture, TextFetcher};
pub use format::{DeclaredType, Format};
pub use model::{Atom, Model};
pub use sanitize::{normalize_minimal_pdb, prepare, sanitize};
pub use traits::ModelReader;

#[cfg(feature = "fetch")]
pub use fetch::HttpFetcher;

/// Parse a model from a string with the given format
pub fn parse_str(content: &str, format: Format) -> IoResult<Model> {
    match format {
        Format::Pdb => pdb::read_pdb_str(content),
        Format::Sdf => sdf::read_sdf_str(content),
        Format::Mol2 => mol2::read_mol2_str(content),
        Format::Xyz => xyz::read_xyz_str(content),
        Format::Cube => cube::read_cube_str(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_str_dispatch() {
        let xyz = "1\nsingle\nC 0 0 0\n";
        assert_eq!(parse_str(xyz, Format::Xyz).unwrap().atom_count(), 1);
        assert!(parse_str(xyz, Format::Sdf).is_err());
    }

    #[test]
    fn test_pdb_parse_of_non_pdb_is_empty() {
        let model = parse_str("just some words\n", Format::Pdb).unwrap();
        assert!(model.is_empty());
    }
}
