//! PDB format reader
//!
//! Reads ATOM/HETATM records of the first model. Everything else is
//! ignored, so text that is not PDB at all yields an empty model rather
//! than an error; callers decide what an empty model means.

mod parser;

pub use parser::PdbReader;

use crate::error::IoResult;
use crate::model::Model;
use crate::traits::ModelReader;

/// Read a PDB file from a string
pub fn read_pdb_str(content: &str) -> IoResult<Model> {
    PdbReader::new(content.as_bytes()).read()
}
