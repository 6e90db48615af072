//! TRIPOS MOL2 format reader

mod parser;

pub use parser::Mol2Reader;

use crate::error::IoResult;
use crate::model::Model;
use crate::traits::ModelReader;

/// Read the first molecule of a MOL2 file from a string
pub fn read_mol2_str(content: &str) -> IoResult<Model> {
    Mol2Reader::new(content.as_bytes()).read()
}
