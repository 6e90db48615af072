//! Gaussian cube format reader
//!
//! Only the atom block is read; the volumetric grid is left to the engine.

mod parser;

pub use parser::CubeReader;

use crate::error::IoResult;
use crate::model::Model;
use crate::traits::ModelReader;

/// Read the atoms of a cube file from a string
pub fn read_cube_str(content: &str) -> IoResult<Model> {
    CubeReader::new(content.as_bytes()).read()
}
