//! XYZ coordinate format reader

mod parser;

pub use parser::XyzReader;

use crate::error::IoResult;
use crate::model::Model;
use crate::traits::ModelReader;

/// Read an XYZ file from a string
pub fn read_xyz_str(content: &str) -> IoResult<Model> {
    XyzReader::new(content.as_bytes()).read()
}
