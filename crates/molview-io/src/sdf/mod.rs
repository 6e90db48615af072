//! SDF/MOL format reader (V2000 connection tables)

mod parser;

pub use parser::SdfReader;

use crate::error::IoResult;
use crate::model::Model;
use crate::traits::ModelReader;

/// Read the first record of an SDF/MOL file from a string
pub fn read_sdf_str(content: &str) -> IoResult<Model> {
    SdfReader::new(content.as_bytes()).read()
}
