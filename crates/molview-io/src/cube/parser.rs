//! Cube file parser

use std::io::Read;

use crate::error::{IoError, IoResult};
use crate::model::{element_symbol, Atom, Model};
use crate::traits::{parse_xyz, LineSource, ModelReader};

/// Conversion factor for coordinates given in atomic units
const BOHR_TO_ANGSTROM: f32 = 0.529_177_2;

/// Cube file reader
pub struct CubeReader<R> {
    source: LineSource<R>,
}

impl<R: Read> CubeReader<R> {
    /// Create a new cube reader
    pub fn new(reader: R) -> Self {
        CubeReader {
            source: LineSource::new(reader),
        }
    }

    fn numbers(&mut self, what: &str) -> IoResult<Vec<String>> {
        let line = self.source.expect_line(what)?;
        Ok(line.split_whitespace().map(str::to_string).collect())
    }
}

impl<R: Read> ModelReader for CubeReader<R> {
    fn read(&mut self) -> IoResult<Model> {
        // Lines 1-2: free-form comments
        let title = match self.source.read_line()? {
            Some(line) => line,
            None => return Err(IoError::EmptyFile),
        };
        self.source.expect_line("second comment line")?;

        // Line 3: atom count (negative when orbital data follows) and origin
        let header = self.numbers("atom count line")?;
        let line = self.source.line_number();
        let n_atoms: i64 = header
            .first()
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| IoError::parse(line, "Invalid atom count"))?;
        if n_atoms == 0 {
            return Err(IoError::parse(line, "Zero atoms in cube file"));
        }

        // Lines 4-6: voxel counts and axis vectors; a positive count means Bohr
        let mut in_bohr = true;
        for axis in 0..3 {
            let parts = self.numbers("voxel axis line")?;
            let line = self.source.line_number();
            let voxels: i64 = parts
                .first()
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| IoError::parse(line, "Invalid voxel count"))?;
            if axis == 0 {
                in_bohr = voxels > 0;
            }
        }
        let scale = if in_bohr { BOHR_TO_ANGSTROM } else { 1.0 };

        let mut model = Model::new(title.trim());
        for _ in 0..n_atoms.unsigned_abs() {
            let parts = self.numbers("atom line")?;
            let line = self.source.line_number();
            if parts.len() < 5 {
                return Err(IoError::parse(line, "Atom line too short"));
            }
            let atomic_number: u32 = parts[0]
                .parse()
                .map_err(|_| IoError::parse(line, format!("Invalid atomic number '{}'", parts[0])))?;
            let refs: Vec<&str> = parts[2..5].iter().map(String::as_str).collect();
            let [x, y, z] = parse_xyz(&refs, line)?;
            let symbol = element_symbol(atomic_number);
            model.add_atom(Atom::new(symbol, symbol, [x * scale, y * scale, z * scale]));
        }

        Ok(model)
    }
}
