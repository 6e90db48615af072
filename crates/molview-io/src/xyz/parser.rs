//! XYZ file parser
//!
//! Only the first frame is read; trajectories are not needed to decide
//! whether a file renders.

use std::io::Read;

use crate::error::{IoError, IoResult};
use crate::model::{Atom, Model};
use crate::traits::{parse_xyz, LineSource, ModelReader};

/// XYZ file reader
pub struct XyzReader<R> {
    source: LineSource<R>,
}

impl<R: Read> XyzReader<R> {
    /// Create a new XYZ reader
    pub fn new(reader: R) -> Self {
        XyzReader {
            source: LineSource::new(reader),
        }
    }
}

impl<R: Read> ModelReader for XyzReader<R> {
    fn read(&mut self) -> IoResult<Model> {
        // Line 1: Number of atoms (leading blank lines tolerated)
        let count_line = loop {
            match self.source.read_line()? {
                None => return Err(IoError::EmptyFile),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => break line,
            }
        };

        let n_atoms: usize = count_line
            .trim()
            .parse()
            .map_err(|_| IoError::parse(self.source.line_number(), "Invalid atom count"))?;

        if n_atoms == 0 {
            return Err(IoError::parse(
                self.source.line_number(),
                "Zero atoms in XYZ file",
            ));
        }

        // Line 2: Comment/title line
        let title = self.source.expect_line("comment line after atom count")?;
        let mut model = Model::new(title.trim());

        for i in 0..n_atoms {
            let line = self.source.expect_line(&format!("atom {}", i + 1))?;
            model.add_atom(parse_atom_line(&line, self.source.line_number())?);
        }

        Ok(model)
    }
}

/// Parse an XYZ atom line: `element x y z [extra columns]`
fn parse_atom_line(line: &str, line_number: usize) -> IoResult<Atom> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    if parts.len() < 4 {
        return Err(IoError::parse(
            line_number,
            format!("Atom line too short: expected 'element x y z', got '{}'", line),
        ));
    }

    let symbol = parts[0];
    if !symbol.bytes().any(|b| b.is_ascii_alphabetic()) {
        return Err(IoError::parse(
            line_number,
            format!("Invalid element symbol '{}'", symbol),
        ));
    }

    let position = parse_xyz(&parts[1..4], line_number)?;
    Ok(Atom::new(symbol, symbol, position))
}
