//! SDF/MOL file parser
//!
//! Reads the header, counts line and atom block of the first record. Bonds,
//! properties and data items are not needed by the loader and are skipped.

use std::io::Read;

use crate::error::{IoError, IoResult};
use crate::model::{Atom, Model};
use crate::traits::{parse_xyz, LineSource, ModelReader};

/// SDF/MOL file reader
pub struct SdfReader<R> {
    source: LineSource<R>,
}

impl<R: Read> SdfReader<R> {
    /// Create a new SDF reader
    pub fn new(reader: R) -> Self {
        SdfReader {
            source: LineSource::new(reader),
        }
    }
}

impl<R: Read> ModelReader for SdfReader<R> {
    fn read(&mut self) -> IoResult<Model> {
        // Line 1: Molecule name; leading $$$$ separators are not names
        let name = loop {
            match self.source.read_line()? {
                None => return Err(IoError::EmptyFile),
                Some(line) if line.trim() == "$$$$" => continue,
                Some(line) => break line.trim().to_string(),
            }
        };

        // Line 2: Program/timestamp line, Line 3: Comment line
        self.source.expect_line("program line")?;
        self.source.expect_line("comment line")?;

        // Line 4: Counts line
        let counts_line = self.source.expect_line("counts line")?;
        let (n_atoms, _n_bonds) = parse_counts_line(&counts_line, self.source.line_number())?;

        let mut model = Model::new(name);
        for i in 0..n_atoms {
            let line = self.source.expect_line(&format!("atom {}", i + 1))?;
            model.add_atom(parse_atom_line(&line, self.source.line_number())?);
        }

        Ok(model)
    }
}

/// Parse the counts line, returning (atoms, bonds)
fn parse_counts_line(line: &str, line_number: usize) -> IoResult<(usize, usize)> {
    if line.contains("V3000") {
        return Err(IoError::unsupported("V3000 format not yet supported"));
    }

    // Fixed columns first (aaabbb), whitespace split for sloppy writers
    let fixed = |start: usize| {
        line.get(start..start + 3)
            .and_then(|s| s.trim().parse::<usize>().ok())
    };
    if let (Some(atoms), Some(bonds)) = (fixed(0), fixed(3)) {
        return Ok((atoms, bonds));
    }

    let mut parts = line.split_whitespace().map(str::parse::<usize>);
    match (parts.next(), parts.next()) {
        (Some(Ok(atoms)), Some(Ok(bonds))) => Ok((atoms, bonds)),
        _ => Err(IoError::parse(
            line_number,
            format!("Invalid counts line '{}'", line.trim()),
        )),
    }
}

/// Parse an atom block line: `x y z symbol ...`
fn parse_atom_line(line: &str, line_number: usize) -> IoResult<Atom> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(IoError::parse(
            line_number,
            format!("Atom line too short: '{}'", line),
        ));
    }

    let position = parse_xyz(&parts[0..3], line_number)?;
    let symbol = parts[3];
    if !symbol.bytes().all(|b| b.is_ascii_alphabetic() || b == b'*') {
        return Err(IoError::parse(
            line_number,
            format!("Invalid atom symbol '{}'", symbol),
        ));
    }

    Ok(Atom::new(symbol, symbol, position))
}
