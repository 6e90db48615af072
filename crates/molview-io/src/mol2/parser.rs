//! MOL2 file parser

use std::io::Read;

use crate::error::{IoError, IoResult};
use crate::model::{Atom, Model};
use crate::traits::{parse_xyz, LineSource, ModelReader};

const SECTION_PREFIX: &str = "@<TRIPOS>";

/// MOL2 file reader
pub struct Mol2Reader<R> {
    source: LineSource<R>,
}

impl<R: Read> Mol2Reader<R> {
    /// Create a new MOL2 reader
    pub fn new(reader: R) -> Self {
        Mol2Reader {
            source: LineSource::new(reader),
        }
    }

    /// Skip to a specific section, returning false at end of file
    fn skip_to_section(&mut self, section: &str) -> IoResult<bool> {
        while let Some(line) = self.source.read_line()? {
            let line = line.trim();
            if let Some(name) = line.strip_prefix(SECTION_PREFIX) {
                if name.eq_ignore_ascii_case(section) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

impl<R: Read> ModelReader for Mol2Reader<R> {
    fn read(&mut self) -> IoResult<Model> {
        if !self.skip_to_section("MOLECULE")? {
            return Err(IoError::EmptyFile);
        }

        let name = self.source.expect_line("molecule name")?;
        let counts = self.source.expect_line("counts line")?;
        let declared_atoms: Option<usize> = counts
            .split_whitespace()
            .next()
            .and_then(|n| n.parse().ok());

        if !self.skip_to_section("ATOM")? {
            return Err(IoError::parse(
                self.source.line_number(),
                "Missing @<TRIPOS>ATOM section",
            ));
        }

        let mut model = Model::new(name.trim());
        loop {
            let section_done = match self.source.peek_line()? {
                None => true,
                Some(line) => line.trim_start().starts_with(SECTION_PREFIX),
            };
            if section_done || declared_atoms.is_some_and(|n| model.atom_count() >= n) {
                break;
            }

            let line = self.source.expect_line("atom line")?;
            if line.trim().is_empty() {
                continue;
            }
            model.add_atom(parse_atom_line(&line, self.source.line_number())?);
        }

        if model.is_empty() {
            return Err(IoError::parse(self.source.line_number(), "No atoms in ATOM section"));
        }

        Ok(model)
    }
}

/// Parse an ATOM section line: `id name x y z type [subst_id subst_name charge]`
fn parse_atom_line(line: &str, line_number: usize) -> IoResult<Atom> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 6 {
        return Err(IoError::parse(
            line_number,
            format!("Atom line too short: '{}'", line.trim()),
        ));
    }

    let position = parse_xyz(&parts[2..5], line_number)?;
    // SYBYL type: element, optionally followed by ".hybridisation"
    let element = parts[5].split('.').next().unwrap_or_default();

    Ok(Atom::new(parts[1], element, position))
}
