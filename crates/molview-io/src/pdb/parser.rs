//! PDB file parser

use std::io::Read;

use crate::error::{IoError, IoResult};
use crate::model::{Atom, Model};
use crate::traits::{LineSource, ModelReader};

/// PDB file reader
pub struct PdbReader<R> {
    source: LineSource<R>,
}

impl<R: Read> PdbReader<R> {
    /// Create a new PDB reader
    pub fn new(reader: R) -> Self {
        PdbReader {
            source: LineSource::new(reader),
        }
    }
}

impl<R: Read> ModelReader for PdbReader<R> {
    fn read(&mut self) -> IoResult<Model> {
        let mut model = Model::default();
        let mut title = String::new();
        let mut header = String::new();
        let mut skipped = 0usize;

        while let Some(line) = self.source.read_line()? {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }

            // Get record type (first 6 characters)
            let record_type = line.get(0..6).unwrap_or(line).trim_end();

            match record_type {
                "ATOM" | "HETATM" => match parse_atom_record(line, self.source.line_number()) {
                    Ok(atom) => model.add_atom(atom),
                    Err(e) => {
                        skipped += 1;
                        log::debug!("skipping malformed atom record: {}", e);
                    }
                },
                "TITLE" => {
                    if let Some(text) = line.get(10..) {
                        if !title.is_empty() {
                            title.push(' ');
                        }
                        title.push_str(text.trim());
                    }
                }
                "HEADER" => {
                    if let Some(text) = line.get(10..50.min(line.len())) {
                        header = text.trim().to_string();
                    }
                }
                // Only the first model is read
                "ENDMDL" | "END" => break,
                _ => {}
            }
        }

        if skipped > 0 {
            log::debug!("{} malformed ATOM/HETATM records skipped", skipped);
        }

        model.title = if title.is_empty() { header } else { title };
        Ok(model)
    }
}

/// Parse an ATOM/HETATM record using the fixed PDB columns
fn parse_atom_record(line: &str, line_number: usize) -> IoResult<Atom> {
    let column = |start: usize, end: usize| line.get(start..end.min(line.len())).map(str::trim);

    let name = column(12, 16).unwrap_or_default();
    let mut position = [0.0f32; 3];
    for (slot, (axis, start)) in position.iter_mut().zip([("x", 30), ("y", 38), ("z", 46)]) {
        let raw = column(start, start + 8)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| IoError::parse(line_number, format!("Missing {} coordinate", axis)))?;
        *slot = raw.parse().map_err(|_| {
            IoError::parse(line_number, format!("Invalid {} coordinate '{}'", axis, raw))
        })?;
    }

    let element = match column(76, 78).filter(|s| !s.is_empty()) {
        Some(symbol) => symbol.to_string(),
        None => element_from_name(name),
    };

    Ok(Atom::new(name, &element, position))
}

/// Guess the element from an atom name (`CA` -> `C`, `1HB` -> `H`)
fn element_from_name(name: &str) -> String {
    name.chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRAMBIN: &str = "\
HEADER    PLANT PROTEIN                           30-APR-81   1CRN
TITLE     WATER STRUCTURE OF A HYDROPHOBIC PROTEIN AT ATOMIC RESOLUTION
ATOM      1  N   THR A   1      17.047  14.099   3.625  1.00 13.79           N
ATOM      2  CA  THR A   1      16.967  12.784   4.338  1.00 10.80           C
HETATM    3 FE   HEM A 200       1.000   2.000   3.000  1.00 10.00          FE
END
";

    #[test]
    fn test_read_atoms() {
        let model = PdbReader::new(CRAMBIN.as_bytes()).read().unwrap();
        assert_eq!(model.atom_count(), 3);
        assert_eq!(model.atoms[0].name, "N");
        assert_eq!(model.atoms[1].element, "C");
        assert_eq!(model.atoms[2].element, "Fe");
        assert!((model.atoms[0].position[0] - 17.047).abs() < 1e-4);
        assert!(model.title.starts_with("WATER STRUCTURE"));
    }

    #[test]
    fn test_element_from_name_when_column_missing() {
        let line = "ATOM      2  CA  THR A   1      16.967  12.784   4.338";
        let atom = parse_atom_record(line, 1).unwrap();
        assert_eq!(atom.element, "C");
    }

    #[test]
    fn test_first_model_only() {
        let text = "\
MODEL        1
ATOM      1  N   THR A   1      17.047  14.099   3.625  1.00 13.79           N
ENDMDL
MODEL        2
ATOM      1  N   THR A   1      17.000  14.000   3.600  1.00 13.79           N
ENDMDL
";
        let model = PdbReader::new(text.as_bytes()).read().unwrap();
        assert_eq!(model.atom_count(), 1);
    }

    #[test]
    fn test_garbage_gives_empty_model() {
        let model = PdbReader::new("3\nwater\nO 0 0 0\n".as_bytes()).read().unwrap();
        assert!(model.is_empty());
    }

    #[test]
    fn test_malformed_coordinates_skipped() {
        let text = "ATOM      1  N   THR A   1      abc     14.099   3.625\n";
        let model = PdbReader::new(text.as_bytes()).read().unwrap();
        assert!(model.is_empty());
    }
}
