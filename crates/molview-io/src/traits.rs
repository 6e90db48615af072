//! Reader trait and line handling shared by the headless readers

use std::io::{BufRead, BufReader, Read};

use crate::error::{IoError, IoResult};
use crate::model::Model;

/// Trait for reading a structure from a source
pub trait ModelReader {
    /// Read the first structure from the source
    fn read(&mut self) -> IoResult<Model>;
}

/// Line-oriented source with line counting and one line of lookahead
pub(crate) struct LineSource<R> {
    reader: BufReader<R>,
    line_number: usize,
    peeked: Option<String>,
}

impl<R: Read> LineSource<R> {
    pub(crate) fn new(reader: R) -> Self {
        LineSource {
            reader: BufReader::new(reader),
            line_number: 0,
            peeked: None,
        }
    }

    /// Current 1-based line number
    pub(crate) fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read a single line without its line terminator
    pub(crate) fn read_line(&mut self) -> IoResult<Option<String>> {
        if let Some(line) = self.peeked.take() {
            return Ok(Some(line));
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => {
                self.line_number += 1;
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Ok(Some(line))
            }
            Err(e) => Err(IoError::Io(e)),
        }
    }

    /// Read a line that must exist
    pub(crate) fn expect_line(&mut self, what: &str) -> IoResult<String> {
        match self.read_line()? {
            Some(line) => Ok(line),
            None => Err(IoError::parse(
                self.line_number,
                format!("Expected {}, got end of file", what),
            )),
        }
    }

    /// Peek at the next line without consuming it
    pub(crate) fn peek_line(&mut self) -> IoResult<Option<&str>> {
        if self.peeked.is_none() {
            self.peeked = self.read_line()?;
        }
        Ok(self.peeked.as_deref())
    }
}

/// Parse three whitespace-separated coordinates starting at `parts[0]`
pub(crate) fn parse_xyz(parts: &[&str], line: usize) -> IoResult<[f32; 3]> {
    if parts.len() < 3 {
        return Err(IoError::parse(line, "Expected three coordinates"));
    }
    let mut out = [0.0f32; 3];
    for (slot, (axis, raw)) in out.iter_mut().zip(["x", "y", "z"].iter().zip(parts)) {
        *slot = raw
            .parse()
            .map_err(|_| IoError::parse(line, format!("Invalid {} coordinate '{}'", axis, raw)))?;
    }
    Ok(out)
}
