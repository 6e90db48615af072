//! Structure formats understood by the loader
//!
//! A [`Format`] is always concrete. The host may leave the type open
//! ([`DeclaredType::Auto`]), in which case the sniffer picks one.

use std::fmt;
use std::str::FromStr;

use crate::error::IoError;

/// Supported structure formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Protein Data Bank format
    Pdb,
    /// MDL SDF/MOL format
    Sdf,
    /// TRIPOS MOL2 format
    Mol2,
    /// XYZ coordinate format
    Xyz,
    /// Gaussian cube volumetric format
    Cube,
}

impl Format {
    /// Every known format, in the order the loader falls back through them
    pub const ALL: [Format; 5] = [
        Format::Pdb,
        Format::Sdf,
        Format::Mol2,
        Format::Xyz,
        Format::Cube,
    ];

    /// Get the format token used by the rendering engine and in file names
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Pdb => "pdb",
            Format::Sdf => "sdf",
            Format::Mol2 => "mol2",
            Format::Xyz => "xyz",
            Format::Cube => "cube",
        }
    }

    /// Get a human-readable name for the format
    pub fn name(&self) -> &'static str {
        match self {
            Format::Pdb => "PDB",
            Format::Sdf => "SDF/MOL",
            Format::Mol2 => "MOL2",
            Format::Xyz => "XYZ",
            Format::Cube => "Gaussian cube",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdb" => Ok(Format::Pdb),
            "sdf" => Ok(Format::Sdf),
            "mol2" => Ok(Format::Mol2),
            "xyz" => Ok(Format::Xyz),
            "cube" => Ok(Format::Cube),
            other => Err(IoError::UnknownFormat(other.to_string())),
        }
    }
}

/// The type a host declared for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeclaredType {
    /// Let the sniffer decide
    #[default]
    Auto,
    /// Use exactly this format and nothing else
    Explicit(Format),
}

impl DeclaredType {
    /// Parse a host-supplied type attribute
    ///
    /// Empty, `auto` and unknown values all mean [`DeclaredType::Auto`].
    pub fn parse_lenient(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("auto") {
            return DeclaredType::Auto;
        }
        match raw.parse::<Format>() {
            Ok(format) => DeclaredType::Explicit(format),
            Err(_) => {
                log::debug!("unknown declared type '{}', treating as auto", raw);
                DeclaredType::Auto
            }
        }
    }

    /// The explicit format, if one was declared
    pub fn explicit(&self) -> Option<Format> {
        match self {
            DeclaredType::Auto => None,
            DeclaredType::Explicit(format) => Some(*format),
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Auto => f.write_str("auto"),
            DeclaredType::Explicit(format) => format.fmt(f),
        }
    }
}
