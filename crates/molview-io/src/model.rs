//! Minimal in-memory structure produced by the headless readers

/// A single atom: name, element symbol and Cartesian position
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Atom name as written in the file (may equal the element)
    pub name: String,
    /// Element symbol, normalised to `Xx` capitalisation
    pub element: String,
    /// Position in Angstrom
    pub position: [f32; 3],
}

impl Atom {
    /// Create a new atom
    pub fn new(name: impl Into<String>, element: &str, position: [f32; 3]) -> Self {
        Atom {
            name: name.into(),
            element: normalize_element(element),
            position,
        }
    }
}

/// A parsed structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    /// Title or molecule name, empty when the file has none
    pub title: String,
    /// Atoms in file order
    pub atoms: Vec<Atom>,
}

impl Model {
    /// Create an empty model with a title
    pub fn new(title: impl Into<String>) -> Self {
        Model {
            title: title.into(),
            atoms: Vec::new(),
        }
    }

    /// Add an atom
    pub fn add_atom(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    /// Number of atoms
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Whether the model has no atoms
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

/// Normalise an element symbol to `Xx` form (`FE` -> `Fe`, `c` -> `C`)
pub fn normalize_element(symbol: &str) -> String {
    let mut chars = symbol.trim().chars().filter(|c| c.is_ascii_alphabetic());
    let mut out = String::with_capacity(2);
    if let Some(first) = chars.next() {
        out.push(first.to_ascii_uppercase());
        if let Some(second) = chars.next() {
            out.push(second.to_ascii_lowercase());
        }
    }
    out
}

/// Element symbol for an atomic number, for formats that store numbers
pub fn element_symbol(atomic_number: u32) -> &'static str {
    const SYMBOLS: [&str; 55] = [
        "X", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P",
        "S", "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
        "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh",
        "Pd", "Ag", "Cd", "In", "Sn", "Sb", "Te", "I", "Xe",
    ];
    SYMBOLS.get(atomic_number as usize).copied().unwrap_or("X")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_element() {
        assert_eq!(normalize_element("FE"), "Fe");
        assert_eq!(normalize_element(" c "), "C");
        assert_eq!(normalize_element("Cl1"), "Cl");
        assert_eq!(normalize_element(""), "");
    }

    #[test]
    fn test_element_symbol() {
        assert_eq!(element_symbol(1), "H");
        assert_eq!(element_symbol(8), "O");
        assert_eq!(element_symbol(26), "Fe");
        assert_eq!(element_symbol(54), "Xe");
        assert_eq!(element_symbol(200), "X");
    }

    #[test]
    fn test_model_counts() {
        let mut model = Model::new("water");
        assert!(model.is_empty());
        model.add_atom(Atom::new("O1", "O", [0.0, 0.0, 0.0]));
        assert_eq!(model.atom_count(), 1);
        assert_eq!(model.atoms[0].element, "O");
    }
}
