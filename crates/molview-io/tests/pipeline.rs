//! Raw text through repair, sniffing and parsing

use molview_io::{parse_str, prepare, sniff, Format};

fn pdb_atom(serial: usize, name: &str, element: &str, xyz: [f32; 3]) -> String {
    format!(
        "ATOM  {:>5} {:<4} ALA A{:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
        serial, name, 1, xyz[0], xyz[1], xyz[2], 1.0, 0.0, element
    )
}

const ETHANOL_SDF: &str = "\
ethanol
  molview

  3  2  0  0  0  0  0  0  0  0999 V2000
    0.0000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.5000    0.0000    0.0000 C   0  0  0  0  0  0  0  0  0  0  0  0
    2.0000    1.4000    0.0000 O   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0
  2  3  1  0
M  END
$$$$
";

#[test]
fn quoted_printable_pdb_loads() {
    let first = pdb_atom(1, "N", "N", [11.104, 6.134, -6.504]);
    let second = pdb_atom(2, "CA", "C", [11.639, 6.071, -5.147]);
    // soft break in the middle of the first record, escaped spaces in the second
    let (a, b) = first.split_at(20);
    let mangled = format!(
        "HEADER    MANGLED\n{}=\n{}\n{}\nEND\n",
        a,
        b,
        second.replacen("  ", "=20=20", 1)
    );

    let text = prepare(&mangled);
    assert_eq!(sniff(&text), Format::Pdb);

    let model = parse_str(&text, Format::Pdb).unwrap();
    assert_eq!(model.atom_count(), 2);
    assert_eq!(model.atoms[1].element, "C");
}

#[test]
fn crlf_sdf_loads() {
    let text = prepare(&ETHANOL_SDF.replace('\n', "\r\n"));
    assert_eq!(sniff(&text), Format::Sdf);

    let model = parse_str(&text, Format::Sdf).unwrap();
    assert_eq!(model.title, "ethanol");
    assert_eq!(model.atom_count(), 3);
}

#[test]
fn every_sniffed_format_parses() {
    let xyz = "3\nwater\nO 0.0 0.0 0.0\nH 0.96 0.0 0.0\nH -0.24 0.93 0.0\n";
    let mol2 = "\
@<TRIPOS>MOLECULE
water
 3 2 0 0 0
SMALL
NO_CHARGES

@<TRIPOS>ATOM
      1 O1   0.0000 0.0000 0.0000 O.3 1 HOH 0.0
      2 H1   0.9600 0.0000 0.0000 H   1 HOH 0.0
      3 H2  -0.2400 0.9300 0.0000 H   1 HOH 0.0
@<TRIPOS>BOND
     1 1 2 1
     2 1 3 1
";

    for (text, expected) in [
        (xyz, Format::Xyz),
        (mol2, Format::Mol2),
        (ETHANOL_SDF, Format::Sdf),
    ] {
        let text = prepare(text);
        let format = sniff(&text);
        assert_eq!(format, expected);
        assert_eq!(parse_str(&text, format).unwrap().atom_count(), 3);
    }
}
