use crate::io::{Format, error::Error};
use crate::model::structure::Structure;
use std::io::Write;

/// Writes a structure in POSCAR format with Cartesian coordinates.
///
/// Atoms are grouped by species in order of first appearance, as the format
/// requires; within a species block the original atom order is kept.
pub fn write<W: Write>(mut writer: W, structure: &Structure) -> Result<(), Error> {
    if structure.atoms.is_empty() {
        return Err(Error::EmptyStructure {
            format: Format::Poscar,
        });
    }

    let species = structure.species();

    writeln!(writer, "soap-prep canonical structure")?;
    writeln!(writer, "1.0")?;
    for row in &structure.lattice {
        writeln!(writer, "  {:>20.16}  {:>20.16}  {:>20.16}", row[0], row[1], row[2])?;
    }

    let symbols: Vec<&str> = species.iter().map(|s| s.symbol()).collect();
    writeln!(writer, "{}", symbols.join(" "))?;

    let counts: Vec<String> = species
        .iter()
        .map(|&s| {
            structure
                .atoms
                .iter()
                .filter(|a| a.element == s)
                .count()
                .to_string()
        })
        .collect();
    writeln!(writer, "{}", counts.join(" "))?;

    writeln!(writer, "Cartesian")?;
    for &element in &species {
        for atom in structure.atoms.iter().filter(|a| a.element == element) {
            writeln!(
                writer,
                "  {:>20.16}  {:>20.16}  {:>20.16}",
                atom.position[0], atom.position[1], atom.position[2]
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::poscar;
    use crate::model::{atom::Atom, types::Element};
    use approx::assert_relative_eq;
    use std::io::Cursor;

    fn sample_structure() -> Structure {
        let mut s = Structure::new([[8.0, 0.0, 0.0], [0.0, 8.0, 0.0], [0.0, 0.0, 8.0]]);
        s.atoms.push(Atom::new(Element::C, [0.0, 0.0, 0.0]));
        s.atoms.push(Atom::new(Element::H, [1.09, 0.0, 0.0]));
        s.atoms.push(Atom::new(Element::C, [2.0, 2.0, 2.0]));
        s.atoms.push(Atom::new(Element::H, [0.0, 1.09, 0.0]));
        s
    }

    #[test]
    fn writes_and_reads_back_consistently() {
        let structure = sample_structure();
        let mut buf = Vec::new();
        write(&mut buf, &structure).expect("write poscar");

        let roundtrip = poscar::read(Cursor::new(&buf)).expect("read poscar");

        assert_eq!(roundtrip.atom_count(), structure.atom_count());
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(
                    roundtrip.lattice[i][j],
                    structure.lattice[i][j],
                    epsilon = 1e-9
                );
            }
        }
        // Grouped order: both carbons first, then both hydrogens.
        assert_eq!(roundtrip.atoms[0].element, Element::C);
        assert_eq!(roundtrip.atoms[1].element, Element::C);
        assert_eq!(roundtrip.atoms[2].element, Element::H);
        assert_eq!(roundtrip.atoms[3].element, Element::H);
        assert_relative_eq!(roundtrip.atoms[1].position[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(roundtrip.atoms[2].position[0], 1.09, epsilon = 1e-9);
    }

    #[test]
    fn writing_is_deterministic() {
        let structure = sample_structure();
        let mut a = Vec::new();
        let mut b = Vec::new();
        write(&mut a, &structure).unwrap();
        write(&mut b, &structure).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_structure_is_an_error() {
        let structure = Structure::new([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        assert!(matches!(
            write(Vec::new(), &structure),
            Err(Error::EmptyStructure { .. })
        ));
    }
}
