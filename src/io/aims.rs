//! Reader for FHI-aims geometry files (`geometry.in` / `geometry.in.next_step`).
//!
//! The format is line-keyword based: `lattice_vector x y z` rows define the
//! periodic cell, `atom x y z Symbol` rows give Cartesian positions in Å and
//! `atom_frac fx fy fz Symbol` rows give fractional ones. Relaxation
//! bookkeeping lines (`trust_radius`, `hessian_block`, constraints, ...) are
//! ignored.

use crate::io::{Format, error::Error};
use crate::model::{
    atom::Atom,
    structure::{Structure, frac_to_cartesian},
    types::Element,
};
use std::io::BufRead;

pub fn read<R: BufRead>(reader: R) -> Result<Structure, Error> {
    let mut lattice_rows: Vec<[f64; 3]> = Vec::new();
    // Fractional atoms are resolved after the full lattice is known.
    let mut cartesian: Vec<(Element, [f64; 3])> = Vec::new();
    let mut fractional: Vec<(Element, [f64; 3])> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::Io { source: e })?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut fields = trimmed.split_whitespace();
        let keyword = fields.next().unwrap_or_default();
        match keyword {
            "lattice_vector" => {
                if lattice_rows.len() == 3 {
                    return Err(Error::parse(
                        Format::AimsGeometry,
                        line_no,
                        "more than 3 lattice_vector lines",
                    ));
                }
                lattice_rows.push(parse_vector(trimmed, line_no)?);
            }
            "atom" => {
                let (position, element) = parse_atom_fields(trimmed, line_no)?;
                cartesian.push((element, position));
            }
            "atom_frac" => {
                let (position, element) = parse_atom_fields(trimmed, line_no)?;
                fractional.push((element, position));
            }
            _ => {
                // trust_radius, hessian_block, constrain_relaxation, velocities...
            }
        }
    }

    if lattice_rows.len() != 3 {
        return Err(Error::MissingLattice {
            format: Format::AimsGeometry,
        });
    }
    let lattice = [lattice_rows[0], lattice_rows[1], lattice_rows[2]];

    let mut structure = Structure::new(lattice);
    for (element, position) in cartesian {
        structure.atoms.push(Atom::new(element, position));
    }
    for (element, frac) in fractional {
        structure
            .atoms
            .push(Atom::new(element, frac_to_cartesian(&lattice, frac)));
    }

    if structure.atoms.is_empty() {
        return Err(Error::EmptyStructure {
            format: Format::AimsGeometry,
        });
    }

    Ok(structure)
}

fn parse_vector(line: &str, line_no: usize) -> Result<[f64; 3], Error> {
    let parts: Vec<_> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(Error::parse(
            Format::AimsGeometry,
            line_no,
            "lattice_vector requires 3 components",
        ));
    }
    let mut vector = [0.0; 3];
    for (slot, part) in vector.iter_mut().zip(&parts[1..4]) {
        *slot = part.parse::<f64>().map_err(|_| {
            Error::parse(
                Format::AimsGeometry,
                line_no,
                "invalid lattice_vector component",
            )
        })?;
    }
    Ok(vector)
}

fn parse_atom_fields(line: &str, line_no: usize) -> Result<([f64; 3], Element), Error> {
    let parts: Vec<_> = line.split_whitespace().collect();
    if parts.len() < 5 {
        return Err(Error::parse(
            Format::AimsGeometry,
            line_no,
            "atom line requires 3 coordinates and a species symbol",
        ));
    }
    let mut position = [0.0; 3];
    for (slot, part) in position.iter_mut().zip(&parts[1..4]) {
        *slot = part.parse::<f64>().map_err(|_| {
            Error::parse(Format::AimsGeometry, line_no, "invalid atom coordinate")
        })?;
    }
    let element = parts[4].parse::<Element>().map_err(|_| {
        Error::parse(
            Format::AimsGeometry,
            line_no,
            format!("unknown species symbol '{}'", parts[4]),
        )
    })?;
    Ok((position, element))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    const SAMPLE: &str = "\
# relaxed geometry
lattice_vector 10.0 0.0 0.0
lattice_vector 0.0 10.0 0.0
lattice_vector 0.0 0.0 10.0
atom 0.0 0.0 0.0 C
atom 1.09 0.0 0.0 H
atom_frac 0.5 0.5 0.5 H
trust_radius 0.2
";

    #[test]
    fn reads_cartesian_and_fractional_atoms() {
        let structure = read(Cursor::new(SAMPLE)).expect("parse aims geometry");
        assert_eq!(structure.atom_count(), 3);
        assert_eq!(structure.atoms[0].element, Element::C);
        assert_eq!(structure.atoms[1].element, Element::H);
        assert_relative_eq!(structure.atoms[1].position[0], 1.09, epsilon = 1e-12);
        // atom_frac resolved against the (cubic) lattice
        assert_relative_eq!(structure.atoms[2].position[0], 5.0, epsilon = 1e-12);
        assert_relative_eq!(structure.atoms[2].position[2], 5.0, epsilon = 1e-12);
    }

    #[test]
    fn parsing_is_idempotent() {
        let a = read(Cursor::new(SAMPLE)).unwrap();
        let b = read(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_lattice_is_an_error() {
        let input = "atom 0.0 0.0 0.0 C\n";
        match read(Cursor::new(input)) {
            Err(Error::MissingLattice { format }) => assert_eq!(format, Format::AimsGeometry),
            other => panic!("unexpected result: {:?}", other.map(|s| s.atom_count())),
        }
    }

    #[test]
    fn unknown_species_is_an_error() {
        let input = "\
lattice_vector 10.0 0.0 0.0
lattice_vector 0.0 10.0 0.0
lattice_vector 0.0 0.0 10.0
atom 0.0 0.0 0.0 Qq
";
        assert!(matches!(
            read(Cursor::new(input)),
            Err(Error::Parse { line: 4, .. })
        ));
    }
}
