//! Reader for LAMMPS data files (`lmp.data.relax`).
//!
//! Supports the `atomic`, `charge` and `full` atom styles. Element identity
//! is taken from a trailing `# Symbol` comment on each `Masses` line when
//! present, and inferred from the atomic mass otherwise. Box bounds (plus an
//! optional `xy xz yz` tilt) become the lattice vectors of the canonical
//! structure, with positions shifted so the box origin is at zero.

use crate::io::{Format, error::Error};
use crate::model::{atom::Atom, structure::Structure, types::Element};
use std::collections::HashMap;
use std::io::BufRead;

pub fn read<R: BufRead>(reader: R) -> Result<Structure, Error> {
    let mut header = Header::default();
    let mut type_elements: HashMap<i64, Element> = HashMap::new();
    let mut raw_atoms: Vec<(i64, i64, [f64; 3])> = Vec::new();
    let mut section = Section::Header;
    let mut atom_style: Option<String> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| Error::Io { source: e })?;
        let line_no = idx + 1;
        if line_no == 1 {
            // Title line, always a comment.
            continue;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(next) = section_header(trimmed) {
            if next == Section::Atoms {
                atom_style = style_comment(trimmed);
            }
            section = next;
            continue;
        }
        if trimmed.starts_with('#') {
            continue;
        }

        match section {
            Section::Header => header.parse_line(trimmed),
            Section::Masses => {
                let (atom_type, element) = parse_mass_line(trimmed, line_no)?;
                type_elements.insert(atom_type, element);
            }
            Section::Atoms => {
                raw_atoms.push(parse_atom_line(trimmed, atom_style.as_deref(), line_no)?);
            }
            Section::Other => {}
        }
    }

    let lattice = header.lattice().ok_or(Error::MissingLattice {
        format: Format::LammpsData,
    })?;

    let mut structure = Structure::new(lattice);
    // Sort by atom id so the output order is independent of file order.
    raw_atoms.sort_by_key(|(id, _, _)| *id);
    for (id, atom_type, position) in raw_atoms {
        let element = *type_elements.get(&atom_type).ok_or_else(|| {
            Error::parse(
                Format::LammpsData,
                0,
                format!("atom {} references type {} with no mass entry", id, atom_type),
            )
        })?;
        let shifted = [
            position[0] - header.lo[0],
            position[1] - header.lo[1],
            position[2] - header.lo[2],
        ];
        structure.atoms.push(Atom::new(element, shifted));
    }

    if structure.atoms.is_empty() {
        return Err(Error::EmptyStructure {
            format: Format::LammpsData,
        });
    }

    Ok(structure)
}

#[derive(Debug, Default)]
struct Header {
    lo: [f64; 3],
    hi: [f64; 3],
    tilt: [f64; 3],
    have_bounds: [bool; 3],
}

impl Header {
    fn parse_line(&mut self, line: &str) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [lo, hi, "xlo", "xhi"] => self.set_bounds(0, lo, hi),
            [lo, hi, "ylo", "yhi"] => self.set_bounds(1, lo, hi),
            [lo, hi, "zlo", "zhi"] => self.set_bounds(2, lo, hi),
            [xy, xz, yz, "xy", "xz", "yz"] => {
                if let (Ok(xy), Ok(xz), Ok(yz)) =
                    (xy.parse::<f64>(), xz.parse::<f64>(), yz.parse::<f64>())
                {
                    self.tilt = [xy, xz, yz];
                }
            }
            // Count lines ("N atoms", "M atom types", ...) carry no
            // information the parser needs ahead of the sections.
            _ => {}
        }
    }

    fn set_bounds(&mut self, axis: usize, lo: &str, hi: &str) {
        if let (Ok(lo), Ok(hi)) = (lo.parse::<f64>(), hi.parse::<f64>()) {
            self.lo[axis] = lo;
            self.hi[axis] = hi;
            self.have_bounds[axis] = true;
        }
    }

    fn lattice(&self) -> Option<[[f64; 3]; 3]> {
        if !self.have_bounds.iter().all(|&b| b) {
            return None;
        }
        let [xy, xz, yz] = self.tilt;
        Some([
            [self.hi[0] - self.lo[0], 0.0, 0.0],
            [xy, self.hi[1] - self.lo[1], 0.0],
            [xz, yz, self.hi[2] - self.lo[2]],
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Masses,
    Atoms,
    Other,
}

fn section_header(line: &str) -> Option<Section> {
    let token = line.split_whitespace().next()?;
    match token {
        "Masses" => Some(Section::Masses),
        "Atoms" => Some(Section::Atoms),
        "Velocities" | "Bonds" | "Angles" | "Dihedrals" | "Impropers" | "Pair" | "PairIJ"
        | "Bond" | "Angle" | "Dihedral" | "Improper" => Some(Section::Other),
        _ => None,
    }
}

fn style_comment(line: &str) -> Option<String> {
    line.split('#').nth(1).map(|s| s.trim().to_lowercase())
}

fn parse_mass_line(line: &str, line_no: usize) -> Result<(i64, Element), Error> {
    let mut halves = line.splitn(2, '#');
    let data = halves.next().unwrap_or_default().trim();
    let comment = halves.next().map(|s| s.trim());

    let fields: Vec<&str> = data.split_whitespace().collect();
    if fields.len() < 2 {
        return Err(Error::parse(Format::LammpsData, line_no, "invalid Masses line"));
    }
    let atom_type = fields[0]
        .parse::<i64>()
        .map_err(|_| Error::parse(Format::LammpsData, line_no, "invalid atom type in Masses"))?;
    let mass = fields[1]
        .parse::<f64>()
        .map_err(|_| Error::parse(Format::LammpsData, line_no, "invalid mass in Masses"))?;

    let element = comment
        .and_then(|c| c.split_whitespace().next())
        .and_then(|symbol| symbol.parse::<Element>().ok())
        .or_else(|| Element::from_mass(mass))
        .ok_or_else(|| {
            Error::parse(
                Format::LammpsData,
                line_no,
                format!("cannot infer element for atom type {} (mass {})", atom_type, mass),
            )
        })?;

    Ok((atom_type, element))
}

/// Returns `(atom id, atom type, position)` for one `Atoms` line.
fn parse_atom_line(
    line: &str,
    style: Option<&str>,
    line_no: usize,
) -> Result<(i64, i64, [f64; 3]), Error> {
    let data = line.splitn(2, '#').next().unwrap_or_default().trim();
    let fields: Vec<&str> = data.split_whitespace().collect();

    // Column layout per atom style: atomic is "id type x y z", charge adds a
    // charge column, full adds molecule id and charge.
    let (type_col, x_col) = match style {
        Some("full") => (2, 4),
        Some("charge") => (1, 3),
        _ => (1, 2),
    };

    if fields.len() < x_col + 3 {
        return Err(Error::parse(Format::LammpsData, line_no, "invalid Atoms line"));
    }

    let id = fields[0]
        .parse::<i64>()
        .map_err(|_| Error::parse(Format::LammpsData, line_no, "invalid atom id"))?;
    let atom_type = fields[type_col]
        .parse::<i64>()
        .map_err(|_| Error::parse(Format::LammpsData, line_no, "invalid atom type"))?;

    let mut position = [0.0; 3];
    for (slot, field) in position.iter_mut().zip(&fields[x_col..x_col + 3]) {
        *slot = field
            .parse::<f64>()
            .map_err(|_| Error::parse(Format::LammpsData, line_no, "invalid atom coordinate"))?;
    }

    Ok((id, atom_type, position))
}
