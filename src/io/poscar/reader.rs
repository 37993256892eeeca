use crate::io::{Format, error::Error};
use crate::model::{
    atom::Atom,
    structure::{Structure, frac_to_cartesian},
    types::Element,
};
use std::io::BufRead;

pub fn read<R: BufRead>(reader: R) -> Result<Structure, Error> {
    let lines = collect_lines(reader)?;
    let mut cursor = 0;

    // Comment line.
    next_line(&lines, &mut cursor)
        .ok_or_else(|| Error::parse(Format::Poscar, 1, "empty POSCAR file"))?;

    let (scale_no, scale_line) = next_line(&lines, &mut cursor)
        .ok_or_else(|| Error::parse(Format::Poscar, cursor, "missing scale line"))?;
    let scale = scale_line
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::parse(Format::Poscar, scale_no, "invalid scale factor"))?;

    let mut lattice = [[0.0; 3]; 3];
    for row in lattice.iter_mut() {
        let (ln, line) = next_line(&lines, &mut cursor)
            .ok_or_else(|| Error::parse(Format::Poscar, cursor, "missing lattice row"))?;
        *row = parse_triplet(&line, ln)?;
        for component in row.iter_mut() {
            *component *= scale;
        }
    }

    let (symbols_no, symbols_line) = next_line(&lines, &mut cursor)
        .ok_or_else(|| Error::parse(Format::Poscar, cursor, "missing species symbols line"))?;
    if !starts_alphabetic(&symbols_line) {
        return Err(Error::parse(
            Format::Poscar,
            symbols_no,
            "species symbols line is required (VASP 4 files without symbols are not supported)",
        ));
    }
    let species = symbols_line
        .split_whitespace()
        .map(|sym| {
            sym.parse::<Element>().map_err(|_| {
                Error::parse(
                    Format::Poscar,
                    symbols_no,
                    format!("unknown species symbol '{}'", sym),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (counts_no, counts_line) = next_line(&lines, &mut cursor)
        .ok_or_else(|| Error::parse(Format::Poscar, cursor, "missing species counts line"))?;
    let counts = counts_line
        .split_whitespace()
        .map(|n| {
            n.parse::<usize>()
                .map_err(|_| Error::parse(Format::Poscar, counts_no, "invalid species count"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if counts.len() != species.len() {
        return Err(Error::parse(
            Format::Poscar,
            counts_no,
            "species counts do not match symbols",
        ));
    }

    let (mode_no, mut mode_line) = next_line(&lines, &mut cursor)
        .ok_or_else(|| Error::parse(Format::Poscar, cursor, "missing coordinate mode line"))?;
    if mode_line.trim_start().starts_with(['s', 'S']) {
        // Selective dynamics flag line; the real mode follows.
        let (_, next) = next_line(&lines, &mut cursor)
            .ok_or_else(|| Error::parse(Format::Poscar, cursor, "missing coordinate mode line"))?;
        mode_line = next;
    }
    let direct = match mode_line.trim_start().chars().next() {
        Some('d') | Some('D') => true,
        Some('c') | Some('C') | Some('k') | Some('K') => false,
        _ => {
            return Err(Error::parse(
                Format::Poscar,
                mode_no,
                "coordinate mode must be Direct or Cartesian",
            ));
        }
    };

    let mut structure = Structure::new(lattice);
    for (&element, &count) in species.iter().zip(&counts) {
        for _ in 0..count {
            let (ln, line) = next_line(&lines, &mut cursor)
                .ok_or_else(|| Error::parse(Format::Poscar, cursor, "missing atom position"))?;
            let triple = parse_triplet(&line, ln)?;
            let position = if direct {
                frac_to_cartesian(&lattice, triple)
            } else {
                [triple[0] * scale, triple[1] * scale, triple[2] * scale]
            };
            structure.atoms.push(Atom::new(element, position));
        }
    }

    if structure.atoms.is_empty() {
        return Err(Error::EmptyStructure {
            format: Format::Poscar,
        });
    }

    Ok(structure)
}

fn collect_lines<R: BufRead>(reader: R) -> Result<Vec<(usize, String)>, Error> {
    reader
        .lines()
        .enumerate()
        .map(|(i, line)| {
            line.map(|v| (i + 1, v))
                .map_err(|e| Error::Io { source: e })
        })
        .collect()
}

fn next_line(lines: &[(usize, String)], cursor: &mut usize) -> Option<(usize, String)> {
    while *cursor < lines.len() {
        let (ln, content) = &lines[*cursor];
        *cursor += 1;
        if content.trim().is_empty() {
            continue;
        }
        return Some((*ln, content.clone()));
    }
    None
}

fn starts_alphabetic(line: &str) -> bool {
    line.trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
}

fn parse_triplet(line: &str, line_no: usize) -> Result<[f64; 3], Error> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(Error::parse(
            Format::Poscar,
            line_no,
            "expected 3 numeric fields",
        ));
    }
    let mut triple = [0.0; 3];
    for (slot, part) in triple.iter_mut().zip(&parts[..3]) {
        *slot = part
            .parse::<f64>()
            .map_err(|_| Error::parse(Format::Poscar, line_no, "invalid numeric field"))?;
    }
    Ok(triple)
}
