use std::fmt;

pub mod aims;
pub mod error;
pub mod lammps;
pub mod poscar;

/// File formats handled by the structure adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    AimsGeometry,
    LammpsData,
    Poscar,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::AimsGeometry => write!(f, "FHI-aims geometry"),
            Format::LammpsData => write!(f, "LAMMPS data"),
            Format::Poscar => write!(f, "POSCAR"),
        }
    }
}

/// Raw simulation outputs a sample directory may contain.
///
/// The marker file name selects the parser; a sample must carry exactly one
/// of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFormat {
    AimsGeometry,
    LammpsData,
}

impl RawFormat {
    pub const ALL: [RawFormat; 2] = [RawFormat::AimsGeometry, RawFormat::LammpsData];

    /// The marker file name inside a sample directory.
    pub fn marker(self) -> &'static str {
        match self {
            RawFormat::AimsGeometry => "geometry.in.next_step",
            RawFormat::LammpsData => "lmp.data.relax",
        }
    }

    pub fn format(self) -> Format {
        match self {
            RawFormat::AimsGeometry => Format::AimsGeometry,
            RawFormat::LammpsData => Format::LammpsData,
        }
    }
}
