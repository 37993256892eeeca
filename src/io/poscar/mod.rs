//! Canonical structure format (VASP POSCAR).
//!
//! Every sample is converted to this format before descriptor computation;
//! the descriptor stage re-reads the written file rather than consuming the
//! in-memory structure, so the file on disk is the single source of truth.

pub mod reader;
pub mod writer;

pub use reader::read;
pub use writer::write;

/// Fixed file name of the canonical structure inside a sample directory.
pub const FILE_NAME: &str = "POSCAR";
