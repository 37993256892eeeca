pub mod atom;
pub mod structure;
pub mod types;
