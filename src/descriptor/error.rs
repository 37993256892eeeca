use crate::model::types::Element;
use thiserror::Error;

/// Errors from SOAP parameter validation and descriptor computation.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cutoff radius must be positive (got {0})")]
    InvalidCutoff(f64),

    #[error("gaussian width sigma must be positive (got {0})")]
    InvalidSigma(f64),

    #[error("nmax must be between 1 and {max} (got {nmax})")]
    InvalidRadialOrder { nmax: usize, max: usize },

    #[error("lmax must be between 1 and {max} (got {lmax})")]
    InvalidAngularOrder { lmax: usize, max: usize },

    #[error("the species list must not be empty")]
    EmptySpecies,

    #[error("species '{0}' appears more than once in the species list")]
    DuplicateSpecies(Element),

    #[error("structure contains species '{0}' which is not in the configured species list")]
    UnsupportedSpecies(Element),

    #[error("structure contains no atoms")]
    EmptyStructure,

    #[error("periodic cell is degenerate (volume {volume:.3e} Å³)")]
    DegenerateCell { volume: f64 },

    #[error("radial basis orthonormalization failed: {0}")]
    RadialBasis(String),
}
