//! A pure Rust data preparation library for machine-learned interatomic
//! potential workflows. It converts relaxed simulation outputs (FHI-aims
//! geometries, LAMMPS data files) into canonical POSCAR structures, computes
//! SOAP power-spectrum descriptors for every atom, and aggregates the
//! normalization statistics a downstream model trains against.
//!
//! # Features
//!
//! - **Structure adapters** — Read FHI-aims `geometry.in.next_step` and
//!   LAMMPS `lmp.data.relax` files; write and re-read canonical POSCAR
//! - **SOAP descriptors** — Smooth Overlap of Atomic Positions power
//!   spectrum with a polynomial radial basis, periodic images, and
//!   species crossover
//! - **Dataset pipeline** — Per-sample descriptor archives (`soap.npz`)
//!   plus training-set mean / standard deviation (`norm.npz`)
//!
//! # Quick Start
//!
//! The descriptor engine works on in-memory structures as well as on
//! whole dataset trees:
//!
//! ```
//! use soap_prep::{Atom, Element, Soap, SoapParameters, Structure};
//!
//! // A methane-like fragment in a cubic box.
//! let mut structure =
//!     Structure::new([[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]]);
//! structure.atoms.push(Atom::new(Element::C, [5.000, 5.000, 5.000]));
//! structure.atoms.push(Atom::new(Element::H, [5.629, 5.629, 5.629]));
//! structure.atoms.push(Atom::new(Element::H, [4.371, 4.371, 5.629]));
//! structure.atoms.push(Atom::new(Element::H, [4.371, 5.629, 4.371]));
//! structure.atoms.push(Atom::new(Element::H, [5.629, 4.371, 4.371]));
//!
//! let engine = Soap::new(SoapParameters::default())?;
//! let desc = engine.compute(&structure)?;
//!
//! // One row per atom, one column per power-spectrum feature.
//! assert_eq!(desc.nrows(), 5);
//! assert_eq!(desc.ncols(), engine.parameters().n_features());
//! # Ok::<(), soap_prep::DescriptorError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`] — Structure file adapters (FHI-aims, LAMMPS data, POSCAR)
//! - [`descriptor`] — The SOAP engine and its parameters
//! - [`pipeline`] — Sample processing and normalization over dataset trees

pub mod descriptor;
pub mod io;
pub mod model;
pub mod pipeline;

pub use model::atom::Atom;
pub use model::structure::Structure;
pub use model::types::{Element, ParseElementError};

pub use descriptor::{Soap, SoapParameters};

pub use pipeline::{
    NormStats, generate_training_set, generate_validation_set, list_sample_dirs,
    normalize_descriptors, process_sample, process_samples,
};

pub use descriptor::Error as DescriptorError;
pub use io::error::Error as IoError;
pub use pipeline::Error as PipelineError;
