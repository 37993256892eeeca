//! SOAP (smooth overlap of atomic positions) power-spectrum descriptors.
//!
//! For every atom the Gaussian-smeared neighbor density of each species is
//! expanded in an orthonormal radial basis and real spherical harmonics, and
//! the rotationally invariant power spectrum
//! `p(a₁, a₂, l) = π √(8/(2l+1)) Σ_m c(a₁,l,m) c(a₂,l,m)` over combined
//! `(species, radial)` channels forms the feature vector. The expansion of a
//! unit Gaussian at distance `r` uses the modified spherical Bessel kernel
//! `4π exp(-(u²+r²)/2σ²) i_l(ur/σ²)`, integrated against the radial basis by
//! a fixed Simpson rule, so the computation is fully deterministic.

mod bessel;
mod error;
mod radial;
mod spherical;

pub use error::Error;

use crate::model::{structure::cross, structure::Structure, types::Element};
use ndarray::Array2;
use radial::RadialBasis;

/// Largest supported radial expansion order; bounded by the conditioning of
/// the polynomial radial overlap matrix in double precision.
pub const MAX_NMAX: usize = 10;
/// Largest supported angular expansion order.
pub const MAX_LMAX: usize = 12;

/// Simpson quadrature intervals for the radial integrals.
const QUADRATURE_INTERVALS: usize = 200;

/// Parameter set of the SOAP descriptor.
///
/// The defaults mirror the pipeline's fixed choices: species `{H, C}`,
/// `rcut = 6.0 Å`, `nmax = lmax = 8`, `sigma = 1.0 Å`, periodic, with
/// species crossover enabled. Only `rcut` and `sigma` are exposed as
/// tunables by the CLI.
#[derive(Debug, Clone)]
pub struct SoapParameters {
    /// Species channels; every atom of the input structure must be listed.
    pub species: Vec<Element>,
    /// Cutoff radius in Å.
    pub rcut: f64,
    /// Number of radial basis functions.
    pub nmax: usize,
    /// Maximum angular momentum of the expansion.
    pub lmax: usize,
    /// Gaussian smearing width in Å.
    pub sigma: f64,
    /// Include periodic images of the cell.
    pub periodic: bool,
    /// Keep cross-species channel pairs in the power spectrum.
    pub crossover: bool,
}

impl Default for SoapParameters {
    fn default() -> Self {
        Self {
            species: vec![Element::H, Element::C],
            rcut: 6.0,
            nmax: 8,
            lmax: 8,
            sigma: 1.0,
            periodic: true,
            crossover: true,
        }
    }
}

impl SoapParameters {
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.rcut > 0.0) || !self.rcut.is_finite() {
            return Err(Error::InvalidCutoff(self.rcut));
        }
        if !(self.sigma > 0.0) || !self.sigma.is_finite() {
            return Err(Error::InvalidSigma(self.sigma));
        }
        if self.nmax == 0 || self.nmax > MAX_NMAX {
            return Err(Error::InvalidRadialOrder {
                nmax: self.nmax,
                max: MAX_NMAX,
            });
        }
        if self.lmax == 0 || self.lmax > MAX_LMAX {
            return Err(Error::InvalidAngularOrder {
                lmax: self.lmax,
                max: MAX_LMAX,
            });
        }
        if self.species.is_empty() {
            return Err(Error::EmptySpecies);
        }
        for (idx, &species) in self.species.iter().enumerate() {
            if self.species[..idx].contains(&species) {
                return Err(Error::DuplicateSpecies(species));
            }
        }
        Ok(())
    }

    /// Width of the descriptor row for these parameters.
    pub fn n_features(&self) -> usize {
        let per_l = self.lmax + 1;
        if self.crossover {
            let channels = self.species.len() * self.nmax;
            per_l * channels * (channels + 1) / 2
        } else {
            self.species.len() * per_l * self.nmax * (self.nmax + 1) / 2
        }
    }
}

/// The descriptor engine: validated parameters plus the precomputed radial
/// basis. Construction is cheap; one engine handles any number of
/// structures.
#[derive(Debug, Clone)]
pub struct Soap {
    params: SoapParameters,
    /// `g_n(u_k) · u_k² · w_k` per quadrature node, folding the Simpson
    /// weights into the radial basis values.
    weighted_basis: Vec<Vec<f64>>,
    nodes: Vec<f64>,
}

impl Soap {
    pub fn new(params: SoapParameters) -> Result<Self, Error> {
        params.validate()?;
        let basis = RadialBasis::new(params.nmax, params.rcut)?;

        let step = params.rcut / QUADRATURE_INTERVALS as f64;
        let mut nodes = Vec::with_capacity(QUADRATURE_INTERVALS + 1);
        let mut weighted_basis = vec![Vec::with_capacity(QUADRATURE_INTERVALS + 1); params.nmax];
        for k in 0..=QUADRATURE_INTERVALS {
            let u = k as f64 * step;
            let simpson = if k == 0 || k == QUADRATURE_INTERVALS {
                1.0
            } else if k % 2 == 1 {
                4.0
            } else {
                2.0
            } * step
                / 3.0;
            let values = basis.evaluate(u);
            for (n, column) in weighted_basis.iter_mut().enumerate() {
                column.push(values[n] * u * u * simpson);
            }
            nodes.push(u);
        }

        Ok(Self {
            params,
            weighted_basis,
            nodes,
        })
    }

    #[inline]
    pub fn parameters(&self) -> &SoapParameters {
        &self.params
    }

    /// Computes the descriptor matrix, one row per atom in input order.
    pub fn compute(&self, structure: &Structure) -> Result<Array2<f64>, Error> {
        if structure.atoms.is_empty() {
            return Err(Error::EmptyStructure);
        }
        if self.params.periodic {
            let volume = structure.volume();
            if volume < 1e-6 {
                return Err(Error::DegenerateCell { volume });
            }
        }

        let channel_of = self.species_channels(structure)?;
        let shifts = self.image_shifts(structure);

        let lmax = self.params.lmax;
        let nmax = self.params.nmax;
        let n_species = self.params.species.len();
        let lm_count = (lmax + 1) * (lmax + 1);

        let mut descriptor = Array2::zeros((structure.atom_count(), self.params.n_features()));

        for (center_idx, center) in structure.atoms.iter().enumerate() {
            // c[(s·nmax + n) · lm_count + lm]
            let mut coefficients = vec![0.0; n_species * nmax * lm_count];

            for (neighbor_idx, neighbor) in structure.atoms.iter().enumerate() {
                let channel = channel_of[neighbor_idx];
                for shift in &shifts {
                    let delta = [
                        neighbor.position[0] + shift[0] - center.position[0],
                        neighbor.position[1] + shift[1] - center.position[1],
                        neighbor.position[2] + shift[2] - center.position[2],
                    ];
                    let distance =
                        (delta[0] * delta[0] + delta[1] * delta[1] + delta[2] * delta[2]).sqrt();
                    if distance > self.params.rcut {
                        continue;
                    }

                    let radial = self.radial_integrals(distance);
                    let direction = if distance > 1e-10 {
                        [
                            delta[0] / distance,
                            delta[1] / distance,
                            delta[2] / distance,
                        ]
                    } else {
                        // The central atom: only the l = 0 kernel survives,
                        // so the direction is arbitrary.
                        [0.0, 0.0, 1.0]
                    };
                    let harmonics = spherical::eval(lmax, direction);

                    for n in 0..nmax {
                        let base = (channel * nmax + n) * lm_count;
                        for l in 0..=lmax {
                            let kernel = radial[n * (lmax + 1) + l];
                            for lm in (l * l)..((l + 1) * (l + 1)) {
                                coefficients[base + lm] += kernel * harmonics[lm];
                            }
                        }
                    }
                }
            }

            self.power_spectrum(&coefficients, descriptor.row_mut(center_idx));
        }

        Ok(descriptor)
    }

    /// Maps each atom to its channel index in the species list.
    fn species_channels(&self, structure: &Structure) -> Result<Vec<usize>, Error> {
        structure
            .atoms
            .iter()
            .map(|atom| {
                self.params
                    .species
                    .iter()
                    .position(|&s| s == atom.element)
                    .ok_or(Error::UnsupportedSpecies(atom.element))
            })
            .collect()
    }

    /// Cartesian shift vectors of every periodic image that can reach into
    /// the cutoff sphere. Non-periodic parameters yield only the zero shift.
    fn image_shifts(&self, structure: &Structure) -> Vec<[f64; 3]> {
        if !self.params.periodic {
            return vec![[0.0; 3]];
        }

        let [a, b, c] = structure.lattice;
        let volume = structure.volume();
        let counts = [
            images_along(volume, cross(b, c), self.params.rcut),
            images_along(volume, cross(c, a), self.params.rcut),
            images_along(volume, cross(a, b), self.params.rcut),
        ];

        let mut shifts = Vec::new();
        for ia in -counts[0]..=counts[0] {
            for ib in -counts[1]..=counts[1] {
                for ic in -counts[2]..=counts[2] {
                    let fa = ia as f64;
                    let fb = ib as f64;
                    let fc = ic as f64;
                    shifts.push([
                        fa * a[0] + fb * b[0] + fc * c[0],
                        fa * a[1] + fb * b[1] + fc * c[1],
                        fa * a[2] + fb * b[2] + fc * c[2],
                    ]);
                }
            }
        }
        shifts
    }

    /// Radial expansion integrals `I[n][l]` for one neighbor at `distance`,
    /// flattened as `n · (lmax+1) + l`.
    fn radial_integrals(&self, distance: f64) -> Vec<f64> {
        let lmax = self.params.lmax;
        let nmax = self.params.nmax;
        let sigma2 = self.params.sigma * self.params.sigma;
        let four_pi = 4.0 * std::f64::consts::PI;

        let mut integrals = vec![0.0; nmax * (lmax + 1)];
        for (k, &u) in self.nodes.iter().enumerate() {
            let gaussian = (-(u - distance) * (u - distance) / (2.0 * sigma2)).exp();
            if gaussian < 1e-14 {
                continue;
            }
            let kernels = bessel::scaled_bessel_i(lmax, u * distance / sigma2);
            for n in 0..nmax {
                let weighted = self.weighted_basis[n][k] * gaussian;
                for l in 0..=lmax {
                    integrals[n * (lmax + 1) + l] += weighted * kernels[l];
                }
            }
        }
        for value in integrals.iter_mut() {
            *value *= four_pi;
        }
        integrals
    }

    /// Contracts expansion coefficients into the invariant power spectrum.
    fn power_spectrum(&self, coefficients: &[f64], mut row: ndarray::ArrayViewMut1<'_, f64>) {
        let lmax = self.params.lmax;
        let nmax = self.params.nmax;
        let lm_count = (lmax + 1) * (lmax + 1);
        let channels = self.params.species.len() * nmax;
        let sqrt2 = std::f64::consts::SQRT_2;

        let mut feature = 0;
        for a1 in 0..channels {
            for a2 in a1..channels {
                if !self.params.crossover && a1 / nmax != a2 / nmax {
                    continue;
                }
                for l in 0..=lmax {
                    let prefactor =
                        std::f64::consts::PI * (8.0 / (2.0 * l as f64 + 1.0)).sqrt();
                    let mut sum = 0.0;
                    for lm in (l * l)..((l + 1) * (l + 1)) {
                        sum += coefficients[a1 * lm_count + lm] * coefficients[a2 * lm_count + lm];
                    }
                    let mut value = prefactor * sum;
                    if a1 != a2 {
                        // Preserves the dot-product metric across the
                        // halved off-diagonal channel pairs.
                        value *= sqrt2;
                    }
                    row[feature] = value;
                    feature += 1;
                }
            }
        }
        debug_assert_eq!(feature, self.params.n_features());
    }
}

/// Number of periodic repeats along one lattice vector needed to cover the
/// cutoff, from the spacing between opposite cell faces.
fn images_along(volume: f64, face_normal: [f64; 3], rcut: f64) -> i64 {
    let area = (face_normal[0] * face_normal[0]
        + face_normal[1] * face_normal[1]
        + face_normal[2] * face_normal[2])
        .sqrt();
    let spacing = volume / area;
    (rcut / spacing).ceil() as i64
}
