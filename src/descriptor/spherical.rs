//! Real spherical harmonics up to a fixed angular order.
//!
//! Values are laid out in a flat vector indexed by `l² + l + m` for
//! `-l ≤ m ≤ l`, the usual packing for all `(l, m)` pairs up to `lmax`.

/// Evaluates all real spherical harmonics `Y_lm` on a unit vector.
pub fn eval(lmax: usize, unit: [f64; 3]) -> Vec<f64> {
    let [x, y, z] = unit;
    let sin_theta = (x * x + y * y).sqrt();
    // φ is undefined on the poles; the m > 0 terms all vanish there through
    // the associated Legendre factor, so any finite φ works.
    let (cos_phi, sin_phi) = if sin_theta > 1e-14 {
        (x / sin_theta, y / sin_theta)
    } else {
        (1.0, 0.0)
    };

    let legendre = associated_legendre(lmax, z, sin_theta);
    let mut values = vec![0.0; (lmax + 1) * (lmax + 1)];

    // cos(mφ), sin(mφ) by the angle-addition recurrence.
    let mut cos_m = Vec::with_capacity(lmax + 1);
    let mut sin_m = Vec::with_capacity(lmax + 1);
    cos_m.push(1.0);
    sin_m.push(0.0);
    for m in 1..=lmax {
        cos_m.push(cos_m[m - 1] * cos_phi - sin_m[m - 1] * sin_phi);
        sin_m.push(sin_m[m - 1] * cos_phi + cos_m[m - 1] * sin_phi);
    }

    let sqrt2 = std::f64::consts::SQRT_2;
    for l in 0..=lmax {
        let base = l * l + l;
        values[base] = normalization(l, 0) * legendre[tri_index(l, 0)];
        for m in 1..=l {
            let norm = normalization(l, m) * legendre[tri_index(l, m)];
            values[base + m] = sqrt2 * norm * cos_m[m];
            values[base - m] = sqrt2 * norm * sin_m[m];
        }
    }

    values
}

/// Associated Legendre values `P_l^m(cosθ)` (no Condon–Shortley phase) for
/// `0 ≤ m ≤ l ≤ lmax`, packed by [`tri_index`].
fn associated_legendre(lmax: usize, cos_theta: f64, sin_theta: f64) -> Vec<f64> {
    let size = (lmax + 1) * (lmax + 2) / 2;
    let mut p = vec![0.0; size];
    p[0] = 1.0;

    // Diagonal: P_m^m = (2m-1)!! sinθ^m.
    for m in 1..=lmax {
        p[tri_index(m, m)] = p[tri_index(m - 1, m - 1)] * (2.0 * m as f64 - 1.0) * sin_theta;
    }
    // First off-diagonal: P_{m+1}^m = (2m+1) cosθ P_m^m.
    for m in 0..lmax {
        p[tri_index(m + 1, m)] = (2.0 * m as f64 + 1.0) * cos_theta * p[tri_index(m, m)];
    }
    // Upward in l.
    for m in 0..=lmax {
        for l in (m + 2)..=lmax {
            let lf = l as f64;
            let mf = m as f64;
            p[tri_index(l, m)] = ((2.0 * lf - 1.0) * cos_theta * p[tri_index(l - 1, m)]
                - (lf + mf - 1.0) * p[tri_index(l - 2, m)])
                / (lf - mf);
        }
    }

    p
}

#[inline]
fn tri_index(l: usize, m: usize) -> usize {
    l * (l + 1) / 2 + m
}

/// `sqrt((2l+1)/(4π) · (l-m)!/(l+m)!)`, with the factorial ratio built
/// incrementally to avoid large intermediates.
fn normalization(l: usize, m: usize) -> f64 {
    let mut ratio = 1.0;
    for k in (l - m + 1)..=(l + m) {
        ratio /= k as f64;
    }
    ((2.0 * l as f64 + 1.0) / (4.0 * std::f64::consts::PI) * ratio).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit(v: [f64; 3]) -> [f64; 3] {
        let n = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        [v[0] / n, v[1] / n, v[2] / n]
    }

    #[test]
    fn monopole_is_constant() {
        for direction in [[0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.3, -0.4, 0.5]] {
            let values = eval(0, unit(direction));
            assert_relative_eq!(values[0], 0.28209479177387814, epsilon = 1e-12);
        }
    }

    #[test]
    fn dipole_matches_closed_form() {
        let u = unit([0.2, -0.3, 0.8]);
        let values = eval(1, u);
        let k = (3.0 / (4.0 * std::f64::consts::PI)).sqrt();
        // Real l=1 harmonics are k·y, k·z, k·x at indices 1, 2, 3.
        assert_relative_eq!(values[1], k * u[1], epsilon = 1e-12);
        assert_relative_eq!(values[2], k * u[2], epsilon = 1e-12);
        assert_relative_eq!(values[3], k * u[0], epsilon = 1e-12);
    }

    #[test]
    fn addition_theorem_holds_per_order() {
        let directions = [
            unit([1.0, 2.0, 3.0]),
            unit([-0.5, 0.1, 0.2]),
            [0.0, 0.0, 1.0],
            unit([1.0, -1.0, 0.0]),
        ];
        for direction in directions {
            let values = eval(8, direction);
            for l in 0..=8usize {
                let sum: f64 = (0..(2 * l + 1))
                    .map(|k| values[l * l + k] * values[l * l + k])
                    .sum();
                let expected = (2.0 * l as f64 + 1.0) / (4.0 * std::f64::consts::PI);
                assert_relative_eq!(sum, expected, epsilon = 1e-10);
            }
        }
    }
}
