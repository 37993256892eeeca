//! Exponentially scaled modified spherical Bessel functions of the first
//! kind, `ĩ_l(x) = e^(-x) i_l(x)`.
//!
//! The Gaussian neighbor density expands onto spherical harmonics through
//! `i_l`; the scaled form keeps the radial integrand bounded (the `e^x`
//! growth of `i_l` cancels against the Gaussian envelope, leaving
//! `exp(-(u-r)²/2σ²)` factors).

/// Evaluates `ĩ_l(x)` for `l = 0..=lmax` at `x ≥ 0`.
///
/// Small arguments use the series `i_l(x) ≈ x^l / (2l+1)!!`; otherwise
/// Miller's downward recurrence, normalized against the closed form
/// `ĩ_0(x) = (1 - e^(-2x)) / (2x)`.
pub fn scaled_bessel_i(lmax: usize, x: f64) -> Vec<f64> {
    debug_assert!(x >= 0.0);

    if x < 1e-8 {
        let mut values = vec![0.0; lmax + 1];
        values[0] = 1.0;
        let mut term = 1.0;
        for l in 1..=lmax {
            term *= x / (2.0 * l as f64 + 1.0);
            values[l] = term;
        }
        return values;
    }

    // The start order must exceed both lmax and x for the seeded ratios to
    // converge to the true ones before l = lmax is reached.
    let start = lmax + 20 + x.ceil() as usize;
    let mut work = vec![0.0; start + 2];
    work[start + 1] = 0.0;
    work[start] = 1e-30;
    for l in (1..=start).rev() {
        work[l - 1] = work[l + 1] + (2.0 * l as f64 + 1.0) / x * work[l];
        if work[l - 1] > 1e280 {
            // Rescale to avoid overflow for small x; only ratios matter.
            for value in work[l - 1..].iter_mut() {
                *value *= 1e-280;
            }
        }
    }

    let scale = -f64::exp_m1(-2.0 * x) / (2.0 * x) / work[0];
    work[..=lmax].iter().map(|&v| v * scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scaled_i1(x: f64) -> f64 {
        // i_1(x) = (x cosh x - sinh x) / x²
        ((x - 1.0) + (x + 1.0) * (-2.0 * x).exp()) / (2.0 * x * x)
    }

    #[test]
    fn matches_closed_forms() {
        for x in [0.05, 0.5, 1.0, 3.0, 10.0, 40.0, 120.0] {
            let values = scaled_bessel_i(8, x);
            let i0 = -f64::exp_m1(-2.0 * x) / (2.0 * x);
            assert_relative_eq!(values[0], i0, max_relative = 1e-12);
            assert_relative_eq!(values[1], scaled_i1(x), max_relative = 1e-10);
        }
    }

    #[test]
    fn zero_argument_selects_the_monopole() {
        let values = scaled_bessel_i(6, 0.0);
        assert_eq!(values[0], 1.0);
        for &v in &values[1..] {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn decreases_with_order() {
        for x in [0.3, 2.0, 15.0] {
            let values = scaled_bessel_i(10, x);
            for l in 1..values.len() {
                assert!(values[l] < values[l - 1]);
                assert!(values[l] > 0.0);
            }
        }
    }

    #[test]
    fn recurrence_agrees_with_the_series_at_the_branch_point() {
        // At the branch threshold the recurrence path runs, but the series
        // i_l(x) = x^l / (2l+1)!! is exact to double precision there.
        let x = 1.0e-8;
        let values = scaled_bessel_i(4, x);
        assert_relative_eq!(values[0], 1.0, max_relative = 1e-7);
        let mut term = 1.0;
        for l in 1..=4 {
            term *= x / (2.0 * l as f64 + 1.0);
            assert_relative_eq!(values[l], term, max_relative = 1e-6);
        }
    }
}
