//! K-space filtering: partial sampling and Gaussian low/high-pass masks.
//!
//! All functions operate on a centered k-space array (zero frequency at
//! `[rows/2, cols/2]`, the output of the forward transform) and return a new
//! array of the same shape; inputs are never mutated. The low-pass and
//! high-pass masks sum to one everywhere, so the two filtered arrays add back
//! up to the original k-space exactly.

use ndarray::{s, Array2, ArrayView2};
use rustfft::num_complex::Complex;

use crate::float_trait::KspaceFloat;

/// Build a centered Gaussian mask for k-space filtering.
///
/// Each cell holds `exp(-d^2 / (2 sigma^2))` where `d` is the index distance
/// to the center cell `[rows/2, cols/2]` and `sigma = sigma_fraction *
/// max(rows, cols)`. Values lie in `(0, 1]` with the maximum of exactly 1 at
/// the center.
pub fn gaussian_kspace_mask<F: KspaceFloat>(
    shape: (usize, usize),
    sigma_fraction: F,
) -> Array2<F> {
    let (rows, cols) = shape;
    let center_r = (rows / 2) as isize;
    let center_c = (cols / 2) as isize;
    let sigma = sigma_fraction * F::usize_as(rows.max(cols));
    let denom = F::from_f64_c(2.0) * sigma * sigma;

    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let du = F::isize_as(r as isize - center_r);
        let dv = F::isize_as(c as isize - center_c);
        (-(du * du + dv * dv) / denom).exp()
    })
}

/// Simulate partial k-space acquisition by keeping only the centered
/// rectangular window whose half-extents are `floor(dim * fraction / 2)` per
/// axis; everything outside is zeroed.
///
/// Window bounds are clamped to the array, so the result is total and
/// deterministic for any non-negative `fraction` (odd dimensions keep the
/// sample below center, mirroring the floor-based half-extent).
pub fn simulate_partial_kspace<F: KspaceFloat>(
    kspace: ArrayView2<Complex<F>>,
    fraction: F,
) -> Array2<Complex<F>> {
    let (rows, cols) = kspace.dim();
    let center_r = rows / 2;
    let center_c = cols / 2;
    let two = F::from_f64_c(2.0);
    let half_r = (F::usize_as(rows) * fraction / two)
        .floor()
        .to_usize()
        .unwrap_or(0);
    let half_c = (F::usize_as(cols) * fraction / two)
        .floor()
        .to_usize()
        .unwrap_or(0);

    let r0 = center_r.saturating_sub(half_r);
    let r1 = (center_r + half_r).min(rows);
    let c0 = center_c.saturating_sub(half_c);
    let c1 = (center_c + half_c).min(cols);

    let mut output = Array2::zeros((rows, cols));
    output
        .slice_mut(s![r0..r1, c0..c1])
        .assign(&kspace.slice(s![r0..r1, c0..c1]));
    output
}

/// Apply a Gaussian low-pass filter to k-space (retains smooth content).
pub fn apply_lowpass_filter<F: KspaceFloat>(
    kspace: ArrayView2<Complex<F>>,
    sigma_fraction: F,
) -> Array2<Complex<F>> {
    let mask = gaussian_kspace_mask(kspace.dim(), sigma_fraction);
    Array2::from_shape_fn(kspace.dim(), |(r, c)| kspace[[r, c]] * mask[[r, c]])
}

/// Apply a Gaussian high-pass filter to k-space (retains edges and detail).
/// Complementary to [`apply_lowpass_filter`] for the same `sigma_fraction`.
pub fn apply_highpass_filter<F: KspaceFloat>(
    kspace: ArrayView2<Complex<F>>,
    sigma_fraction: F,
) -> Array2<Complex<F>> {
    let mask = gaussian_kspace_mask(kspace.dim(), sigma_fraction);
    Array2::from_shape_fn(kspace.dim(), |(r, c)| {
        kspace[[r, c]] * (F::one() - mask[[r, c]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn random_kspace(rows: usize, cols: usize, seed: u64) -> Array2<Complex<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array2::from_shape_fn((rows, cols), |_| {
            Complex::new(rng.gen::<f64>() - 0.5, rng.gen::<f64>() - 0.5)
        })
    }

    #[test]
    fn test_mask_bounds_and_center() {
        for &(rows, cols) in &[(32usize, 32usize), (15, 15), (16, 9)] {
            let mask = gaussian_kspace_mask::<f64>((rows, cols), 0.05);

            for &v in mask.iter() {
                assert!(v > 0.0 && v <= 1.0, "mask value {} out of (0, 1]", v);
            }

            assert!((mask[[rows / 2, cols / 2]] - 1.0).abs() < 1e-12);
            let max = mask.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(max, mask[[rows / 2, cols / 2]]);
        }
    }

    #[test]
    fn test_mask_decreases_away_from_center() {
        let mask = gaussian_kspace_mask::<f64>((64, 64), 0.05);
        assert!(mask[[32, 33]] < mask[[32, 32]]);
        assert!(mask[[32, 40]] < mask[[32, 33]]);
        assert!(mask[[0, 0]] < mask[[16, 16]]);
    }

    #[test]
    fn test_lowpass_highpass_complementarity() {
        let kspace = random_kspace(24, 17, 5);
        let low = apply_lowpass_filter(kspace.view(), 0.05);
        let high = apply_highpass_filter(kspace.view(), 0.05);
        let sum = &low + &high;

        for (a, b) in kspace.iter().zip(sum.iter()) {
            assert!((a - b).norm() < 1e-12, "lowpass + highpass != original");
        }
    }

    #[test]
    fn test_partial_energy_containment() {
        let (rows, cols) = (16, 16);
        let kspace = random_kspace(rows, cols, 21);
        let partial = simulate_partial_kspace(kspace.view(), 0.5);

        // fraction 0.5 on 16x16 keeps rows/cols 4..12
        for ((r, c), v) in partial.indexed_iter() {
            let inside = (4..12).contains(&r) && (4..12).contains(&c);
            if inside {
                assert_eq!(*v, kspace[[r, c]], "window content altered at {:?}", (r, c));
            } else {
                assert_eq!(v.norm(), 0.0, "energy outside window at {:?}", (r, c));
            }
        }
    }

    #[test]
    fn test_partial_full_fraction_keeps_even_array() {
        let kspace = random_kspace(8, 8, 3);
        let partial = simulate_partial_kspace(kspace.view(), 1.0);
        for (a, b) in kspace.iter().zip(partial.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_partial_odd_dimensions_deterministic() {
        let kspace = random_kspace(7, 7, 8);
        let partial = simulate_partial_kspace(kspace.view(), 0.5);

        // half-extent floor(7 * 0.5 / 2) = 1, center 3 -> window 2..4
        for ((r, c), v) in partial.indexed_iter() {
            let inside = (2..4).contains(&r) && (2..4).contains(&c);
            if inside {
                assert_eq!(*v, kspace[[r, c]]);
            } else {
                assert_eq!(v.norm(), 0.0);
            }
        }
    }

    #[test]
    fn test_filters_do_not_mutate_input() {
        let kspace = random_kspace(8, 8, 55);
        let snapshot = kspace.clone();
        let _ = simulate_partial_kspace(kspace.view(), 0.5);
        let _ = apply_lowpass_filter(kspace.view(), 0.05);
        let _ = apply_highpass_filter(kspace.view(), 0.05);
        assert_eq!(kspace, snapshot);
    }
}
