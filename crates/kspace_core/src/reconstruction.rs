//! Image reconstruction from k-space and reference-relative normalization.
//!
//! Every filtered variant removes energy from the spectrum, so each raw
//! reconstruction comes out dimmer than the full one. Dividing all variants
//! by the full reconstruction's maximum keeps their pixel magnitudes on one
//! shared scale; normalizing each by its own maximum would rescale contrast
//! and make cross-variant error comparisons meaningless.

use ndarray::{Array2, ArrayView2};
use rustfft::num_complex::Complex;

use crate::float_trait::KspaceFloat;
use crate::transforms::{kspace_to_image, kspace_to_image_with_plans, FftPlans};

/// Reconstruct the unnormalized magnitude image from centered k-space.
pub fn reconstruct_image<F: KspaceFloat>(kspace: ArrayView2<Complex<F>>) -> Array2<F> {
    kspace_to_image(kspace)
}

/// Reconstruct the unnormalized magnitude image, reusing pre-computed plans.
pub fn reconstruct_image_with_plans<F: KspaceFloat>(
    kspace: ArrayView2<Complex<F>>,
    plans: &FftPlans<F>,
) -> Array2<F> {
    kspace_to_image_with_plans(kspace, plans)
}

/// Divide every pixel by the reference maximum.
///
/// `ref_max` must come from the full (unfiltered) reconstruction, never from
/// the variant's own maximum. A zero `ref_max` (all-zero input) returns the
/// image unchanged instead of producing NaN/Inf.
pub fn normalize_by_reference<F: KspaceFloat>(image: ArrayView2<F>, ref_max: F) -> Array2<F> {
    if ref_max == F::zero() {
        return image.to_owned();
    }
    image.mapv(|v| v / ref_max)
}

/// Maximum pixel value of an image; used to derive the reference scale.
pub fn max_value<F: KspaceFloat>(image: ArrayView2<F>) -> F {
    image
        .iter()
        .fold(F::neg_infinity(), |acc, &v| if v > acc { v } else { acc })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::image_to_kspace;
    use ndarray::Array2;

    #[test]
    fn test_normalize_scales_to_unit_max() {
        let image = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c) as f64);
        let ref_max = max_value(image.view());
        let normalized = normalize_by_reference(image.view(), ref_max);

        assert!((max_value(normalized.view()) - 1.0).abs() < 1e-12);
        assert!((normalized[[1, 1]] - 5.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_zero_reference_returns_copy() {
        let image = Array2::from_shape_fn((3, 3), |(r, c)| (r + c) as f32);
        let out = normalize_by_reference(image.view(), 0.0);
        assert_eq!(out, image);

        let zeros = Array2::<f32>::zeros((3, 3));
        let out = normalize_by_reference(zeros.view(), 0.0);
        assert!(out.iter().all(|&v| v == 0.0));
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_reconstruct_zero_kspace_is_zero() {
        let kspace = Array2::zeros((8, 8));
        let image = reconstruct_image::<f64>(kspace.view());
        assert!(image.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_reconstruct_matches_forward_transform() {
        let image = Array2::from_shape_fn((8, 8), |(r, c)| ((r + c) % 2) as f64);
        let complex = crate::transforms::to_complex(image.view());
        let kspace = image_to_kspace(complex.view());
        let recon = reconstruct_image(kspace.view());

        for (a, b) in image.iter().zip(recon.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }
}
