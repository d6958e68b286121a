//! 2D transforms between image space and centered k-space.
//!
//! The forward direction is `fftshift(fft2d(image))`: an unnormalized 2D FFT
//! followed by a quadrant shift that places the zero-frequency (DC) sample at
//! the geometric center of the array. The inverse direction undoes the shift,
//! applies the normalized inverse FFT and takes the complex magnitude.
//!
//! The shift pair is asymmetric on odd dimensions: `fftshift` rolls each axis
//! by `floor(n/2)` while `ifftshift` rolls by `ceil(n/2)`, so the two are
//! exact mutual inverses for every array shape.

use ndarray::{Array2, ArrayView2};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::float_trait::KspaceFloat;

/// Pre-computed FFT plans for one array shape.
///
/// Reusing plans avoids repeated planner initialization when several filtered
/// variants of the same k-space array are inverted back to back. Row plans
/// have length `cols`, column plans have length `rows`, so non-square arrays
/// are supported.
pub struct FftPlans<F: KspaceFloat> {
    fft_row: Arc<dyn Fft<F>>,
    fft_col: Arc<dyn Fft<F>>,
    ifft_row: Arc<dyn Fft<F>>,
    ifft_col: Arc<dyn Fft<F>>,
}

impl<F: KspaceFloat> FftPlans<F> {
    /// Create plans for arrays of the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft_row = planner.plan_fft_forward(cols);
        let fft_col = planner.plan_fft_forward(rows);
        let ifft_row = planner.plan_fft_inverse(cols);
        let ifft_col = planner.plan_fft_inverse(rows);

        Self {
            fft_row,
            fft_col,
            ifft_row,
            ifft_col,
        }
    }
}

/// Lift a real-valued image into the complex plane (imaginary part zero).
pub fn to_complex<F: KspaceFloat>(image: ArrayView2<F>) -> Array2<Complex<F>> {
    image.mapv(|v| Complex::new(v, F::zero()))
}

/// Compute the unnormalized 2D FFT of a complex array using pre-computed plans.
pub fn fft2d<F: KspaceFloat>(
    input: ArrayView2<Complex<F>>,
    plans: &FftPlans<F>,
) -> Array2<Complex<F>> {
    let (rows, cols) = input.dim();

    // 1. Transform rows
    let mut intermediate = Array2::<Complex<F>>::zeros((rows, cols));
    let mut row_vec = vec![Complex::new(F::zero(), F::zero()); cols];

    for r in 0..rows {
        for (c, &v) in input.row(r).iter().enumerate() {
            row_vec[c] = v;
        }
        plans.fft_row.process(&mut row_vec);
        for c in 0..cols {
            intermediate[[r, c]] = row_vec[c];
        }
    }

    // 2. Transform columns
    let mut output = Array2::<Complex<F>>::zeros((rows, cols));
    let mut col_vec = vec![Complex::new(F::zero(), F::zero()); rows];

    for c in 0..cols {
        for r in 0..rows {
            col_vec[r] = intermediate[[r, c]];
        }
        plans.fft_col.process(&mut col_vec);
        for r in 0..rows {
            output[[r, c]] = col_vec[r];
        }
    }

    output
}

/// Compute the 2D inverse FFT of a complex array using pre-computed plans.
/// Normalizes by 1/(rows*cols) so that `ifft2d(fft2d(x)) == x`.
pub fn ifft2d<F: KspaceFloat>(
    input: ArrayView2<Complex<F>>,
    plans: &FftPlans<F>,
) -> Array2<Complex<F>> {
    let (rows, cols) = input.dim();

    // 1. Transform columns
    let mut intermediate = input.to_owned();
    let mut col_vec = vec![Complex::new(F::zero(), F::zero()); rows];

    for c in 0..cols {
        for r in 0..rows {
            col_vec[r] = intermediate[[r, c]];
        }
        plans.ifft_col.process(&mut col_vec);
        for r in 0..rows {
            intermediate[[r, c]] = col_vec[r];
        }
    }

    // 2. Transform rows
    let mut output = Array2::<Complex<F>>::zeros((rows, cols));
    let norm_factor = F::one() / F::usize_as(rows * cols);
    let mut row_vec = vec![Complex::new(F::zero(), F::zero()); cols];

    for r in 0..rows {
        for c in 0..cols {
            row_vec[c] = intermediate[[r, c]];
        }
        plans.ifft_row.process(&mut row_vec);
        for c in 0..cols {
            output[[r, c]] = row_vec[c] * norm_factor;
        }
    }

    output
}

/// Shift the zero-frequency sample from index `[0, 0]` to the array center
/// `[rows/2, cols/2]` by rolling each axis by `floor(n/2)`.
pub fn fftshift<T: Copy>(input: ArrayView2<T>) -> Array2<T> {
    let (rows, cols) = input.dim();
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        input[[(r + rows - rows / 2) % rows, (c + cols - cols / 2) % cols]]
    })
}

/// Exact inverse of [`fftshift`]: rolls each axis by `ceil(n/2)`, moving the
/// center sample back to index `[0, 0]`. Differs from `fftshift` whenever a
/// dimension has odd length.
pub fn ifftshift<T: Copy>(input: ArrayView2<T>) -> Array2<T> {
    let (rows, cols) = input.dim();
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        input[[(r + rows / 2) % rows, (c + cols / 2) % cols]]
    })
}

/// Convert an image to centered k-space, reusing the given plans.
pub fn image_to_kspace_with_plans<F: KspaceFloat>(
    image: ArrayView2<Complex<F>>,
    plans: &FftPlans<F>,
) -> Array2<Complex<F>> {
    let freq = fft2d(image, plans);
    fftshift(freq.view())
}

/// Convert an image to centered k-space (zero frequency at the array center).
pub fn image_to_kspace<F: KspaceFloat>(image: ArrayView2<Complex<F>>) -> Array2<Complex<F>> {
    let (rows, cols) = image.dim();
    let plans = FftPlans::new(rows, cols);
    image_to_kspace_with_plans(image, &plans)
}

/// Invert centered k-space back to a non-negative magnitude image, reusing
/// the given plans.
pub fn kspace_to_image_with_plans<F: KspaceFloat>(
    kspace: ArrayView2<Complex<F>>,
    plans: &FftPlans<F>,
) -> Array2<F> {
    let unshifted = ifftshift(kspace);
    let spatial = ifft2d(unshifted.view(), plans);
    spatial.mapv(|v| v.norm())
}

/// Invert centered k-space back to a non-negative magnitude image.
pub fn kspace_to_image<F: KspaceFloat>(kspace: ArrayView2<Complex<F>>) -> Array2<F> {
    let (rows, cols) = kspace.dim();
    let plans = FftPlans::new(rows, cols);
    kspace_to_image_with_plans(kspace, &plans)
}
