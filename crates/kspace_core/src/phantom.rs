//! Synthetic test images.
//!
//! The Shepp-Logan phantom is rendered directly from the standard ten-ellipse
//! parameter table (the modified, high-contrast variant), so no external
//! image data is needed to exercise the pipeline.

use ndarray::Array2;

use crate::float_trait::KspaceFloat;

/// Modified Shepp-Logan ellipses: intensity, semi-axis x, semi-axis y,
/// center x, center y, rotation in degrees. Coordinates live in [-1, 1]^2.
const SHEPP_LOGAN_ELLIPSES: [[f64; 6]; 10] = [
    [1.0, 0.69, 0.92, 0.0, 0.0, 0.0],
    [-0.8, 0.6624, 0.8740, 0.0, -0.0184, 0.0],
    [-0.2, 0.1100, 0.3100, 0.22, 0.0, -18.0],
    [-0.2, 0.1600, 0.4100, -0.22, 0.0, 18.0],
    [0.1, 0.2100, 0.2500, 0.0, 0.35, 0.0],
    [0.1, 0.0460, 0.0460, 0.0, 0.1, 0.0],
    [0.1, 0.0460, 0.0460, 0.0, -0.1, 0.0],
    [0.1, 0.0460, 0.0230, -0.08, -0.605, 0.0],
    [0.1, 0.0230, 0.0230, 0.0, -0.606, 0.0],
    [0.1, 0.0230, 0.0460, 0.06, -0.605, 0.0],
];

/// Render the modified Shepp-Logan phantom on a `size x size` grid.
///
/// Pixel intensities are the summed ellipse contributions, lying in [0, 1]
/// with zero background outside the skull ellipse.
pub fn shepp_logan_phantom<F: KspaceFloat>(size: usize) -> Array2<F> {
    let half = (size as f64 - 1.0) / 2.0;

    Array2::from_shape_fn((size, size), |(r, c)| {
        // Map pixel indices to [-1, 1]^2 with y pointing up.
        let x = (c as f64 - half) / half;
        let y = (half - r as f64) / half;

        let mut value = 0.0;
        for e in &SHEPP_LOGAN_ELLIPSES {
            let [intensity, a, b, x0, y0, phi_deg] = *e;
            let phi = phi_deg.to_radians();
            let (sin_phi, cos_phi) = phi.sin_cos();

            let dx = x - x0;
            let dy = y - y0;
            let u = (dx * cos_phi + dy * sin_phi) / a;
            let v = (dy * cos_phi - dx * sin_phi) / b;
            if u * u + v * v <= 1.0 {
                value += intensity;
            }
        }

        // Summed intensities cancel to zero inside the ventricles; guard the
        // few ULPs of rounding below zero.
        F::from_f64_c(value.max(0.0))
    })
}

/// Binary checkerboard test pattern with `tile x tile` squares.
pub fn checkerboard<F: KspaceFloat>(size: usize, tile: usize) -> Array2<F> {
    let tile = tile.max(1);
    Array2::from_shape_fn((size, size), |(r, c)| {
        if (r / tile + c / tile) % 2 == 0 {
            F::zero()
        } else {
            F::one()
        }
    })
}
