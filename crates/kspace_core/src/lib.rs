//! K-Space Reconstruction Core Library
//!
//! Pure Rust implementation of a k-space sampling and filtering pipeline for
//! MRI-style frequency-domain experiments: forward/inverse 2D FFT with
//! centered k-space, partial-sampling and Gaussian low/high-pass filters,
//! reference-normalized reconstruction and image quality metrics. This crate
//! contains all algorithm logic without any I/O or rendering concerns.

pub mod filters;
pub mod float_trait;
pub mod metrics;
pub mod phantom;
pub mod pipeline;
pub mod reconstruction;
pub mod transforms;

// Re-export commonly used types at the crate root
pub use filters::{
    apply_highpass_filter, apply_lowpass_filter, gaussian_kspace_mask, simulate_partial_kspace,
};
pub use float_trait::KspaceFloat;
pub use metrics::{estimate_noise, mean_absolute_error, sharpness};
pub use phantom::{checkerboard, shepp_logan_phantom};
pub use pipeline::{
    compute_metrics, reconstruct_all_versions, run_pipeline, run_pipeline_with_cache,
    KspaceConfig, PipelineResult, ReconstructionCache, ReconstructionSet, Variant,
    VariantMetrics,
};
pub use reconstruction::{
    max_value, normalize_by_reference, reconstruct_image, reconstruct_image_with_plans,
};
pub use rustfft::num_complex::Complex;
pub use transforms::{
    fft2d, fftshift, ifft2d, ifftshift, image_to_kspace, image_to_kspace_with_plans,
    kspace_to_image, kspace_to_image_with_plans, to_complex, FftPlans,
};
