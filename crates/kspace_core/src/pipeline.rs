//! K-space reconstruction pipeline.
//!
//! Sequences the transform, filtering, reconstruction and metric stages over
//! one input image to produce the four canonical reconstructions (full,
//! partial, low-pass, high-pass) plus their quality metrics. The pipeline is
//! linear: forward transform, variant derivation, reconstruction under a
//! shared normalization scale, metric computation. There is no retry logic
//! and no state kept across invocations.

use ndarray::{Array2, ArrayView2};
use rustfft::num_complex::Complex;

use crate::filters::{apply_highpass_filter, apply_lowpass_filter, simulate_partial_kspace};
use crate::float_trait::KspaceFloat;
use crate::metrics::{estimate_noise, mean_absolute_error, sharpness};
use crate::reconstruction::{max_value, normalize_by_reference, reconstruct_image_with_plans};
use crate::transforms::{image_to_kspace, FftPlans};

// =============================================================================
// Default parameters
// =============================================================================

/// Fraction of k-space retained by the partial sampling window.
const DEFAULT_PARTIAL_FRACTION: f64 = 0.5;

/// Gaussian sigma fraction for the low-pass filter.
const DEFAULT_LOWPASS_SIGMA_FRACTION: f64 = 0.05;

/// Gaussian sigma fraction for the high-pass filter.
const DEFAULT_HIGHPASS_SIGMA_FRACTION: f64 = 0.05;

/// Fraction of each image dimension used for the noise-estimation corner.
const DEFAULT_NOISE_CORNER_FRACTION: f64 = 0.08;

// =============================================================================
// Types
// =============================================================================

/// The four reconstruction variants produced from one k-space array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Complete k-space; the fidelity reference for all comparisons.
    Full,
    /// Central rectangular window only (undersampled acquisition).
    Partial,
    /// Gaussian low-pass filtered.
    LowPass,
    /// Gaussian high-pass filtered.
    HighPass,
}

impl Variant {
    /// All variants in pipeline order (reference first).
    pub const ALL: [Variant; 4] = [
        Variant::Full,
        Variant::Partial,
        Variant::LowPass,
        Variant::HighPass,
    ];

    /// Human-readable label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            Variant::Full => "Full k-space",
            Variant::Partial => "Partial k-space",
            Variant::LowPass => "Low-pass",
            Variant::HighPass => "High-pass",
        }
    }
}

/// Pipeline configuration.
///
/// All parameters have defaults matching the standard demonstration setup.
/// The struct is passed by reference into every entry point; there is no
/// process-wide mutable configuration.
#[derive(Debug, Clone)]
pub struct KspaceConfig<F: KspaceFloat> {
    /// Fraction of k-space kept by partial sampling. Default: 0.5
    pub partial_fraction: F,
    /// Sigma fraction of the low-pass Gaussian. Default: 0.05
    pub lowpass_sigma_fraction: F,
    /// Sigma fraction of the high-pass Gaussian. Default: 0.05
    pub highpass_sigma_fraction: F,
    /// Corner fraction for the noise estimate. Default: 0.08
    pub noise_corner_fraction: F,
}

impl<F: KspaceFloat> Default for KspaceConfig<F> {
    fn default() -> Self {
        Self {
            partial_fraction: F::from_f64_c(DEFAULT_PARTIAL_FRACTION),
            lowpass_sigma_fraction: F::from_f64_c(DEFAULT_LOWPASS_SIGMA_FRACTION),
            highpass_sigma_fraction: F::from_f64_c(DEFAULT_HIGHPASS_SIGMA_FRACTION),
            noise_corner_fraction: F::from_f64_c(DEFAULT_NOISE_CORNER_FRACTION),
        }
    }
}

impl<F: KspaceFloat> KspaceConfig<F> {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.partial_fraction <= F::zero() || self.partial_fraction > F::one() {
            return Err("partial_fraction must be in (0, 1]".to_string());
        }
        if self.lowpass_sigma_fraction <= F::zero() {
            return Err("lowpass_sigma_fraction must be > 0".to_string());
        }
        if self.highpass_sigma_fraction <= F::zero() {
            return Err("highpass_sigma_fraction must be > 0".to_string());
        }
        if self.noise_corner_fraction <= F::zero() || self.noise_corner_fraction > F::one() {
            return Err("noise_corner_fraction must be in (0, 1]".to_string());
        }
        Ok(())
    }
}

/// The four reconstructions derived from one k-space array, all normalized by
/// the same reference maximum (`ref_max`, the full reconstruction's peak).
#[derive(Debug, Clone)]
pub struct ReconstructionSet<F: KspaceFloat> {
    pub full: Array2<F>,
    pub partial: Array2<F>,
    pub lowpass: Array2<F>,
    pub highpass: Array2<F>,
    /// Shared normalization divisor; zero only for an all-zero input.
    pub ref_max: F,
}

impl<F: KspaceFloat> ReconstructionSet<F> {
    /// Borrow the image for one variant.
    pub fn get(&self, variant: Variant) -> ArrayView2<'_, F> {
        match variant {
            Variant::Full => self.full.view(),
            Variant::Partial => self.partial.view(),
            Variant::LowPass => self.lowpass.view(),
            Variant::HighPass => self.highpass.view(),
        }
    }
}

/// Quality metrics for one reconstruction variant.
#[derive(Debug, Clone, Copy)]
pub struct VariantMetrics<F: KspaceFloat> {
    pub variant: Variant,
    pub sharpness: F,
    pub noise: F,
    /// Mean absolute error against the full reconstruction; zero for the
    /// reference itself by definition.
    pub error: F,
}

/// Output of one pipeline invocation.
#[derive(Debug, Clone)]
pub struct PipelineResult<F: KspaceFloat> {
    pub recons: ReconstructionSet<F>,
    pub metrics: Vec<VariantMetrics<F>>,
}

/// Lookup for previously computed reconstruction sets.
///
/// The orchestrator consults this before recomputing a dataset; callers
/// decide what a key means (a dataset prefix) and where sets live (memory,
/// raw dumps on disk).
pub trait ReconstructionCache<F: KspaceFloat> {
    /// Return the stored set for `key`, if any.
    fn lookup(&self, key: &str) -> Option<ReconstructionSet<F>>;

    /// Store a freshly computed set under `key`.
    fn insert(&mut self, key: &str, set: &ReconstructionSet<F>);
}

// =============================================================================
// Pipeline stages
// =============================================================================

/// Reconstruct all four variants from centered k-space.
///
/// The full reconstruction is computed first; its maximum becomes the shared
/// normalization divisor for every variant.
pub fn reconstruct_all_versions<F: KspaceFloat>(
    kspace: ArrayView2<Complex<F>>,
    config: &KspaceConfig<F>,
) -> Result<ReconstructionSet<F>, String> {
    config.validate()?;

    let (rows, cols) = kspace.dim();
    let plans = FftPlans::new(rows, cols);

    let full_raw = reconstruct_image_with_plans(kspace, &plans);
    let ref_max = max_value(full_raw.view());
    let full = normalize_by_reference(full_raw.view(), ref_max);

    let partial_kspace = simulate_partial_kspace(kspace, config.partial_fraction);
    let partial_raw = reconstruct_image_with_plans(partial_kspace.view(), &plans);
    let partial = normalize_by_reference(partial_raw.view(), ref_max);

    let lowpass_kspace = apply_lowpass_filter(kspace, config.lowpass_sigma_fraction);
    let lowpass_raw = reconstruct_image_with_plans(lowpass_kspace.view(), &plans);
    let lowpass = normalize_by_reference(lowpass_raw.view(), ref_max);

    let highpass_kspace = apply_highpass_filter(kspace, config.highpass_sigma_fraction);
    let highpass_raw = reconstruct_image_with_plans(highpass_kspace.view(), &plans);
    let highpass = normalize_by_reference(highpass_raw.view(), ref_max);

    Ok(ReconstructionSet {
        full,
        partial,
        lowpass,
        highpass,
        ref_max,
    })
}

/// Compute sharpness, noise and error-vs-reference for every variant.
pub fn compute_metrics<F: KspaceFloat>(
    set: &ReconstructionSet<F>,
    config: &KspaceConfig<F>,
) -> Result<Vec<VariantMetrics<F>>, String> {
    let mut metrics = Vec::with_capacity(Variant::ALL.len());

    for variant in Variant::ALL {
        let image = set.get(variant);
        let error = if variant == Variant::Full {
            F::zero()
        } else {
            mean_absolute_error(set.full.view(), image)?
        };

        metrics.push(VariantMetrics {
            variant,
            sharpness: sharpness(image),
            noise: estimate_noise(image, config.noise_corner_fraction),
            error,
        });
    }

    Ok(metrics)
}

/// Run the complete pipeline over one spatial-domain image.
pub fn run_pipeline<F: KspaceFloat>(
    image: ArrayView2<Complex<F>>,
    config: &KspaceConfig<F>,
) -> Result<PipelineResult<F>, String> {
    let kspace = image_to_kspace(image);
    let recons = reconstruct_all_versions(kspace.view(), config)?;
    let metrics = compute_metrics(&recons, config)?;
    Ok(PipelineResult { recons, metrics })
}

/// Run the pipeline, reusing a previously computed reconstruction set for
/// `key` when the cache holds one. Metrics are always recomputed so they
/// reflect the current configuration.
pub fn run_pipeline_with_cache<F, C>(
    key: &str,
    image: ArrayView2<Complex<F>>,
    config: &KspaceConfig<F>,
    cache: &mut C,
) -> Result<PipelineResult<F>, String>
where
    F: KspaceFloat,
    C: ReconstructionCache<F>,
{
    config.validate()?;

    let recons = match cache.lookup(key) {
        Some(set) => set,
        None => {
            let kspace = image_to_kspace(image);
            let set = reconstruct_all_versions(kspace.view(), config)?;
            cache.insert(key, &set);
            set
        }
    };

    let metrics = compute_metrics(&recons, config)?;
    Ok(PipelineResult { recons, metrics })
}
