//! Batch front end for the k-space reconstruction pipeline.
//!
//! `process` runs the pipeline over the built-in synthetic datasets and saves
//! every artifact (originals, k-space views, reconstructions, raw dumps).
//! `analyze` re-reports quality metrics, preferring the raw dumps from an
//! earlier `process` run over recomputation, and writes difference maps
//! against the reference reconstruction.

mod io;
mod report;

use io::{save_image_png, save_kspace_pngs, save_rescaled_png, variant_slug, DiskCache};
use kspace_core::{
    checkerboard, compute_metrics, image_to_kspace, reconstruct_all_versions,
    run_pipeline_with_cache, shepp_logan_phantom, to_complex, KspaceConfig, ReconstructionCache,
    Variant, VariantMetrics,
};
use ndarray::Array2;
use rayon::prelude::*;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

const DEFAULT_OUTPUT_DIR: &str = "kspace_results";

const PARTIAL_FRACTION_ENV: &str = "KSPACE_PARTIAL_FRACTION";
const LOWPASS_SIGMA_ENV: &str = "KSPACE_LOWPASS_SIGMA";
const HIGHPASS_SIGMA_ENV: &str = "KSPACE_HIGHPASS_SIGMA";

const PHANTOM_SIZE: usize = 400;
const CHECKERBOARD_SIZE: usize = 256;
const CHECKERBOARD_TILE: usize = 32;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("process");
    let output_dir = PathBuf::from(
        args.get(2)
            .map(String::as_str)
            .unwrap_or(DEFAULT_OUTPUT_DIR),
    );

    fs::create_dir_all(&output_dir)
        .map_err(|e| format!("cannot create {}: {}", output_dir.display(), e))?;

    let config = config_from_env();
    config.validate()?;

    match command {
        "process" => process_all(&output_dir, &config),
        "analyze" => analyze_all(&output_dir, &config),
        other => Err(format!(
            "unknown command '{}'; expected 'process' or 'analyze'",
            other
        )),
    }
}

/// Pipeline configuration from defaults plus environment overrides.
fn config_from_env() -> KspaceConfig<f32> {
    let defaults = KspaceConfig::default();
    KspaceConfig {
        partial_fraction: env_override(PARTIAL_FRACTION_ENV, defaults.partial_fraction),
        lowpass_sigma_fraction: env_override(LOWPASS_SIGMA_ENV, defaults.lowpass_sigma_fraction),
        highpass_sigma_fraction: env_override(HIGHPASS_SIGMA_ENV, defaults.highpass_sigma_fraction),
        ..defaults
    }
}

fn env_override(name: &str, default: f32) -> f32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Built-in synthetic datasets processed by both commands.
fn datasets() -> Vec<(&'static str, Array2<f32>)> {
    vec![
        ("shepp_logan", shepp_logan_phantom(PHANTOM_SIZE)),
        (
            "checkerboard",
            checkerboard(CHECKERBOARD_SIZE, CHECKERBOARD_TILE),
        ),
    ]
}

fn process_all(output_dir: &Path, config: &KspaceConfig<f32>) -> Result<(), String> {
    println!("K-space processing");

    // Datasets are independent, so they can run in parallel.
    let summaries = datasets()
        .into_par_iter()
        .map(|(name, image)| {
            process_dataset(name, &image, output_dir, config)
                .map(|(metrics, secs)| (name, metrics, secs))
        })
        .collect::<Result<Vec<_>, String>>()?;

    for (name, metrics, secs) in &summaries {
        report::print_metrics_table(name, metrics);
        println!("Processed {} in {:.2}s", name, secs);
    }

    println!("\nAll results in: {}", output_dir.display());
    Ok(())
}

/// Run the full pipeline over one dataset and save every artifact.
fn process_dataset(
    prefix: &str,
    image: &Array2<f32>,
    output_dir: &Path,
    config: &KspaceConfig<f32>,
) -> Result<(Vec<VariantMetrics<f32>>, f64), String> {
    let start = Instant::now();

    save_image_png(
        &output_dir.join(format!("{}_original.png", prefix)),
        image.view(),
    )
    .map_err(|e| e.to_string())?;

    let complex = to_complex(image.view());
    let kspace = image_to_kspace(complex.view());
    save_kspace_pngs(output_dir, prefix, kspace.view()).map_err(|e| e.to_string())?;

    let set = reconstruct_all_versions(kspace.view(), config)?;
    let metrics = compute_metrics(&set, config)?;

    for variant in Variant::ALL {
        let path = output_dir.join(format!("{}_recon_{}.png", prefix, variant_slug(variant)));
        save_image_png(&path, set.get(variant)).map_err(|e| e.to_string())?;
    }

    // Raw dumps let a later analyze run skip the FFT work entirely.
    let mut cache = DiskCache::new(output_dir);
    cache.insert(prefix, &set);

    Ok((metrics, start.elapsed().as_secs_f64()))
}

fn analyze_all(output_dir: &Path, config: &KspaceConfig<f32>) -> Result<(), String> {
    println!("K-space image quality analysis");

    for (name, image) in datasets() {
        let mut cache = DiskCache::new(output_dir);
        if cache.has(name) {
            println!("\nUsing raw reconstruction dumps for {}", name);
        } else {
            println!("\nNo raw dumps found for {}; recomputing from source", name);
        }

        let complex = to_complex(image.view());
        let result = run_pipeline_with_cache(name, complex.view(), config, &mut cache)?;

        report::print_metrics_table(name, &result.metrics);

        for variant in [Variant::Partial, Variant::LowPass, Variant::HighPass] {
            let variant_img = result.recons.get(variant);
            let diff = Array2::from_shape_fn(result.recons.full.dim(), |(r, c)| {
                (result.recons.full[[r, c]] - variant_img[[r, c]]).abs()
            });
            let path = output_dir.join(format!("{}_diff_{}.png", name, variant_slug(variant)));
            save_rescaled_png(&path, diff.view()).map_err(|e| e.to_string())?;
        }
    }

    println!("\nAnalysis artifacts in: {}", output_dir.display());
    Ok(())
}
