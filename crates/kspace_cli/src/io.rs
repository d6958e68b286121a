//! Artifact saving and loading: display PNGs and raw float TIFF dumps.
//!
//! PNGs are 8-bit grayscale with a fixed [0, 1] display window so the four
//! reconstruction images of one dataset are directly comparable on screen.
//! Raw dumps keep the unnormalized float values so a later analysis run can
//! rebuild the exact reconstruction set without redoing any FFT work.

use image::GrayImage;
use ndarray::{Array2, ArrayView2};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};

use kspace_core::{
    max_value, normalize_by_reference, Complex, ReconstructionCache, ReconstructionSet, Variant,
};

#[derive(Debug)]
pub enum ArtifactError {
    Io(String),
    Tiff(String),
    Image(String),
    InvalidData(String),
}

impl std::fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(s) => write!(f, "IO error: {}", s),
            Self::Tiff(s) => write!(f, "TIFF error: {}", s),
            Self::Image(s) => write!(f, "Image error: {}", s),
            Self::InvalidData(s) => write!(f, "Invalid data: {}", s),
        }
    }
}

/// File suffix for one reconstruction variant.
pub fn variant_slug(variant: Variant) -> &'static str {
    match variant {
        Variant::Full => "full",
        Variant::Partial => "partial",
        Variant::LowPass => "lowpass",
        Variant::HighPass => "highpass",
    }
}

/// Save a [0, 1] image as an 8-bit grayscale PNG with a fixed display window.
pub fn save_image_png(path: &Path, image: ArrayView2<f32>) -> Result<(), ArtifactError> {
    let (rows, cols) = image.dim();
    let raw: Vec<u8> = image
        .iter()
        .map(|&v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();

    let png = GrayImage::from_raw(cols as u32, rows as u32, raw)
        .ok_or_else(|| ArtifactError::InvalidData("pixel buffer size mismatch".to_string()))?;
    png.save(path)
        .map_err(|e| ArtifactError::Image(e.to_string()))
}

/// Save an image rescaled by its own maximum (for difference maps and other
/// data without a natural [0, 1] window).
pub fn save_rescaled_png(path: &Path, image: ArrayView2<f32>) -> Result<(), ArtifactError> {
    let peak = max_value(image.view());
    let scaled = normalize_by_reference(image, peak);
    save_image_png(path, scaled.view())
}

/// Save the three standard k-space views: log-magnitude, phase, real part.
pub fn save_kspace_pngs(
    dir: &Path,
    prefix: &str,
    kspace: ArrayView2<Complex<f32>>,
) -> Result<(), ArtifactError> {
    // log(1 + |k|) tames the dynamic range; k-space has exact zeros.
    let mag_log = kspace.mapv(|v| (1.0 + v.norm()).ln());
    save_rescaled_png(&dir.join(format!("{}_mag.png", prefix)), mag_log.view())?;

    let two_pi = 2.0 * std::f32::consts::PI;
    let phase = kspace.mapv(|v| (v.arg() + std::f32::consts::PI) / two_pi);
    save_image_png(&dir.join(format!("{}_phase.png", prefix)), phase.view())?;

    let re_min = kspace.iter().map(|v| v.re).fold(f32::INFINITY, f32::min);
    let re_max = kspace.iter().map(|v| v.re).fold(f32::NEG_INFINITY, f32::max);
    let span = if re_max > re_min { re_max - re_min } else { 1.0 };
    let real = kspace.mapv(|v| (v.re - re_min) / span);
    save_image_png(&dir.join(format!("{}_kspace.png", prefix)), real.view())
}

/// Write one unnormalized reconstruction as a 32-bit float TIFF.
pub fn save_raw_tiff(path: &Path, image: ArrayView2<f32>) -> Result<(), ArtifactError> {
    let file = File::create(path).map_err(|e| ArtifactError::Io(e.to_string()))?;
    let mut encoder =
        TiffEncoder::new(BufWriter::new(file)).map_err(|e| ArtifactError::Tiff(e.to_string()))?;

    let (rows, cols) = image.dim();
    let data: Vec<f32> = image.iter().copied().collect();
    encoder
        .write_image::<colortype::Gray32Float>(cols as u32, rows as u32, &data)
        .map_err(|e| ArtifactError::Tiff(e.to_string()))?;
    Ok(())
}

/// Read a 32-bit float TIFF back into an array.
pub fn load_raw_tiff(path: &Path) -> Result<Array2<f32>, ArtifactError> {
    let file = File::open(path).map_err(|e| ArtifactError::Io(e.to_string()))?;
    let mut decoder =
        Decoder::new(BufReader::new(file)).map_err(|e| ArtifactError::Tiff(e.to_string()))?;

    let (cols, rows) = decoder
        .dimensions()
        .map_err(|e| ArtifactError::Tiff(e.to_string()))?;

    match decoder
        .read_image()
        .map_err(|e| ArtifactError::Tiff(e.to_string()))?
    {
        DecodingResult::F32(data) => Array2::from_shape_vec((rows as usize, cols as usize), data)
            .map_err(|e| ArtifactError::InvalidData(e.to_string())),
        _ => Err(ArtifactError::InvalidData(
            "expected 32-bit float samples".to_string(),
        )),
    }
}

/// Reconstruction cache backed by raw TIFF dumps on disk.
///
/// `insert` writes the four unnormalized reconstructions; `lookup` reads them
/// back and re-derives the shared reference maximum from the full variant, so
/// no side-channel metadata file is needed.
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn raw_path(&self, key: &str, variant: Variant) -> PathBuf {
        self.dir
            .join(format!("{}_recon_{}_raw.tiff", key, variant_slug(variant)))
    }

    /// Whether raw dumps exist for this key (used for provenance reporting).
    pub fn has(&self, key: &str) -> bool {
        Variant::ALL
            .iter()
            .all(|&v| self.raw_path(key, v).is_file())
    }
}

impl ReconstructionCache<f32> for DiskCache {
    fn lookup(&self, key: &str) -> Option<ReconstructionSet<f32>> {
        let full_raw = load_raw_tiff(&self.raw_path(key, Variant::Full)).ok()?;
        let partial_raw = load_raw_tiff(&self.raw_path(key, Variant::Partial)).ok()?;
        let lowpass_raw = load_raw_tiff(&self.raw_path(key, Variant::LowPass)).ok()?;
        let highpass_raw = load_raw_tiff(&self.raw_path(key, Variant::HighPass)).ok()?;

        let ref_max = max_value(full_raw.view());
        Some(ReconstructionSet {
            full: normalize_by_reference(full_raw.view(), ref_max),
            partial: normalize_by_reference(partial_raw.view(), ref_max),
            lowpass: normalize_by_reference(lowpass_raw.view(), ref_max),
            highpass: normalize_by_reference(highpass_raw.view(), ref_max),
            ref_max,
        })
    }

    fn insert(&mut self, key: &str, set: &ReconstructionSet<f32>) {
        for variant in Variant::ALL {
            let raw = set.get(variant).mapv(|v| v * set.ref_max);
            let path = self.raw_path(key, variant);
            if let Err(e) = save_raw_tiff(&path, raw.view()) {
                eprintln!("Warning: could not write {}: {}", path.display(), e);
            }
        }
    }
}
