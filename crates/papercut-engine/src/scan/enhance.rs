// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan enhancement pipeline — turns a rectified colour crop into the
// "scanned" variants: untouched original, sharpened grayscale, and an
// adaptively binarized final result.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;
use papercut_core::{EnhanceConfig, Result};
use tracing::{debug, info, instrument};

use crate::codec::{encode_png, ensure_non_empty, save};

/// The three images produced for one rectified document.
#[derive(Debug, Clone)]
pub struct ScanArtifacts {
    /// The rectified image, unchanged.
    pub original: DynamicImage,
    /// Grayscale with unsharp masking applied.
    pub sharpened: GrayImage,
    /// Black-and-white result intended for OCR and archival.
    pub binarized: GrayImage,
}

/// Names the variants in [`ScanArtifacts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Original,
    Sharpened,
    Final,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [Self::Original, Self::Sharpened, Self::Final];

    /// Tab label shown to the user.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Original => "Original Scan",
            Self::Sharpened => "Grayscale + Sharpened",
            Self::Final => "Final Result",
        }
    }

    pub fn file_stem(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Sharpened => "sharpened",
            Self::Final => "final",
        }
    }
}

impl ScanArtifacts {
    /// The image downstream consumers (OCR, storage) should use.
    pub fn final_image(&self) -> &GrayImage {
        &self.binarized
    }

    pub fn to_dynamic(&self, kind: ArtifactKind) -> DynamicImage {
        match kind {
            ArtifactKind::Original => self.original.clone(),
            ArtifactKind::Sharpened => DynamicImage::ImageLuma8(self.sharpened.clone()),
            ArtifactKind::Final => DynamicImage::ImageLuma8(self.binarized.clone()),
        }
    }

    pub fn to_png_bytes(&self, kind: ArtifactKind) -> Result<Vec<u8>> {
        encode_png(&self.to_dynamic(kind))
    }

    /// Write every variant to `dir` as `<prefix>_<kind>.png`.
    ///
    /// The caller owns the files' lifetime.
    #[instrument(skip(self), fields(dir = %dir.as_ref().display()))]
    pub fn write_pngs(&self, dir: impl AsRef<Path>, prefix: &str) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(ArtifactKind::ALL.len());
        for kind in ArtifactKind::ALL {
            let path = dir.join(format!("{prefix}_{}.png", kind.file_stem()));
            save(&self.to_dynamic(kind), &path)?;
            written.push(path);
        }
        info!(files = written.len(), "Scan artifacts written");
        Ok(written)
    }
}

/// Cleans up rectified document images for reading and archival.
#[derive(Debug, Clone, Default)]
pub struct ScanEnhancer {
    config: EnhanceConfig,
}

impl ScanEnhancer {
    pub fn new(config: EnhanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EnhanceConfig {
        &self.config
    }

    /// Run the full enhancement pipeline:
    ///
    /// 1. Keep the rectified image as `original`
    /// 2. Convert to grayscale
    /// 3. Unsharp mask → `sharpened`
    /// 4. Adaptive binarization of `sharpened` → `binarized`
    ///
    /// Deterministic: identical input always yields identical output.
    #[instrument(skip_all, fields(width = rectified.width(), height = rectified.height()))]
    pub fn enhance(&self, rectified: &DynamicImage) -> Result<ScanArtifacts> {
        ensure_non_empty(rectified)?;
        info!("Running scan enhancement pipeline");

        let gray = rectified.to_luma8();
        let sharpened = self.sharpen(&gray);
        let binarized = self.binarize(&sharpened);

        Ok(ScanArtifacts {
            original: rectified.clone(),
            sharpened,
            binarized,
        })
    }

    /// Unsharp masking: `amount * gray + (1 - amount) * blurred`, rounded and
    /// saturated to `u8`.
    #[instrument(skip_all)]
    pub fn sharpen(&self, gray: &GrayImage) -> GrayImage {
        let amount = self.config.sharpen_amount;
        let blurred = gaussian_blur_f32(gray, self.config.sharpen_sigma);
        debug!(sigma = self.config.sharpen_sigma, amount, "Unsharp mask");

        GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            let original = gray.get_pixel(x, y).0[0] as f32;
            let soft = blurred.get_pixel(x, y).0[0] as f32;
            let value = amount * original + (1.0 - amount) * soft;
            Luma([value.round().clamp(0.0, 255.0) as u8])
        })
    }

    /// Adaptive thresholding to a black-and-white image.
    ///
    /// For each pixel the threshold is the mean intensity of the
    /// `(2r + 1)²` neighbourhood (clipped at the borders) minus the offset.
    /// Pixels darker than their threshold become black; others white.
    #[instrument(skip_all)]
    pub fn binarize(&self, gray: &GrayImage) -> GrayImage {
        let block_radius = self.config.threshold_block_radius;
        let offset = self.config.threshold_offset;
        debug!(block_radius, offset, "Applying adaptive binarization");

        let (width, height) = gray.dimensions();
        let integral = compute_integral_image(gray);

        GrayImage::from_fn(width, height, |x, y| {
            let local_mean = region_mean(&integral, width, height, x, y, block_radius);
            let threshold = (local_mean.round() as i32 - offset).clamp(0, 255);
            let value = gray.get_pixel(x, y).0[0] as i32;
            Luma([if value < threshold { 0u8 } else { 255u8 }])
        })
    }
}

// -- Integral image helpers ---------------------------------------------------

/// Summed-area table of a grayscale image.
///
/// `integral[y * (width+1) + x]` holds the sum of all pixels in `[0, x) x
/// [0, y)`; the table is `(width+1) x (height+1)` with a zero border.
fn compute_integral_image(gray: &GrayImage) -> Vec<u64> {
    let (w, h) = gray.dimensions();
    let stride = (w + 1) as usize;
    let mut table = vec![0u64; stride * (h + 1) as usize];

    for y in 0..h {
        let mut row_sum: u64 = 0;
        for x in 0..w {
            row_sum += gray.get_pixel(x, y).0[0] as u64;
            let idx = (y + 1) as usize * stride + (x + 1) as usize;
            let above = y as usize * stride + (x + 1) as usize;
            table[idx] = row_sum + table[above];
        }
    }

    table
}

/// Mean pixel value of the square of `radius` around (cx, cy), clipped to the
/// image, looked up from the summed-area table.
fn region_mean(
    integral: &[u64],
    img_width: u32,
    img_height: u32,
    cx: u32,
    cy: u32,
    radius: u32,
) -> f64 {
    let stride = (img_width + 1) as usize;

    let x1 = cx.saturating_sub(radius) as usize;
    let y1 = cy.saturating_sub(radius) as usize;
    let x2 = (cx as usize + radius as usize + 1).min(img_width as usize);
    let y2 = (cy as usize + radius as usize + 1).min(img_height as usize);

    let area = ((x2 - x1) * (y2 - y1)) as f64;
    if area == 0.0 {
        return 128.0;
    }

    // S = I[y2][x2] - I[y1][x2] - I[y2][x1] + I[y1][x1]
    let sum = integral[y2 * stride + x2] as f64 - integral[y1 * stride + x2] as f64
        - integral[y2 * stride + x1] as f64
        + integral[y1 * stride + x1] as f64;

    sum / area
}
