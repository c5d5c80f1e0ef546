// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan pipeline configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PapercutError, Result};

/// Tunables for the corner detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Height (px) the photo is resized to before edge detection.
    pub working_height: u32,
    /// Gaussian sigma applied before Canny (1.1 matches a 5x5 kernel).
    pub blur_sigma: f32,
    /// Canny hysteresis thresholds.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Radius of the square closing element (4 gives 9x9).
    pub close_radius: u8,
    /// How many of the largest contours are considered.
    pub max_candidates: usize,
    /// Polygon approximation tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_ratio: f64,
    /// Fraction of each dimension the fallback quad is inset by.
    pub fallback_inset: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            working_height: 500,
            blur_sigma: 1.1,
            canny_low: 75.0,
            canny_high: 200.0,
            close_radius: 4,
            max_candidates: 5,
            approx_epsilon_ratio: 0.02,
            fallback_inset: 0.10,
        }
    }
}

/// Tunables for the post-rectification clean-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Gaussian sigma of the unsharp-mask blur.
    pub sharpen_sigma: f32,
    /// Weight of the grayscale image; the blurred copy gets `1 - amount`.
    pub sharpen_amount: f32,
    /// Adaptive threshold neighbourhood radius (10 gives a 21x21 block).
    pub threshold_block_radius: u32,
    /// Subtracted from the local mean to form the threshold.
    pub threshold_offset: i32,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            sharpen_sigma: 3.0,
            sharpen_amount: 1.5,
            threshold_block_radius: 10,
            threshold_offset: 15,
        }
    }
}

/// Display scaling for interactive correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Longest side (px) of the image shown to the user.
    pub max_dimension: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { max_dimension: 800 }
    }
}

/// Complete pipeline settings, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub detector: DetectorConfig,
    pub enhance: EnhanceConfig,
    pub display: DisplayConfig,
}

impl ScanConfig {
    /// Read a config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detector;
        if d.working_height == 0 {
            return Err(invalid("detector.working_height must be non-zero"));
        }
        if !(d.blur_sigma > 0.0) {
            return Err(invalid("detector.blur_sigma must be positive"));
        }
        if !(d.canny_low >= 0.0 && d.canny_low <= d.canny_high) {
            return Err(invalid("detector.canny_low must be in [0, canny_high]"));
        }
        if d.max_candidates == 0 {
            return Err(invalid("detector.max_candidates must be non-zero"));
        }
        if !(d.approx_epsilon_ratio > 0.0 && d.approx_epsilon_ratio < 1.0) {
            return Err(invalid("detector.approx_epsilon_ratio must be in (0, 1)"));
        }
        if !(d.fallback_inset >= 0.0 && d.fallback_inset < 0.5) {
            return Err(invalid("detector.fallback_inset must be in [0, 0.5)"));
        }

        let e = &self.enhance;
        if !(e.sharpen_sigma > 0.0) {
            return Err(invalid("enhance.sharpen_sigma must be positive"));
        }
        if !e.sharpen_amount.is_finite() {
            return Err(invalid("enhance.sharpen_amount must be finite"));
        }

        if self.display.max_dimension == 0 {
            return Err(invalid("display.max_dimension must be non-zero"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> PapercutError {
    PapercutError::Config(msg.to_owned())
}
