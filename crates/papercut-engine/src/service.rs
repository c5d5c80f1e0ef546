// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner service: the entry point front ends construct once from a
// validated config and share by clone across concurrent scans.

use std::sync::Arc;

use image::DynamicImage;
use papercut_core::{
    Detection, DetectionSource, PapercutError, Quad, Result, ScanConfig, ScanReport,
};
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::scan::{CornerDetector, ScanArtifacts, ScanEnhancer, ScanSession, rectify};

/// Shared document-scanning pipeline.
///
/// All fields sit behind one `Arc`, so clones can be moved into worker
/// threads or async tasks freely.
#[derive(Debug, Clone)]
pub struct Scanner {
    inner: Arc<ScannerInner>,
}

#[derive(Debug)]
struct ScannerInner {
    config: ScanConfig,
    detector: CornerDetector,
    enhancer: ScanEnhancer,
}

impl Scanner {
    /// Build the pipeline. Fails if `config` does not validate.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        info!(
            working_height = config.detector.working_height,
            display_max = config.display.max_dimension,
            "Scanner initialised"
        );
        Ok(Self {
            inner: Arc::new(ScannerInner {
                detector: CornerDetector::new(config.detector.clone()),
                enhancer: ScanEnhancer::new(config.enhance.clone()),
                config,
            }),
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.inner.config
    }

    /// Corner detection in original-image space (see [`CornerDetector::detect`]).
    pub fn detect(&self, image: &DynamicImage) -> Result<Detection> {
        self.inner.detector.detect(image)
    }

    /// Perspective rectification; `quad` must be in `image`'s coordinate space.
    pub fn rectify(&self, image: &DynamicImage, quad: &Quad) -> Result<DynamicImage> {
        rectify(image, quad)
    }

    pub fn enhance(&self, rectified: &DynamicImage) -> Result<ScanArtifacts> {
        self.inner.enhancer.enhance(rectified)
    }

    /// Rectify then enhance.
    #[instrument(skip_all)]
    pub fn process(&self, image: &DynamicImage, quad: &Quad) -> Result<ScanArtifacts> {
        let rectified = self.rectify(image, quad)?;
        self.enhance(&rectified)
    }

    /// Detect corners and open an interactive correction session.
    pub fn open_session(&self, image: DynamicImage) -> Result<ScanSession> {
        let detection = self.detect(&image)?;
        ScanSession::new(image, detection, &self.inner.config.display)
    }

    /// Open a session on caller-supplied corners (original space), skipping
    /// detection.
    pub fn open_session_with(&self, image: DynamicImage, corners: Quad) -> Result<ScanSession> {
        let detection = Detection {
            corners,
            source: DetectionSource::Manual,
        };
        ScanSession::new(image, detection, &self.inner.config.display)
    }

    /// Apply the session's current corners: map them back to original space,
    /// rectify the full-resolution photo, and enhance the result.
    #[instrument(skip_all, fields(session = %session.id()))]
    pub fn cutout(&self, session: &ScanSession) -> Result<(ScanArtifacts, ScanReport)> {
        let corners = session.original_corners();
        let artifacts = self.process(session.original(), &corners)?;
        let report = session.report(artifacts.original.width(), artifacts.original.height());
        info!(
            output_w = report.output_width,
            output_h = report.output_height,
            "Cutout complete"
        );
        Ok((artifacts, report))
    }

    /// Run detection on tokio's blocking pool.
    ///
    /// The returned handle is the one thing to await; dropping it abandons
    /// the result without cancelling the CPU work. Must be called from within
    /// a tokio runtime.
    pub fn detect_in_background(&self, image: Arc<DynamicImage>) -> JoinHandle<Result<Detection>> {
        let scanner = self.clone();
        tokio::task::spawn_blocking(move || scanner.detect(&image))
    }

    /// [`Self::detect_in_background`], awaited.
    pub async fn detect_async(&self, image: Arc<DynamicImage>) -> Result<Detection> {
        self.detect_in_background(image)
            .await
            .map_err(|err| PapercutError::Worker(format!("detection task failed: {err}")))?
    }
}

impl Default for Scanner {
    fn default() -> Self {
        let config = ScanConfig::default();
        Self {
            inner: Arc::new(ScannerInner {
                detector: CornerDetector::new(config.detector.clone()),
                enhancer: ScanEnhancer::new(config.enhance.clone()),
                config,
            }),
        }
    }
}
