// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Papercut.

use thiserror::Error;

/// Top-level error type for all Papercut operations.
///
/// A detector fallback is not an error; it is reported through
/// [`crate::DetectionSource::Fallback`].
#[derive(Debug, Error)]
pub enum PapercutError {
    // -- Input --
    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("image has no pixels")]
    EmptyImage,

    // -- Geometry --
    #[error("invalid document geometry: {0}")]
    InvalidGeometry(String),

    // -- Output --
    #[error("image encoding failed: {0}")]
    Encode(String),

    // -- Configuration / runtime --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("background worker failed: {0}")]
    Worker(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PapercutError {
    /// True for errors that mean the input could not be read as an image.
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::EmptyImage)
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PapercutError>;
