// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// papercut-engine — Geometric document detection and rectification.
//
// Finds a document's four corners in a photograph (with a whole-image
// fallback), warps the outlined quadrilateral to an upright rectangle, and
// produces cleaned-up "scanned" variants of the result.

pub mod codec;
pub mod geometry;
pub mod scan;
pub mod service;

// Re-export the primary types so callers can use `papercut_engine::Scanner` etc.
pub use scan::{
    ArtifactKind, CornerDetector, DragOutcome, ScanArtifacts, ScanEnhancer, ScanSession, rectify,
};
pub use service::Scanner;
