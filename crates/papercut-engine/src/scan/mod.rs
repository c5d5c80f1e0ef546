// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — corner detection, perspective rectification, scan
// enhancement, and the interactive correction session that ties them together.

pub mod detect;
pub mod enhance;
pub mod preview;
pub mod rectify;
pub mod session;

pub use detect::{CornerDetector, fallback_quad};
pub use enhance::{ArtifactKind, ScanArtifacts, ScanEnhancer};
pub use preview::draw_quad;
pub use rectify::rectify;
pub use session::{DragOutcome, ScanSession};
