// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interactive scan session — holds one uploaded photo, its display-scaled
// copy, and the user-adjustable corners in display space.
//
// Corner identity is index-stable: index 0 is the top-left handle for the
// whole session. Drags are clamped to the display bounds, and a drag that
// would cross two edges or flip the quad's winding is rejected outright
// instead of re-ordering the corners under the user's finger.

use chrono::{DateTime, Utc};
use image::DynamicImage;
use image::imageops::FilterType;
use papercut_core::{
    Detection, DisplayConfig, DisplayQuad, DisplayScale, PapercutError, Point, Quad, Result,
    ScanReport, SessionId,
};
use tracing::{debug, info, instrument};

use crate::codec::ensure_non_empty;
use crate::geometry::{is_simple_quad, order_points, signed_area};

/// Result of a drag request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// The corners moved (possibly clamped to the display bounds).
    Moved,
    /// The move would have crossed corners; nothing changed.
    Rejected,
}

/// One photo being scanned.
#[derive(Debug, Clone)]
pub struct ScanSession {
    id: SessionId,
    created_at: DateTime<Utc>,
    original: DynamicImage,
    display: DynamicImage,
    scale: DisplayScale,
    detection: Detection,
    corners: DisplayQuad,
}

impl ScanSession {
    /// Start a session from a decoded photo and its detection result.
    ///
    /// Detected corners are ordered canonically once, here, so that handle
    /// indices mean top-left, top-right, bottom-right, bottom-left.
    #[instrument(skip_all, fields(width = original.width(), height = original.height()))]
    pub fn new(original: DynamicImage, detection: Detection, display: &DisplayConfig) -> Result<Self> {
        ensure_non_empty(&original)?;
        let (w, h) = (original.width(), original.height());
        let scale = DisplayScale::fit(w, h, display.max_dimension)?;
        let (display_w, display_h) = scale.display_size(w, h);
        let display_image = original.resize_exact(display_w, display_h, FilterType::Triangle);

        let ordered = order_points(&detection.corners);
        let corners = DisplayQuad(
            scale
                .to_display(&ordered)
                .0
                .map(|p| clamp_point(p, display_w as f32, display_h as f32)),
        );

        let session = Self {
            id: SessionId::new(),
            created_at: Utc::now(),
            original,
            display: display_image,
            scale,
            detection,
            corners,
        };
        info!(
            session = %session.id,
            ratio = scale.ratio(),
            display_w,
            display_h,
            fallback = detection.is_fallback(),
            "Scan session opened"
        );
        Ok(session)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The full-resolution photo.
    pub fn original(&self) -> &DynamicImage {
        &self.original
    }

    /// The scaled copy the corners are expressed against.
    pub fn display_image(&self) -> &DynamicImage {
        &self.display
    }

    pub fn scale(&self) -> DisplayScale {
        self.scale
    }

    pub fn detection(&self) -> &Detection {
        &self.detection
    }

    /// Current corners in display space.
    pub fn corners(&self) -> &DisplayQuad {
        &self.corners
    }

    /// Current corners mapped back to original-image space.
    pub fn original_corners(&self) -> Quad {
        self.scale.to_original(&self.corners)
    }

    /// Move corner `index` by a display-space delta.
    pub fn drag_corner(&mut self, index: usize, dx: f32, dy: f32) -> Result<DragOutcome> {
        check_index(index)?;
        Ok(self.try_move(&[index], dx, dy))
    }

    /// Move the edge from corner `index` to corner `index + 1` (mod 4) by a
    /// display-space delta. Both endpoints move together.
    pub fn drag_edge(&mut self, index: usize, dx: f32, dy: f32) -> Result<DragOutcome> {
        check_index(index)?;
        Ok(self.try_move(&[index, (index + 1) % 4], dx, dy))
    }

    /// Discard user edits and return to the detected corners.
    pub fn reset_corners(&mut self) {
        let (w, h) = self.display_bounds();
        let ordered = order_points(&self.detection.corners);
        self.corners = DisplayQuad(
            self.scale
                .to_display(&ordered)
                .0
                .map(|p| clamp_point(p, w, h)),
        );
    }

    /// Metadata for a cutout produced from this session's current corners.
    pub fn report(&self, output_width: u32, output_height: u32) -> ScanReport {
        ScanReport {
            session: self.id,
            created_at: self.created_at,
            source_width: self.original.width(),
            source_height: self.original.height(),
            corners: self.original_corners(),
            fallback: self.detection.is_fallback(),
            output_width,
            output_height,
        }
    }

    fn display_bounds(&self) -> (f32, f32) {
        (self.display.width() as f32, self.display.height() as f32)
    }

    fn try_move(&mut self, indices: &[usize], dx: f32, dy: f32) -> DragOutcome {
        let (w, h) = self.display_bounds();
        let current = self.corners.0;
        let mut candidate = current;
        for &i in indices {
            let p = candidate[i];
            candidate[i] = clamp_point(Point::new(p.x + dx, p.y + dy), w, h);
        }

        if candidate.iter().any(|p| !p.is_finite()) {
            debug!(?indices, dx, dy, "Drag rejected: non-finite delta");
            return DragOutcome::Rejected;
        }

        // A quad that is already tangled may be moved freely so the user can
        // untangle it; a valid one must stay valid.
        if is_simple_quad(&current) {
            let same_winding =
                signed_area(&candidate).signum() == signed_area(&current).signum();
            if !same_winding || !is_simple_quad(&candidate) {
                debug!(?indices, dx, dy, "Drag rejected: corners would cross");
                return DragOutcome::Rejected;
            }
        }

        self.corners = DisplayQuad(candidate);
        DragOutcome::Moved
    }
}

fn check_index(index: usize) -> Result<()> {
    if index >= 4 {
        return Err(PapercutError::InvalidGeometry(format!(
            "corner index {index} out of range (0..4)"
        )));
    }
    Ok(())
}

fn clamp_point(p: Point, max_x: f32, max_y: f32) -> Point {
    Point::new(p.x.clamp(0.0, max_x), p.y.clamp(0.0, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use papercut_core::DetectionSource;

    fn session_1600x1200() -> ScanSession {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1600, 1200, Rgb([120, 120, 120])));
        // Unordered on purpose.
        let detection = Detection {
            corners: Quad::from_tuples([
                (1440.0, 1080.0),
                (160.0, 120.0),
                (160.0, 1080.0),
                (1440.0, 120.0),
            ]),
            source: DetectionSource::Contour,
        };
        ScanSession::new(img, detection, &DisplayConfig::default()).unwrap()
    }

    #[test]
    fn opening_scales_image_and_orders_corners() {
        let session = session_1600x1200();
        assert!((session.scale().ratio() - 0.5).abs() < 1e-6);
        assert_eq!(session.display_image().width(), 800);
        assert_eq!(session.display_image().height(), 600);
        assert_eq!(
            session.corners().0,
            [
                Point::new(80.0, 60.0),
                Point::new(720.0, 60.0),
                Point::new(720.0, 540.0),
                Point::new(80.0, 540.0),
            ]
        );
    }

    #[test]
    fn original_corners_undo_display_scaling() {
        let mut session = session_1600x1200();
        assert_eq!(session.drag_corner(0, 10.0, 5.0).unwrap(), DragOutcome::Moved);
        let original = session.original_corners();
        assert_eq!(original.points()[0], Point::new(180.0, 130.0));
        assert_eq!(original.points()[2], Point::new(1440.0, 1080.0));
    }

    #[test]
    fn drag_is_clamped_to_display_bounds() {
        let mut session = session_1600x1200();
        assert_eq!(session.drag_corner(0, -500.0, -500.0).unwrap(), DragOutcome::Moved);
        assert_eq!(session.corners().0[0], Point::new(0.0, 0.0));
    }

    #[test]
    fn drag_that_crosses_edges_is_rejected() {
        let mut session = session_1600x1200();
        let before = *session.corners();
        // Pull top-right past top-left.
        assert_eq!(session.drag_corner(1, -700.0, 0.0).unwrap(), DragOutcome::Rejected);
        assert_eq!(*session.corners(), before);
    }

    #[test]
    fn drag_that_flips_winding_is_rejected() {
        let mut session = session_1600x1200();
        assert_eq!(session.drag_corner(0, 1000.0, 1000.0).unwrap(), DragOutcome::Rejected);
        assert_eq!(session.corners().0[0], Point::new(80.0, 60.0));
    }

    #[test]
    fn edge_drag_moves_both_endpoints() {
        let mut session = session_1600x1200();
        assert_eq!(session.drag_edge(3, 20.0, 0.0).unwrap(), DragOutcome::Moved);
        // Edge 3 joins bottom-left and top-left.
        assert_eq!(session.corners().0[3], Point::new(100.0, 540.0));
        assert_eq!(session.corners().0[0], Point::new(100.0, 60.0));
        assert_eq!(session.corners().0[1], Point::new(720.0, 60.0));
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let mut session = session_1600x1200();
        assert!(matches!(
            session.drag_corner(4, 1.0, 1.0),
            Err(PapercutError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn reset_restores_detection() {
        let mut session = session_1600x1200();
        let detected = *session.corners();
        session.drag_corner(2, -30.0, -30.0).unwrap();
        assert_ne!(*session.corners(), detected);
        session.reset_corners();
        assert_eq!(*session.corners(), detected);
    }

    #[test]
    fn report_carries_session_metadata() {
        let session = session_1600x1200();
        let report = session.report(1280, 960);
        assert_eq!(report.session, session.id());
        assert_eq!((report.source_width, report.source_height), (1600, 1200));
        assert!(!report.fallback);
        assert_eq!(report.output_width, 1280);
    }
}
