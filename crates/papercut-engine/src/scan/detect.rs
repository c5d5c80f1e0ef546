// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document corner detection — finds the dominant four-sided contour in a
// photograph, falling back to an inset whole-image quad when none exists.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::morphology::close;
use imageproc::point::Point as PixelPoint;
use papercut_core::{Detection, DetectionSource, DetectorConfig, Point, Quad, Result};
use tracing::{debug, info, instrument, warn};

use crate::codec::ensure_non_empty;
use crate::geometry::shoelace_area;

/// Locates document corners in unconstrained photographs.
///
/// Stateless apart from its configuration; one detector can serve any number
/// of images, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct CornerDetector {
    config: DetectorConfig,
}

impl CornerDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Propose the four corners of the document in `image`.
    ///
    /// ## Pipeline
    ///
    /// 1. Resize to the working height (aspect preserved)
    /// 2. Grayscale + Gaussian blur
    /// 3. Canny edge detection
    /// 4. Morphological closing with a square element to bridge border gaps
    /// 5. Keep the largest outermost contours by enclosed area
    /// 6. Approximate each with a tolerance proportional to its perimeter and
    ///    accept the first that reduces to exactly four vertices
    /// 7. Scale the vertices back to original-image coordinates
    ///
    /// Corners are returned in contour order, not canonical order. When no
    /// candidate qualifies the inset whole-image quad is returned with
    /// [`DetectionSource::Fallback`]; only an empty image is an error.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect(&self, image: &DynamicImage) -> Result<Detection> {
        ensure_non_empty(image)?;
        let (orig_w, orig_h) = (image.width(), image.height());

        let (working, ratio) = self.working_copy(image);
        debug!(
            ratio,
            working_w = working.width(),
            working_h = working.height(),
            "Working copy prepared"
        );

        let blurred = gaussian_blur_f32(&working, self.config.blur_sigma);
        let edges = canny(&blurred, self.config.canny_low, self.config.canny_high);
        let closed = close(&edges, Norm::LInf, self.config.close_radius);

        let candidates = self.largest_outer_contours(&closed);
        debug!(candidates = candidates.len(), "Contour candidates selected");

        for (rank, contour) in candidates.iter().enumerate() {
            let Some(vertices) = self.approximate(contour) else {
                continue;
            };
            debug!(rank, vertices = vertices.len(), "Candidate approximated");
            if vertices.len() != 4 {
                continue;
            }

            let corners = Quad::new([0, 1, 2, 3].map(|i| {
                let v = vertices[i];
                Point::new(v.x as f32 / ratio, v.y as f32 / ratio)
            }));
            info!(rank, ?corners, "Document quadrilateral detected");
            return Ok(Detection {
                corners,
                source: DetectionSource::Contour,
            });
        }

        warn!(
            candidates = candidates.len(),
            inset = self.config.fallback_inset,
            "No four-sided contour found; using whole-image fallback"
        );
        Ok(Detection {
            corners: fallback_quad(orig_w, orig_h, self.config.fallback_inset),
            source: DetectionSource::Fallback,
        })
    }

    /// Grayscale copy at the working height, plus the applied scale factor.
    fn working_copy(&self, image: &DynamicImage) -> (GrayImage, f32) {
        let gray = image.to_luma8();
        let (w, h) = gray.dimensions();
        let target_h = self.config.working_height;
        if target_h == h {
            return (gray, 1.0);
        }

        let ratio = target_h as f32 / h as f32;
        let target_w = ((w as f32 * ratio) as u32).max(1);
        let resized = imageops::resize(&gray, target_w, target_h, FilterType::Triangle);
        (resized, ratio)
    }

    /// Outermost contours sorted by enclosed area, largest first, truncated
    /// to `max_candidates`.
    fn largest_outer_contours(&self, edges: &GrayImage) -> Vec<Vec<PixelPoint<i32>>> {
        let mut outer: Vec<(f32, Vec<PixelPoint<i32>>)> = find_contours::<i32>(edges)
            .into_iter()
            .filter(is_external)
            .map(|c| (contour_area(&c.points), c.points))
            .collect();

        outer.sort_by(|a, b| b.0.total_cmp(&a.0));
        outer.truncate(self.config.max_candidates);
        outer.into_iter().map(|(_, points)| points).collect()
    }

    fn approximate(&self, contour: &[PixelPoint<i32>]) -> Option<Vec<PixelPoint<i32>>> {
        if contour.len() < 4 {
            return None;
        }
        let perimeter = arc_length(contour, true);
        let epsilon = self.config.approx_epsilon_ratio * perimeter;
        if !(epsilon > 0.0) {
            return None;
        }
        Some(approximate_closed(contour, epsilon))
    }
}

/// The quad substituted when detection finds nothing: the image bounds,
/// inset by `inset` of each dimension, in canonical order.
pub fn fallback_quad(width: u32, height: u32, inset: f32) -> Quad {
    let (w, h) = (width as f32, height as f32);
    let (left, top) = (w * inset, h * inset);
    let (right, bottom) = (w * (1.0 - inset), h * (1.0 - inset));
    Quad::from_tuples([(left, top), (right, top), (right, bottom), (left, bottom)])
}

fn is_external(contour: &Contour<i32>) -> bool {
    contour.border_type == BorderType::Outer && contour.parent.is_none()
}

fn contour_area(points: &[PixelPoint<i32>]) -> f32 {
    let as_points: Vec<Point> = points
        .iter()
        .map(|p| Point::new(p.x as f32, p.y as f32))
        .collect();
    shoelace_area(&as_points)
}

/// Douglas-Peucker simplification of a *closed* curve.
///
/// The curve is split at the point farthest from its first point, each half
/// is simplified as an open polyline, and the halves are rejoined without
/// repeating the shared endpoints.
fn approximate_closed(curve: &[PixelPoint<i32>], epsilon: f64) -> Vec<PixelPoint<i32>> {
    let start = curve[0];
    let split = curve
        .iter()
        .enumerate()
        .max_by_key(|(_, p)| {
            let (dx, dy) = (i64::from(p.x - start.x), i64::from(p.y - start.y));
            dx * dx + dy * dy
        })
        .map(|(i, _)| i)
        .unwrap_or(0);
    if split == 0 {
        return vec![start];
    }

    let mut simplified = approximate_polygon_dp(&curve[..=split], epsilon, false);

    let mut back: Vec<PixelPoint<i32>> = curve[split..].to_vec();
    back.push(start);
    let back = approximate_polygon_dp(&back, epsilon, false);
    simplified.extend_from_slice(&back[1..back.len() - 1]);
    simplified
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn assert_has_corner_near(corners: &Quad, expected: (f32, f32), tolerance: f32) {
        let target = Point::from(expected);
        let nearest = corners
            .points()
            .iter()
            .map(|p| p.distance(&target))
            .fold(f32::INFINITY, f32::min);
        assert!(
            nearest <= tolerance,
            "no corner within {tolerance}px of {expected:?}: {corners:?}"
        );
    }

    fn document_on_dark(w: u32, h: u32, doc: (u32, u32, u32, u32)) -> GrayImage {
        let (x0, y0, x1, y1) = doc;
        GrayImage::from_fn(w, h, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                Luma([235u8])
            } else {
                Luma([25u8])
            }
        })
    }

    #[test]
    fn uniform_image_falls_back_to_inset_bounds() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(300, 200, Luma([180u8])));
        let detection = CornerDetector::default().detect(&img).unwrap();

        assert!(detection.is_fallback());
        assert_eq!(
            detection.corners,
            Quad::from_tuples([(30.0, 20.0), (270.0, 20.0), (270.0, 180.0), (30.0, 180.0)])
        );
    }

    #[test]
    fn fallback_is_deterministic() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(123, 77, Rgb([40, 90, 200])));
        let detector = CornerDetector::default();
        let first = detector.detect(&img).unwrap();
        let second = detector.detect(&img).unwrap();
        assert_eq!(first, second);
        assert!(first.is_fallback());
    }

    #[test]
    fn zero_inset_fallback_covers_whole_image() {
        let quad = fallback_quad(640, 480, 0.0);
        assert_eq!(
            quad,
            Quad::from_tuples([(0.0, 0.0), (640.0, 0.0), (640.0, 480.0), (0.0, 480.0)])
        );
    }

    #[test]
    fn detects_light_rectangle_on_dark_background() {
        let img = document_on_dark(400, 500, (50, 60, 350, 440));
        let detection = CornerDetector::default()
            .detect(&DynamicImage::ImageLuma8(img))
            .unwrap();

        assert_eq!(detection.source, DetectionSource::Contour);
        for corner in [(50.0, 60.0), (349.0, 60.0), (349.0, 439.0), (50.0, 439.0)] {
            assert_has_corner_near(&detection.corners, corner, 5.0);
        }
    }

    #[test]
    fn detected_corners_are_scaled_back_to_original_space() {
        // 1000 px tall: the working copy is half size.
        let img = document_on_dark(600, 1000, (100, 150, 500, 850));
        let detection = CornerDetector::default()
            .detect(&DynamicImage::ImageLuma8(img))
            .unwrap();

        assert!(!detection.is_fallback());
        for corner in [(100.0, 150.0), (499.0, 150.0), (499.0, 849.0), (100.0, 849.0)] {
            assert_has_corner_near(&detection.corners, corner, 10.0);
        }
    }

    #[test]
    fn empty_image_is_an_error() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(CornerDetector::default().detect(&img).is_err());
    }

    #[test]
    fn closed_approximation_of_square_outline_has_four_vertices() {
        // Clockwise pixel outline of a 20x20 square, as border following
        // would produce it.
        let mut outline = Vec::new();
        outline.extend((0..20).map(|x| PixelPoint::new(x, 0)));
        outline.extend((0..20).map(|y| PixelPoint::new(20, y)));
        outline.extend((0..20).map(|x| PixelPoint::new(20 - x, 20)));
        outline.extend((0..20).map(|y| PixelPoint::new(0, 20 - y)));

        let perimeter = arc_length(&outline, true);
        let simplified = approximate_closed(&outline, 0.02 * perimeter);
        assert_eq!(simplified.len(), 4, "{simplified:?}");
    }
}
