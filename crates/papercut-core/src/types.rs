// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Papercut: points, corner quadrilaterals in the two
// coordinate spaces, and detection/scan metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PapercutError, Result};

/// Unique identifier for one scan session (one uploaded image).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in pixel coordinates. Which space it lives in is carried by the
/// containing type ([`Quad`] or [`DisplayQuad`]).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn scaled(&self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for (f32, f32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

/// Four document corners in *original* (full-resolution) image space.
///
/// Index order is canonical (top-left, top-right, bottom-right, bottom-left)
/// only after ordering; detector output is unordered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad(pub [Point; 4]);

impl Quad {
    pub const fn new(points: [Point; 4]) -> Self {
        Self(points)
    }

    pub fn from_tuples(points: [(f32, f32); 4]) -> Self {
        Self(points.map(Point::from))
    }

    pub fn points(&self) -> &[Point; 4] {
        &self.0
    }

    pub fn to_tuples(&self) -> [(f32, f32); 4] {
        self.0.map(<(f32, f32)>::from)
    }

    /// Parse `x,y,x,y,x,y,x,y` (eight comma-separated numbers).
    pub fn parse_csv(text: &str) -> Result<Self> {
        let values: Vec<f32> = text
            .split(',')
            .map(|part| part.trim().parse::<f32>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|err| {
                PapercutError::InvalidGeometry(format!("unparseable corner list {text:?}: {err}"))
            })?;
        if values.len() != 8 {
            return Err(PapercutError::InvalidGeometry(format!(
                "expected 8 coordinates, got {}",
                values.len()
            )));
        }
        Ok(Self([
            Point::new(values[0], values[1]),
            Point::new(values[2], values[3]),
            Point::new(values[4], values[5]),
            Point::new(values[6], values[7]),
        ]))
    }
}

/// Four document corners in *display* (scaled-for-screen) space.
///
/// Kept as a distinct type so display coordinates can never be handed to the
/// rectifier without going through [`DisplayScale::to_original`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayQuad(pub [Point; 4]);

impl DisplayQuad {
    pub fn points(&self) -> &[Point; 4] {
        &self.0
    }
}

/// Conversion between original and display space.
///
/// `ratio = display_dimension / original_dimension`, so
/// `display = original * ratio` and `original = display / ratio`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayScale {
    ratio: f32,
}

impl DisplayScale {
    pub fn new(ratio: f32) -> Result<Self> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(PapercutError::InvalidGeometry(format!(
                "display ratio must be positive and finite, got {ratio}"
            )));
        }
        Ok(Self { ratio })
    }

    /// Scale that fits a `width` x `height` image into `max_dimension` on its
    /// longer side.
    pub fn fit(width: u32, height: u32, max_dimension: u32) -> Result<Self> {
        let longest = width.max(height);
        if width == 0 || height == 0 {
            return Err(PapercutError::EmptyImage);
        }
        Self::new(max_dimension as f32 / longest as f32)
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Display-space size of an original `width` x `height` image
    /// (truncated, never below one pixel).
    pub fn display_size(&self, width: u32, height: u32) -> (u32, u32) {
        let w = (width as f32 * self.ratio) as u32;
        let h = (height as f32 * self.ratio) as u32;
        (w.max(1), h.max(1))
    }

    pub fn to_display(&self, quad: &Quad) -> DisplayQuad {
        DisplayQuad(quad.0.map(|p| p.scaled(self.ratio)))
    }

    pub fn to_original(&self, quad: &DisplayQuad) -> Quad {
        Quad(quad.0.map(|p| p.scaled(1.0 / self.ratio)))
    }
}

/// How a set of detected corners was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionSource {
    /// A four-vertex document contour was found.
    Contour,
    /// No contour qualified; the inset whole-image quad was substituted.
    Fallback,
    /// Corners were supplied by the caller; detection was skipped.
    Manual,
}

/// Result of corner detection, in original image space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub corners: Quad,
    pub source: DetectionSource,
}

impl Detection {
    pub fn is_fallback(&self) -> bool {
        self.source == DetectionSource::Fallback
    }
}

/// Metadata describing one completed scan, suitable for JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub session: SessionId,
    pub created_at: DateTime<Utc>,
    pub source_width: u32,
    pub source_height: u32,
    /// Corners actually used for rectification (original space).
    pub corners: Quad,
    pub fallback: bool,
    pub output_width: u32,
    pub output_height: u32,
}
