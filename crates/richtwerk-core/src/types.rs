// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core geometry types shared by the solver, sizing, and resampling code.

use serde::{Deserialize, Serialize};

/// A point in one plane's pixel coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Multiply both coordinates by `k` (scaling about the origin).
    pub fn scaled(&self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for Point2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// The four corners of a quadrilateral selected on the source image.
///
/// Labels follow screen orientation: `tl` is top-left, `br` bottom-right.
/// Whenever the corners are needed as a sequence the order is always
/// `[tl, tr, bl, br]`, on both sides of a correspondence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerSet {
    pub tl: Point2D,
    pub tr: Point2D,
    pub bl: Point2D,
    pub br: Point2D,
}

impl CornerSet {
    pub const fn new(tl: Point2D, tr: Point2D, bl: Point2D, br: Point2D) -> Self {
        Self { tl, tr, bl, br }
    }

    /// The default selection: the whole `width` x `height` frame.
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self::rectangle(width as f64, height as f64)
    }

    /// Axis-aligned rectangle anchored at the origin.
    pub fn rectangle(width: f64, height: f64) -> Self {
        Self {
            tl: Point2D::new(0.0, 0.0),
            tr: Point2D::new(width, 0.0),
            bl: Point2D::new(0.0, height),
            br: Point2D::new(width, height),
        }
    }

    /// Build from an ordered `[tl, tr, bl, br]` array.
    pub fn from_array([tl, tr, bl, br]: [Point2D; 4]) -> Self {
        Self { tl, tr, bl, br }
    }

    /// Corners as `[tl, tr, bl, br]`.
    pub fn to_array(&self) -> [Point2D; 4] {
        [self.tl, self.tr, self.bl, self.br]
    }

    /// Scale every corner by `k` about the origin.
    pub fn scaled(&self, k: f64) -> Self {
        Self {
            tl: self.tl.scaled(k),
            tr: self.tr.scaled(k),
            bl: self.bl.scaled(k),
            br: self.br.scaled(k),
        }
    }

    /// Length of the top edge (`tr - tl`).
    pub fn top_edge(&self) -> f64 {
        self.tl.distance(&self.tr)
    }

    /// Length of the bottom edge (`br - bl`).
    pub fn bottom_edge(&self) -> f64 {
        self.bl.distance(&self.br)
    }

    /// Length of the left edge (`bl - tl`).
    pub fn left_edge(&self) -> f64 {
        self.tl.distance(&self.bl)
    }

    /// Length of the right edge (`br - tr`).
    pub fn right_edge(&self) -> f64 {
        self.tr.distance(&self.br)
    }

    /// Area via the shoelace formula, walking the perimeter tl → tr → br → bl.
    pub fn area(&self) -> f64 {
        let ring = [self.tl, self.tr, self.br, self.bl];
        let mut twice = 0.0;
        for i in 0..ring.len() {
            let j = (i + 1) % ring.len();
            twice += ring[i].x * ring[j].y - ring[j].x * ring[i].y;
        }
        twice.abs() / 2.0
    }
}
