// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Projective transform (homography) estimation from four point
// correspondences.

use richtwerk_core::error::{Result, RichtwerkError};
use richtwerk_core::{Point2D, WarpConfig};
use tracing::{debug, instrument};

use super::solver::solve_linear_system;

const CORNER_LABELS: [&str; 4] = ["tl", "tr", "bl", "br"];

/// `w` components smaller than this make a mapped point undefined.
const MIN_HOMOGENEOUS_W: f64 = 1e-12;

/// A 3x3 projective transform in row-major order:
///
/// ```text
/// [ h0 h1 h2 ]
/// [ h3 h4 h5 ]
/// [ h6 h7 h8 ]
/// ```
///
/// A point `(x, y)` maps to `((h0·x + h1·y + h2) / w, (h3·x + h4·y + h5) / w)`
/// with `w = h6·x + h7·y + h8`. Estimated matrices always have `h8 = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    m: [f64; 9],
}

impl Homography {
    pub const IDENTITY: Self = Self {
        m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// Wrap raw coefficients. Returns `None` if any coefficient is non-finite.
    pub fn from_coefficients(m: [f64; 9]) -> Option<Self> {
        m.iter().all(|v| v.is_finite()).then_some(Self { m })
    }

    /// Estimate the transform taking each `source[i]` onto `dest[i]`.
    ///
    /// Both arrays use the same `[tl, tr, bl, br]` order. Each pair gives two
    /// rows of the 8x8 system
    ///
    /// ```text
    /// [x y 1 0 0 0 -x·X -y·X] · h = X
    /// [0 0 0 x y 1 -x·Y -y·Y] · h = Y
    /// ```
    ///
    /// which is solved with partial pivoting; `h8` is fixed to 1.
    #[instrument(skip(config))]
    pub fn from_correspondences(
        source: &[Point2D; 4],
        dest: &[Point2D; 4],
        config: &WarpConfig,
    ) -> Result<Self> {
        check_plane(source, "source", config.collinearity_epsilon)?;
        check_plane(dest, "destination", config.collinearity_epsilon)?;

        if source == dest {
            debug!("Correspondences coincide; using the identity");
            return Ok(Self::IDENTITY);
        }

        let mut a = [[0.0_f64; 8]; 8];
        let mut b = [0.0_f64; 8];
        for (i, (s, d)) in source.iter().zip(dest.iter()).enumerate() {
            let r = 2 * i;
            a[r] = [s.x, s.y, 1.0, 0.0, 0.0, 0.0, -s.x * d.x, -s.y * d.x];
            b[r] = d.x;
            a[r + 1] = [0.0, 0.0, 0.0, s.x, s.y, 1.0, -s.x * d.y, -s.y * d.y];
            b[r + 1] = d.y;
        }

        let h = solve_linear_system(a, b, config.pivot_epsilon)?;

        let m = [h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0];
        let homography = Self::from_coefficients(m).ok_or_else(|| {
            RichtwerkError::DegenerateInput("solution has non-finite coefficients".into())
        })?;

        // Singular systems are already caught by the plane checks and the
        // relative pivot test. Coefficient magnitudes grow with the
        // selection's offset from the origin while the determinant does not,
        // so only an exact zero is rejected here.
        let det = homography.determinant();
        if !det.is_finite() || det == 0.0 {
            return Err(RichtwerkError::DegenerateInput(format!(
                "solution is singular (determinant {det:e})"
            )));
        }

        debug!(coefficients = ?homography.m, "Homography estimated");
        Ok(homography)
    }

    /// Row-major coefficients `h0..=h8`.
    pub fn coefficients(&self) -> &[f64; 9] {
        &self.m
    }

    /// Homogeneous image `(px, py, pz)` of `(x, y, 1)`.
    #[inline]
    pub fn project(&self, x: f64, y: f64) -> (f64, f64, f64) {
        let m = &self.m;
        (
            m[0] * x + m[1] * y + m[2],
            m[3] * x + m[4] * y + m[5],
            m[6] * x + m[7] * y + m[8],
        )
    }

    /// Map a point. `None` when it lands on the line at infinity.
    pub fn apply(&self, p: Point2D) -> Option<Point2D> {
        let (px, py, pz) = self.project(p.x, p.y);
        if !pz.is_finite() || pz.abs() < MIN_HOMOGENEOUS_W {
            return None;
        }
        let mapped = Point2D::new(px / pz, py / pz);
        mapped.is_finite().then_some(mapped)
    }

    pub fn determinant(&self) -> f64 {
        let [a, b, c, d, e, f, g, h, i] = self.m;
        a * (e * i - f * h) - b * (d * i - f * g) + c * (d * h - e * g)
    }

    /// Inverse transform via the adjugate, rescaled so `h8 = 1` when possible.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < f64::EPSILON {
            return None;
        }
        let [a, b, c, d, e, f, g, h, i] = self.m;
        let adj = [
            e * i - f * h,
            c * h - b * i,
            b * f - c * e,
            f * g - d * i,
            a * i - c * g,
            c * d - a * f,
            d * h - e * g,
            b * g - a * h,
            a * e - b * d,
        ];
        let scale = if adj[8].abs() > f64::EPSILON {
            adj[8]
        } else {
            det
        };
        Self::from_coefficients(adj.map(|v| v / scale))
    }
}

/// Estimate the homography mapping `source` onto `dest`.
///
/// For perspective correction the caller passes the axis-aligned output
/// rectangle as `source` and the user's quadrilateral as `dest`, giving the
/// destination → source mapping the resampler walks.
pub fn solve(source: &[Point2D; 4], dest: &[Point2D; 4], config: &WarpConfig) -> Result<Homography> {
    Homography::from_correspondences(source, dest, config)
}

/// Reject planes with non-finite, coincident, or collinear points.
fn check_plane(points: &[Point2D; 4], plane: &str, epsilon: f64) -> Result<()> {
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(RichtwerkError::DegenerateInput(format!(
            "{plane} point {} is non-finite",
            CORNER_LABELS[i]
        )));
    }

    for i in 0..4 {
        for j in (i + 1)..4 {
            if points[i].distance(&points[j]) <= f64::EPSILON {
                return Err(RichtwerkError::DegenerateInput(format!(
                    "{plane} points {} and {} are coincident",
                    CORNER_LABELS[i], CORNER_LABELS[j]
                )));
            }
        }
    }

    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    for [i, j, k] in TRIPLES {
        let (a, b, c) = (points[i], points[j], points[k]);
        let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
        let spread = a.distance(&b) * a.distance(&c);
        if cross.abs() <= epsilon * spread {
            return Err(RichtwerkError::DegenerateInput(format!(
                "{plane} points {}, {}, {} are collinear",
                CORNER_LABELS[i], CORNER_LABELS[j], CORNER_LABELS[k]
            )));
        }
    }

    Ok(())
}
