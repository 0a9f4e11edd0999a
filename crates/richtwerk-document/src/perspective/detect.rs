// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Initial corner proposal: finds the page outline in a photo so the crop
// handles start on the document instead of the image frame.

use image::DynamicImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::hough::{LineDetectionOptions, PolarLine, detect_lines};
use richtwerk_core::{CornerSet, Point2D};
use tracing::{debug, info, instrument, warn};

/// Detected quads covering less than this share of the image are ignored.
const MIN_AREA_FRACTION: f64 = 0.10;

/// Starting corners for the crop handles: the detected page outline if one
/// is found, otherwise the full image frame.
pub fn propose_corners(image: &DynamicImage) -> CornerSet {
    detect_document_corners(image).unwrap_or_else(|| {
        warn!("No document outline found; proposing the full frame");
        CornerSet::full_frame(image.width(), image.height())
    })
}

/// Locate the four edges of a document in `image`.
///
/// ## Pipeline
///
/// 1. Convert to grayscale
/// 2. Gaussian blur (sigma 2.0) for noise reduction
/// 3. Canny edge detection
/// 4. Hough line detection with a vote threshold scaled to the image diagonal
/// 5. Split lines into roughly horizontal and roughly vertical
/// 6. Take the outermost line on each side
/// 7. Intersect them pairwise into `tl`, `tr`, `bl`, `br`
///
/// Returns `None` when the outline is missing, incomplete, or covers less
/// than 10% of the image.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn detect_document_corners(image: &DynamicImage) -> Option<CornerSet> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return None;
    }

    let gray = image.to_luma8();
    let blurred = gaussian_blur_f32(&gray, 2.0);
    let edges = canny(&blurred, 50.0, 150.0);

    let diagonal = (width as f64).hypot(height as f64);
    let vote_threshold = (diagonal * 0.25).max(80.0) as u32;
    let options = LineDetectionOptions {
        vote_threshold,
        suppression_radius: 8,
    };
    let lines = detect_lines(&edges, options);
    debug!(line_count = lines.len(), vote_threshold, "Hough lines detected");

    let (horizontal, vertical) = classify_lines(&lines);
    if horizontal.len() < 2 || vertical.len() < 2 {
        debug!(
            horizontal = horizontal.len(),
            vertical = vertical.len(),
            "Not enough edges for a page outline"
        );
        return None;
    }

    let (top, bottom) = extreme_lines(&horizontal)?;
    let (left, right) = extreme_lines(&vertical)?;

    let corners = CornerSet::new(
        intersect_polar_lines(&top, &left)?,
        intersect_polar_lines(&top, &right)?,
        intersect_polar_lines(&bottom, &left)?,
        intersect_polar_lines(&bottom, &right)?,
    );

    let min_area = width as f64 * height as f64 * MIN_AREA_FRACTION;
    if corners.area() < min_area {
        debug!(area = corners.area(), min_area, "Outline too small");
        return None;
    }

    info!(
        tl = %corners.tl,
        tr = %corners.tr,
        bl = %corners.bl,
        br = %corners.br,
        "Document outline detected"
    );
    Some(corners)
}

/// Split Hough lines into roughly horizontal and roughly vertical sets.
///
/// `PolarLine::angle_in_degrees` is the angle of the line's normal, so a
/// horizontal edge has an angle near 90 and a vertical edge an angle near 0
/// or 180. Lines more than 30 degrees off either axis are dropped.
fn classify_lines(lines: &[PolarLine]) -> (Vec<PolarLine>, Vec<PolarLine>) {
    let mut horizontal = Vec::new();
    let mut vertical = Vec::new();

    for line in lines {
        let angle = line.angle_in_degrees;
        if (60..=120).contains(&angle) {
            horizontal.push(*line);
        } else if angle <= 30 || angle >= 150 {
            vertical.push(*line);
        }
    }

    (horizontal, vertical)
}

/// The lines nearest to and furthest from the origin, by signed distance `r`.
///
/// A normal angle above 90 degrees flips the sign of `r` for vertical lines,
/// so distance is measured along the line's own axis instead.
fn extreme_lines(lines: &[PolarLine]) -> Option<(PolarLine, PolarLine)> {
    let offset = |line: &PolarLine| {
        let theta = (line.angle_in_degrees as f64).to_radians();
        // Offset along x for vertical lines, along y for horizontal ones.
        if line.angle_in_degrees > 45 && line.angle_in_degrees < 135 {
            line.r as f64 / theta.sin()
        } else {
            line.r as f64 / theta.cos()
        }
    };
    let by_offset = |a: &&PolarLine, b: &&PolarLine| offset(*a).total_cmp(&offset(*b));

    let near = lines.iter().min_by(by_offset)?;
    let far = lines.iter().max_by(by_offset)?;
    Some((*near, *far))
}

/// Intersect two lines in Hough form `x·cos(θ) + y·sin(θ) = r`.
///
/// Returns `None` for (nearly) parallel lines.
fn intersect_polar_lines(a: &PolarLine, b: &PolarLine) -> Option<Point2D> {
    let theta_a = (a.angle_in_degrees as f64).to_radians();
    let theta_b = (b.angle_in_degrees as f64).to_radians();

    let (sin_a, cos_a) = theta_a.sin_cos();
    let (sin_b, cos_b) = theta_b.sin_cos();

    let denom = cos_a * sin_b - sin_a * cos_b;
    if denom.abs() < 1e-6 {
        return None;
    }

    let (r_a, r_b) = (a.r as f64, b.r as f64);
    Some(Point2D::new(
        (r_a * sin_b - r_b * sin_a) / denom,
        (r_b * cos_a - r_a * cos_b) / denom,
    ))
}
