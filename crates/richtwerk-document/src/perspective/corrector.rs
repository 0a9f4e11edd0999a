// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective correction: sizing, homography estimation, and resampling
// wired together for one corner selection.

use richtwerk_core::error::Result;
use richtwerk_core::{CornerSet, WarpConfig};
use tracing::{info, instrument};

use super::homography::{Homography, solve};
use super::resample::resample_with;
use super::sizing::derive_output_size_with;
use crate::image::raster::RasterBuffer;

/// Straightens quadrilateral selections into rectangular rasters.
///
/// Holds only configuration; every call is independent and the homography is
/// recomputed from scratch each time.
///
/// ```ignore
/// let corrector = PerspectiveCorrector::new(WarpConfig::default());
/// let page = corrector.correct(&photo, &corners)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PerspectiveCorrector {
    config: WarpConfig,
}

impl PerspectiveCorrector {
    pub fn new(config: WarpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WarpConfig {
        &self.config
    }

    /// Output size and destination → source homography for `corners`,
    /// without touching any pixels.
    pub fn plan(&self, corners: &CornerSet) -> Result<(u32, u32, Homography)> {
        let (width, height) = derive_output_size_with(corners, &self.config)?;
        let rect = CornerSet::rectangle(width as f64, height as f64);
        let homography = solve(&rect.to_array(), &corners.to_array(), &self.config)?;
        Ok((width, height, homography))
    }

    /// Straighten the `corners` region of `source` into a new raster.
    ///
    /// Sizing and solver failures abort before any output is allocated.
    #[instrument(skip(self, source), fields(src_w = source.width(), src_h = source.height()))]
    pub fn correct(&self, source: &RasterBuffer, corners: &CornerSet) -> Result<RasterBuffer> {
        let (width, height, homography) = self.plan(corners)?;
        info!(width, height, "Straightening selection");
        Ok(resample_with(source, &homography, width, height, &self.config))
    }
}

/// One-shot form of [`PerspectiveCorrector::correct`].
pub fn correct_perspective(
    source: &RasterBuffer,
    corners: &CornerSet,
    config: &WarpConfig,
) -> Result<RasterBuffer> {
    PerspectiveCorrector::new(config.clone()).correct(source, corners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use richtwerk_core::error::RichtwerkError;
    use richtwerk_core::{Execution, Point2D};

    use crate::image::raster::TRANSPARENT;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn checkerboard(width: u32, height: u32) -> RasterBuffer {
        let mut raster = RasterBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = if (x / 4 + y / 4) % 2 == 0 { 30 } else { 220 };
                raster.set(x, y, Rgba([v, 255 - v, (x % 256) as u8, 255]));
            }
        }
        raster
    }

    #[test]
    fn red_square_identity() {
        let source = RasterBuffer::from_pixel(100, 100, RED);
        let corners = CornerSet::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(100.0, 0.0),
            Point2D::new(0.0, 100.0),
            Point2D::new(100.0, 100.0),
        );
        let out = correct_perspective(&source, &corners, &WarpConfig::default()).unwrap();
        assert_eq!(out.dimensions(), (100, 100));
        assert_eq!(out.get(50, 50), RED);
    }

    #[test]
    fn full_frame_round_trip_is_exact() {
        let source = checkerboard(64, 40);
        let corners = CornerSet::full_frame(64, 40);
        let out = correct_perspective(&source, &corners, &WarpConfig::default()).unwrap();
        assert_eq!(out, source);
    }

    #[test]
    fn trapezoid_allocates_derived_size() {
        let source = RasterBuffer::from_pixel(100, 100, RED);
        let corners = CornerSet::new(
            Point2D::new(10.0, 0.0),
            Point2D::new(90.0, 0.0),
            Point2D::new(0.0, 100.0),
            Point2D::new(100.0, 100.0),
        );
        let out = correct_perspective(&source, &corners, &WarpConfig::default()).unwrap();
        assert_eq!(out.dimensions(), (100, 100));
        // Interior maps well inside the red source.
        assert_eq!(out.get(50, 50), RED);
    }

    #[test]
    fn selection_corners_land_on_output_corners() {
        let source = checkerboard(120, 90);
        let corners = CornerSet::new(
            Point2D::new(20.0, 10.0),
            Point2D::new(100.0, 14.0),
            Point2D::new(12.0, 80.0),
            Point2D::new(110.0, 76.0),
        );
        let corrector = PerspectiveCorrector::default();
        let (width, height, h) = corrector.plan(&corners).unwrap();
        let mapped_tl = h.apply(Point2D::new(0.0, 0.0)).unwrap();
        let mapped_br = h.apply(Point2D::new(width as f64, height as f64)).unwrap();
        assert!(mapped_tl.distance(&corners.tl) < 1e-9, "{mapped_tl}");
        assert!(mapped_br.distance(&corners.br) < 1e-9, "{mapped_br}");

        let out = corrector.correct(&source, &corners).unwrap();
        // Integer corner: the top-left output pixel samples source (20, 10) exactly.
        assert_eq!(out.get(0, 0), source.get(20, 10));
    }

    #[test]
    fn zero_width_selection_fails_before_resampling() {
        let source = RasterBuffer::from_pixel(100, 100, RED);
        let corners = CornerSet::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 100.0),
            Point2D::new(0.0, 100.0),
        );
        let err = correct_perspective(&source, &corners, &WarpConfig::default()).unwrap_err();
        assert!(
            matches!(
                err,
                RichtwerkError::InvalidDimension { .. } | RichtwerkError::DegenerateInput(_)
            ),
            "got {err:?}"
        );
    }

    #[test]
    fn collinear_selection_is_degenerate() {
        let source = RasterBuffer::from_pixel(100, 100, RED);
        // tl, tr, br all on y = 0; sizes are non-zero so the solver must catch it.
        let corners = CornerSet::new(
            Point2D::new(0.0, 0.0),
            Point2D::new(50.0, 0.0),
            Point2D::new(10.0, 80.0),
            Point2D::new(100.0, 0.0),
        );
        let err = correct_perspective(&source, &corners, &WarpConfig::default()).unwrap_err();
        assert!(matches!(err, RichtwerkError::DegenerateInput(_)), "got {err:?}");
    }

    #[test]
    fn selection_beyond_source_is_transparent() {
        // Right half of the selection hangs off the 50x50 source.
        let source = RasterBuffer::from_pixel(50, 50, RED);
        let corners = CornerSet::full_frame(100, 50);
        let out = correct_perspective(&source, &corners, &WarpConfig::default()).unwrap();
        assert_eq!(out.dimensions(), (100, 50));
        assert_eq!(out.get(10, 10), RED);
        for y in 0..50 {
            for x in 50..100 {
                assert_eq!(out.get(x, y), TRANSPARENT, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn far_offset_selection_plans_like_origin() {
        let corrector = PerspectiveCorrector::default();
        let trapezoid = |off: f64| {
            CornerSet::new(
                Point2D::new(off + 500.0, 0.0),
                Point2D::new(off + 510.0, 0.0),
                Point2D::new(off, 1000.0),
                Point2D::new(off + 1000.0, 1000.0),
            )
        };
        for off in [0.0, 20_000.0, 40_000.0] {
            let (width, height, _) = corrector
                .plan(&trapezoid(off))
                .unwrap_or_else(|err| panic!("offset {off}: {err}"));
            assert_eq!((width, height), (1000, 1118));
        }
    }

    #[test]
    fn far_offset_selection_is_corrected() {
        // Narrow strip so the selection sits past x = 12000 without a huge raster.
        let source = RasterBuffer::from_pixel(12_050, 60, RED);
        let corners = CornerSet::new(
            Point2D::new(12_018.0, 0.0),
            Point2D::new(12_022.0, 0.0),
            Point2D::new(12_000.0, 50.0),
            Point2D::new(12_040.0, 50.0),
        );
        let out = correct_perspective(&source, &corners, &WarpConfig::default()).unwrap();
        assert_eq!(out.dimensions(), (40, 53));
        for x in 1..39 {
            assert_eq!(out.get(x, 26), RED, "pixel ({x}, 26)");
        }
    }

    #[test]
    fn serial_and_parallel_configs_agree() {
        let source = checkerboard(80, 60);
        let corners = CornerSet::new(
            Point2D::new(5.5, 3.25),
            Point2D::new(70.0, 8.0),
            Point2D::new(2.0, 55.0),
            Point2D::new(78.5, 50.0),
        );
        let serial = WarpConfig {
            execution: Execution::Serial,
            ..WarpConfig::default()
        };
        let parallel = WarpConfig {
            execution: Execution::Parallel,
            ..WarpConfig::default()
        };
        assert_eq!(
            correct_perspective(&source, &corners, &serial).unwrap(),
            correct_perspective(&source, &corners, &parallel).unwrap()
        );
    }
}
