// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inverse-mapped bilinear resampling through a homography.
//
// Every destination pixel is mapped back into the source. Pixels that land
// outside the source stay transparent; inside, the four surrounding source
// pixels are blended. Neighbours that fall off the source edge count as
// transparent black with their full weight, so a fade-to-transparent halo
// appears along the true image border.

use image::Rgba;
use rayon::prelude::*;
use richtwerk_core::{Execution, WarpConfig};
use tracing::{debug, info, instrument};

use super::homography::Homography;
use crate::image::raster::{CHANNELS, RasterBuffer};

const MIN_HOMOGENEOUS_W: f64 = 1e-12;

/// Resample `source` into a new `width` x `height` raster on the calling
/// thread.
///
/// `homography` maps destination pixel coordinates to source coordinates.
pub fn resample(
    source: &RasterBuffer,
    homography: &Homography,
    width: u32,
    height: u32,
) -> RasterBuffer {
    resample_with(source, homography, width, height, &WarpConfig {
        execution: Execution::Serial,
        ..WarpConfig::default()
    })
}

/// Same as [`resample`] but rows are distributed over the rayon pool. Each
/// worker owns a disjoint row slice of the output; the source is shared
/// read-only. The result is identical to the serial path.
pub fn resample_parallel(
    source: &RasterBuffer,
    homography: &Homography,
    width: u32,
    height: u32,
) -> RasterBuffer {
    resample_with(source, homography, width, height, &WarpConfig {
        execution: Execution::Parallel,
        ..WarpConfig::default()
    })
}

/// Resample with explicit configuration (snap tolerance, scheduling).
#[instrument(skip(source, homography, config), fields(src_w = source.width(), src_h = source.height()))]
pub fn resample_with(
    source: &RasterBuffer,
    homography: &Homography,
    width: u32,
    height: u32,
    config: &WarpConfig,
) -> RasterBuffer {
    let mut output = RasterBuffer::new(width, height);
    if width == 0 || height == 0 {
        return output;
    }

    let sampler = Sampler {
        source,
        homography,
        snap_epsilon: config.snap_epsilon,
    };
    let stride = output.stride();
    let parallel = config.use_parallel(width, height);

    let misses: usize = if parallel {
        output
            .as_raw_mut()
            .par_chunks_exact_mut(stride)
            .enumerate()
            .map(|(y, row)| sampler.fill_row(y as u32, row))
            .sum()
    } else {
        output
            .as_raw_mut()
            .chunks_exact_mut(stride)
            .enumerate()
            .map(|(y, row)| sampler.fill_row(y as u32, row))
            .sum()
    };

    debug!(misses, "Destination pixels outside the source left transparent");
    info!(width, height, parallel, "Resampling complete");
    output
}

/// Per-call sampling state shared by every row.
struct Sampler<'a> {
    source: &'a RasterBuffer,
    homography: &'a Homography,
    snap_epsilon: f64,
}

impl Sampler<'_> {
    /// Fill one destination row. Returns how many pixels missed the source.
    fn fill_row(&self, y: u32, row: &mut [u8]) -> usize {
        let mut misses = 0;
        for (x, out) in row.chunks_exact_mut(CHANNELS).enumerate() {
            match self.source_coordinate(x as f64, y as f64) {
                Some((sx, sy)) => out.copy_from_slice(&self.bilinear(sx, sy).0),
                None => misses += 1,
            }
        }
        misses
    }

    /// Map a destination pixel into the source, or `None` if the result is
    /// undefined or outside `[0, width) x [0, height)`.
    #[inline]
    fn source_coordinate(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let (px, py, pz) = self.homography.project(x, y);
        if !pz.is_finite() || pz.abs() < MIN_HOMOGENEOUS_W {
            return None;
        }
        let (sx, sy) = (px / pz, py / pz);

        let (w, h) = (self.source.width() as f64, self.source.height() as f64);
        // NaN fails every comparison and is rejected here too.
        if !(sx >= 0.0 && sx < w && sy >= 0.0 && sy < h) {
            return None;
        }
        Some((
            snap_below(sx, self.snap_epsilon, w),
            snap_below(sy, self.snap_epsilon, h),
        ))
    }

    /// Blend the four lattice neighbours of `(sx, sy)`, channel by channel.
    #[inline]
    fn bilinear(&self, sx: f64, sy: f64) -> Rgba<u8> {
        let x0 = sx.floor();
        let y0 = sy.floor();
        let dx = sx - x0;
        let dy = sy - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let p00 = self.source.get_or_transparent(x0, y0);
        let p10 = self.source.get_or_transparent(x0 + 1, y0);
        let p01 = self.source.get_or_transparent(x0, y0 + 1);
        let p11 = self.source.get_or_transparent(x0 + 1, y0 + 1);

        let w00 = (1.0 - dx) * (1.0 - dy);
        let w10 = dx * (1.0 - dy);
        let w01 = (1.0 - dx) * dy;
        let w11 = dx * dy;

        let mut pixel = [0u8; CHANNELS];
        for (c, out) in pixel.iter_mut().enumerate() {
            let v = p00.0[c] as f64 * w00
                + p10.0[c] as f64 * w10
                + p01.0[c] as f64 * w01
                + p11.0[c] as f64 * w11;
            *out = v.round().clamp(0.0, 255.0) as u8;
        }
        Rgba(pixel)
    }
}

/// Pull `v` onto the nearest integer when it is within `epsilon` of it.
#[inline]
fn snap(v: f64, epsilon: f64) -> f64 {
    let r = v.round();
    if (v - r).abs() <= epsilon { r } else { v }
}

/// [`snap`] for an in-bounds coordinate: never pulls `v` up to `limit`.
#[inline]
fn snap_below(v: f64, epsilon: f64, limit: f64) -> f64 {
    let r = snap(v, epsilon);
    if r < limit { r } else { v }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::raster::TRANSPARENT;

    /// A raster whose every pixel encodes its own coordinates.
    fn gradient(width: u32, height: u32) -> RasterBuffer {
        let mut raster = RasterBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                raster.set(x, y, Rgba([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 200, 255]));
            }
        }
        raster
    }

    fn translation(tx: f64, ty: f64) -> Homography {
        Homography::from_coefficients([1.0, 0.0, tx, 0.0, 1.0, ty, 0.0, 0.0, 1.0]).unwrap()
    }

    #[test]
    fn identity_reproduces_source() {
        let source = gradient(37, 23);
        let out = resample(&source, &Homography::IDENTITY, 37, 23);
        assert_eq!(out, source);
    }

    #[test]
    fn near_identity_noise_is_snapped() {
        let source = gradient(16, 16);
        let h = Homography::from_coefficients([
            1.0 + 1e-13,
            0.0,
            1e-10,
            0.0,
            1.0,
            1e-10,
            0.0,
            0.0,
            1.0,
        ])
        .unwrap();
        assert_eq!(resample(&source, &h, 16, 16), source);
    }

    #[test]
    fn half_pixel_shift_blends_neighbours() {
        let mut source = RasterBuffer::new(2, 1);
        source.set(0, 0, Rgba([0, 0, 0, 255]));
        source.set(1, 0, Rgba([200, 100, 50, 255]));
        let out = resample(&source, &translation(0.5, 0.0), 1, 1);
        assert_eq!(out.get(0, 0), Rgba([100, 50, 25, 255]));
    }

    #[test]
    fn missing_neighbour_fades_toward_transparent() {
        // Sampling at x = 1.5 on a 2-wide source: the right neighbour is
        // off the edge and contributes zero with weight 0.5.
        let source = RasterBuffer::from_pixel(2, 1, Rgba([200, 200, 200, 255]));
        let out = resample(&source, &translation(1.5, 0.0), 1, 1);
        assert_eq!(out.get(0, 0), Rgba([100, 100, 100, 128]));
    }

    #[test]
    fn outside_source_stays_transparent() {
        let source = RasterBuffer::from_pixel(10, 10, Rgba([255, 255, 255, 255]));
        // Shift left by 5: destination x >= 5 maps to source x >= 10.
        let out = resample(&source, &translation(5.0, 0.0), 10, 10);
        for y in 0..10 {
            for x in 0..10 {
                let expected = if x < 5 { Rgba([255, 255, 255, 255]) } else { TRANSPARENT };
                assert_eq!(out.get(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn negative_coordinates_are_not_clamped() {
        let source = RasterBuffer::from_pixel(4, 4, Rgba([9, 8, 7, 255]));
        let out = resample(&source, &translation(-2.0, -2.0), 4, 4);
        assert_eq!(out.get(0, 0), TRANSPARENT);
        assert_eq!(out.get(1, 3), TRANSPARENT);
        assert_eq!(out.get(2, 2), Rgba([9, 8, 7, 255]));
    }

    #[test]
    fn horizon_pixels_are_transparent() {
        // w = 1 - x/4 reaches zero at x = 4 and goes negative beyond it.
        let h = Homography::from_coefficients([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, -0.25, 0.0, 1.0])
            .unwrap();
        let source = RasterBuffer::from_pixel(64, 64, Rgba([50, 60, 70, 255]));
        let out = resample(&source, &h, 8, 2);
        assert_eq!(out.get(0, 0), Rgba([50, 60, 70, 255]));
        assert_eq!(out.get(4, 0), TRANSPARENT);
        assert_eq!(out.get(6, 1), TRANSPARENT);
    }

    #[test]
    fn parallel_matches_serial() {
        let source = gradient(64, 48);
        let h = Homography::from_coefficients([
            0.9, 0.05, 3.2, -0.04, 1.1, 1.7, 0.0008, -0.0005, 1.0,
        ])
        .unwrap();
        let serial = resample(&source, &h, 70, 50);
        let parallel = resample_parallel(&source, &h, 70, 50);
        assert_eq!(serial, parallel);
    }

    #[test]
    fn empty_output_is_allowed() {
        let source = gradient(4, 4);
        let out = resample(&source, &Homography::IDENTITY, 0, 3);
        assert_eq!(out.dimensions(), (0, 3));
        assert!(out.as_raw().is_empty());
    }

    #[test]
    fn just_below_zero_is_outside() {
        let source = RasterBuffer::from_pixel(4, 4, Rgba([200, 200, 200, 255]));
        let out = resample(&source, &translation(-1e-7, -1e-7), 1, 1);
        assert_eq!(out.get(0, 0), TRANSPARENT);
    }

    #[test]
    fn bounds_use_the_unsnapped_coordinate() {
        let source = RasterBuffer::new(4, 3);
        let coordinate = |h: Homography| {
            Sampler {
                source: &source,
                homography: &h,
                snap_epsilon: 1e-6,
            }
            .source_coordinate(0.0, 0.0)
        };

        // Within epsilon of the far edge but still inside: kept, not snapped out.
        assert_eq!(
            coordinate(translation(4.0 - 1e-7, 3.0 - 1e-7)),
            Some((4.0 - 1e-7, 3.0 - 1e-7))
        );
        // Within epsilon of zero but negative: outside.
        assert_eq!(coordinate(translation(-1e-7, 1.0)), None);
        assert_eq!(coordinate(translation(1.0, -1e-7)), None);
        // Inside and near a lattice point: snapped.
        assert_eq!(coordinate(translation(1e-7, 2.0 - 1e-7)), Some((0.0, 2.0)));
    }

    #[test]
    fn snap_only_touches_near_integers() {
        assert_eq!(snap(2.0000000001, 1e-6), 2.0);
        assert_eq!(snap(-1e-9, 1e-6), 0.0);
        assert_eq!(snap(2.25, 1e-6), 2.25);
        assert_eq!(snap_below(3.9999999, 1e-6, 4.0), 3.9999999);
        assert_eq!(snap_below(2.9999999, 1e-6, 4.0), 3.0);
    }
}
