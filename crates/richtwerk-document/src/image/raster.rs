// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// RGBA raster buffer with typed pixel access.

use image::{DynamicImage, Rgba, RgbaImage};
use richtwerk_core::error::{Result, RichtwerkError};

/// Bytes per pixel (red, green, blue, alpha).
pub const CHANNELS: usize = 4;

/// A fully transparent pixel; the initial value of every new raster.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Row-major RGBA8 pixel grid.
///
/// Pixels are read and written as whole `Rgba<u8>` values so callers never do
/// channel offset arithmetic themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Allocate a fully transparent `width` x `height` raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * CHANNELS],
        }
    }

    /// A raster with every pixel set to `pixel`.
    pub fn from_pixel(width: u32, height: u32, pixel: Rgba<u8>) -> Self {
        let data = pixel.0.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap raw RGBA8 bytes. `data.len()` must equal `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(RichtwerkError::ImageError(format!(
                "raw buffer holds {} bytes, {}x{} RGBA needs {}",
                data.len(),
                width,
                height,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw bytes in row-major RGBA order.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the raster, like slice indexing.
    pub fn get(&self, x: u32, y: u32) -> Rgba<u8> {
        let i = self.offset(x, y);
        Rgba([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Overwrite the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the raster.
    pub fn set(&mut self, x: u32, y: u32, pixel: Rgba<u8>) {
        let i = self.offset(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&pixel.0);
    }

    /// Checked read.
    pub fn try_get(&self, x: u32, y: u32) -> Result<Rgba<u8>> {
        if self.contains(x, y) {
            Ok(self.get(x, y))
        } else {
            Err(self.out_of_bounds(x, y))
        }
    }

    /// Checked write.
    pub fn try_set(&mut self, x: u32, y: u32, pixel: Rgba<u8>) -> Result<()> {
        if !self.contains(x, y) {
            return Err(self.out_of_bounds(x, y));
        }
        self.set(x, y, pixel);
        Ok(())
    }

    /// Signed lookup used by samplers: anything outside the raster reads as
    /// transparent black.
    #[inline]
    pub fn get_or_transparent(&self, x: i64, y: i64) -> Rgba<u8> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return TRANSPARENT;
        }
        self.get(x as u32, y as u32)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Bytes per row.
    pub(crate) fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Raw bytes, mutable. Callers split this by `stride()` into rows.
    pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            self.contains(x, y),
            "pixel ({x}, {y}) outside {}x{} raster",
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    fn out_of_bounds(&self, x: u32, y: u32) -> RichtwerkError {
        RichtwerkError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }
}

impl From<RgbaImage> for RasterBuffer {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

impl From<&DynamicImage> for RasterBuffer {
    fn from(img: &DynamicImage) -> Self {
        Self::from(img.to_rgba8())
    }
}

impl From<RasterBuffer> for RgbaImage {
    fn from(raster: RasterBuffer) -> Self {
        // Length is an invariant of RasterBuffer, so this cannot fail.
        RgbaImage::from_raw(raster.width, raster.height, raster.data)
            .unwrap_or_else(|| RgbaImage::new(0, 0))
    }
}

impl From<RasterBuffer> for DynamicImage {
    fn from(raster: RasterBuffer) -> Self {
        DynamicImage::ImageRgba8(raster.into())
    }
}
