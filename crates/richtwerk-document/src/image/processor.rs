// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor: the boundary between encoded image bytes coming from the
// editor and the raster-level perspective engine. Decodes uploads, runs the
// correction, and encodes the result for the export layer using the `image`
// crate.

use image::{DynamicImage, ImageFormat};
use richtwerk_core::error::{Result, RichtwerkError};
use richtwerk_core::{CornerSet, WarpConfig};
use tracing::{debug, info, instrument};

use crate::image::raster::RasterBuffer;
use crate::perspective::corrector::PerspectiveCorrector;
use crate::perspective::detect::propose_corners;

/// Image pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`, enabling
/// method chaining.
///
/// ```ignore
/// let png = ImageProcessor::from_bytes(&upload)?
///     .correct_perspective(&corners, &WarpConfig::default())?
///     .to_png_bytes()?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode raw encoded bytes (JPEG, PNG, WEBP, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data).map_err(|err| {
            RichtwerkError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Wrap a raster produced elsewhere (e.g. received through a handoff).
    pub fn from_raster(raster: RasterBuffer) -> Self {
        Self {
            image: raster.into(),
        }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    /// RGBA copy of the current image.
    pub fn to_raster(&self) -> RasterBuffer {
        RasterBuffer::from(&self.image)
    }

    // -- Perspective ----------------------------------------------------------

    /// Starting crop handles: the detected page outline, or the full frame.
    pub fn propose_corners(&self) -> CornerSet {
        propose_corners(&self.image)
    }

    /// Straighten the `corners` quadrilateral into a rectangular image.
    ///
    /// The working image is replaced by the corrected RGBA raster; on error
    /// the processor is consumed and nothing is returned.
    #[instrument(skip(self, config))]
    pub fn correct_perspective(self, corners: &CornerSet, config: &WarpConfig) -> Result<Self> {
        info!(
            from_w = self.image.width(),
            from_h = self.image.height(),
            "Correcting perspective"
        );
        let source = self.to_raster();
        let corrected = PerspectiveCorrector::new(config.clone()).correct(&source, corners)?;
        debug!(
            new_w = corrected.width(),
            new_h = corrected.height(),
            "Perspective correction complete"
        );
        Ok(Self::from_raster(corrected))
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        encode_to_format(&self.image, ImageFormat::Png)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    ///
    /// JPEG has no alpha channel; transparent areas are flattened.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder).map_err(|err| {
            RichtwerkError::ImageError(format!("JPEG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image.write_to(&mut cursor, format).map_err(|err| {
        RichtwerkError::ImageError(format!("image encoding failed: {}", err))
    })?;
    Ok(buffer)
}
