// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// richtwerk-document: Perspective correction for the Richtwerk editor.
//
// Provides a typed RGBA raster, the projective transform solver, output
// sizing for a corner selection, inverse-mapped bilinear resampling (serial
// or row-parallel), automatic corner proposal, and the encode/decode boundary
// to the rest of the editor.

pub mod image;
pub mod perspective;

// Re-export the primary types so callers can use `richtwerk_document::RasterBuffer` etc.
pub use crate::image::processor::ImageProcessor;
pub use crate::image::raster::RasterBuffer;
pub use crate::perspective::corrector::{PerspectiveCorrector, correct_perspective};
pub use crate::perspective::homography::Homography;
