// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: typed RGBA rasters and the encode/decode boundary.

pub mod processor;
pub mod raster;

pub use processor::ImageProcessor;
pub use raster::RasterBuffer;
