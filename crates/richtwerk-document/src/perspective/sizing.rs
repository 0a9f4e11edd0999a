// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output raster sizing for a corner selection.

use richtwerk_core::error::{Result, RichtwerkError};
use richtwerk_core::{CornerSet, WarpConfig};
use tracing::debug;

/// Output dimensions for straightening `corners`, capped by
/// `WarpConfig::default().max_output_dimension`.
pub fn derive_output_size(corners: &CornerSet) -> Result<(u32, u32)> {
    derive_output_size_with(corners, &WarpConfig::default())
}

/// Output dimensions for straightening `corners`.
///
/// Width is the longer of the top and bottom edges, height the longer of the
/// left and right edges, each rounded to the nearest pixel. Using the longer
/// edge keeps the least foreshortened side at full resolution.
pub fn derive_output_size_with(corners: &CornerSet, config: &WarpConfig) -> Result<(u32, u32)> {
    let width = corners.top_edge().max(corners.bottom_edge()).round();
    let height = corners.left_edge().max(corners.right_edge()).round();

    let limit = config.max_output_dimension as f64;
    let valid = |v: f64| v.is_finite() && v >= 1.0 && v <= limit;
    if !valid(width) || !valid(height) {
        return Err(RichtwerkError::InvalidDimension { width, height });
    }

    debug!(width, height, "Output size derived");
    Ok((width as u32, height as u32))
}
