// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Richtwerk.

use thiserror::Error;

/// Top-level error type for all Richtwerk operations.
#[derive(Debug, Error)]
pub enum RichtwerkError {
    // -- Geometry errors --
    /// The four correspondences are collinear, coincident, or otherwise
    /// produce a singular system. No homography is produced.
    #[error("degenerate corner selection: {0}")]
    DegenerateInput(String),

    /// The derived output raster would be empty, non-finite, or too large.
    #[error("invalid output dimensions: {width} x {height}")]
    InvalidDimension { width: f64, height: f64 },

    // -- Raster errors --
    #[error("pixel ({x}, {y}) outside {width}x{height} raster")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Cross-context handoff --
    #[error("handoff counterpart dropped before the value was delivered")]
    HandoffClosed,

    // -- Configuration --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RichtwerkError>;
