// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Resampling engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// How the resampling loop is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Execution {
    /// Always run on the calling thread.
    Serial,
    /// Always split destination rows across the rayon pool.
    Parallel,
    /// Parallel once the destination exceeds `parallel_threshold_pixels`.
    #[default]
    Auto,
}

/// Tunables for homography solving and perspective resampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpConfig {
    /// Smallest acceptable pivot during elimination, relative to the largest
    /// magnitude in the system.
    pub pivot_epsilon: f64,
    /// Three points whose spanned triangle is smaller than this fraction of
    /// the product of its two edge lengths are treated as collinear.
    pub collinearity_epsilon: f64,
    /// Mapped source coordinates this close to a lattice point snap onto it.
    pub snap_epsilon: f64,
    /// Largest permitted output width or height in pixels.
    pub max_output_dimension: u32,
    /// Scheduling of the per-row resampling loop.
    pub execution: Execution,
    /// Destination pixel count above which `Execution::Auto` goes parallel.
    pub parallel_threshold_pixels: u64,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            pivot_epsilon: 1e-10,
            collinearity_epsilon: 1e-9,
            snap_epsilon: 1e-6,
            max_output_dimension: 32_768,
            execution: Execution::Auto,
            parallel_threshold_pixels: 512 * 512,
        }
    }
}

impl WarpConfig {
    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&data)?;
        debug!(path = %path.as_ref().display(), ?config, "Warp config loaded");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Whether a `width` x `height` destination should be resampled in parallel.
    pub fn use_parallel(&self, width: u32, height: u32) -> bool {
        match self.execution {
            Execution::Serial => false,
            Execution::Parallel => true,
            Execution::Auto => width as u64 * height as u64 > self.parallel_threshold_pixels,
        }
    }
}
