// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Richtwerk: Core geometry types, configuration, and error definitions shared
// across all crates.

pub mod config;
pub mod error;
pub mod handoff;
pub mod human_errors;
pub mod types;

pub use config::{Execution, WarpConfig};
pub use error::{Result, RichtwerkError};
pub use types::*;
