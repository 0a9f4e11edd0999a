// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective module: linear solver, homography estimation, output sizing,
// bilinear resampling, and corner proposal. Leaves first: solver →
// homography → resample; sizing and corrector tie them together.

pub mod corrector;
pub mod detect;
pub mod homography;
pub mod resample;
pub mod sizing;
pub mod solver;

pub use corrector::{PerspectiveCorrector, correct_perspective};
pub use detect::{detect_document_corners, propose_corners};
pub use homography::{Homography, solve};
pub use resample::{resample, resample_parallel, resample_with};
pub use sizing::{derive_output_size, derive_output_size_with};
