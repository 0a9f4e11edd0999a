// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the editor UI.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the UI presents it.

use crate::error::RichtwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Something went wrong in passing; trying again may work.
    Transient,
    /// The user must change their input (move a corner, pick another file).
    ActionRequired,
    /// Cannot be fixed by retrying or adjusting the selection.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether re-running the same operation unchanged could succeed.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `RichtwerkError` into a `HumanError` suitable for display.
pub fn humanize_error(err: &RichtwerkError) -> HumanError {
    match err {
        RichtwerkError::DegenerateInput(detail) => humanize_degenerate(detail),

        RichtwerkError::InvalidDimension { width, height } => {
            if !width.is_finite() || !height.is_finite() || *width < 1.0 || *height < 1.0 {
                HumanError {
                    message: "The selected area is too thin.".into(),
                    suggestion: "Drag the corner handles further apart so the selection covers part of the page.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "The selected area is too large to straighten.".into(),
                    suggestion: format!("Try a smaller image or selection. (Requested {width:.0} x {height:.0} pixels)"),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            }
        }

        RichtwerkError::OutOfBounds { .. } => HumanError {
            message: "Something went wrong while straightening the image.".into(),
            suggestion: "Please try again. If this keeps happening, reload the image.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        RichtwerkError::ImageError(detail) => HumanError {
            message: "We couldn't read or save this image.".into(),
            suggestion: format!("Try a different picture, or save it as PNG or JPEG first. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        RichtwerkError::HandoffClosed => HumanError {
            message: "The corrected image is no longer available.".into(),
            suggestion: "Go back and apply the correction again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        RichtwerkError::Io(e) => HumanError {
            message: "Settings could not be read.".into(),
            suggestion: format!("Default settings will be used instead. ({e})"),
            retriable: true,
            severity: Severity::Transient,
        },

        RichtwerkError::Serialization(e) => HumanError {
            message: "Settings are damaged.".into(),
            suggestion: format!("Reset the settings to their defaults. ({e})"),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

/// Pick the wording for a degenerate selection based on what the solver saw.
fn humanize_degenerate(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    let message = if lower.contains("coincident") {
        "Two corners are on top of each other."
    } else if lower.contains("collinear") {
        "Three corners are in a straight line."
    } else if lower.contains("non-finite") {
        "A corner is outside the picture."
    } else {
        "The selected shape can't be straightened."
    };

    HumanError {
        message: message.into(),
        suggestion: "Drag the corner handles onto the four corners of the page, then try again.".into(),
        retriable: false,
        severity: Severity::ActionRequired,
    }
}
