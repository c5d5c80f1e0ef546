// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how a front end presents it.

use crate::error::PapercutError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth retrying as-is.
    Transient,
    /// User must do something (adjust corners, fix a setting).
    ActionRequired,
    /// Retrying will not help; a different input is needed.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the same action can simply be retried.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `PapercutError` into a `HumanError`.
pub fn humanize_error(err: &PapercutError) -> HumanError {
    match err {
        PapercutError::Decode(_) | PapercutError::EmptyImage => HumanError {
            message: "We couldn't load this image.".into(),
            suggestion: "The file may be damaged or not a picture. Try a JPEG or PNG photo of the document.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        PapercutError::InvalidGeometry(_) => HumanError {
            message: "The selected corners don't outline a page.".into(),
            suggestion: "Drag the four corners so they sit on the corners of the document, then apply the cutout again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PapercutError::Encode(_) => HumanError {
            message: "The scan couldn't be saved as an image.".into(),
            suggestion: "Try again. If it keeps failing, try a smaller photo.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        PapercutError::Config(detail) => HumanError {
            message: "A scanner setting is invalid.".into(),
            suggestion: format!("Fix or remove the setting and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PapercutError::Worker(_) => HumanError {
            message: "Finding the document edges stopped unexpectedly.".into(),
            suggestion: "Try loading the image again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        PapercutError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "Check the file name and location, then try again.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Papercut isn't allowed to use this file or folder.".into(),
                suggestion: "Choose a location you have permission to read or write.".into(),
                retriable: false,
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "Reading or writing a file failed.".into(),
                suggestion: "Make sure there is free disk space, then try again.".into(),
                retriable: true,
                severity: Severity::Transient,
            },
        },

        PapercutError::Serialization(_) => HumanError {
            message: "A settings or report file is malformed.".into(),
            suggestion: "Delete or repair the JSON file and try again.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}
