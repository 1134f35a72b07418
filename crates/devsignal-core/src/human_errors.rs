// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the host application.
//
// Every technical error is mapped to a short sentence the web layer can show
// as-is, plus whether calling the operation again could plausibly help.

use crate::error::DevsignalError;

/// A human-readable error with a plain message and a hint.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Short summary, safe to show to the user.
    pub message: String,
    /// What the integrator should check.
    pub suggestion: String,
    /// Whether re-invoking the operation might succeed.
    pub retriable: bool,
}

/// Convert a `DevsignalError` into a `HumanError`.
pub fn humanize_error(err: &DevsignalError) -> HumanError {
    match err {
        DevsignalError::Bridge(detail) => HumanError {
            message: "The platform did not answer the security query.".into(),
            suggestion: format!("Check that the app has finished starting up. ({detail})"),
            retriable: true,
        },

        DevsignalError::PlatformUnavailable => HumanError {
            message: "This check is not available on this device.".into(),
            suggestion: "The signal is only reported on platforms that expose it.".into(),
            retriable: false,
        },

        DevsignalError::PermissionNotFound(name) => HumanError {
            message: "A declared permission is unknown to the platform.".into(),
            suggestion: format!("Remove or rename `{name}` in the app manifest."),
            retriable: false,
        },

        DevsignalError::ProcessSpawn(_) | DevsignalError::ProcessTimeout { .. } => HumanError {
            message: "The shell lookup could not be completed.".into(),
            suggestion: "The device may restrict process creation; file checks still apply."
                .into(),
            retriable: true,
        },

        DevsignalError::UnknownOperation(name) => HumanError {
            message: format!("`{name}` is not a known security check."),
            suggestion: "Use one of the documented operation names.".into(),
            retriable: false,
        },

        DevsignalError::Report(detail) => HumanError {
            message: "The security report could not be assembled.".into(),
            suggestion: format!("Try again. ({detail})"),
            retriable: true,
        },

        DevsignalError::Config(detail) => HumanError {
            message: "The collector configuration is invalid.".into(),
            suggestion: detail.clone(),
            retriable: false,
        },

        DevsignalError::Io(io_err) => HumanError {
            message: "A file could not be read.".into(),
            suggestion: format!("Check the path and its permissions. ({io_err})"),
            retriable: false,
        },

        DevsignalError::Serialization(_) => HumanError {
            message: "The result could not be encoded for the host.".into(),
            suggestion: "This is a bug in the collector; please report it.".into(),
            retriable: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_operation_names_the_operation() {
        let human = humanize_error(&DevsignalError::UnknownOperation("rootMe".into()));
        assert!(human.message.contains("rootMe"));
        assert!(!human.retriable);
    }

    #[test]
    fn timeout_is_retriable() {
        let err = DevsignalError::ProcessTimeout {
            program: "which".into(),
            timeout_ms: 2000,
        };
        assert!(humanize_error(&err).retriable);
    }

    #[test]
    fn unavailable_platform_is_permanent() {
        let human = humanize_error(&DevsignalError::PlatformUnavailable);
        assert!(!human.retriable);
    }

    #[test]
    fn report_failure_keeps_detail() {
        let human = humanize_error(&DevsignalError::Report("encoder died".into()));
        assert!(human.suggestion.contains("encoder died"));
        assert!(human.retriable);
    }
}
