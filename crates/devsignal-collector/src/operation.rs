// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Named operations: the surface a host application calls.
//
// A call either succeeds with a JSON value (flags encoded as 0/1, text, a
// list of text, or the report object) or fails with a short message. The
// caller never receives a partial result.

use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

use devsignal_core::error::DevsignalError;
use devsignal_core::human_errors::humanize_error;
use devsignal_core::types::SecurityReport;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{error, info_span};

use crate::collector::{SignalCollector, panic_message};

/// Every operation the collector answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SecurityInfo,
    SecurityPatchLevel,
    DeviceCompromised,
    DeveloperOptionsEnabled,
    UsbDebuggingEnabled,
    ScreenLockEnabled,
    EncryptionStatus,
    PlayServicesAvailable,
    DangerousPermissions,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Self::SecurityInfo,
        Self::SecurityPatchLevel,
        Self::DeviceCompromised,
        Self::DeveloperOptionsEnabled,
        Self::UsbDebuggingEnabled,
        Self::ScreenLockEnabled,
        Self::EncryptionStatus,
        Self::PlayServicesAvailable,
        Self::DangerousPermissions,
    ];

    /// Name the host uses to select the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SecurityInfo => "getSecurityInfo",
            Self::SecurityPatchLevel => "getSecurityPatchLevel",
            Self::DeviceCompromised => "isDeviceCompromised",
            Self::DeveloperOptionsEnabled => "isDeveloperOptionsEnabled",
            Self::UsbDebuggingEnabled => "isUsbDebuggingEnabled",
            Self::ScreenLockEnabled => "isScreenLockEnabled",
            Self::EncryptionStatus => "getEncryptionStatus",
            Self::PlayServicesAvailable => "isPlayServicesAvailable",
            Self::DangerousPermissions => "getDangerousPermissions",
        }
    }

    fn failure_prefix(&self) -> &'static str {
        match self {
            Self::SecurityInfo => "Error getting security info",
            _ => "Error",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = DevsignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| DevsignalError::UnknownOperation(s.to_owned()))
    }
}

/// Successful result of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationValue {
    Report(SecurityReport),
    Text(String),
    /// Sent to the host as `1` or `0`.
    Flag(bool),
    List(Vec<String>),
}

impl Serialize for OperationValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Report(report) => report.serialize(serializer),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Flag(flag) => serializer.serialize_u8(u8::from(*flag)),
            Self::List(items) => items.serialize(serializer),
        }
    }
}

/// Call-level failure delivered to the host instead of a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OperationFailure {
    pub message: String,
}

impl SignalCollector {
    /// Run `op` and return its typed value.
    pub fn run(&self, op: Operation) -> OperationValue {
        match op {
            Operation::SecurityInfo => OperationValue::Report(self.report()),
            Operation::SecurityPatchLevel => OperationValue::Text(self.security_patch_level()),
            Operation::DeviceCompromised => OperationValue::Flag(self.is_device_compromised()),
            Operation::DeveloperOptionsEnabled => {
                OperationValue::Flag(self.is_developer_options_enabled())
            }
            Operation::UsbDebuggingEnabled => OperationValue::Flag(self.is_usb_debugging_enabled()),
            Operation::ScreenLockEnabled => OperationValue::Flag(self.is_screen_lock_enabled()),
            Operation::EncryptionStatus => {
                OperationValue::Text(self.encryption_status().as_str().to_owned())
            }
            Operation::PlayServicesAvailable => {
                OperationValue::Flag(self.is_play_services_available())
            }
            Operation::DangerousPermissions => OperationValue::List(self.dangerous_permissions()),
        }
    }

    /// Dispatch a named operation and encode its result for the host.
    ///
    /// Probes already absorb their own failures. Unknown names, a panic while
    /// assembling the value and encoding errors become an
    /// [`OperationFailure`]; the collector stays usable afterwards.
    pub fn execute(&self, action: &str) -> Result<serde_json::Value, OperationFailure> {
        let op = action.parse::<Operation>().map_err(|e| {
            error!(action, error = %e, "rejected operation");
            OperationFailure {
                message: format!("Error: {}", humanize_error(&e).message),
            }
        })?;

        let _span = info_span!("operation", op = op.name()).entered();

        let value = panic::catch_unwind(AssertUnwindSafe(|| self.run(op)))
            .map_err(|payload| aborted(op, panic_message(payload.as_ref())))?;

        serde_json::to_value(&value).map_err(|e| {
            let e = DevsignalError::from(e);
            error!(error = %e, "failed to encode result");
            OperationFailure {
                message: format!("{}: {}", op.failure_prefix(), humanize_error(&e).message),
            }
        })
    }
}

/// Failure for an operation whose value could not be produced at all.
fn aborted(op: Operation, detail: String) -> OperationFailure {
    let message = format!("{}: {detail}", op.failure_prefix());
    let e = DevsignalError::Report(detail);
    error!(error = %e, "operation aborted");
    OperationFailure { message }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use devsignal_bridge::fake::{FakePlatform, LookupOutcome};
    use devsignal_core::types::{PROTECTION_DANGEROUS, REQUESTED_PERMISSION_GRANTED};
    use serde_json::json;

    use super::*;

    fn collector(fake: FakePlatform) -> SignalCollector {
        SignalCollector::with_platform(Arc::new(fake).platform())
    }

    #[test]
    fn names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
        }
        assert!(matches!(
            "getSecurityinfo".parse::<Operation>(),
            Err(DevsignalError::UnknownOperation(_))
        ));
    }

    #[test]
    fn flags_are_encoded_as_integers() {
        let c = collector(FakePlatform {
            lookup: LookupOutcome::Exit(0),
            ..Default::default()
        });
        assert_eq!(c.execute("isDeviceCompromised").unwrap(), json!(1));
        assert_eq!(c.execute("isUsbDebuggingEnabled").unwrap(), json!(0));
        assert_eq!(c.execute("isPlayServicesAvailable").unwrap(), json!(1));
    }

    #[test]
    fn text_and_list_values() {
        let c = collector(
            FakePlatform {
                encryption_code: Some(2),
                ..Default::default()
            }
            .with_permission("A", REQUESTED_PERMISSION_GRANTED, Some(PROTECTION_DANGEROUS)),
        );
        assert_eq!(c.execute("getSecurityPatchLevel").unwrap(), json!("2025-01-05"));
        assert_eq!(c.execute("getEncryptionStatus").unwrap(), json!("Encrypting"));
        assert_eq!(c.execute("getDangerousPermissions").unwrap(), json!(["A"]));
    }

    #[test]
    fn security_info_is_an_object() {
        let c = collector(FakePlatform::default());
        let value = c.execute("getSecurityInfo").unwrap();
        assert_eq!(value["osVersion"], "14");
        assert_eq!(value["encryptionStatus"], "Not Encrypted");
        assert_eq!(value["isDeviceCompromised"], false);
        assert_eq!(value["dangerousPermissions"], json!([]));
    }

    #[test]
    fn unknown_operation_fails() {
        let c = collector(FakePlatform::default());
        let failure = c.execute("wipeDevice").unwrap_err();
        assert!(failure.message.starts_with("Error: "));
        assert!(failure.message.contains("wipeDevice"));
    }

    #[test]
    fn panicking_collaborator_still_yields_security_info() {
        let c = collector(FakePlatform {
            panic_in_packages: Some("package manager died"),
            device_secure: Some(true),
            encryption_code: Some(3),
            ..Default::default()
        });
        let value = c.execute("getSecurityInfo").unwrap();
        assert_eq!(value["dangerousPermissions"], json!([]));
        assert_eq!(value["isScreenLockEnabled"], true);
        assert_eq!(value["encryptionStatus"], "Encrypted");
        assert_eq!(value["securityPatchLevel"], "2025-01-05");
        assert_eq!(value["osVersion"], "14");
        assert_eq!(value["isPlayServicesAvailable"], true);

        assert_eq!(c.execute("getDangerousPermissions").unwrap(), json!([]));
        assert_eq!(c.execute("isScreenLockEnabled").unwrap(), json!(1));
    }

    #[test]
    fn aborted_operation_uses_its_prefix() {
        let failure = aborted(Operation::SecurityInfo, "encoder died".into());
        assert_eq!(failure.message, "Error getting security info: encoder died");
        let failure = aborted(Operation::DangerousPermissions, "encoder died".into());
        assert_eq!(failure.message, "Error: encoder died");
    }
}
