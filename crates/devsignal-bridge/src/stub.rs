// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for desktop/CI builds where mobile platform services are
// unavailable.
//
// Every service returns `PlatformUnavailable`, so each probe falls back to
// its default. Real implementations live in the `android` module.

use devsignal_core::error::{DevsignalError, Result};
use devsignal_core::types::{Capabilities, RequestedPermissions};

use crate::traits::*;

/// No-op bridge returned on non-mobile platforms.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubBridge;

impl PlatformBridge for StubBridge {
    fn platform_name(&self) -> &str {
        "Desktop (stub)"
    }
}

impl PlatformInfo for StubBridge {
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }

    fn os_version(&self) -> Result<String> {
        Ok(std::env::consts::OS.to_owned())
    }

    fn security_patch(&self) -> Result<String> {
        tracing::warn!("PlatformInfo::security_patch called on stub bridge");
        Err(DevsignalError::PlatformUnavailable)
    }

    fn security_provider(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

impl SystemSettings for StubBridge {
    fn global_int(&self, name: &str, _default: i32) -> Result<i32> {
        tracing::warn!(name, "SystemSettings::global_int called on stub bridge");
        Err(DevsignalError::PlatformUnavailable)
    }
}

impl Keyguard for StubBridge {
    fn is_device_secure(&self) -> Result<bool> {
        tracing::warn!("Keyguard::is_device_secure called on stub bridge");
        Err(DevsignalError::PlatformUnavailable)
    }

    fn is_keyguard_secure(&self) -> Result<bool> {
        tracing::warn!("Keyguard::is_keyguard_secure called on stub bridge");
        Err(DevsignalError::PlatformUnavailable)
    }
}

impl DevicePolicy for StubBridge {
    fn storage_encryption_status(&self) -> Result<i32> {
        Err(DevsignalError::PlatformUnavailable)
    }
}

impl ServicesAvailability for StubBridge {
    fn availability_code(&self) -> Result<i32> {
        Err(DevsignalError::PlatformUnavailable)
    }
}

impl PackageMetadata for StubBridge {
    fn requested_permissions(&self) -> Result<RequestedPermissions> {
        Err(DevsignalError::PlatformUnavailable)
    }

    fn protection_level(&self, permission: &str) -> Result<i32> {
        Err(DevsignalError::PermissionNotFound(permission.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_reports_no_capabilities() {
        assert_eq!(StubBridge.capabilities(), Capabilities::NONE);
        assert_eq!(StubBridge.platform_name(), "Desktop (stub)");
    }

    #[test]
    fn stub_services_are_unavailable() {
        assert!(matches!(
            StubBridge.global_int("adb_enabled", 0),
            Err(DevsignalError::PlatformUnavailable)
        ));
        assert!(matches!(
            StubBridge.storage_encryption_status(),
            Err(DevsignalError::PlatformUnavailable)
        ));
        assert!(StubBridge.requested_permissions().is_err());
        assert_eq!(StubBridge.security_provider().unwrap(), None);
    }
}
