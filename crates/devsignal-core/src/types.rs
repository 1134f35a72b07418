// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Devsignal collector.

use serde::{Deserialize, Serialize};

/// Text reported when a signal cannot be read on this platform.
pub const UNKNOWN: &str = "Unknown";

// ---------------------------------------------------------------------------
// Platform constants
// ---------------------------------------------------------------------------

/// Android API levels that gate individual platform facilities.
pub mod api_level {
    /// `Settings.Global` (developer options, ADB flag).
    pub const JELLY_BEAN_MR1: u32 = 17;
    /// `Build.VERSION.SECURITY_PATCH`, `KeyguardManager.isDeviceSecure`,
    /// `PermissionInfo` protection tiers.
    pub const MARSHMALLOW: u32 = 23;
}

/// Global setting names read through the system-settings reader.
pub mod setting {
    pub const DEVELOPMENT_SETTINGS_ENABLED: &str = "development_settings_enabled";
    pub const ADB_ENABLED: &str = "adb_enabled";
}

/// `PackageInfo.REQUESTED_PERMISSION_GRANTED`.
pub const REQUESTED_PERMISSION_GRANTED: i32 = 2;

/// `PermissionInfo.PROTECTION_DANGEROUS`.
pub const PROTECTION_DANGEROUS: i32 = 1;

/// `ConnectionResult.SUCCESS` from the services-availability resolver.
pub const SERVICES_SUCCESS: i32 = 0;

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// Which optional platform facilities the running platform exposes.
///
/// Probes consult this instead of comparing version numbers. A missing
/// capability means the probe takes its documented fallback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// The platform reports a security patch string.
    pub security_patch: bool,
    /// Global settings flags (developer options, debug bridge) are readable.
    pub global_settings: bool,
    /// The keyguard service distinguishes "device secure" from "keyguard secure".
    pub device_secure_signal: bool,
    /// The device-policy service reports a storage encryption status.
    pub encryption_status: bool,
    /// Permission metadata carries a protection tier.
    pub permission_tiers: bool,
}

impl Capabilities {
    /// No optional facility is present.
    pub const NONE: Self = Self {
        security_patch: false,
        global_settings: false,
        device_secure_signal: false,
        encryption_status: false,
        permission_tiers: false,
    };

    /// Every optional facility is present.
    pub const ALL: Self = Self {
        security_patch: true,
        global_settings: true,
        device_secure_signal: true,
        encryption_status: true,
        permission_tiers: true,
    };

    /// Derive the capability set from an Android API level (`Build.VERSION.SDK_INT`).
    pub fn from_api_level(level: u32) -> Self {
        let marshmallow = level >= api_level::MARSHMALLOW;
        Self {
            security_patch: marshmallow,
            global_settings: level >= api_level::JELLY_BEAN_MR1,
            device_secure_signal: marshmallow,
            encryption_status: marshmallow,
            permission_tiers: marshmallow,
        }
    }
}

// ---------------------------------------------------------------------------
// Encryption status
// ---------------------------------------------------------------------------

/// Whole-device storage encryption state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncryptionStatus {
    #[serde(rename = "Encrypted")]
    Active,
    #[serde(rename = "Not Encrypted")]
    Inactive,
    #[serde(rename = "Encrypting")]
    Activating,
    Unsupported,
    Unknown,
}

impl EncryptionStatus {
    /// Map a `DevicePolicyManager.ENCRYPTION_STATUS_*` code.
    ///
    /// Total: any code outside 0..=3 is `Unknown`.
    pub fn from_platform_code(code: i32) -> Self {
        match code {
            0 => Self::Unsupported,
            1 => Self::Inactive,
            2 => Self::Activating,
            3 => Self::Active,
            _ => Self::Unknown,
        }
    }

    /// Text sent to the host application.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Encrypted",
            Self::Inactive => "Not Encrypted",
            Self::Activating => "Encrypting",
            Self::Unsupported => "Unsupported",
            Self::Unknown => UNKNOWN,
        }
    }
}

impl std::fmt::Display for EncryptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Package metadata
// ---------------------------------------------------------------------------

/// The permissions a package declared, with the parallel grant-flags array
/// exactly as the package manager returns them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedPermissions {
    pub names: Vec<String>,
    pub flags: Vec<i32>,
}

impl RequestedPermissions {
    /// Iterate `(name, granted)` pairs in platform order.
    ///
    /// A name without a matching flag entry is treated as not granted.
    pub fn iter_granted(&self) -> impl Iterator<Item = &str> {
        self.names.iter().enumerate().filter_map(|(i, name)| {
            let flags = self.flags.get(i).copied().unwrap_or(0);
            (flags & REQUESTED_PERMISSION_GRANTED != 0).then_some(name.as_str())
        })
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// The aggregate result of every probe, computed fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityReport {
    #[serde(rename = "securityPatchLevel")]
    pub security_patch_level: String,
    #[serde(rename = "isDeviceCompromised")]
    pub device_compromised: bool,
    #[serde(rename = "isDeveloperOptionsEnabled")]
    pub developer_options_enabled: bool,
    #[serde(rename = "isUsbDebuggingEnabled")]
    pub usb_debugging_enabled: bool,
    #[serde(rename = "isScreenLockEnabled")]
    pub screen_lock_enabled: bool,
    #[serde(rename = "encryptionStatus")]
    pub encryption_status: EncryptionStatus,
    #[serde(rename = "isPlayServicesAvailable")]
    pub play_services_available: bool,
    #[serde(rename = "dangerousPermissions")]
    pub dangerous_permissions: Vec<String>,
    #[serde(rename = "osVersion")]
    pub os_version: String,
    #[serde(
        rename = "securityProvider",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub security_provider: Option<String>,
}
