// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the facilities the collector reads.
//
// Each trait is one consumed capability. All of them are read-only; none of
// them may mutate device state.

use std::path::Path;
use std::time::Duration;

use devsignal_core::error::Result;
use devsignal_core::types::{Capabilities, RequestedPermissions};

/// Unified bridge grouping every platform service a mobile OS provides.
///
/// Filesystem and process access are not part of it: those come from the
/// host implementations in [`crate::host`] on every target.
pub trait PlatformBridge:
    PlatformInfo + SystemSettings + Keyguard + DevicePolicy + ServicesAvailability + PackageMetadata
{
    /// Human-readable platform name (e.g. "Android").
    fn platform_name(&self) -> &str;
}

/// Version and build information.
pub trait PlatformInfo: Send + Sync {
    /// Optional facilities present on the running platform.
    fn capabilities(&self) -> Capabilities;

    /// User-visible OS release string (e.g. "14").
    fn os_version(&self) -> Result<String>;

    /// Security patch string (e.g. "2025-01-05").
    ///
    /// Only meaningful when `capabilities().security_patch` is set.
    fn security_patch(&self) -> Result<String>;

    /// Name of the highest-priority security provider, if the platform has one.
    fn security_provider(&self) -> Result<Option<String>>;
}

/// Existence checks against the local filesystem.
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
}

/// Spawn a child process and wait for it.
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args`, blocking for at most `timeout`.
    ///
    /// Returns the exit code, or `None` if the process was terminated by a
    /// signal. Spawn failures and timeouts are errors.
    fn exit_code(&self, program: &str, args: &[String], timeout: Duration) -> Result<Option<i32>>;
}

/// System-wide settings store.
pub trait SystemSettings: Send + Sync {
    /// Read a global integer setting, returning `default` when it is unset.
    fn global_int(&self, name: &str, default: i32) -> Result<i32>;
}

/// Lock-screen service.
pub trait Keyguard: Send + Sync {
    /// PIN, pattern, password or biometric protects the device.
    fn is_device_secure(&self) -> Result<bool>;

    /// Weaker legacy signal: the keyguard is secured by some method.
    fn is_keyguard_secure(&self) -> Result<bool>;
}

/// Device-policy service.
pub trait DevicePolicy: Send + Sync {
    /// Raw storage encryption status code.
    fn storage_encryption_status(&self) -> Result<i32>;
}

/// Resolver for the auxiliary mobile-services framework.
pub trait ServicesAvailability: Send + Sync {
    /// Raw availability result code; `SERVICES_SUCCESS` means usable.
    fn availability_code(&self) -> Result<i32>;
}

/// Package manager metadata for the calling application.
pub trait PackageMetadata: Send + Sync {
    /// Permissions the app declared, with the parallel grant-flags array.
    fn requested_permissions(&self) -> Result<RequestedPermissions>;

    /// Raw protection level of `permission`.
    ///
    /// Returns `DevsignalError::PermissionNotFound` when the platform does
    /// not know the permission.
    fn protection_level(&self, permission: &str) -> Result<i32>;
}
