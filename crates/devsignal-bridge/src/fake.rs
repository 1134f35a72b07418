// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory platform for tests and benchmarks.
//
// Every facility answers from plain fields. `None` means the facility fails
// with `PlatformUnavailable`, which is how tests drive the fallback paths.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use devsignal_core::error::{DevsignalError, Result};
use devsignal_core::types::{Capabilities, RequestedPermissions};

use crate::Platform;
use crate::traits::*;

/// What the fake process runner does when asked to run the `su` lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Exit(i32),
    Signalled,
    SpawnFails,
    TimesOut,
}

/// Scriptable platform state.
#[derive(Debug)]
pub struct FakePlatform {
    pub capabilities: Capabilities,
    pub os_version: Option<String>,
    pub security_patch: Option<String>,
    pub security_provider: Option<String>,
    pub existing_paths: HashSet<PathBuf>,
    pub lookup: LookupOutcome,
    /// `None` makes every settings read fail.
    pub settings: Option<HashMap<String, i32>>,
    pub device_secure: Option<bool>,
    pub keyguard_secure: Option<bool>,
    pub encryption_code: Option<i32>,
    pub services_code: Option<i32>,
    pub requested: Option<RequestedPermissions>,
    /// Permissions absent from this map are unknown to the platform.
    pub protection_levels: HashMap<String, i32>,
    /// When set, every package metadata call panics with this message.
    pub panic_in_packages: Option<&'static str>,
    /// Process-runner invocations so far.
    pub lookups: AtomicUsize,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::ALL,
            os_version: Some("14".into()),
            security_patch: Some("2025-01-05".into()),
            security_provider: None,
            existing_paths: HashSet::new(),
            lookup: LookupOutcome::Exit(1),
            settings: Some(HashMap::new()),
            device_secure: Some(false),
            keyguard_secure: Some(false),
            encryption_code: Some(1),
            services_code: Some(0),
            requested: Some(RequestedPermissions::default()),
            protection_levels: HashMap::new(),
            panic_in_packages: None,
            lookups: AtomicUsize::new(0),
        }
    }
}

impl FakePlatform {
    /// Set a global setting value.
    pub fn with_setting(mut self, name: &str, value: i32) -> Self {
        self.settings
            .get_or_insert_with(HashMap::new)
            .insert(name.to_owned(), value);
        self
    }

    /// Declare a permission with its grant flags and protection level.
    ///
    /// `level = None` leaves the permission unknown to the metadata lookup.
    pub fn with_permission(mut self, name: &str, flags: i32, level: Option<i32>) -> Self {
        let requested = self.requested.get_or_insert_with(RequestedPermissions::default);
        requested.names.push(name.to_owned());
        requested.flags.push(flags);
        if let Some(level) = level {
            self.protection_levels.insert(name.to_owned(), level);
        }
        self
    }

    /// Mark a filesystem path as present.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.existing_paths.insert(path.into());
        self
    }

    /// How many times the process runner has been invoked.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Build a [`Platform`] whose every collaborator is this fake.
    pub fn platform(self: &Arc<Self>) -> Platform {
        Platform {
            name: "Fake".into(),
            info: self.clone(),
            files: self.clone(),
            processes: self.clone(),
            settings: self.clone(),
            keyguard: self.clone(),
            device_policy: self.clone(),
            services: self.clone(),
            packages: self.clone(),
        }
    }

    fn check_panic(&self) {
        if let Some(message) = self.panic_in_packages {
            panic!("{message}");
        }
    }
}

fn available<T: Clone>(value: &Option<T>) -> Result<T> {
    value.clone().ok_or(DevsignalError::PlatformUnavailable)
}

impl PlatformInfo for FakePlatform {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn os_version(&self) -> Result<String> {
        available(&self.os_version)
    }

    fn security_patch(&self) -> Result<String> {
        available(&self.security_patch)
    }

    fn security_provider(&self) -> Result<Option<String>> {
        Ok(self.security_provider.clone())
    }
}

impl FileSystem for FakePlatform {
    fn exists(&self, path: &Path) -> bool {
        self.existing_paths.contains(path)
    }
}

impl ProcessRunner for FakePlatform {
    fn exit_code(&self, program: &str, _args: &[String], timeout: Duration) -> Result<Option<i32>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match self.lookup {
            LookupOutcome::Exit(code) => Ok(Some(code)),
            LookupOutcome::Signalled => Ok(None),
            LookupOutcome::SpawnFails => {
                Err(DevsignalError::ProcessSpawn(format!("{program}: not found")))
            }
            LookupOutcome::TimesOut => Err(DevsignalError::ProcessTimeout {
                program: program.to_owned(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

impl SystemSettings for FakePlatform {
    fn global_int(&self, name: &str, default: i32) -> Result<i32> {
        let settings = self.settings.as_ref().ok_or(DevsignalError::PlatformUnavailable)?;
        Ok(settings.get(name).copied().unwrap_or(default))
    }
}

impl Keyguard for FakePlatform {
    fn is_device_secure(&self) -> Result<bool> {
        available(&self.device_secure)
    }

    fn is_keyguard_secure(&self) -> Result<bool> {
        available(&self.keyguard_secure)
    }
}

impl DevicePolicy for FakePlatform {
    fn storage_encryption_status(&self) -> Result<i32> {
        available(&self.encryption_code)
    }
}

impl ServicesAvailability for FakePlatform {
    fn availability_code(&self) -> Result<i32> {
        available(&self.services_code)
    }
}

impl PackageMetadata for FakePlatform {
    fn requested_permissions(&self) -> Result<RequestedPermissions> {
        self.check_panic();
        available(&self.requested)
    }

    fn protection_level(&self, permission: &str) -> Result<i32> {
        self.check_panic();
        self.protection_levels
            .get(permission)
            .copied()
            .ok_or_else(|| DevsignalError::PermissionNotFound(permission.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_populate_parallel_arrays() {
        let fake = FakePlatform::default()
            .with_permission("a", 2, Some(1))
            .with_permission("b", 0, None);
        let requested = fake.requested_permissions().unwrap();
        assert_eq!(requested.names, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(requested.flags, vec![2, 0]);
        assert!(matches!(
            fake.protection_level("b"),
            Err(DevsignalError::PermissionNotFound(_))
        ));
    }

    #[test]
    fn lookups_are_counted() {
        let fake = Arc::new(FakePlatform::default());
        let platform = fake.platform();
        let _ = platform.processes.exit_code("which", &[], Duration::from_secs(1));
        assert_eq!(fake.lookup_count(), 1);
    }
}
