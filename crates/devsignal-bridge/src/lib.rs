// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Devsignal platform bridge abstractions.
//!
//! Defines one trait per platform facility the collector reads, the
//! [`Platform`] handle set that is injected into the collector, and the
//! per-target selection of real implementations.

use std::sync::Arc;

use devsignal_core::error::Result;

pub mod fake;
pub mod host;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

// iOS has no native bridge and uses the stub like desktop targets.
#[cfg(not(target_os = "android"))]
pub mod stub;

use traits::*;

/// Handles to every collaborator the collector consumes.
///
/// Each field can be swapped independently, which is how tests supply fakes.
#[derive(Clone)]
pub struct Platform {
    pub name: String,
    pub info: Arc<dyn PlatformInfo>,
    pub files: Arc<dyn FileSystem>,
    pub processes: Arc<dyn ProcessRunner>,
    pub settings: Arc<dyn SystemSettings>,
    pub keyguard: Arc<dyn Keyguard>,
    pub device_policy: Arc<dyn DevicePolicy>,
    pub services: Arc<dyn ServicesAvailability>,
    pub packages: Arc<dyn PackageMetadata>,
}

impl Platform {
    /// Wire a mobile bridge together with the host filesystem and process
    /// runner.
    pub fn from_bridge<B: PlatformBridge + 'static>(bridge: B) -> Self {
        let name = bridge.platform_name().to_owned();
        let bridge = Arc::new(bridge);
        Self {
            name,
            info: bridge.clone(),
            files: Arc::new(host::HostFileSystem),
            processes: Arc::new(host::HostProcessRunner),
            settings: bridge.clone(),
            keyguard: bridge.clone(),
            device_policy: bridge.clone(),
            services: bridge.clone(),
            packages: bridge,
        }
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Builds the collaborator set for the target operating system.
///
/// On Android this attaches to the JVM that hosts the app; everywhere else it
/// returns the stub bridge, which cannot fail.
pub fn platform() -> Result<Platform> {
    #[cfg(target_os = "android")]
    {
        Ok(Platform::from_bridge(android::AndroidBridge::new()?))
    }
    #[cfg(not(target_os = "android"))]
    {
        Ok(Platform::from_bridge(stub::StubBridge))
    }
}
