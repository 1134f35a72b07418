// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Signal collector. Owns the injected collaborators and exposes one method
// per probe plus the aggregate report.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use devsignal_bridge::Platform;
use devsignal_core::config::CollectorConfig;
use devsignal_core::types::{Capabilities, EncryptionStatus, SecurityReport, UNKNOWN};
use tracing::{debug, instrument, warn};

use crate::probes;

/// Collects device security signals from an injected [`Platform`].
///
/// Holds no mutable state, so one collector can serve any number of
/// concurrent callers.
#[derive(Debug, Clone)]
pub struct SignalCollector {
    platform: Platform,
    config: CollectorConfig,
}

impl SignalCollector {
    pub fn new(platform: Platform, config: CollectorConfig) -> Self {
        Self { platform, config }
    }

    /// Collector with the default configuration.
    pub fn with_platform(platform: Platform) -> Self {
        Self::new(platform, CollectorConfig::default())
    }

    pub fn platform_name(&self) -> &str {
        &self.platform.name
    }

    pub fn security_patch_level(&self) -> String {
        let caps = self.capabilities();
        guarded("security_patch_level", UNKNOWN.to_owned(), || {
            probes::security_patch_level(self.platform.info.as_ref(), caps)
        })
    }

    pub fn is_device_compromised(&self) -> bool {
        guarded("device_compromised", false, || {
            probes::device_compromised(
                self.platform.files.as_ref(),
                self.platform.processes.as_ref(),
                &self.config,
            )
        })
    }

    pub fn is_developer_options_enabled(&self) -> bool {
        let caps = self.capabilities();
        guarded("developer_options_enabled", false, || {
            probes::developer_options_enabled(self.platform.settings.as_ref(), caps)
        })
    }

    pub fn is_usb_debugging_enabled(&self) -> bool {
        let caps = self.capabilities();
        guarded("usb_debugging_enabled", false, || {
            probes::usb_debugging_enabled(self.platform.settings.as_ref(), caps)
        })
    }

    pub fn is_screen_lock_enabled(&self) -> bool {
        let caps = self.capabilities();
        guarded("screen_lock_enabled", false, || {
            probes::screen_lock_enabled(self.platform.keyguard.as_ref(), caps)
        })
    }

    pub fn encryption_status(&self) -> EncryptionStatus {
        let caps = self.capabilities();
        guarded("encryption_status", EncryptionStatus::Unknown, || {
            probes::encryption_status(self.platform.device_policy.as_ref(), caps)
        })
    }

    pub fn is_play_services_available(&self) -> bool {
        guarded("play_services_available", false, || {
            probes::play_services_available(self.platform.services.as_ref())
        })
    }

    pub fn dangerous_permissions(&self) -> Vec<String> {
        let caps = self.capabilities();
        guarded("dangerous_permissions", Vec::new(), || {
            probes::dangerous_permissions(self.platform.packages.as_ref(), caps)
        })
    }

    fn os_version(&self) -> String {
        guarded("os_version", UNKNOWN.to_owned(), || {
            probes::os_version(self.platform.info.as_ref())
        })
    }

    fn security_provider(&self) -> Option<String> {
        guarded("security_provider", None, || {
            probes::security_provider(self.platform.info.as_ref())
        })
    }

    fn capabilities(&self) -> Capabilities {
        guarded("capabilities", Capabilities::NONE, || self.platform.info.capabilities())
    }

    /// Run every probe and assemble the results.
    ///
    /// Each field goes through the same guarded method a single-signal call
    /// uses, so one failing collaborator only costs its own field.
    #[instrument(skip(self), fields(platform = %self.platform.name))]
    pub fn report(&self) -> SecurityReport {
        let report = SecurityReport {
            security_patch_level: self.security_patch_level(),
            device_compromised: self.is_device_compromised(),
            developer_options_enabled: self.is_developer_options_enabled(),
            usb_debugging_enabled: self.is_usb_debugging_enabled(),
            screen_lock_enabled: self.is_screen_lock_enabled(),
            encryption_status: self.encryption_status(),
            play_services_available: self.is_play_services_available(),
            dangerous_permissions: self.dangerous_permissions(),
            os_version: self.os_version(),
            security_provider: self.security_provider(),
        };

        debug!(
            compromised = report.device_compromised,
            dangerous = report.dangerous_permissions.len(),
            "security report assembled"
        );
        report
    }
}

/// Run one probe. A panic raised by its collaborators is logged and the
/// probe answers `default` instead.
fn guarded<T>(probe: &'static str, default: T, f: impl FnOnce() -> T) -> T {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        warn!(probe, detail = %panic_message(payload.as_ref()), "probe panicked, using default");
        default
    })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected internal failure".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use devsignal_bridge::fake::{FakePlatform, LookupOutcome};
    use devsignal_core::types::{
        Capabilities, PROTECTION_DANGEROUS, REQUESTED_PERMISSION_GRANTED as GRANTED, setting,
    };

    use super::*;

    fn collector(fake: FakePlatform) -> SignalCollector {
        SignalCollector::with_platform(Arc::new(fake).platform())
    }

    fn busy_device() -> FakePlatform {
        FakePlatform {
            security_patch: Some("2025-02-01".into()),
            security_provider: Some("AndroidOpenSSL".into()),
            lookup: LookupOutcome::Exit(0),
            device_secure: Some(true),
            encryption_code: Some(3),
            services_code: Some(0),
            ..Default::default()
        }
        .with_setting(setting::DEVELOPMENT_SETTINGS_ENABLED, 1)
        .with_setting(setting::ADB_ENABLED, 1)
        .with_permission("android.permission.CAMERA", GRANTED, Some(PROTECTION_DANGEROUS))
        .with_permission("android.permission.INTERNET", GRANTED, Some(0))
    }

    #[test]
    fn report_matches_individual_probes() {
        let c = collector(busy_device());
        let report = c.report();

        assert_eq!(report.security_patch_level, c.security_patch_level());
        assert_eq!(report.device_compromised, c.is_device_compromised());
        assert_eq!(report.developer_options_enabled, c.is_developer_options_enabled());
        assert_eq!(report.usb_debugging_enabled, c.is_usb_debugging_enabled());
        assert_eq!(report.screen_lock_enabled, c.is_screen_lock_enabled());
        assert_eq!(report.encryption_status, c.encryption_status());
        assert_eq!(report.play_services_available, c.is_play_services_available());
        assert_eq!(report.dangerous_permissions, c.dangerous_permissions());
    }

    #[test]
    fn report_of_busy_device() {
        let report = collector(busy_device()).report();
        assert_eq!(report.security_patch_level, "2025-02-01");
        assert!(report.device_compromised);
        assert!(report.developer_options_enabled);
        assert!(report.usb_debugging_enabled);
        assert!(report.screen_lock_enabled);
        assert_eq!(report.encryption_status, EncryptionStatus::Active);
        assert!(report.play_services_available);
        assert_eq!(report.dangerous_permissions, vec!["android.permission.CAMERA"]);
        assert_eq!(report.os_version, "14");
        assert_eq!(report.security_provider.as_deref(), Some("AndroidOpenSSL"));
    }

    #[test]
    fn old_platform_without_root_reports_defaults() {
        let fake = FakePlatform {
            capabilities: Capabilities::from_api_level(16),
            lookup: LookupOutcome::SpawnFails,
            keyguard_secure: Some(false),
            services_code: Some(1),
            ..Default::default()
        };
        let report = collector(fake).report();

        assert_eq!(report.security_patch_level, "Unknown");
        assert!(!report.device_compromised);
        assert!(!report.developer_options_enabled);
        assert!(!report.usb_debugging_enabled);
        assert!(!report.screen_lock_enabled);
        assert_eq!(report.encryption_status, EncryptionStatus::Unknown);
        assert!(!report.play_services_available);
        assert!(report.dangerous_permissions.is_empty());
    }

    #[test]
    fn every_collaborator_failing_still_yields_report() {
        let fake = FakePlatform {
            os_version: None,
            security_patch: None,
            lookup: LookupOutcome::TimesOut,
            settings: None,
            device_secure: None,
            keyguard_secure: None,
            encryption_code: None,
            services_code: None,
            requested: None,
            ..Default::default()
        };
        let report = collector(fake).report();

        assert_eq!(report.security_patch_level, "Unknown");
        assert_eq!(report.os_version, "Unknown");
        assert!(!report.device_compromised);
        assert_eq!(report.encryption_status, EncryptionStatus::Unknown);
        assert!(report.dangerous_permissions.is_empty());
    }

    #[test]
    fn panicking_package_manager_only_empties_permissions() {
        let fake = FakePlatform {
            panic_in_packages: Some("package manager died"),
            ..busy_device()
        };
        let c = collector(fake);
        let report = c.report();

        assert!(report.dangerous_permissions.is_empty());
        assert_eq!(report.security_patch_level, "2025-02-01");
        assert!(report.device_compromised);
        assert!(report.developer_options_enabled);
        assert!(report.usb_debugging_enabled);
        assert!(report.screen_lock_enabled);
        assert_eq!(report.encryption_status, EncryptionStatus::Active);
        assert!(report.play_services_available);
        assert_eq!(report.os_version, "14");

        assert!(c.dangerous_permissions().is_empty());
        assert_eq!(c.report(), report);
    }

    #[test]
    fn panic_messages_are_extracted() {
        let boxed: Box<dyn Any + Send> = Box::new("static text");
        assert_eq!(panic_message(boxed.as_ref()), "static text");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned text"));
        assert_eq!(panic_message(boxed.as_ref()), "owned text");
        let boxed: Box<dyn Any + Send> = Box::new(7_u32);
        assert_eq!(panic_message(boxed.as_ref()), "unexpected internal failure");
    }

    #[test]
    fn repeated_reports_are_identical() {
        let c = collector(busy_device());
        assert_eq!(c.report(), c.report());
    }

    #[test]
    fn collector_is_shareable_across_threads() {
        let c = Arc::new(collector(busy_device()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let c = Arc::clone(&c);
                std::thread::spawn(move || c.report())
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().device_compromised);
        }
    }
}
