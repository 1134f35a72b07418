// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Individual security probes.
//
// Each probe reads only the collaborators it is handed, never fails, and
// never calls another probe. A collaborator error is logged and the probe
// returns its default: `false`, "Unknown", `EncryptionStatus::Unknown` or
// an empty list.

use std::path::Path;

use devsignal_bridge::traits::*;
use devsignal_core::config::CollectorConfig;
use devsignal_core::types::{
    Capabilities, EncryptionStatus, PROTECTION_DANGEROUS, SERVICES_SUCCESS, UNKNOWN, setting,
};
use tracing::{debug, info, warn};

/// Platform security patch string, or "Unknown" where it is not reported.
pub fn security_patch_level(info: &dyn PlatformInfo, caps: Capabilities) -> String {
    if !caps.security_patch {
        return UNKNOWN.to_owned();
    }
    match info.security_patch() {
        Ok(patch) => patch,
        Err(e) => {
            warn!(error = %e, "security patch level unreadable");
            UNKNOWN.to_owned()
        }
    }
}

/// Raw OS release string, or "Unknown".
pub fn os_version(info: &dyn PlatformInfo) -> String {
    info.os_version().unwrap_or_else(|e| {
        warn!(error = %e, "OS version unreadable");
        UNKNOWN.to_owned()
    })
}

/// Highest-priority security provider name, if any.
pub fn security_provider(info: &dyn PlatformInfo) -> Option<String> {
    info.security_provider().unwrap_or_else(|e| {
        debug!(error = %e, "security provider unavailable");
        None
    })
}

/// True when a known `su` path exists or the shell lookup finds `su`.
///
/// The lookup only runs when no path matched. A lookup that cannot be
/// performed counts as "not found".
pub fn device_compromised(
    files: &dyn FileSystem,
    processes: &dyn ProcessRunner,
    config: &CollectorConfig,
) -> bool {
    if let Some(path) = config.su_paths.iter().find(|p| files.exists(Path::new(p))) {
        info!(path = %path, "elevated-privilege binary present");
        return true;
    }
    config.su_lookup_enabled && su_on_path(processes, config)
}

fn su_on_path(processes: &dyn ProcessRunner, config: &CollectorConfig) -> bool {
    let program = &config.su_lookup_program;
    match processes.exit_code(program, &config.su_lookup_args, config.su_lookup_timeout()) {
        Ok(Some(0)) => {
            info!(program = %program, "su located by shell lookup");
            true
        }
        Ok(code) => {
            debug!(program = %program, ?code, "su lookup found nothing");
            false
        }
        Err(e) => {
            debug!(program = %program, error = %e, "su lookup unavailable, treating as not found");
            false
        }
    }
}

/// Developer options toggle.
pub fn developer_options_enabled(settings: &dyn SystemSettings, caps: Capabilities) -> bool {
    global_flag(settings, caps, setting::DEVELOPMENT_SETTINGS_ENABLED)
}

/// USB debugging (debug bridge) toggle.
pub fn usb_debugging_enabled(settings: &dyn SystemSettings, caps: Capabilities) -> bool {
    global_flag(settings, caps, setting::ADB_ENABLED)
}

fn global_flag(settings: &dyn SystemSettings, caps: Capabilities, name: &str) -> bool {
    if !caps.global_settings {
        return false;
    }
    match settings.global_int(name, 0) {
        Ok(value) => value != 0,
        Err(e) => {
            warn!(setting = name, error = %e, "global setting unreadable");
            false
        }
    }
}

/// Whether the device is protected by a lock screen.
///
/// Uses the "device secure" signal where the platform has it; the weaker
/// "keyguard secure" signal is only consulted on older platforms.
pub fn screen_lock_enabled(keyguard: &dyn Keyguard, caps: Capabilities) -> bool {
    let result = if caps.device_secure_signal {
        keyguard.is_device_secure()
    } else {
        keyguard.is_keyguard_secure()
    };
    result.unwrap_or_else(|e| {
        warn!(error = %e, "screen lock state unreadable");
        false
    })
}

/// Storage encryption state.
pub fn encryption_status(policy: &dyn DevicePolicy, caps: Capabilities) -> EncryptionStatus {
    if !caps.encryption_status {
        return EncryptionStatus::Unknown;
    }
    match policy.storage_encryption_status() {
        Ok(code) => EncryptionStatus::from_platform_code(code),
        Err(e) => {
            warn!(error = %e, "encryption status unreadable");
            EncryptionStatus::Unknown
        }
    }
}

/// True only when the resolver answers with the success code.
pub fn play_services_available(services: &dyn ServicesAvailability) -> bool {
    match services.availability_code() {
        Ok(code) => code == SERVICES_SUCCESS,
        Err(e) => {
            warn!(error = %e, "services availability unreadable");
            false
        }
    }
}

/// Granted permissions in the dangerous tier, in the order the package
/// manager lists them.
///
/// Without tier metadata every granted permission is included. A
/// permission whose metadata lookup fails is skipped on every platform.
pub fn dangerous_permissions(packages: &dyn PackageMetadata, caps: Capabilities) -> Vec<String> {
    let requested = match packages.requested_permissions() {
        Ok(requested) => requested,
        Err(e) => {
            warn!(error = %e, "requested permissions unreadable");
            return Vec::new();
        }
    };

    requested
        .iter_granted()
        .filter(|name| match packages.protection_level(name) {
            Ok(level) => !caps.permission_tiers || level == PROTECTION_DANGEROUS,
            Err(e) => {
                debug!(permission = %name, error = %e, "permission metadata missing, skipping");
                false
            }
        })
        .map(str::to_owned)
        .collect()
}
