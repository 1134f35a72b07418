// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Requires the Android NDK and targets `aarch64-linux-android` or
// `armv7-linux-androideabi`. Each trait method is a single read-only query
// against the Android SDK through JNI calls into the ART runtime.
//
// ## Architecture notes
//
// The application `Context` comes from `ndk_context`, which the host
// Activity (or `android_main`) initialises before any probe runs. Every
// query attaches the calling thread through a scoped guard and runs inside
// its own JNI local frame, so probes may run from any thread the host
// chooses and leave no local references behind.
//
// A failed JNI call leaves a pending Java exception behind. `jni_call`
// clears it before returning the error, otherwise the next JNI call on the
// thread would abort the process.

#![cfg(target_os = "android")]

use jni::objects::{JIntArray, JObject, JObjectArray, JString, JValue};
use jni::{JNIEnv, JavaVM};

use devsignal_core::error::{DevsignalError, Result};
use devsignal_core::types::{Capabilities, RequestedPermissions};

use crate::traits::*;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// `Context.KEYGUARD_SERVICE`.
const KEYGUARD_SERVICE: &str = "keyguard";

/// `Context.DEVICE_POLICY_SERVICE`.
const DEVICE_POLICY_SERVICE: &str = "device_policy";

/// `PackageManager.GET_PERMISSIONS`.
const GET_PERMISSIONS: i32 = 0x0000_1000;

/// Local reference capacity reserved for one bridge call.
const FRAME_CAPACITY: i32 = 16;

const BUILD_VERSION: &str = "android/os/Build$VERSION";
const NAME_NOT_FOUND: &str = "android/content/pm/PackageManager$NameNotFoundException";

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// Obtain the application `Context` as a [`JObject`].
///
/// The pointer comes from `ndk_context::android_context().context()`, a
/// global reference to the `Activity` (or `Application`) hosting the native
/// code.
fn context() -> Result<JObject<'static>> {
    let ctx = ndk_context::android_context();
    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(DevsignalError::Bridge(
            "Android context is null, native activity not initialised".into(),
        ));
    }
    // SAFETY: the NDK guarantees this pointer is a valid global jobject for
    // the hosting Context.
    Ok(unsafe { JObject::from_raw(ptr.cast()) })
}

/// Run one JNI operation, converting failures into `DevsignalError::Bridge`
/// and clearing any exception the call left pending.
fn jni_call<'local, T>(
    env: &mut JNIEnv<'local>,
    context: &str,
    f: impl FnOnce(&mut JNIEnv<'local>) -> jni::errors::Result<T>,
) -> Result<T> {
    match f(env) {
        Ok(value) => Ok(value),
        Err(e) => {
            clear_exception(env);
            Err(DevsignalError::Bridge(format!("{context}: {e}")))
        }
    }
}

fn clear_exception(env: &mut JNIEnv<'_>) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
}

/// Read a Java string object into a Rust `String`, releasing its local
/// reference.
fn rust_string(env: &mut JNIEnv<'_>, context: &str, obj: JObject<'_>) -> Result<String> {
    if obj.is_null() {
        return Err(DevsignalError::Bridge(format!("{context}: null string")));
    }
    let j_str = JString::from(obj);
    let value = jni_call(env, context, |env| env.get_string(&j_str).map(String::from));
    let _ = env.delete_local_ref(j_str);
    value
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// Android implementation of the Devsignal platform bridge.
///
/// Holds only the `JavaVM` handle; all state lives on the Java side.
pub struct AndroidBridge {
    vm: JavaVM,
}

impl AndroidBridge {
    /// Create a new Android bridge bound to the process-wide `JavaVM`.
    pub fn new() -> Result<Self> {
        let ctx = ndk_context::android_context();
        // SAFETY: `ctx.vm()` returns the `JavaVM*` set by the NDK glue code.
        // The pointer is valid for the lifetime of the process.
        let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
            .map_err(|e| DevsignalError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
        Ok(Self { vm })
    }

    /// Run `f` on an attached thread inside a fresh local frame.
    ///
    /// The guard detaches threads it attached itself when dropped, and the
    /// frame frees every local reference `f` created.
    fn with_env<T>(&self, f: impl FnOnce(&mut JNIEnv<'_>) -> Result<T>) -> Result<T> {
        let mut guard = self
            .vm
            .attach_current_thread()
            .map_err(|e| DevsignalError::Bridge(format!("failed to attach JNI thread: {e}")))?;
        guard
            .with_local_frame(FRAME_CAPACITY, |env| Ok::<_, jni::errors::Error>(f(env)))
            .map_err(|e| DevsignalError::Bridge(format!("JNI local frame: {e}")))?
    }

    fn api_level(&self) -> Result<u32> {
        let level = self.with_env(|env| {
            jni_call(env, "Build.VERSION.SDK_INT", |env| {
                env.get_static_field(BUILD_VERSION, "SDK_INT", "I")?.i()
            })
        })?;
        Ok(u32::try_from(level).unwrap_or(0))
    }

    fn build_version_string(&self, field: &str) -> Result<String> {
        self.with_env(|env| {
            let label = format!("Build.VERSION.{field}");
            let obj = jni_call(env, &label, |env| {
                env.get_static_field(BUILD_VERSION, field, "Ljava/lang/String;")?.l()
            })?;
            rust_string(env, &label, obj)
        })
    }
}

impl PlatformBridge for AndroidBridge {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// PlatformInfo: android.os.Build, java.security.Security
// ---------------------------------------------------------------------------

impl PlatformInfo for AndroidBridge {
    fn capabilities(&self) -> Capabilities {
        match self.api_level() {
            Ok(level) => Capabilities::from_api_level(level),
            Err(e) => {
                tracing::warn!(error = %e, "Android: SDK_INT unreadable, assuming no optional facilities");
                Capabilities::NONE
            }
        }
    }

    fn os_version(&self) -> Result<String> {
        self.build_version_string("RELEASE")
    }

    fn security_patch(&self) -> Result<String> {
        self.build_version_string("SECURITY_PATCH")
    }

    /// `Security.getProviders()[0].getName()`.
    fn security_provider(&self) -> Result<Option<String>> {
        self.with_env(|env| {
            let providers = jni_call(env, "Security.getProviders", |env| {
                env.call_static_method(
                    "java/security/Security",
                    "getProviders",
                    "()[Ljava/security/Provider;",
                    &[],
                )?
                .l()
            })?;
            if providers.is_null() {
                return Ok(None);
            }
            let providers = JObjectArray::from(providers);
            let len = jni_call(env, "providers.length", |env| env.get_array_length(&providers))?;
            if len == 0 {
                return Ok(None);
            }
            let first = jni_call(env, "providers[0]", |env| {
                env.get_object_array_element(&providers, 0)
            })?;
            let name = jni_call(env, "Provider.getName", |env| {
                env.call_method(&first, "getName", "()Ljava/lang/String;", &[])?.l()
            })?;
            rust_string(env, "Provider.getName", name).map(Some)
        })
    }
}

// ---------------------------------------------------------------------------
// SystemSettings: android.provider.Settings.Global
// ---------------------------------------------------------------------------

impl SystemSettings for AndroidBridge {
    fn global_int(&self, name: &str, default: i32) -> Result<i32> {
        let value = self.with_env(|env| {
            let context = context()?;
            let resolver = jni_call(env, "getContentResolver", |env| {
                env.call_method(
                    &context,
                    "getContentResolver",
                    "()Landroid/content/ContentResolver;",
                    &[],
                )?
                .l()
            })?;
            let j_name = jni_call(env, "new_string(setting)", |env| env.new_string(name))?;

            jni_call(env, "Settings.Global.getInt", |env| {
                env.call_static_method(
                    "android/provider/Settings$Global",
                    "getInt",
                    "(Landroid/content/ContentResolver;Ljava/lang/String;I)I",
                    &[
                        JValue::Object(&resolver),
                        JValue::Object(&j_name),
                        JValue::Int(default),
                    ],
                )?
                .i()
            })
        })?;

        tracing::debug!(name, value, "Android: read global setting");
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Keyguard: android.app.KeyguardManager
// ---------------------------------------------------------------------------

impl AndroidBridge {
    fn keyguard_flag(&self, method: &str) -> Result<bool> {
        self.with_env(|env| {
            let manager = system_service(env, KEYGUARD_SERVICE)?;
            jni_call(env, method, |env| env.call_method(&manager, method, "()Z", &[])?.z())
        })
    }
}

impl Keyguard for AndroidBridge {
    fn is_device_secure(&self) -> Result<bool> {
        self.keyguard_flag("isDeviceSecure")
    }

    fn is_keyguard_secure(&self) -> Result<bool> {
        self.keyguard_flag("isKeyguardSecure")
    }
}

// ---------------------------------------------------------------------------
// DevicePolicy: android.app.admin.DevicePolicyManager
// ---------------------------------------------------------------------------

impl DevicePolicy for AndroidBridge {
    fn storage_encryption_status(&self) -> Result<i32> {
        self.with_env(|env| {
            let manager = system_service(env, DEVICE_POLICY_SERVICE)?;
            jni_call(env, "getStorageEncryptionStatus", |env| {
                env.call_method(&manager, "getStorageEncryptionStatus", "()I", &[])?
                    .i()
            })
        })
    }
}

// ---------------------------------------------------------------------------
// ServicesAvailability: com.google.android.gms.common.GoogleApiAvailability
// ---------------------------------------------------------------------------

impl ServicesAvailability for AndroidBridge {
    /// `GoogleApiAvailability.getInstance().isGooglePlayServicesAvailable(context)`.
    ///
    /// When the Play services client library is not bundled with the app the
    /// class lookup fails and this returns `Err(Bridge)`.
    fn availability_code(&self) -> Result<i32> {
        self.with_env(|env| {
            let context = context()?;
            let api = jni_call(env, "GoogleApiAvailability.getInstance", |env| {
                env.call_static_method(
                    "com/google/android/gms/common/GoogleApiAvailability",
                    "getInstance",
                    "()Lcom/google/android/gms/common/GoogleApiAvailability;",
                    &[],
                )?
                .l()
            })?;

            jni_call(env, "isGooglePlayServicesAvailable", |env| {
                env.call_method(
                    &api,
                    "isGooglePlayServicesAvailable",
                    "(Landroid/content/Context;)I",
                    &[JValue::Object(&context)],
                )?
                .i()
            })
        })
    }
}

// ---------------------------------------------------------------------------
// PackageMetadata: android.content.pm.PackageManager
// ---------------------------------------------------------------------------

impl PackageMetadata for AndroidBridge {
    /// `getPackageInfo(getPackageName(), GET_PERMISSIONS)` and its
    /// `requestedPermissions` / `requestedPermissionsFlags` arrays.
    fn requested_permissions(&self) -> Result<RequestedPermissions> {
        let requested = self.with_env(|env| {
            let context = context()?;
            let pm = package_manager(env, &context)?;

            let package_name = jni_call(env, "getPackageName", |env| {
                env.call_method(&context, "getPackageName", "()Ljava/lang/String;", &[])?
                    .l()
            })?;

            let info = jni_call(env, "getPackageInfo", |env| {
                env.call_method(
                    &pm,
                    "getPackageInfo",
                    "(Ljava/lang/String;I)Landroid/content/pm/PackageInfo;",
                    &[JValue::Object(&package_name), JValue::Int(GET_PERMISSIONS)],
                )?
                .l()
            })?;

            let names_obj = jni_call(env, "requestedPermissions", |env| {
                env.get_field(&info, "requestedPermissions", "[Ljava/lang/String;")?
                    .l()
            })?;
            if names_obj.is_null() {
                return Ok(RequestedPermissions::default());
            }
            let names_arr = JObjectArray::from(names_obj);
            let len = jni_call(env, "requestedPermissions.length", |env| {
                env.get_array_length(&names_arr)
            })?;

            // Each element reference is dropped as soon as it is read, so the
            // frame stays small however long the manifest is.
            let mut names = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
            for i in 0..len {
                let element = jni_call(env, "requestedPermissions[i]", |env| {
                    env.get_object_array_element(&names_arr, i)
                })?;
                names.push(rust_string(env, "requestedPermissions[i]", element)?);
            }

            let flags_obj = jni_call(env, "requestedPermissionsFlags", |env| {
                env.get_field(&info, "requestedPermissionsFlags", "[I")?.l()
            })?;
            let mut flags = Vec::new();
            if !flags_obj.is_null() {
                let flags_arr = JIntArray::from(flags_obj);
                let flags_len = jni_call(env, "requestedPermissionsFlags.length", |env| {
                    env.get_array_length(&flags_arr)
                })?;
                flags = vec![0; usize::try_from(flags_len).unwrap_or(0)];
                jni_call(env, "requestedPermissionsFlags[]", |env| {
                    env.get_int_array_region(&flags_arr, 0, &mut flags)
                })?;
            }

            Ok(RequestedPermissions { names, flags })
        })?;

        tracing::debug!(requested = requested.names.len(), "Android: read requested permissions");
        Ok(requested)
    }

    /// `getPermissionInfo(permission, 0).protectionLevel`.
    fn protection_level(&self, permission: &str) -> Result<i32> {
        self.with_env(|env| {
            let context = context()?;
            let pm = package_manager(env, &context)?;
            let j_name = jni_call(env, "new_string(permission)", |env| {
                env.new_string(permission)
            })?;

            let lookup = env.call_method(
                &pm,
                "getPermissionInfo",
                "(Ljava/lang/String;I)Landroid/content/pm/PermissionInfo;",
                &[JValue::Object(&j_name), JValue::Int(0)],
            );
            let info = match lookup.and_then(|v| v.l()) {
                Ok(info) => info,
                Err(e) => {
                    let not_found = pending_exception_is(env, NAME_NOT_FOUND);
                    clear_exception(env);
                    return Err(if not_found {
                        DevsignalError::PermissionNotFound(permission.to_owned())
                    } else {
                        DevsignalError::Bridge(format!("getPermissionInfo: {e}"))
                    });
                }
            };

            jni_call(env, "PermissionInfo.protectionLevel", |env| {
                env.get_field(&info, "protectionLevel", "I")?.i()
            })
        })
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// `context.getSystemService(name)`; a null result is an error.
fn system_service<'local>(env: &mut JNIEnv<'local>, name: &str) -> Result<JObject<'local>> {
    let context = context()?;
    let j_name = jni_call(env, "new_string(service)", |env| env.new_string(name))?;
    let service = jni_call(env, "getSystemService", |env| {
        env.call_method(
            &context,
            "getSystemService",
            "(Ljava/lang/String;)Ljava/lang/Object;",
            &[JValue::Object(&j_name)],
        )?
        .l()
    })?;
    if service.is_null() {
        return Err(DevsignalError::Bridge(format!("system service `{name}` unavailable")));
    }
    Ok(service)
}

fn package_manager<'local>(
    env: &mut JNIEnv<'local>,
    context: &JObject<'_>,
) -> Result<JObject<'local>> {
    jni_call(env, "getPackageManager", |env| {
        env.call_method(
            context,
            "getPackageManager",
            "()Landroid/content/pm/PackageManager;",
            &[],
        )?
        .l()
    })
}

/// Whether the pending Java exception is an instance of `class`.
fn pending_exception_is(env: &mut JNIEnv<'_>, class: &str) -> bool {
    let Ok(throwable) = env.exception_occurred() else {
        return false;
    };
    if throwable.is_null() {
        return false;
    }
    // `is_instance_of` cannot run with an exception pending.
    let _ = env.exception_clear();
    env.is_instance_of(&throwable, class).unwrap_or(false)
}
