// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host implementations of filesystem and process access.
//
// These work the same on Android, desktop and CI, so every platform uses
// them regardless of which bridge it selects.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use devsignal_core::error::{DevsignalError, Result};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::traits::{FileSystem, ProcessRunner};

/// Filesystem checks against the real root filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFileSystem;

impl FileSystem for HostFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Runs child processes with a hard timeout.
///
/// Each call drives a single-threaded tokio runtime on a short-lived helper
/// thread, so it is safe to call from synchronous code and from inside an
/// existing async runtime alike.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostProcessRunner;

impl ProcessRunner for HostProcessRunner {
    fn exit_code(&self, program: &str, args: &[String], timeout: Duration) -> Result<Option<i32>> {
        std::thread::scope(|scope| {
            scope
                .spawn(|| run_with_timeout(program, args, timeout))
                .join()
                .map_err(|_| DevsignalError::ProcessSpawn(format!("{program}: runner thread panicked")))?
        })
    }
}

fn run_with_timeout(program: &str, args: &[String], timeout: Duration) -> Result<Option<i32>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .enable_time()
        .build()?;

    runtime.block_on(async {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DevsignalError::ProcessSpawn(format!("{program}: {e}")))?;

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(program, code = ?status.code(), "child exited");
                Ok(status.code())
            }
            Ok(Err(e)) => Err(DevsignalError::Io(e)),
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!(program, error = %e, "failed to kill timed-out child");
                }
                Err(DevsignalError::ProcessTimeout {
                    program: program.to_owned(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
        }
    })
}
