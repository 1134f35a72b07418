// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Devsignal.

use thiserror::Error;

/// Top-level error type for all Devsignal operations.
#[derive(Debug, Error)]
pub enum DevsignalError {
    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    #[error("permission not found: {0}")]
    PermissionNotFound(String),

    // -- Process lookup --
    #[error("failed to spawn process: {0}")]
    ProcessSpawn(String),

    #[error("`{program}` did not exit within {timeout_ms} ms")]
    ProcessTimeout { program: String, timeout_ms: u64 },

    // -- Operation dispatch --
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("report assembly failed: {0}")]
    Report(String),

    // -- Configuration / IO --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DevsignalError>;
