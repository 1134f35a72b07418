// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! devsignal-collector observes device security signals and reports them.
//!
//! Each probe is an independent read of one platform facility that degrades
//! to a safe default on failure. [`SignalCollector`] wires the probes to an
//! injected [`devsignal_bridge::Platform`]; [`Operation`] is the named
//! surface a host application calls.

pub mod collector;
pub mod operation;
pub mod probes;

// PUBLIC API
pub use collector::SignalCollector;
pub use operation::{Operation, OperationFailure, OperationValue};
