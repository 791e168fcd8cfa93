// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, recording, and Chrome trace export for `marker_reveal`
//! diagnostics.
//!
//! This crate provides [`TraceSink`](marker_reveal_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`] — human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`] — in-memory recording, read back through a
//!   shared [`recorder::Recording`] handle after the sink has been handed to
//!   the experience.
//! - [`chrome::export`] — writes Chrome Trace Event Format JSON from a
//!   recording.

pub mod chrome;
pub mod pretty;
pub mod recorder;
