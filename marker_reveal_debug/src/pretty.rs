// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Times are
//! printed in host milliseconds.

use std::io::Write;

use marker_reveal_core::trace::{
    AcquisitionIgnoredEvent, ActionPerformedEvent, ActionSuppressedEvent, CollaboratorFailedEvent,
    CollaboratorMissingEvent, CueFiredEvent, EpochBeganEvent, EpochCancelledEvent,
    FaceResolvedEvent, GestureClassifiedEvent, PageTransitionEvent, SequencerStateEvent,
    TapUnresolvedEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the destination, consuming the sink.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_epoch_began(&mut self, e: &EpochBeganEvent) {
        let _ = writeln!(
            self.writer,
            "[epoch:begin] epoch={} at={}ms",
            e.epoch.serial(),
            e.at.millis(),
        );
    }

    fn on_epoch_cancelled(&mut self, e: &EpochCancelledEvent) {
        let _ = writeln!(
            self.writer,
            "[epoch:cancel] epoch={} at={}ms dropped={}",
            e.epoch.serial(),
            e.at.millis(),
            e.dropped_timers,
        );
    }

    fn on_cue_fired(&mut self, e: &CueFiredEvent) {
        let _ = writeln!(
            self.writer,
            "[cue] epoch={} at={}ms {}",
            e.epoch.serial(),
            e.at.millis(),
            e.cue,
        );
    }

    fn on_acquisition_ignored(&mut self, e: &AcquisitionIgnoredEvent) {
        let _ = writeln!(
            self.writer,
            "[acquire:ignored] at={}ms state={:?}",
            e.at.millis(),
            e.state,
        );
    }

    fn on_sequencer_state(&mut self, e: &SequencerStateEvent) {
        let _ = writeln!(
            self.writer,
            "[state] at={}ms {:?} -> {:?}",
            e.at.millis(),
            e.from,
            e.to,
        );
    }

    fn on_page_transition(&mut self, e: &PageTransitionEvent) {
        let _ = writeln!(
            self.writer,
            "[page] at={}ms {} -> {} {:?}",
            e.at.millis(),
            e.from.name(),
            e.to.name(),
            e.phase,
        );
    }

    fn on_gesture_classified(&mut self, e: &GestureClassifiedEvent) {
        let _ = writeln!(
            self.writer,
            "[gesture] at={}ms {:?} duration={}ms path={:.1}px",
            e.at.millis(),
            e.outcome.classification,
            e.outcome.duration.millis(),
            e.outcome.path_length,
        );
    }

    fn on_face_resolved(&mut self, e: &FaceResolvedEvent) {
        let _ = writeln!(self.writer, "[face] at={}ms {}", e.at.millis(), e.face);
    }

    fn on_tap_unresolved(&mut self, e: &TapUnresolvedEvent) {
        let _ = writeln!(self.writer, "[face] at={}ms unresolved", e.at.millis());
    }

    fn on_action_performed(&mut self, e: &ActionPerformedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[action] at={}ms {:?}",
            e.at.millis(),
            e.action,
        );
    }

    fn on_action_suppressed(&mut self, e: &ActionSuppressedEvent) {
        let _ = writeln!(
            self.writer,
            "[action:duplicate] at={}ms {:?}",
            e.at.millis(),
            e.key,
        );
    }

    fn on_collaborator_missing(&mut self, e: &CollaboratorMissingEvent<'_>) {
        let _ = writeln!(self.writer, "[missing] {}", e.what);
    }

    fn on_collaborator_failed(&mut self, e: &CollaboratorFailedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[failed] at={}ms {}: {}",
            e.at.millis(),
            e.what,
            e.error,
        );
    }
}
