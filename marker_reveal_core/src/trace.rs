// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the experience.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! sequencer, page state machine and router call as they act. All method
//! bodies default to no-ops, so implementing only the events you care about
//! is fine.
//!
//! [`Tracer`] owns an optional boxed [`TraceSink`]. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing and the sink is
//! dropped on construction. When **on**, each method performs a single
//! `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace` enables the `Tracer` method bodies (one branch per call).

use alloc::boxed::Box;

use crate::face::Face;
use crate::gesture::GestureOutcome;
use crate::ledger::Epoch;
use crate::page::Page;
use crate::router::{Action, ActionKey};
use crate::sequencer::SequencerState;
use crate::time::HostTime;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which point of a page transition is being reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PagePhase {
    /// The outgoing page started fading out.
    Started,
    /// A newer request replaced this transition before it finished.
    Superseded,
    /// The outgoing page is hidden and the incoming page became current.
    Entered,
    /// Every stage of the incoming page has finished fading in.
    Settled,
    /// No session was live, so the transition completed without fades.
    Immediate,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a marker session starts.
#[derive(Clone, Copy, Debug)]
pub struct EpochBeganEvent {
    /// The new session.
    pub epoch: Epoch,
    /// Acquisition time.
    pub at: HostTime,
}

/// Emitted when a marker session ends.
#[derive(Clone, Copy, Debug)]
pub struct EpochCancelledEvent {
    /// The ended session.
    pub epoch: Epoch,
    /// Loss time.
    pub at: HostTime,
    /// Delayed actions dropped without firing.
    pub dropped_timers: usize,
}

/// Emitted when a delayed action fires.
#[derive(Clone, Copy, Debug)]
pub struct CueFiredEvent {
    /// Session the action belonged to.
    pub epoch: Epoch,
    /// When it was due.
    pub at: HostTime,
    /// Short description of the action.
    pub cue: &'static str,
}

/// Emitted when an acquisition arrives while a session is already live.
#[derive(Clone, Copy, Debug)]
pub struct AcquisitionIgnoredEvent {
    /// Event time.
    pub at: HostTime,
    /// Sequencer state at the time.
    pub state: SequencerState,
}

/// Emitted on every sequencer state change.
#[derive(Clone, Copy, Debug)]
pub struct SequencerStateEvent {
    /// Change time.
    pub at: HostTime,
    /// Previous state.
    pub from: SequencerState,
    /// New state.
    pub to: SequencerState,
}

/// Emitted at each phase of a page transition.
#[derive(Clone, Copy, Debug)]
pub struct PageTransitionEvent {
    /// Event time.
    pub at: HostTime,
    /// Page being left.
    pub from: Page,
    /// Page being entered.
    pub to: Page,
    /// Which phase.
    pub phase: PagePhase,
}

/// Emitted when a pointer session is classified.
#[derive(Clone, Copy, Debug)]
pub struct GestureClassifiedEvent {
    /// Pointer-up time.
    pub at: HostTime,
    /// The classification and the numbers it was derived from.
    pub outcome: GestureOutcome,
}

/// Emitted when a tap resolves to a face.
#[derive(Clone, Copy, Debug)]
pub struct FaceResolvedEvent {
    /// Tap time.
    pub at: HostTime,
    /// The face.
    pub face: Face,
}

/// Emitted when a tap cannot be resolved to a face.
#[derive(Clone, Copy, Debug)]
pub struct TapUnresolvedEvent {
    /// Tap time.
    pub at: HostTime,
}

/// Emitted when a user action is carried out.
#[derive(Clone, Copy, Debug)]
pub struct ActionPerformedEvent<'a> {
    /// Event time.
    pub at: HostTime,
    /// The action.
    pub action: &'a Action,
}

/// Emitted when a duplicate request is dropped.
#[derive(Clone, Copy, Debug)]
pub struct ActionSuppressedEvent {
    /// Event time.
    pub at: HostTime,
    /// The repeated request.
    pub key: ActionKey,
}

/// Emitted at wiring time for each absent collaborator or unknown layer.
#[derive(Clone, Copy, Debug)]
pub struct CollaboratorMissingEvent<'a> {
    /// Collaborator kind or layer name.
    pub what: &'a str,
}

/// Emitted when a collaborator reports a failure.
#[derive(Clone, Copy, Debug)]
pub struct CollaboratorFailedEvent<'a> {
    /// Event time.
    pub at: HostTime,
    /// Collaborator kind.
    pub what: &'static str,
    /// What went wrong.
    pub error: &'a dyn core::error::Error,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the experience.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a marker session starts.
    fn on_epoch_began(&mut self, e: &EpochBeganEvent) {
        _ = e;
    }

    /// Called when a marker session ends.
    fn on_epoch_cancelled(&mut self, e: &EpochCancelledEvent) {
        _ = e;
    }

    /// Called when a delayed action fires.
    fn on_cue_fired(&mut self, e: &CueFiredEvent) {
        _ = e;
    }

    /// Called when a redundant acquisition is ignored.
    fn on_acquisition_ignored(&mut self, e: &AcquisitionIgnoredEvent) {
        _ = e;
    }

    /// Called on every sequencer state change.
    fn on_sequencer_state(&mut self, e: &SequencerStateEvent) {
        _ = e;
    }

    /// Called at each phase of a page transition.
    fn on_page_transition(&mut self, e: &PageTransitionEvent) {
        _ = e;
    }

    /// Called when a pointer session is classified.
    fn on_gesture_classified(&mut self, e: &GestureClassifiedEvent) {
        _ = e;
    }

    /// Called when a tap resolves to a face.
    fn on_face_resolved(&mut self, e: &FaceResolvedEvent) {
        _ = e;
    }

    /// Called when a tap resolves to nothing.
    fn on_tap_unresolved(&mut self, e: &TapUnresolvedEvent) {
        _ = e;
    }

    /// Called when a user action is carried out.
    fn on_action_performed(&mut self, e: &ActionPerformedEvent<'_>) {
        _ = e;
    }

    /// Called when a duplicate request is dropped.
    fn on_action_suppressed(&mut self, e: &ActionSuppressedEvent) {
        _ = e;
    }

    /// Called for each absent collaborator at wiring time.
    fn on_collaborator_missing(&mut self, e: &CollaboratorMissingEvent<'_>) {
        _ = e;
    }

    /// Called when a collaborator fails.
    fn on_collaborator_failed(&mut self, e: &CollaboratorFailedEvent<'_>) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional owned [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// When **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::none()
    }
}

/// Expands to a `Tracer` method that forwards one event to the sink.
macro_rules! emit {
    ($(#[$doc:meta])* $name:ident => $method:ident($event:ty)) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self, e: &$event) {
            #[cfg(feature = "trace")]
            if let Some(s) = &mut self.sink {
                s.$method(e);
            }
            #[cfg(not(feature = "trace"))]
            {
                _ = e;
            }
        }
    };
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {}
        }
    }

    /// Removes and returns the sink, leaving the tracer silent.
    ///
    /// Always `None` without the `trace` feature.
    pub fn take_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        #[cfg(feature = "trace")]
        {
            self.sink.take()
        }
        #[cfg(not(feature = "trace"))]
        {
            None
        }
    }

    emit!(
        /// Emits an [`EpochBeganEvent`].
        epoch_began => on_epoch_began(EpochBeganEvent)
    );
    emit!(
        /// Emits an [`EpochCancelledEvent`].
        epoch_cancelled => on_epoch_cancelled(EpochCancelledEvent)
    );
    emit!(
        /// Emits a [`CueFiredEvent`].
        cue_fired => on_cue_fired(CueFiredEvent)
    );
    emit!(
        /// Emits an [`AcquisitionIgnoredEvent`].
        acquisition_ignored => on_acquisition_ignored(AcquisitionIgnoredEvent)
    );
    emit!(
        /// Emits a [`SequencerStateEvent`].
        sequencer_state => on_sequencer_state(SequencerStateEvent)
    );
    emit!(
        /// Emits a [`PageTransitionEvent`].
        page_transition => on_page_transition(PageTransitionEvent)
    );
    emit!(
        /// Emits a [`GestureClassifiedEvent`].
        gesture_classified => on_gesture_classified(GestureClassifiedEvent)
    );
    emit!(
        /// Emits a [`FaceResolvedEvent`].
        face_resolved => on_face_resolved(FaceResolvedEvent)
    );
    emit!(
        /// Emits a [`TapUnresolvedEvent`].
        tap_unresolved => on_tap_unresolved(TapUnresolvedEvent)
    );
    emit!(
        /// Emits an [`ActionPerformedEvent`].
        action_performed => on_action_performed(ActionPerformedEvent<'_>)
    );
    emit!(
        /// Emits an [`ActionSuppressedEvent`].
        action_suppressed => on_action_suppressed(ActionSuppressedEvent)
    );
    emit!(
        /// Emits a [`CollaboratorMissingEvent`].
        collaborator_missing => on_collaborator_missing(CollaboratorMissingEvent<'_>)
    );
    emit!(
        /// Emits a [`CollaboratorFailedEvent`].
        collaborator_failed => on_collaborator_failed(CollaboratorFailedEvent<'_>)
    );
}
