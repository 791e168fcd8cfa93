// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory trace recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and appends an owned
//! [`RecordedEvent`] for every call. The experience takes ownership of its
//! sink, so the events live behind a shared [`Recording`] handle that the
//! caller keeps and reads after (or during) a run.

use std::cell::RefCell;
use std::rc::Rc;

use marker_reveal_core::face::Face;
use marker_reveal_core::gesture::GestureOutcome;
use marker_reveal_core::ledger::Epoch;
use marker_reveal_core::page::Page;
use marker_reveal_core::router::{Action, ActionKey};
use marker_reveal_core::sequencer::SequencerState;
use marker_reveal_core::time::HostTime;
use marker_reveal_core::trace::{
    AcquisitionIgnoredEvent, ActionPerformedEvent, ActionSuppressedEvent, CollaboratorFailedEvent,
    CollaboratorMissingEvent, CueFiredEvent, EpochBeganEvent, EpochCancelledEvent,
    FaceResolvedEvent, GestureClassifiedEvent, PagePhase, PageTransitionEvent,
    SequencerStateEvent, TapUnresolvedEvent, TraceSink,
};

/// An owned copy of one trace event.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A marker session started.
    EpochBegan {
        /// The new session.
        epoch: Epoch,
        /// Acquisition time.
        at: HostTime,
    },
    /// A marker session ended.
    EpochCancelled {
        /// The ended session.
        epoch: Epoch,
        /// Loss time.
        at: HostTime,
        /// Delayed actions dropped without firing.
        dropped_timers: usize,
    },
    /// A delayed action fired.
    CueFired {
        /// Owning session.
        epoch: Epoch,
        /// Due time.
        at: HostTime,
        /// Action label.
        cue: &'static str,
    },
    /// A redundant acquisition was ignored.
    AcquisitionIgnored {
        /// Event time.
        at: HostTime,
        /// Sequencer state at the time.
        state: SequencerState,
    },
    /// The sequencer changed state.
    SequencerState {
        /// Change time.
        at: HostTime,
        /// Previous state.
        from: SequencerState,
        /// New state.
        to: SequencerState,
    },
    /// A page transition reached a phase.
    PageTransition {
        /// Event time.
        at: HostTime,
        /// Page being left.
        from: Page,
        /// Page being entered.
        to: Page,
        /// Which phase.
        phase: PagePhase,
    },
    /// A pointer session was classified.
    GestureClassified {
        /// Pointer-up time.
        at: HostTime,
        /// The classification.
        outcome: GestureOutcome,
    },
    /// A tap resolved to a face.
    FaceResolved {
        /// Tap time.
        at: HostTime,
        /// The face.
        face: Face,
    },
    /// A tap resolved to nothing.
    TapUnresolved {
        /// Tap time.
        at: HostTime,
    },
    /// A user action was carried out.
    ActionPerformed {
        /// Event time.
        at: HostTime,
        /// The action.
        action: Action,
    },
    /// A duplicate request was dropped.
    ActionSuppressed {
        /// Event time.
        at: HostTime,
        /// The repeated request.
        key: ActionKey,
    },
    /// A collaborator or layer was absent at wiring time.
    CollaboratorMissing {
        /// Collaborator kind or layer name.
        what: String,
    },
    /// A collaborator reported a failure.
    CollaboratorFailed {
        /// Event time.
        at: HostTime,
        /// Collaborator kind.
        what: &'static str,
        /// Rendered error.
        error: String,
    },
}

impl RecordedEvent {
    /// Returns the event's name, as used in exports.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::EpochBegan { .. } => "EpochBegan",
            Self::EpochCancelled { .. } => "EpochCancelled",
            Self::CueFired { .. } => "CueFired",
            Self::AcquisitionIgnored { .. } => "AcquisitionIgnored",
            Self::SequencerState { .. } => "SequencerState",
            Self::PageTransition { .. } => "PageTransition",
            Self::GestureClassified { .. } => "GestureClassified",
            Self::FaceResolved { .. } => "FaceResolved",
            Self::TapUnresolved { .. } => "TapUnresolved",
            Self::ActionPerformed { .. } => "ActionPerformed",
            Self::ActionSuppressed { .. } => "ActionSuppressed",
            Self::CollaboratorMissing { .. } => "CollaboratorMissing",
            Self::CollaboratorFailed { .. } => "CollaboratorFailed",
        }
    }

    /// Returns the event time. Wiring-time events have none.
    #[must_use]
    pub fn at(&self) -> Option<HostTime> {
        match self {
            Self::EpochBegan { at, .. }
            | Self::EpochCancelled { at, .. }
            | Self::CueFired { at, .. }
            | Self::AcquisitionIgnored { at, .. }
            | Self::SequencerState { at, .. }
            | Self::PageTransition { at, .. }
            | Self::GestureClassified { at, .. }
            | Self::FaceResolved { at, .. }
            | Self::TapUnresolved { at }
            | Self::ActionPerformed { at, .. }
            | Self::ActionSuppressed { at, .. }
            | Self::CollaboratorFailed { at, .. } => Some(*at),
            Self::CollaboratorMissing { .. } => None,
        }
    }
}

/// Shared read access to the events captured by a [`RecorderSink`].
#[derive(Clone, Debug, Default)]
pub struct Recording {
    events: Rc<RefCell<Vec<RecordedEvent>>>,
}

impl Recording {
    /// Returns a copy of everything recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.borrow().clone()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Counts recorded events with the given [`name`](RecordedEvent::name).
    #[must_use]
    pub fn count(&self, name: &str) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.name() == name)
            .count()
    }

    /// Discards everything recorded so far.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

/// A [`TraceSink`] that records every event in memory.
#[derive(Debug, Default)]
pub struct RecorderSink {
    recording: Recording,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle that stays readable after the sink is boxed.
    #[must_use]
    pub fn recording(&self) -> Recording {
        self.recording.clone()
    }

    fn push(&mut self, event: RecordedEvent) {
        self.recording.events.borrow_mut().push(event);
    }
}

impl TraceSink for RecorderSink {
    fn on_epoch_began(&mut self, e: &EpochBeganEvent) {
        self.push(RecordedEvent::EpochBegan {
            epoch: e.epoch,
            at: e.at,
        });
    }

    fn on_epoch_cancelled(&mut self, e: &EpochCancelledEvent) {
        self.push(RecordedEvent::EpochCancelled {
            epoch: e.epoch,
            at: e.at,
            dropped_timers: e.dropped_timers,
        });
    }

    fn on_cue_fired(&mut self, e: &CueFiredEvent) {
        self.push(RecordedEvent::CueFired {
            epoch: e.epoch,
            at: e.at,
            cue: e.cue,
        });
    }

    fn on_acquisition_ignored(&mut self, e: &AcquisitionIgnoredEvent) {
        self.push(RecordedEvent::AcquisitionIgnored {
            at: e.at,
            state: e.state,
        });
    }

    fn on_sequencer_state(&mut self, e: &SequencerStateEvent) {
        self.push(RecordedEvent::SequencerState {
            at: e.at,
            from: e.from,
            to: e.to,
        });
    }

    fn on_page_transition(&mut self, e: &PageTransitionEvent) {
        self.push(RecordedEvent::PageTransition {
            at: e.at,
            from: e.from,
            to: e.to,
            phase: e.phase,
        });
    }

    fn on_gesture_classified(&mut self, e: &GestureClassifiedEvent) {
        self.push(RecordedEvent::GestureClassified {
            at: e.at,
            outcome: e.outcome,
        });
    }

    fn on_face_resolved(&mut self, e: &FaceResolvedEvent) {
        self.push(RecordedEvent::FaceResolved {
            at: e.at,
            face: e.face,
        });
    }

    fn on_tap_unresolved(&mut self, e: &TapUnresolvedEvent) {
        self.push(RecordedEvent::TapUnresolved { at: e.at });
    }

    fn on_action_performed(&mut self, e: &ActionPerformedEvent<'_>) {
        self.push(RecordedEvent::ActionPerformed {
            at: e.at,
            action: e.action.clone(),
        });
    }

    fn on_action_suppressed(&mut self, e: &ActionSuppressedEvent) {
        self.push(RecordedEvent::ActionSuppressed {
            at: e.at,
            key: e.key,
        });
    }

    fn on_collaborator_missing(&mut self, e: &CollaboratorMissingEvent<'_>) {
        self.push(RecordedEvent::CollaboratorMissing {
            what: e.what.to_owned(),
        });
    }

    fn on_collaborator_failed(&mut self, e: &CollaboratorFailedEvent<'_>) {
        self.push(RecordedEvent::CollaboratorFailed {
            at: e.at,
            what: e.what,
            error: e.error.to_string(),
        });
    }
}
