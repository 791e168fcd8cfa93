// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Acquisition reveal and loss reset.
//!
//! The [`Sequencer`] turns the two marker signals into layer state:
//!
//! ```text
//!   Idle ──found──► Revealing(step…) ──last step done──► Steady
//!    ▲                    │                                 │
//!    └──── Resetting ◄────┴───────────── lost ──────────────┘
//! ```
//!
//! On acquisition it opens a new [`Epoch`] and schedules every choreography
//! step at its cumulative offset. On loss it cancels the epoch, which drops
//! every pending step synchronously, then forces all layers back to rest.
//! An acquisition while a session is live is ignored.

use alloc::vec::Vec;

use crate::backend::ClipMode;
use crate::config::{RevealConfig, RevealStep};
use crate::experience::{Cue, Effects};
use crate::layer::{LayerId, LayerRegistry, LayerRole};
use crate::ledger::Epoch;
use crate::time::HostTime;
use crate::trace::{
    AcquisitionIgnoredEvent, CollaboratorMissingEvent, EpochBeganEvent, EpochCancelledEvent,
    SequencerStateEvent, Tracer,
};
use crate::transition::FadeSpec;

/// What a choreography step does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RevealCue {
    /// Hide every content layer.
    HideContent,
    /// Show the entry object and play its one-shot flight clip.
    EntryFlight,
    /// Show the base, text and accent layers, start accent pulses, the glow
    /// clip and the HUD. The card is interactive from here on.
    Reveal,
    /// Fade the text layer out over the step's duration.
    TextFade,
}

impl RevealCue {
    /// Short description used in traces.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HideContent => "reveal:hide-content",
            Self::EntryFlight => "reveal:entry-flight",
            Self::Reveal => "reveal:reveal",
            Self::TextFade => "reveal:text-fade",
        }
    }
}

/// Sequencer lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SequencerState {
    /// No marker.
    Idle,
    /// Choreography running; holds the most recent step that fired.
    Revealing(Option<RevealCue>),
    /// Choreography finished.
    Steady,
    /// Unwinding after a loss.
    Resetting,
}

/// Delayed actions owned by the sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SequencerCue {
    /// Run the step at this index.
    Step(usize),
    /// Every step has run.
    Settled,
}

/// Drives the reveal choreography.
#[derive(Debug)]
pub struct Sequencer {
    config: RevealConfig,
    entry_layer: Option<LayerId>,
    state: SequencerState,
    epoch: Option<Epoch>,
}

impl Sequencer {
    /// Creates an idle sequencer, resolving configured layer names.
    ///
    /// An unknown entry layer is reported and skipped.
    #[must_use]
    pub fn new(config: RevealConfig, layers: &LayerRegistry, tracer: &mut Tracer) -> Self {
        let entry_layer = config.entry_layer.as_deref().and_then(|name| {
            let id = layers.find(name);
            if id.is_none() {
                tracer.collaborator_missing(&CollaboratorMissingEvent { what: name });
            }
            id
        });
        Self {
            config,
            entry_layer,
            state: SequencerState::Idle,
            epoch: None,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> SequencerState {
        self.state
    }

    /// Returns the live session, if any.
    #[must_use]
    pub const fn epoch(&self) -> Option<Epoch> {
        self.epoch
    }

    /// Returns the choreography.
    #[must_use]
    pub const fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// Returns `true` once the card accepts input.
    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        matches!(
            self.state,
            SequencerState::Revealing(Some(RevealCue::Reveal | RevealCue::TextFade))
                | SequencerState::Steady
        )
    }

    /// Handles marker acquisition.
    ///
    /// Only valid from [`Idle`](SequencerState::Idle) or
    /// [`Resetting`](SequencerState::Resetting); otherwise the event is
    /// traced and ignored. Returns `true` if a new session started.
    pub(crate) fn target_found(&mut self, now: HostTime, fx: &mut Effects<'_>) -> bool {
        if !matches!(
            self.state,
            SequencerState::Idle | SequencerState::Resetting
        ) {
            fx.tracer.acquisition_ignored(&AcquisitionIgnoredEvent {
                at: now,
                state: self.state,
            });
            return false;
        }

        // A stray epoch here means a loss was never delivered to us; end it
        // so its pending steps cannot fire into the new session.
        if let Some(stale) = fx.ledger.active() {
            let dropped_timers = fx.ledger.cancel_all(stale);
            fx.tracer.epoch_cancelled(&EpochCancelledEvent {
                epoch: stale,
                at: now,
                dropped_timers,
            });
        }
        let Ok(epoch) = fx.ledger.begin_epoch() else {
            return false;
        };
        self.epoch = Some(epoch);
        fx.tracer.epoch_began(&EpochBeganEvent { epoch, at: now });

        for index in 0..self.config.steps.len() {
            let offset = self.config.offset_of(index);
            fx.ledger.schedule(
                epoch,
                now,
                offset,
                Cue::Sequencer(SequencerCue::Step(index)),
            );
        }
        fx.ledger.schedule(
            epoch,
            now,
            self.config.total(),
            Cue::Sequencer(SequencerCue::Settled),
        );

        self.set_state(SequencerState::Revealing(None), now, fx.tracer);
        true
    }

    /// Starts unwinding after a marker loss.
    ///
    /// Cancels the session and forces every layer, clip and the HUD back to
    /// rest. Leaves the sequencer in [`Resetting`](SequencerState::Resetting)
    /// until [`finish_reset`](Self::finish_reset). Returns `false` (and does
    /// nothing) when already idle.
    pub(crate) fn target_lost(&mut self, now: HostTime, fx: &mut Effects<'_>) -> bool {
        if self.state == SequencerState::Idle {
            return false;
        }
        self.set_state(SequencerState::Resetting, now, fx.tracer);

        if let Some(epoch) = self.epoch.take() {
            let dropped_timers = fx.ledger.cancel_all(epoch);
            fx.tracer.epoch_cancelled(&EpochCancelledEvent {
                epoch,
                at: now,
                dropped_timers,
            });
        }

        fx.layers.reset_all_to_rest();
        if let Some(scene) = fx.collaborators.scene.as_mut() {
            for clip in [&self.config.entry_clip, &self.config.glow_clip]
                .into_iter()
                .flatten()
            {
                scene.stop_clip(clip);
            }
        }
        if let Some(hud) = fx.collaborators.hud.as_mut() {
            hud.hide();
        }
        true
    }

    /// Completes a reset started by [`target_lost`](Self::target_lost).
    pub(crate) fn finish_reset(&mut self, now: HostTime, tracer: &mut Tracer) {
        if self.state == SequencerState::Resetting {
            self.set_state(SequencerState::Idle, now, tracer);
        }
    }

    /// Returns the trace label of a cue.
    pub(crate) fn label(&self, cue: SequencerCue) -> &'static str {
        match cue {
            SequencerCue::Step(index) => self
                .config
                .steps
                .get(index)
                .map_or("reveal:unknown", |step| step.cue.label()),
            SequencerCue::Settled => "reveal:settled",
        }
    }

    /// Runs a due cue. `at` is the time it was due.
    pub(crate) fn fire(&mut self, cue: SequencerCue, at: HostTime, fx: &mut Effects<'_>) {
        match cue {
            SequencerCue::Step(index) => {
                let Some(step) = self.config.steps.get(index).copied() else {
                    return;
                };
                self.run_step(step, fx);
                self.set_state(SequencerState::Revealing(Some(step.cue)), at, fx.tracer);
            }
            SequencerCue::Settled => self.set_state(SequencerState::Steady, at, fx.tracer),
        }
    }

    fn run_step(&self, step: RevealStep, fx: &mut Effects<'_>) {
        let layers = &mut *fx.layers;
        match step.cue {
            RevealCue::HideContent => {
                let content: Vec<LayerId> = layers.with_role(LayerRole::Content).collect();
                for id in content {
                    layers.reset_to_rest(id);
                }
            }
            RevealCue::EntryFlight => {
                if let Some(id) = self.entry_layer {
                    layers.set_opacity(id, 1.0);
                    layers.set_visible(id, true);
                }
                if let (Some(scene), Some(clip)) = (
                    fx.collaborators.scene.as_mut(),
                    self.config.entry_clip.as_deref(),
                ) {
                    scene.play_clip(clip, ClipMode::Once);
                }
            }
            RevealCue::Reveal => {
                let opaque: Vec<LayerId> = layers
                    .with_role(LayerRole::Base)
                    .chain(layers.with_role(LayerRole::Text))
                    .collect();
                for id in opaque {
                    layers.set_opacity(id, 1.0);
                    layers.set_visible(id, true);
                }
                let accents: Vec<LayerId> = layers.with_role(LayerRole::Accent).collect();
                for (n, id) in accents.into_iter().enumerate() {
                    layers.set_opacity(id, self.config.accent_opacity);
                    layers.set_visible(id, true);
                    layers.start_pulse(id, self.config.pulse_for(n));
                }
                if let (Some(scene), Some(clip)) = (
                    fx.collaborators.scene.as_mut(),
                    self.config.glow_clip.as_deref(),
                ) {
                    scene.play_clip(clip, ClipMode::Loop);
                }
                if let Some(hud) = fx.collaborators.hud.as_mut() {
                    hud.show();
                }
            }
            RevealCue::TextFade => {
                let fade = FadeSpec::new(step.duration, self.config.text_easing);
                let text: Vec<LayerId> = layers.with_role(LayerRole::Text).collect();
                for id in text {
                    layers.fade_to(id, 0.0, fade);
                }
            }
        }
    }

    fn set_state(&mut self, to: SequencerState, at: HostTime, tracer: &mut Tracer) {
        if self.state != to {
            tracer.sequencer_state(&SequencerStateEvent {
                at,
                from: self.state,
                to,
            });
            self.state = to;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Collaborators;
    use crate::config::ExperienceConfig;
    use crate::experience::Cue;
    use crate::ledger::TimerLedger;
    use crate::time::Duration;

    struct Rig {
        layers: LayerRegistry,
        ledger: TimerLedger<Cue>,
        collaborators: Collaborators,
        tracer: Tracer,
        sequencer: Sequencer,
    }

    impl Rig {
        fn new() -> Self {
            let config = ExperienceConfig::business_card();
            let mut layers = LayerRegistry::new();
            for spec in &config.layout.layers {
                layers.create_layer(spec).unwrap();
            }
            let mut tracer = Tracer::none();
            let sequencer = Sequencer::new(config.reveal, &layers, &mut tracer);
            Self {
                layers,
                ledger: TimerLedger::new(),
                collaborators: Collaborators::none(),
                tracer,
                sequencer,
            }
        }

        fn found(&mut self, now: u64) -> bool {
            let mut fx = Effects {
                layers: &mut self.layers,
                ledger: &mut self.ledger,
                collaborators: &mut self.collaborators,
                tracer: &mut self.tracer,
            };
            self.sequencer.target_found(HostTime(now), &mut fx)
        }

        fn lost(&mut self, now: u64) -> bool {
            let mut fx = Effects {
                layers: &mut self.layers,
                ledger: &mut self.ledger,
                collaborators: &mut self.collaborators,
                tracer: &mut self.tracer,
            };
            let lost = self.sequencer.target_lost(HostTime(now), &mut fx);
            self.sequencer.finish_reset(HostTime(now), &mut self.tracer);
            lost
        }

        fn advance(&mut self, now: u64) {
            while let Some(due) = self.ledger.pop_due(HostTime(now)) {
                let Cue::Sequencer(cue) = due.action else {
                    continue;
                };
                let mut fx = Effects {
                    layers: &mut self.layers,
                    ledger: &mut self.ledger,
                    collaborators: &mut self.collaborators,
                    tracer: &mut self.tracer,
                };
                self.sequencer.fire(cue, due.at, &mut fx);
            }
        }

        fn layer(&self, name: &str) -> LayerId {
            self.layers.find(name).unwrap()
        }
    }

    #[test]
    fn reveal_runs_at_configured_offsets() {
        let mut rig = Rig::new();
        assert!(rig.found(0));
        rig.advance(0);
        assert_eq!(
            rig.sequencer.state(),
            SequencerState::Revealing(Some(RevealCue::EntryFlight))
        );
        assert!(!rig.layers.is_visible(rig.layer("tri1")));
        assert!(rig.layers.is_visible(rig.layer("cube")));

        rig.advance(5_999);
        assert!(!rig.sequencer.is_interactive());
        rig.advance(6_000);
        assert!(rig.sequencer.is_interactive());
        assert!(rig.layers.is_fully_shown(rig.layer("cardBase")));
        assert!(rig.layers.is_fully_shown(rig.layer("cardText")));
        let tri4 = rig.layer("tri4");
        assert!(rig.layers.is_visible(tri4));
        assert_eq!(rig.layers.pulse(tri4).unwrap().delay, Duration::from_millis(600));

        rig.advance(9_999);
        assert_eq!(rig.layers.fade(rig.layer("cardText")), None);
        rig.advance(10_000);
        let fade = rig.layers.fade(rig.layer("cardText")).unwrap();
        assert_eq!(fade.spec.duration, Duration::from_millis(1_200));
        assert_eq!(fade.to, 0.0);

        rig.advance(11_200);
        assert_eq!(rig.sequencer.state(), SequencerState::Steady);
        assert!(rig.ledger.is_empty());
    }

    #[test]
    fn second_acquisition_is_ignored() {
        let mut rig = Rig::new();
        assert!(rig.found(0));
        let epoch = rig.sequencer.epoch();
        let pending = rig.ledger.len();
        assert!(!rig.found(100));
        assert_eq!(rig.sequencer.epoch(), epoch);
        assert_eq!(rig.ledger.len(), pending);
    }

    #[test]
    fn loss_voids_pending_steps() {
        let mut rig = Rig::new();
        rig.found(0);
        rig.advance(6_000);
        assert!(rig.lost(7_000));
        assert!(rig.ledger.is_empty());
        assert_eq!(rig.ledger.active(), None);
        assert_eq!(rig.sequencer.state(), SequencerState::Idle);

        // Nothing left to fire, even long after the text fade was due.
        rig.advance(60_000);
        let text = rig.layer("cardText");
        assert_eq!(rig.layers.fade(text), None);
        assert_eq!(rig.layers.opacity(text), 1.0);
        assert!(!rig.layers.is_visible(text));
    }

    #[test]
    fn loss_restores_rest_state() {
        let mut rig = Rig::new();
        rig.found(0);
        rig.advance(10_500);
        rig.lost(10_500);
        for id in rig.layers.ids() {
            assert!(!rig.layers.is_visible(id), "{}", rig.layers.name(id));
            assert_eq!(rig.layers.pulse(id), None);
        }
        assert_eq!(rig.layers.opacity(rig.layer("tri2")), 0.5);
        assert_eq!(rig.layers.opacity(rig.layer("cardText")), 1.0);
    }

    #[test]
    fn loss_when_idle_does_nothing() {
        let mut rig = Rig::new();
        assert!(!rig.lost(0));
        rig.found(10);
        assert!(rig.lost(20));
        assert!(!rig.lost(30));
    }

    #[test]
    fn reacquisition_starts_a_fresh_epoch() {
        let mut rig = Rig::new();
        rig.found(0);
        let first = rig.sequencer.epoch().unwrap();
        rig.lost(3_000);
        assert!(rig.found(3_100));
        let second = rig.sequencer.epoch().unwrap();
        assert_ne!(first, second);
        // The replay is relative to the new acquisition.
        rig.advance(9_099);
        assert!(!rig.sequencer.is_interactive());
        rig.advance(9_100);
        assert!(rig.sequencer.is_interactive());
    }
}
