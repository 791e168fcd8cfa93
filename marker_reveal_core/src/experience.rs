// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The experience facade.
//!
//! [`Experience`] owns every component and is the single entry point for
//! host events: marker acquisition and loss, pointer input, HUD buttons and
//! frame ticks. Each handler runs to completion and then fires any delayed
//! cues that have become due, so a host that only forwards events and calls
//! [`advance`](Experience::advance) once per frame gets deterministic
//! behavior regardless of frame rate.

use alloc::boxed::Box;
use alloc::format;

use kurbo::Point;

use crate::backend::{ClipMode, Collaborators, Presenter};
use crate::config::ExperienceConfig;
use crate::contact::{self, ContactRecord};
use crate::face::{self, Hit};
use crate::gesture::{Classification, GestureClassifier, ObjectRotation};
use crate::layer::{LayerChanges, LayerRegistry, RegistryError};
use crate::ledger::{Epoch, TimerLedger};
use crate::page::{Page, PageCue, PageMachine};
use crate::router::{Action, ActionKey, FaceBinding, HudButton, Router};
use crate::sequencer::{Sequencer, SequencerCue, SequencerState};
use crate::time::HostTime;
use crate::trace::{
    ActionPerformedEvent, ActionSuppressedEvent, CollaboratorFailedEvent,
    CollaboratorMissingEvent, CueFiredEvent, FaceResolvedEvent, GestureClassifiedEvent,
    TapUnresolvedEvent, TraceSink, Tracer,
};
use crate::transform::Transform3d;

/// A delayed action on the session's timer ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Cue {
    /// A choreography step.
    Sequencer(SequencerCue),
    /// A page transition or slide step.
    Page(PageCue),
}

/// Mutable state shared by the sequencer and the page machine while they
/// act. Only one of them holds it at a time.
pub(crate) struct Effects<'a> {
    pub(crate) layers: &'a mut LayerRegistry,
    pub(crate) ledger: &'a mut TimerLedger<Cue>,
    pub(crate) collaborators: &'a mut Collaborators,
    pub(crate) tracer: &'a mut Tracer,
}

macro_rules! effects {
    ($this:ident) => {
        Effects {
            layers: &mut $this.layers,
            ledger: &mut $this.ledger,
            collaborators: &mut $this.collaborators,
            tracer: &mut $this.tracer,
        }
    };
}

/// The whole marker-triggered experience.
#[derive(Debug)]
pub struct Experience {
    layers: LayerRegistry,
    ledger: TimerLedger<Cue>,
    sequencer: Sequencer,
    pages: PageMachine,
    gesture: GestureClassifier,
    rotation: ObjectRotation,
    router: Router,
    contact: ContactRecord,
    collaborators: Collaborators,
    tracer: Tracer,
    changes: LayerChanges,
}

impl Experience {
    /// Registers the configured layers and wires the collaborators.
    ///
    /// Absent collaborators and unknown layer names are reported to the
    /// tracer and the features they back are skipped. Fails only if the
    /// layer layout itself is invalid.
    pub fn new(
        config: ExperienceConfig,
        collaborators: Collaborators,
        mut tracer: Tracer,
    ) -> Result<Self, RegistryError> {
        let mut layers = LayerRegistry::new();
        for spec in &config.layout.layers {
            layers.create_layer(spec)?;
        }
        for what in collaborators.missing() {
            tracer.collaborator_missing(&CollaboratorMissingEvent { what });
        }

        let pages = PageMachine::new(&config.pages, &config.reveal, &layers, &mut tracer);
        let sequencer = Sequencer::new(config.reveal, &layers, &mut tracer);

        Ok(Self {
            layers,
            ledger: TimerLedger::new(),
            sequencer,
            pages,
            gesture: GestureClassifier::new(config.gesture),
            rotation: ObjectRotation::ZERO,
            router: Router::new(&config.router),
            contact: config.contact,
            collaborators,
            tracer,
            changes: LayerChanges::default(),
        })
    }

    // -- Marker events --

    /// Handles marker acquisition. Returns `true` if a new session started.
    pub fn target_found(&mut self, now: HostTime) -> bool {
        let mut fx = effects!(self);
        let started = self.sequencer.target_found(now, &mut fx);
        self.pump(now);
        started
    }

    /// Handles marker loss: cancels every pending cue and puts everything
    /// back to rest. Returns `false` if there was nothing to undo.
    pub fn target_lost(&mut self, now: HostTime) -> bool {
        let mut fx = effects!(self);
        if !self.sequencer.target_lost(now, &mut fx) {
            return false;
        }
        self.pages.reset(&mut self.collaborators);
        self.gesture.cancel();
        self.rotation = ObjectRotation::ZERO;
        if let Some(scene) = self.collaborators.scene.as_mut() {
            scene.set_rotation(&Transform3d::IDENTITY);
        }
        self.router.reset();
        self.sequencer.finish_reset(now, &mut self.tracer);
        true
    }

    // -- Pointer events --

    /// Starts a pointer session. Ignored until the card is interactive.
    pub fn pointer_down(&mut self, now: HostTime, point: Point) -> bool {
        if !self.is_interactive() {
            return false;
        }
        self.gesture.pointer_down(now, point);
        true
    }

    /// Feeds a pointer move; drags rotate the object incrementally.
    pub fn pointer_move(&mut self, now: HostTime, point: Point) {
        if !self.is_interactive() {
            return;
        }
        let Some(delta) = self.gesture.pointer_move(now, point) else {
            return;
        };
        self.rotation.apply(delta);
        if let Some(scene) = self.collaborators.scene.as_mut() {
            scene.set_rotation(&self.rotation.to_transform());
        }
    }

    /// Ends a pointer session. `hit` is what the pointer was over when it
    /// went up.
    ///
    /// A tap that resolves to a bound face performs that face's action and
    /// returns it. Drags, unresolved taps and duplicates return `None`.
    pub fn pointer_up(&mut self, now: HostTime, hit: Option<Hit>) -> Option<Action> {
        let outcome = self.gesture.pointer_up(now)?;
        self.tracer
            .gesture_classified(&GestureClassifiedEvent { at: now, outcome });
        if outcome.classification != Classification::Tap || !self.is_interactive() {
            return None;
        }

        let Some(face) = hit.and_then(face::resolve) else {
            self.tracer.tap_unresolved(&TapUnresolvedEvent { at: now });
            return None;
        };
        self.tracer.face_resolved(&FaceResolvedEvent { at: now, face });
        if !self.router.admit(ActionKey::Face(face), now) {
            self.tracer.action_suppressed(&ActionSuppressedEvent {
                at: now,
                key: ActionKey::Face(face),
            });
            return None;
        }
        if let Some(scene) = self.collaborators.scene.as_mut() {
            scene.play_clip(&format!("press:{face}"), ClipMode::Once);
        }

        let action = self.router.binding(face)?.action.clone();
        self.perform(&action, now);
        self.pump(now);
        Some(action)
    }

    // -- HUD --

    /// Handles a HUD button press. Returns the action if it was performed.
    pub fn hud_button(&mut self, now: HostTime, button: HudButton) -> Option<Action> {
        if !self.is_interactive() {
            return None;
        }
        let key = ActionKey::Button(button);
        if !self.router.admit(key, now) {
            self.tracer
                .action_suppressed(&ActionSuppressedEvent { at: now, key });
            return None;
        }
        let action = button.action();
        self.perform(&action, now);
        self.pump(now);
        Some(action)
    }

    // -- Frame loop --

    /// Fires every cue due at or before `now`.
    pub fn advance(&mut self, now: HostTime) {
        self.pump(now);
    }

    /// Drains layer changes and hands them to `presenter`.
    pub fn present(&mut self, presenter: &mut dyn Presenter) {
        self.layers.evaluate_into(&mut self.changes);
        presenter.apply(&self.layers, &self.changes);
    }

    /// Drains layer changes without presenting them.
    pub fn evaluate(&mut self) -> LayerChanges {
        self.layers.evaluate()
    }

    // -- Accessors --

    /// Returns the layer registry.
    #[must_use]
    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    /// Returns the sequencer state.
    #[must_use]
    pub fn state(&self) -> SequencerState {
        self.sequencer.state()
    }

    /// Returns `true` once the card accepts input.
    #[must_use]
    pub fn is_interactive(&self) -> bool {
        self.sequencer.is_interactive()
    }

    /// Returns the current page.
    #[must_use]
    pub fn page(&self) -> Page {
        self.pages.current()
    }

    /// Returns the page machine.
    #[must_use]
    pub fn pages(&self) -> &PageMachine {
        &self.pages
    }

    /// Returns the object's accumulated rotation.
    #[must_use]
    pub fn rotation(&self) -> ObjectRotation {
        self.rotation
    }

    /// Returns the live session, if any.
    #[must_use]
    pub fn active_epoch(&self) -> Option<Epoch> {
        self.ledger.active()
    }

    /// Returns the number of pending cues.
    #[must_use]
    pub fn pending_cues(&self) -> usize {
        self.ledger.len()
    }

    /// Returns when the next cue is due, for hosts that sleep between events.
    #[must_use]
    pub fn next_due(&self) -> Option<HostTime> {
        self.ledger.next_due()
    }

    /// Returns the face bindings.
    #[must_use]
    pub fn bindings(&self) -> &[FaceBinding] {
        self.router.bindings()
    }

    /// Returns the contact record.
    #[must_use]
    pub fn contact(&self) -> &ContactRecord {
        &self.contact
    }

    /// Removes and returns the trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.tracer.take_sink()
    }

    // -- Internals --

    fn perform(&mut self, action: &Action, now: HostTime) {
        match action {
            Action::ShowPage(page) => {
                let mut fx = effects!(self);
                self.pages.transition_to(*page, now, &mut fx);
            }
            Action::PreviousSlide | Action::NextSlide => {
                let mut fx = effects!(self);
                let forward = matches!(action, Action::NextSlide);
                self.pages.step_slide(forward, now, &mut fx);
            }
            Action::ExportContact => {
                if let Some(outbox) = self.collaborators.outbox.as_mut()
                    && let Err(error) = outbox.download(
                        contact::FILE_NAME,
                        contact::MIME_TYPE,
                        &self.contact.to_vcard(),
                    )
                {
                    self.tracer.collaborator_failed(&CollaboratorFailedEvent {
                        at: now,
                        what: "outbox",
                        error: &error,
                    });
                }
            }
            Action::OpenLink(url) => {
                if let Some(outbox) = self.collaborators.outbox.as_mut()
                    && let Err(error) = outbox.open_link(url)
                {
                    self.tracer.collaborator_failed(&CollaboratorFailedEvent {
                        at: now,
                        what: "outbox",
                        error: &error,
                    });
                }
            }
        }
        self.tracer
            .action_performed(&ActionPerformedEvent { at: now, action });
    }

    fn pump(&mut self, now: HostTime) {
        while let Some(due) = self.ledger.pop_due(now) {
            let cue = match due.action {
                Cue::Sequencer(c) => self.sequencer.label(c),
                Cue::Page(c) => c.label(),
            };
            self.tracer.cue_fired(&CueFiredEvent {
                epoch: due.epoch,
                at: due.at,
                cue,
            });
            let mut fx = effects!(self);
            match due.action {
                Cue::Sequencer(c) => self.sequencer.fire(c, due.at, &mut fx),
                Cue::Page(c) => self.pages.fire(c, due.at, &mut fx),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::*;
    use crate::backend::{Hud, Media, MediaError, Outbox, OutboxError, Scene};
    use crate::face::Face;
    use crate::layer::LayerId;
    use crate::transition::{Fade, PulseSpec};

    type Log = Rc<RefCell<Vec<String>>>;

    struct FakeScene(Log);

    impl Scene for FakeScene {
        fn play_clip(&mut self, name: &str, mode: ClipMode) {
            self.0.borrow_mut().push(format!("play {name} {mode:?}"));
        }

        fn stop_clip(&mut self, name: &str) {
            self.0.borrow_mut().push(format!("stop {name}"));
        }

        fn set_rotation(&mut self, rotation: &Transform3d) {
            let label = if *rotation == Transform3d::IDENTITY {
                "rotate identity"
            } else {
                "rotate"
            };
            self.0.borrow_mut().push(label.to_string());
        }
    }

    struct FakeHud(Log);

    impl Hud for FakeHud {
        fn show(&mut self) {
            self.0.borrow_mut().push("hud show".to_string());
        }

        fn hide(&mut self) {
            self.0.borrow_mut().push("hud hide".to_string());
        }
    }

    struct FakeMedia(Log);

    impl Media for FakeMedia {
        fn play(&mut self) -> Result<(), MediaError> {
            self.0.borrow_mut().push("media play".to_string());
            Ok(())
        }

        fn pause(&mut self) {
            self.0.borrow_mut().push("media pause".to_string());
        }

        fn rewind(&mut self) {
            self.0.borrow_mut().push("media rewind".to_string());
        }
    }

    struct FakeOutbox {
        log: Log,
        fail: Option<OutboxError>,
    }

    impl Outbox for FakeOutbox {
        fn download(
            &mut self,
            file_name: &str,
            mime_type: &str,
            body: &str,
        ) -> Result<(), OutboxError> {
            assert!(body.starts_with("BEGIN:VCARD"));
            self.log
                .borrow_mut()
                .push(format!("download {file_name} {mime_type}"));
            self.fail.map_or(Ok(()), Err)
        }

        fn open_link(&mut self, url: &str) -> Result<(), OutboxError> {
            self.log.borrow_mut().push(format!("open {url}"));
            self.fail.map_or(Ok(()), Err)
        }
    }

    fn experience_with(fail_outbox: Option<OutboxError>) -> (Experience, Log) {
        let log: Log = Rc::default();
        let collaborators = Collaborators {
            scene: Some(Box::new(FakeScene(log.clone()))),
            media: Some(Box::new(FakeMedia(log.clone()))),
            hud: Some(Box::new(FakeHud(log.clone()))),
            outbox: Some(Box::new(FakeOutbox {
                log: log.clone(),
                fail: fail_outbox,
            })),
        };
        let experience = Experience::new(
            ExperienceConfig::business_card(),
            collaborators,
            Tracer::none(),
        )
        .unwrap();
        (experience, log)
    }

    fn experience() -> (Experience, Log) {
        experience_with(None)
    }

    fn count(log: &Log, entry: &str) -> usize {
        log.borrow().iter().filter(|e| *e == entry).count()
    }

    fn layer(e: &Experience, name: &str) -> LayerId {
        e.layers().find(name).unwrap()
    }

    type Snapshot = Vec<(bool, f32, Option<Fade>, Option<PulseSpec>)>;

    fn snapshot(e: &Experience) -> Snapshot {
        let layers = e.layers();
        layers
            .ids()
            .map(|id| {
                (
                    layers.is_visible(id),
                    layers.opacity(id),
                    layers.fade(id),
                    layers.pulse(id),
                )
            })
            .collect()
    }

    fn tap(e: &mut Experience, at: u64, face: Face) -> Option<Action> {
        e.pointer_down(HostTime(at), Point::new(100.0, 100.0));
        e.pointer_up(HostTime(at + 50), Some(Hit::Element(face)))
    }

    fn drag(e: &mut Experience, at: u64, face: Face) -> Option<Action> {
        e.pointer_down(HostTime(at), Point::new(100.0, 100.0));
        e.pointer_move(HostTime(at + 20), Point::new(130.0, 90.0));
        e.pointer_move(HostTime(at + 40), Point::new(160.0, 80.0));
        e.pointer_up(HostTime(at + 60), Some(Hit::Element(face)))
    }

    #[test]
    fn reveal_ordering_matches_the_choreography() {
        let (mut e, log) = experience();
        assert!(e.target_found(HostTime(0)));
        let accents = ["tri1", "tri2", "tri3", "tri4"].map(|n| layer(&e, n));
        let base = layer(&e, "cardBase");
        let text = layer(&e, "cardText");
        for id in accents.iter().copied().chain([base, text]) {
            assert!(!e.layers().is_visible(id));
        }
        assert_eq!(count(&log, "play entry Once"), 1);

        e.advance(HostTime(6_000));
        assert!(e.layers().is_fully_shown(base));
        assert!(e.layers().is_fully_shown(text));
        for id in accents {
            assert!(e.layers().is_visible(id));
            assert!(e.layers().pulse(id).is_some());
        }
        assert_eq!(count(&log, "play glow Loop"), 1);
        assert_eq!(count(&log, "hud show"), 1);

        e.advance(HostTime(9_999));
        assert_eq!(e.layers().fade(text), None);
        e.advance(HostTime(10_000));
        assert!(e.layers().fade(text).is_some(), "text fade starts at 10 s");
    }

    #[test]
    fn loss_is_idempotent() {
        let (mut e, log) = experience();
        e.target_found(HostTime(0));
        e.advance(HostTime(7_000));
        tap(&mut e, 7_000, Face::Bottom);
        e.advance(HostTime(8_000));

        assert!(e.target_lost(HostTime(8_000)));
        let once = snapshot(&e);
        let log_len = log.borrow().len();
        assert!(!e.target_lost(HostTime(8_001)));
        assert_eq!(snapshot(&e), once);
        assert_eq!(log.borrow().len(), log_len, "no duplicate resets");
        assert_eq!(count(&log, "hud hide"), 1);
        assert_eq!(e.state(), SequencerState::Idle);
        assert_eq!(e.page(), Page::Home);
    }

    #[test]
    fn stale_cues_never_touch_layers() {
        let (mut e, _) = experience();
        // A flaky marker: acquire and lose at awkward moments.
        let script: [(bool, u64); 8] = [
            (true, 0),
            (false, 5_999),
            (true, 6_100),
            (false, 9_000),
            (true, 9_050),
            (false, 16_000),
            (true, 16_001),
            (false, 16_002),
        ];
        for (found, at) in script {
            e.advance(HostTime(at));
            if found {
                e.target_found(HostTime(at));
                assert!(e.active_epoch().is_some());
            } else {
                e.target_lost(HostTime(at));
                assert_eq!(e.active_epoch(), None);
                assert_eq!(e.pending_cues(), 0);
                let _ = e.evaluate();
                e.advance(HostTime(at + 60_000));
                assert!(e.evaluate().is_empty(), "lost at {at}: stale cue fired");
            }
        }
    }

    #[test]
    fn drags_rotate_and_taps_act() {
        let (mut e, log) = experience();
        e.target_found(HostTime(0));
        e.advance(HostTime(6_000));

        assert_eq!(drag(&mut e, 6_000, Face::Right), None);
        let rotation = e.rotation();
        assert!(rotation.yaw > 0.0);
        assert!(rotation.pitch > 0.0, "dragging up pitches forwards");
        assert_eq!(count(&log, "download contact.vcf text/vcard"), 0);

        assert_eq!(tap(&mut e, 7_000, Face::Right), Some(Action::ExportContact));
        assert_eq!(e.rotation(), rotation, "taps never rotate");
        assert_eq!(count(&log, "download contact.vcf text/vcard"), 1);
        assert_eq!(count(&log, "play press:right Once"), 1);
    }

    #[test]
    fn drag_released_away_from_the_object_still_ends() {
        let (mut e, log) = experience();
        e.target_found(HostTime(0));
        e.advance(HostTime(6_000));

        assert!(e.pointer_down(HostTime(6_000), Point::new(100.0, 100.0)));
        e.pointer_move(HostTime(6_020), Point::new(300.0, 100.0));
        let first = e.rotation().yaw;
        e.pointer_move(HostTime(6_040), Point::new(900.0, 100.0));
        assert!(e.rotation().yaw > first, "moves past the object keep rotating");
        assert_eq!(e.pointer_up(HostTime(6_060), None), None);
        assert_eq!(count(&log, "play press:front Once"), 0);

        let yaw = e.rotation().yaw;
        assert_eq!(
            tap(&mut e, 7_000, Face::Front),
            Some(Action::ShowPage(Page::Slideshow))
        );
        assert_eq!(e.rotation().yaw, yaw);
    }

    #[test]
    fn input_is_ignored_until_interactive() {
        let (mut e, log) = experience();
        assert!(!e.pointer_down(HostTime(0), Point::ORIGIN));
        e.target_found(HostTime(0));
        e.advance(HostTime(3_000));
        assert_eq!(tap(&mut e, 3_000, Face::Right), None);
        assert_eq!(e.hud_button(HostTime(3_100), HudButton::Contact), None);
        assert_eq!(count(&log, "download contact.vcf text/vcard"), 0);
    }

    #[test]
    fn example_scenario() {
        let (mut e, log) = experience();

        // (1) Acquire; after 6 s the accents pulse.
        e.target_found(HostTime(0));
        e.advance(HostTime(6_000));
        for name in ["tri1", "tri2", "tri3", "tri4"] {
            let id = layer(&e, name);
            assert!(e.layers().is_visible(id));
            assert!(e.layers().pulse(id).is_some());
        }

        // (2) Tap `right` on Home, reported twice by overlapping listeners.
        assert_eq!(tap(&mut e, 6_500, Face::Right), Some(Action::ExportContact));
        assert_eq!(tap(&mut e, 6_520, Face::Right), None);
        assert_eq!(count(&log, "download contact.vcf text/vcard"), 1);
        assert_eq!(e.page(), Page::Home);
        assert!(!e.pages().is_transitioning());

        // (3) Tap `left`: Home -> Info, Home hidden within one fade.
        assert_eq!(
            tap(&mut e, 7_000, Face::Left),
            Some(Action::ShowPage(Page::Info))
        );
        e.advance(HostTime(7_050 + 400));
        assert_eq!(e.page(), Page::Info);
        for (id, _) in e.pages().layers_of(Page::Home) {
            assert!(!e.layers().is_visible(id), "{}", e.layers().name(id));
        }

        // (4) Lose the marker mid-transition.
        assert!(e.pages().is_transitioning());
        e.target_lost(HostTime(7_600));
        assert_eq!(e.page(), Page::Home);
        assert!(!e.pages().is_transitioning());
        for id in e.layers().ids() {
            assert!(!e.layers().is_visible(id));
            assert_eq!(e.layers().pulse(id), None);
        }
        assert_eq!(e.layers().opacity(layer(&e, "tri1")), 0.5);
        assert_eq!(e.layers().opacity(layer(&e, "cardText")), 1.0);
        assert_eq!(e.rotation(), ObjectRotation::ZERO);
        assert_eq!(count(&log, "rotate identity"), 1);
        assert_eq!(count(&log, "stop glow"), 1);
    }

    #[test]
    fn replay_after_loss_is_identical() {
        let (mut e, _) = experience();
        e.target_found(HostTime(0));
        e.advance(HostTime(12_000));
        let first = snapshot(&e);
        e.target_lost(HostTime(12_000));

        e.target_found(HostTime(20_000));
        e.advance(HostTime(32_000));
        assert_eq!(snapshot(&e), first);
    }

    #[test]
    fn hud_navigates_slides_and_returns_home() {
        let (mut e, _) = experience();
        e.target_found(HostTime(0));
        e.advance(HostTime(6_000));
        tap(&mut e, 6_000, Face::Front);
        e.advance(HostTime(8_000));
        assert_eq!(e.page(), Page::Slideshow);
        let first = e.pages().current_slide();

        assert_eq!(
            e.hud_button(HostTime(8_000), HudButton::Next),
            Some(Action::NextSlide)
        );
        assert_ne!(e.pages().current_slide(), first);
        assert_eq!(e.hud_button(HostTime(8_100), HudButton::Next), None);

        e.hud_button(HostTime(9_000), HudButton::Home);
        e.advance(HostTime(10_000));
        assert_eq!(e.page(), Page::Home);
    }

    #[test]
    fn links_open_once_per_tap() {
        let (mut e, log) = experience();
        e.target_found(HostTime(0));
        e.advance(HostTime(6_000));
        tap(&mut e, 6_000, Face::Top);
        assert_eq!(count(&log, "open https://www.instagram.com/"), 1);
    }

    #[test]
    fn export_failure_is_contained() {
        let (mut e, log) = experience_with(Some(OutboxError::Failed));
        e.target_found(HostTime(0));
        e.advance(HostTime(6_000));
        assert_eq!(tap(&mut e, 6_000, Face::Right), Some(Action::ExportContact));
        assert_eq!(count(&log, "download contact.vcf text/vcard"), 1);
        assert!(e.is_interactive());
    }

    #[test]
    fn unsupported_outbox_is_contained() {
        let (mut e, log) = experience_with(Some(OutboxError::Unsupported));
        e.target_found(HostTime(0));
        e.advance(HostTime(6_000));
        assert!(matches!(
            tap(&mut e, 6_000, Face::Top),
            Some(Action::OpenLink(_))
        ));
        assert_eq!(count(&log, "open https://www.instagram.com/"), 1);
        assert_eq!(
            tap(&mut e, 7_000, Face::Left),
            Some(Action::ShowPage(Page::Info))
        );
        e.advance(HostTime(9_000));
        assert_eq!(e.page(), Page::Info);
    }

    #[test]
    fn runs_without_collaborators() {
        let mut e = Experience::new(
            ExperienceConfig::business_card(),
            Collaborators::none(),
            Tracer::none(),
        )
        .unwrap();
        e.target_found(HostTime(0));
        e.advance(HostTime(6_000));
        assert_eq!(tap(&mut e, 6_000, Face::Right), Some(Action::ExportContact));
        assert_eq!(
            tap(&mut e, 7_000, Face::Bottom),
            Some(Action::ShowPage(Page::Video))
        );
        e.advance(HostTime(9_000));
        assert_eq!(e.page(), Page::Video);
        assert!(e.target_lost(HostTime(9_000)));
    }

    fn config_with_ghost_layer() -> ExperienceConfig {
        let mut config = ExperienceConfig::business_card();
        config.reveal.entry_layer = Some("ghost".into());
        let info = config
            .pages
            .iter_mut()
            .find(|spec| spec.page == Page::Info)
            .unwrap();
        info.stages[1].layers.push("ghost".into());
        config
    }

    #[test]
    fn unknown_layers_are_skipped() {
        let log: Log = Rc::default();
        let collaborators = Collaborators {
            scene: Some(Box::new(FakeScene(log.clone()))),
            ..Collaborators::none()
        };
        let mut e = Experience::new(config_with_ghost_layer(), collaborators, Tracer::none())
            .unwrap();
        assert_eq!(e.layers().find("ghost"), None);

        e.target_found(HostTime(0));
        assert_eq!(count(&log, "play entry Once"), 1);
        e.advance(HostTime(6_000));
        assert!(e.is_interactive());

        assert_eq!(
            tap(&mut e, 6_000, Face::Left),
            Some(Action::ShowPage(Page::Info))
        );
        e.advance(HostTime(9_000));
        assert_eq!(e.page(), Page::Info);
        assert!(!e.pages().is_transitioning());
        for name in ["info1", "info2"] {
            assert!(e.layers().is_fully_shown(layer(&e, name)), "{name}");
        }
    }

    #[test]
    fn unresolved_taps_do_nothing() {
        let (mut e, _) = experience();
        e.target_found(HostTime(0));
        e.advance(HostTime(6_000));
        e.pointer_down(HostTime(6_000), Point::ORIGIN);
        assert_eq!(e.pointer_up(HostTime(6_050), None), None);
        e.pointer_down(HostTime(6_100), Point::ORIGIN);
        assert_eq!(
            e.pointer_up(HostTime(6_150), Some(Hit::Normal([0.0, 0.0, 0.0]))),
            None
        );
        e.pointer_down(HostTime(6_200), Point::ORIGIN);
        assert_eq!(
            e.pointer_up(HostTime(6_250), Some(Hit::Normal([0.9, 0.1, 0.0]))),
            Some(Action::ExportContact)
        );
    }

    #[test]
    fn present_applies_drained_changes() {
        struct CountingPresenter(usize);

        impl Presenter for CountingPresenter {
            fn apply(&mut self, _: &LayerRegistry, changes: &LayerChanges) {
                self.0 += changes.added.len();
            }
        }

        let (mut e, _) = experience();
        let mut presenter = CountingPresenter(0);
        e.present(&mut presenter);
        assert_eq!(presenter.0, e.layers().len());
        e.present(&mut presenter);
        assert_eq!(presenter.0, e.layers().len(), "added is reported once");
    }
}
