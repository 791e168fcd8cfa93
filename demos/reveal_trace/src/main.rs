// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless replay of a marker session that exercises the tracing pipeline.
//!
//! Drives the business-card experience through a scripted session (acquire,
//! reveal, taps, a drag, loss mid-transition, reacquire) at 60 Hz, printing
//! every event through a
//! [`PrettyPrintSink`](marker_reveal_debug::pretty::PrettyPrintSink) while a
//! [`RecorderSink`](marker_reveal_debug::recorder::RecorderSink) captures the
//! same events, then exports a Chrome trace JSON file.
//!
//! Layer changes go to a headless presenter that samples fades and pulses,
//! so the log also shows the opacities a renderer would be drawing.
//!
//! Run with: `cargo run -p reveal_trace`

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write as _};

use kurbo::Point;
use marker_reveal_core::Experience;
use marker_reveal_core::backend::{Collaborators, Outbox, OutboxError, Presenter};
use marker_reveal_core::config::ExperienceConfig;
use marker_reveal_core::face::{Face, Hit};
use marker_reveal_core::layer::{LayerChanges, LayerId, LayerRegistry};
use marker_reveal_core::time::HostTime;
use marker_reveal_core::trace::{
    AcquisitionIgnoredEvent, ActionPerformedEvent, ActionSuppressedEvent, CollaboratorFailedEvent,
    CollaboratorMissingEvent, CueFiredEvent, EpochBeganEvent, EpochCancelledEvent,
    FaceResolvedEvent, GestureClassifiedEvent, PageTransitionEvent, SequencerStateEvent,
    TapUnresolvedEvent, TraceSink, Tracer,
};
use marker_reveal_core::transition::{Fade, PulseSpec};

use marker_reveal_debug::pretty::PrettyPrintSink;
use marker_reveal_debug::recorder::RecorderSink;

/// One 60 Hz frame, rounded down to whole milliseconds.
const FRAME_MS: u64 = 16;

/// Forwards every event to two sinks.
struct Tee<A, B>(A, B);

macro_rules! tee {
    ($($method:ident($event:ty);)*) => {
        $(
            fn $method(&mut self, e: &$event) {
                self.0.$method(e);
                self.1.$method(e);
            }
        )*
    };
}

impl<A: TraceSink, B: TraceSink> TraceSink for Tee<A, B> {
    tee! {
        on_epoch_began(EpochBeganEvent);
        on_epoch_cancelled(EpochCancelledEvent);
        on_cue_fired(CueFiredEvent);
        on_acquisition_ignored(AcquisitionIgnoredEvent);
        on_sequencer_state(SequencerStateEvent);
        on_page_transition(PageTransitionEvent);
        on_gesture_classified(GestureClassifiedEvent);
        on_face_resolved(FaceResolvedEvent);
        on_tap_unresolved(TapUnresolvedEvent);
        on_action_performed(ActionPerformedEvent<'_>);
        on_action_suppressed(ActionSuppressedEvent);
        on_collaborator_missing(CollaboratorMissingEvent<'_>);
        on_collaborator_failed(CollaboratorFailedEvent<'_>);
    }
}

/// Prints downloads and links instead of handing them to a browser.
struct StdoutOutbox;

impl Outbox for StdoutOutbox {
    fn download(
        &mut self,
        file_name: &str,
        mime_type: &str,
        body: &str,
    ) -> Result<(), OutboxError> {
        println!("--- {file_name} ({mime_type}) ---");
        print!("{}", body.replace("\r\n", "\n"));
        std::io::stdout().flush().map_err(|_| OutboxError::Failed)
    }

    fn open_link(&mut self, url: &str) -> Result<(), OutboxError> {
        println!("--- open {url} ---");
        Ok(())
    }
}

/// Remembers when each fade and pulse started, so it can report the opacity
/// a renderer would show at any later frame.
#[derive(Default)]
struct SampledOpacity {
    now: HostTime,
    fades: HashMap<LayerId, (HostTime, Fade)>,
    pulses: HashMap<LayerId, (HostTime, PulseSpec)>,
}

impl Presenter for SampledOpacity {
    fn apply(&mut self, layers: &LayerRegistry, changes: &LayerChanges) {
        for id in &changes.opacities {
            self.fades.remove(id);
        }
        for &id in &changes.fades {
            if let Some(fade) = layers.fade(id) {
                self.fades.insert(id, (self.now, fade));
            }
        }
        for &id in &changes.pulses {
            match layers.pulse(id) {
                Some(pulse) => {
                    self.pulses.insert(id, (self.now, pulse));
                }
                None => {
                    self.pulses.remove(&id);
                }
            }
        }
    }
}

impl SampledOpacity {
    fn opacity(&self, layers: &LayerRegistry, id: LayerId) -> f32 {
        if !layers.is_visible(id) {
            return 0.0;
        }
        if let Some((start, pulse)) = self.pulses.get(&id) {
            return pulse.sample(self.now.saturating_duration_since(*start));
        }
        if let Some((start, fade)) = self.fades.get(&id) {
            return fade.sample(self.now.saturating_duration_since(*start));
        }
        layers.opacity(id)
    }
}

struct Session {
    experience: Experience,
    presenter: SampledOpacity,
    now: u64,
}

impl Session {
    /// Ticks frames until `until`, then fires anything due exactly then.
    fn run_until(&mut self, until: u64) {
        while self.now + FRAME_MS <= until {
            self.frame(self.now + FRAME_MS);
        }
        self.frame(until);
    }

    fn frame(&mut self, at: u64) {
        self.now = at;
        self.presenter.now = HostTime(at);
        self.experience.advance(HostTime(at));
        self.experience.present(&mut self.presenter);
    }

    /// Prints the sampled opacity of each named layer.
    fn print_opacities(&self, names: &[&str]) {
        let layers = self.experience.layers();
        let values: Vec<String> = names
            .iter()
            .filter_map(|name| {
                let id = layers.find(name)?;
                Some(format!("{name}={:.2}", self.presenter.opacity(layers, id)))
            })
            .collect();
        println!("[opacity] at={}ms {}", self.now, values.join(" "));
    }

    fn tap(&mut self, at: u64, face: Face) {
        self.run_until(at);
        self.experience
            .pointer_down(HostTime(at), Point::new(200.0, 200.0));
        self.run_until(at + 60);
        self.experience
            .pointer_up(HostTime(at + 60), Some(Hit::Element(face)));
    }

    fn drag(&mut self, at: u64) {
        self.run_until(at);
        self.experience
            .pointer_down(HostTime(at), Point::new(200.0, 200.0));
        for step in 1..=10_u32 {
            let t = at + u64::from(step) * FRAME_MS;
            self.run_until(t);
            let d = f64::from(step) * 8.0;
            self.experience
                .pointer_move(HostTime(t), Point::new(200.0 + d, 200.0 - d / 2.0));
        }
        let end = at + 11 * FRAME_MS;
        self.run_until(end);
        self.experience
            .pointer_up(HostTime(end), Some(Hit::Element(Face::Front)));
    }
}

fn main() {
    // -- sinks -------------------------------------------------------------
    let pretty = PrettyPrintSink::new(Box::new(std::io::stdout()));
    let recorder = RecorderSink::new();
    let recording = recorder.recording();
    let tracer = Tracer::new(Box::new(Tee(pretty, recorder)));

    // -- experience --------------------------------------------------------
    let collaborators = Collaborators {
        outbox: Some(Box::new(StdoutOutbox)),
        ..Collaborators::none()
    };
    let experience = Experience::new(ExperienceConfig::business_card(), collaborators, tracer)
        .expect("built-in layout is valid");
    let mut session = Session {
        experience,
        presenter: SampledOpacity::default(),
        now: 0,
    };
    let watched = ["cardText", "tri1", "tri2", "tri3", "tri4"];

    // -- script ------------------------------------------------------------
    session.experience.target_found(HostTime(0));
    session.run_until(6_000);
    session.print_opacities(&watched);
    session.run_until(6_450);
    session.print_opacities(&watched);
    session.tap(6_500, Face::Right);
    session.tap(6_600, Face::Right);
    session.drag(6_800);
    session.tap(7_400, Face::Left);
    session.run_until(8_000);
    session.experience.target_lost(HostTime(8_000));

    session.run_until(9_000);
    session.experience.target_found(HostTime(9_000));
    session.run_until(19_600);
    session.print_opacities(&watched);
    session.run_until(21_000);
    session.print_opacities(&watched);
    session.tap(21_000, Face::Front);
    session.run_until(23_000);
    session.experience.target_lost(HostTime(23_000));

    // -- export Chrome trace -----------------------------------------------
    let path = "reveal_trace.json";
    let file = File::create(path).expect("failed to create reveal_trace.json");
    let mut writer = BufWriter::new(file);
    marker_reveal_debug::chrome::export(&recording.events(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({} events)", recording.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampled_text_fade_passes_through_the_midpoint() {
        let experience = Experience::new(
            ExperienceConfig::business_card(),
            Collaborators::none(),
            Tracer::none(),
        )
        .unwrap();
        let mut session = Session {
            experience,
            presenter: SampledOpacity::default(),
            now: 0,
        };
        let text = session.experience.layers().find("cardText").unwrap();
        let sampled = |s: &Session| s.presenter.opacity(s.experience.layers(), text);

        session.experience.target_found(HostTime(0));
        session.run_until(6_000);
        assert_eq!(sampled(&session), 1.0);
        session.run_until(10_600);
        let mid = sampled(&session);
        assert!((mid - 0.5).abs() < 1e-3, "half way through the fade: {mid}");
        session.run_until(11_200);
        assert_eq!(sampled(&session), 0.0);
    }
}
