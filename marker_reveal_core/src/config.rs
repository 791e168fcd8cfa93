// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed experience configuration.
//!
//! Everything the experience does is described here as plain data: which
//! layers exist, the reveal choreography, what each page owns, gesture
//! thresholds, face bindings and the contact record. There is no file
//! format; hosts build an [`ExperienceConfig`] in code, usually starting
//! from [`ExperienceConfig::business_card`].
//!
//! Choreography steps carry their own durations. The sequencer schedules
//! the next step with the same value it hands to the renderer, so a fade
//! and the step waiting for it cannot drift apart.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::contact::ContactRecord;
use crate::face::Face;
use crate::gesture::GestureConfig;
use crate::layer::{LayerRole, LayerSpec};
use crate::page::Page;
use crate::router::{Action, FaceBinding};
use crate::sequencer::RevealCue;
use crate::time::Duration;
use crate::transition::{Easing, FadeSpec, PulseSpec};

/// The layers to register, in creation order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StageLayout {
    /// One entry per layer. Names must be unique.
    pub layers: Vec<LayerSpec>,
}

/// One step of the reveal choreography.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealStep {
    /// What the step does.
    pub cue: RevealCue,
    /// How long the step lasts; the next step starts when it ends.
    pub duration: Duration,
}

impl RevealStep {
    /// Creates a step.
    #[must_use]
    pub const fn new(cue: RevealCue, duration: Duration) -> Self {
        Self { cue, duration }
    }
}

/// The acquisition choreography.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealConfig {
    /// Steps in order. The first starts at acquisition.
    pub steps: Vec<RevealStep>,
    /// Layer of the object that flies in during [`RevealCue::EntryFlight`].
    pub entry_layer: Option<String>,
    /// Scene clip played once during [`RevealCue::EntryFlight`].
    pub entry_clip: Option<String>,
    /// Scene clip looped from [`RevealCue::Reveal`] until the marker is lost.
    pub glow_clip: Option<String>,
    /// Opacity accents are revealed at, before their pulse takes over.
    pub accent_opacity: f32,
    /// Pulse applied to every accent layer.
    pub pulse: PulseSpec,
    /// Extra start delay per accent, in layer order.
    pub pulse_stagger: Duration,
    /// Curve of the text fade; its length is the step's duration.
    pub text_easing: Easing,
}

impl RevealConfig {
    /// Returns the total length of the choreography.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.steps
            .iter()
            .fold(Duration::ZERO, |acc, step| acc.saturating_add(step.duration))
    }

    /// Returns when the given step starts, relative to acquisition.
    #[must_use]
    pub fn offset_of(&self, index: usize) -> Duration {
        self.steps
            .iter()
            .take(index)
            .fold(Duration::ZERO, |acc, step| acc.saturating_add(step.duration))
    }

    /// Returns the pulse for the `n`th accent layer.
    #[must_use]
    pub fn pulse_for(&self, n: usize) -> PulseSpec {
        self.pulse.staggered(self.pulse_stagger, n)
    }
}

/// One staged fade-in within a page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageStage {
    /// Layers revealed by this stage.
    pub layers: Vec<String>,
    /// Opacity the layers fade in to.
    pub opacity: f32,
    /// The fade-in.
    pub fade: FadeSpec,
    /// Delay after the previous stage started.
    pub after: Duration,
}

impl PageStage {
    /// A stage fading `layers` in to full opacity.
    #[must_use]
    pub fn new(layers: &[&str], fade: FadeSpec) -> Self {
        Self {
            layers: layers.iter().map(|name| String::from(*name)).collect(),
            opacity: 1.0,
            fade,
            after: Duration::ZERO,
        }
    }

    /// Returns a copy with a different target opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Returns a copy that starts `after` the previous stage.
    #[must_use]
    pub fn after(mut self, after: Duration) -> Self {
        self.after = after;
        self
    }
}

/// What a page owns and how it enters and leaves.
#[derive(Clone, Debug, PartialEq)]
pub struct PageSpec {
    /// Which page this describes.
    pub page: Page,
    /// Staged fade-ins, in order.
    pub stages: Vec<PageStage>,
    /// Slide layers; the current slide enters with the first stage.
    pub slides: Vec<String>,
    /// Cross-fade between slides.
    pub slide_fade: FadeSpec,
    /// Whether the page plays the media collaborator once it has settled.
    pub media: bool,
    /// Whether accent layers on this page pulse once it has settled.
    pub pulses: bool,
    /// Layers hidden outright when leaving the page.
    pub dismiss_on_exit: Vec<String>,
    /// Fade-out of the page's layers when leaving.
    pub fade_out: FadeSpec,
}

impl PageSpec {
    /// A page with no layers.
    #[must_use]
    pub fn empty(page: Page) -> Self {
        Self {
            page,
            stages: Vec::new(),
            slides: Vec::new(),
            slide_fade: FadeSpec::INSTANT,
            media: false,
            pulses: false,
            dismiss_on_exit: Vec::new(),
            fade_out: FadeSpec::INSTANT,
        }
    }
}

/// Face bindings and duplicate suppression.
#[derive(Clone, Debug, PartialEq)]
pub struct RouterConfig {
    /// At most one binding per face.
    pub bindings: Vec<FaceBinding>,
    /// Repeats of the same action within this window are dropped.
    pub dedupe_window: Duration,
}

/// Complete configuration for one experience.
#[derive(Clone, Debug, PartialEq)]
pub struct ExperienceConfig {
    /// Layers to register.
    pub layout: StageLayout,
    /// Acquisition choreography.
    pub reveal: RevealConfig,
    /// One entry per page. A page without an entry owns nothing.
    pub pages: Vec<PageSpec>,
    /// Tap and drag thresholds.
    pub gesture: GestureConfig,
    /// Face bindings.
    pub router: RouterConfig,
    /// The exported contact record.
    pub contact: ContactRecord,
}

const PAGE_FADE: FadeSpec = FadeSpec::new(Duration::from_millis(400), Easing::EaseOutQuad);
const PANEL_FADE: FadeSpec = FadeSpec::new(Duration::from_millis(500), Easing::EaseInOutQuad);

impl ExperienceConfig {
    /// The printed business card: a base, a text overlay that fades away,
    /// four pulsing accent triangles and a rotatable cube whose faces open
    /// an info panel, a slideshow, a video, a contact export and two links.
    #[must_use]
    pub fn business_card() -> Self {
        let layers = vec![
            LayerSpec::new("cardBase", LayerRole::Base, 0),
            LayerSpec::new("cardText", LayerRole::Text, 1),
            LayerSpec::new("tri1", LayerRole::Accent, 2).with_rest_opacity(0.5),
            LayerSpec::new("tri2", LayerRole::Accent, 3).with_rest_opacity(0.5),
            LayerSpec::new("tri3", LayerRole::Accent, 4).with_rest_opacity(0.5),
            LayerSpec::new("tri4", LayerRole::Accent, 5).with_rest_opacity(0.5),
            LayerSpec::new("cube", LayerRole::Content, 6),
            LayerSpec::new("info1", LayerRole::Content, 7),
            LayerSpec::new("info2", LayerRole::Content, 8),
            LayerSpec::new("slide1", LayerRole::Content, 9),
            LayerSpec::new("slide2", LayerRole::Content, 10),
            LayerSpec::new("slide3", LayerRole::Content, 11),
            LayerSpec::new("slideNav", LayerRole::Content, 12),
            LayerSpec::new("videoPanel", LayerRole::Content, 13),
        ];

        let reveal = RevealConfig {
            steps: vec![
                RevealStep::new(RevealCue::HideContent, Duration::ZERO),
                RevealStep::new(RevealCue::EntryFlight, Duration::from_millis(6_000)),
                RevealStep::new(RevealCue::Reveal, Duration::from_millis(4_000)),
                RevealStep::new(RevealCue::TextFade, Duration::from_millis(1_200)),
            ],
            entry_layer: Some("cube".into()),
            entry_clip: Some("entry".into()),
            glow_clip: Some("glow".into()),
            accent_opacity: 0.5,
            pulse: PulseSpec {
                low: 0.25,
                high: 1.0,
                period: Duration::from_millis(900),
                delay: Duration::ZERO,
                easing: Easing::EaseInOutSine,
            },
            pulse_stagger: Duration::from_millis(200),
            text_easing: Easing::EaseInOutQuad,
        };

        let home = PageSpec {
            stages: vec![
                PageStage::new(&["cube"], PAGE_FADE),
                PageStage::new(&["tri1", "tri2", "tri3", "tri4"], PAGE_FADE).with_opacity(0.5),
            ],
            pulses: true,
            dismiss_on_exit: vec!["cardText".into()],
            fade_out: PAGE_FADE,
            ..PageSpec::empty(Page::Home)
        };
        let info = PageSpec {
            stages: vec![
                PageStage::new(&["info1"], PANEL_FADE),
                PageStage::new(&["info2"], PANEL_FADE).after(Duration::from_millis(800)),
            ],
            fade_out: PAGE_FADE,
            ..PageSpec::empty(Page::Info)
        };
        let slideshow = PageSpec {
            stages: vec![
                PageStage::new(&[], PANEL_FADE),
                PageStage::new(&["slideNav"], PAGE_FADE).after(Duration::from_millis(600)),
            ],
            slides: vec!["slide1".into(), "slide2".into(), "slide3".into()],
            slide_fade: PAGE_FADE,
            fade_out: PAGE_FADE,
            ..PageSpec::empty(Page::Slideshow)
        };
        let video = PageSpec {
            stages: vec![PageStage::new(&["videoPanel"], PANEL_FADE)],
            media: true,
            fade_out: PAGE_FADE,
            ..PageSpec::empty(Page::Video)
        };

        let router = RouterConfig {
            bindings: vec![
                FaceBinding::new(Face::Front, "Portfolio", Action::ShowPage(Page::Slideshow)),
                FaceBinding::new(Face::Left, "About Me", Action::ShowPage(Page::Info)),
                FaceBinding::new(Face::Bottom, "Metaverse", Action::ShowPage(Page::Video)),
                FaceBinding::new(Face::Right, "Contact", Action::ExportContact),
                FaceBinding::new(
                    Face::Top,
                    "Instagram",
                    Action::OpenLink("https://www.instagram.com/".into()),
                ),
                FaceBinding::new(
                    Face::Back,
                    "LinkedIn",
                    Action::OpenLink("https://www.linkedin.com/".into()),
                ),
            ],
            dedupe_window: Duration::from_millis(300),
        };

        Self {
            layout: StageLayout { layers },
            reveal,
            pages: vec![home, info, slideshow, video],
            gesture: GestureConfig::touch(),
            router,
            contact: ContactRecord {
                name: "Alex Morgan".into(),
                phone: "+1 555 0100".into(),
                organization: "Marker Reveal Studio".into(),
                email: Some("hello@example.com".into()),
            },
        }
    }
}
