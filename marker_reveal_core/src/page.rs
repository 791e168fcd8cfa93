// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page state machine.
//!
//! Exactly one [`Page`] is current. [`PageMachine::transition_to`] works from
//! any page to any other:
//!
//! 1. The current page's layers fade out (Home also stops its pulses, Video
//!    also pauses and rewinds its media).
//! 2. After the fade-out the outgoing layers are hidden, the target becomes
//!    current and its stages fade in one after another.
//! 3. When the last stage has finished fading in, the page has settled: it
//!    starts its pulses or its media.
//!
//! Every delayed step is a cue on the session's timer ledger, tagged with the
//! transition's token. A newer request supersedes an in-flight transition by
//! cancelling the cues carrying the old token. Without a live session the
//! transition completes synchronously with no fades.
//!
//! Pages with slides show one slide at a time and cross-fade between them
//! with wrap-around.

use alloc::string::String;
use alloc::vec::Vec;

use crate::backend::Collaborators;
use crate::config::{PageSpec, RevealConfig};
use crate::experience::{Cue, Effects};
use crate::layer::{LayerId, LayerRegistry, LayerRole};
use crate::time::{Duration, HostTime};
use crate::trace::{
    CollaboratorFailedEvent, CollaboratorMissingEvent, PagePhase, PageTransitionEvent, Tracer,
};
use crate::transition::{FadeSpec, PulseSpec};

/// A content mode of the experience.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Page {
    /// The card itself with its rotatable object.
    Home,
    /// A staged information panel.
    Info,
    /// An image slideshow.
    Slideshow,
    /// A video panel.
    Video,
}

impl Page {
    /// All pages in a fixed order.
    pub const ALL: [Self; 4] = [Self::Home, Self::Info, Self::Slideshow, Self::Video];

    /// Returns a lowercase identifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Info => "info",
            Self::Slideshow => "slideshow",
            Self::Video => "video",
        }
    }
}

/// Delayed actions owned by the page machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PageCue {
    /// The fade-out is over; swap pages.
    Enter { token: u64 },
    /// Run one fade-in stage of the incoming page.
    Stage { token: u64, index: usize },
    /// Every stage has faded in.
    Settled { token: u64 },
    /// A slide cross-fade is over; hide the old slide.
    HideSlide { layer: LayerId },
}

impl PageCue {
    /// Returns the transition token, if the cue belongs to one.
    pub(crate) const fn token(self) -> Option<u64> {
        match self {
            Self::Enter { token } | Self::Stage { token, .. } | Self::Settled { token } => {
                Some(token)
            }
            Self::HideSlide { .. } => None,
        }
    }

    /// Short description used in traces.
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Enter { .. } => "page:enter",
            Self::Stage { .. } => "page:stage",
            Self::Settled { .. } => "page:settled",
            Self::HideSlide { .. } => "page:hide-slide",
        }
    }
}

#[derive(Clone, Debug)]
struct Stage {
    layers: Vec<LayerId>,
    opacity: f32,
    fade: FadeSpec,
    /// Offset from the moment the page is entered.
    start: Duration,
}

#[derive(Clone, Debug)]
struct ResolvedPage {
    stages: Vec<Stage>,
    slides: Vec<LayerId>,
    slide_fade: FadeSpec,
    media: bool,
    pulses: bool,
    dismiss_on_exit: Vec<LayerId>,
    fade_out: FadeSpec,
    /// Offset at which the last stage has finished fading in.
    settle: Duration,
}

impl ResolvedPage {
    fn empty(page: Page) -> Self {
        Self::resolve(&PageSpec::empty(page), &LayerRegistry::new(), &mut Tracer::none())
    }

    fn resolve(spec: &PageSpec, layers: &LayerRegistry, tracer: &mut Tracer) -> Self {
        let mut lookup = |names: &[String]| -> Vec<LayerId> {
            names
                .iter()
                .filter_map(|name| {
                    let id = layers.find(name);
                    if id.is_none() {
                        tracer.collaborator_missing(&CollaboratorMissingEvent { what: name });
                    }
                    id
                })
                .collect()
        };

        let mut start = Duration::ZERO;
        let mut settle = Duration::ZERO;
        let mut stages = Vec::with_capacity(spec.stages.len());
        for (index, stage) in spec.stages.iter().enumerate() {
            if index > 0 {
                start = start.saturating_add(stage.after);
            }
            settle = settle.max(start.saturating_add(stage.fade.duration));
            stages.push(Stage {
                layers: lookup(&stage.layers),
                opacity: stage.opacity,
                fade: stage.fade,
                start,
            });
        }
        let slides = lookup(&spec.slides);
        let dismiss_on_exit = lookup(&spec.dismiss_on_exit);

        Self {
            stages,
            slides,
            slide_fade: spec.slide_fade,
            media: spec.media,
            pulses: spec.pulses,
            dismiss_on_exit,
            fade_out: spec.fade_out,
            settle,
        }
    }

    fn first_fade(&self) -> FadeSpec {
        self.stages.first().map_or(FadeSpec::INSTANT, |s| s.fade)
    }
}

#[derive(Clone, Debug)]
struct Transition {
    token: u64,
    from: Page,
    to: Page,
    outgoing: Vec<LayerId>,
    entered: bool,
}

/// Holds the current page and runs transitions between pages.
#[derive(Debug)]
pub struct PageMachine {
    pages: Vec<ResolvedPage>,
    current: Page,
    slide: usize,
    transition: Option<Transition>,
    next_token: u64,
    pulse: PulseSpec,
    pulse_stagger: Duration,
}

impl PageMachine {
    /// Creates a machine on [`Page::Home`], resolving configured layer names.
    ///
    /// Unknown layer names are reported and skipped. Pages without a spec
    /// own nothing.
    #[must_use]
    pub fn new(
        specs: &[PageSpec],
        reveal: &RevealConfig,
        layers: &LayerRegistry,
        tracer: &mut Tracer,
    ) -> Self {
        let pages = Page::ALL
            .into_iter()
            .map(|page| match specs.iter().find(|s| s.page == page) {
                Some(spec) => ResolvedPage::resolve(spec, layers, tracer),
                None => ResolvedPage::empty(page),
            })
            .collect();
        Self {
            pages,
            current: Page::Home,
            slide: 0,
            transition: None,
            next_token: 1,
            pulse: reveal.pulse,
            pulse_stagger: reveal.pulse_stagger,
        }
    }

    /// Returns the current page.
    #[must_use]
    pub const fn current(&self) -> Page {
        self.current
    }

    /// Returns the page being transitioned to, if a transition is in flight.
    #[must_use]
    pub fn target(&self) -> Option<Page> {
        self.transition.as_ref().map(|t| t.to)
    }

    /// Returns `true` while a transition is in flight.
    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Returns the visible slide of the current page, if it has slides.
    #[must_use]
    pub fn current_slide(&self) -> Option<LayerId> {
        self.page(self.current).slides.get(self.slide).copied()
    }

    /// Returns every layer `page` shows when fully entered, with the opacity
    /// it settles at. For the current page the slide is the visible one,
    /// otherwise the first.
    #[must_use]
    pub fn layers_of(&self, page: Page) -> Vec<(LayerId, f32)> {
        let resolved = self.page(page);
        let slide = if page == self.current { self.slide } else { 0 };
        let mut out: Vec<(LayerId, f32)> = resolved
            .stages
            .iter()
            .flat_map(|s| s.layers.iter().map(move |id| (*id, s.opacity)))
            .collect();
        out.extend(resolved.slides.get(slide).map(|id| (*id, 1.0)));
        out
    }

    /// Requests a transition to `target`.
    ///
    /// Returns `false` if `target` is already current (and nothing is in
    /// flight) or already being transitioned to.
    pub(crate) fn transition_to(
        &mut self,
        target: Page,
        now: HostTime,
        fx: &mut Effects<'_>,
    ) -> bool {
        match &self.transition {
            None if target == self.current => return false,
            Some(t) if t.to == target => return false,
            _ => {}
        }

        if let Some(old) = self.transition.take() {
            if let Some(epoch) = fx.ledger.active() {
                fx.ledger.cancel_matching(epoch, |cue| match cue {
                    Cue::Page(c) => c.token() == Some(old.token),
                    Cue::Sequencer(_) => false,
                });
            }
            fx.tracer.page_transition(&PageTransitionEvent {
                at: now,
                from: old.from,
                to: old.to,
                phase: PagePhase::Superseded,
            });
        }

        let from = self.current;
        let outgoing: Vec<LayerId> = self.layers_of(from).into_iter().map(|(id, _)| id).collect();
        self.leave(from, &outgoing, fx);

        let fade_out = self.page(from).fade_out;
        match fx.ledger.active() {
            None => {
                for &id in &outgoing {
                    fx.layers.set_opacity(id, 0.0);
                    fx.layers.set_visible(id, false);
                }
                self.current = target;
                self.slide = 0;
                for (id, opacity) in self.layers_of(target) {
                    fx.layers.set_opacity(id, opacity);
                    fx.layers.set_visible(id, true);
                }
                self.settle(target, now, fx);
                fx.tracer.page_transition(&PageTransitionEvent {
                    at: now,
                    from,
                    to: target,
                    phase: PagePhase::Immediate,
                });
            }
            Some(epoch) => {
                let token = self.next_token;
                self.next_token += 1;
                fx.ledger.schedule(
                    epoch,
                    now,
                    fade_out.duration,
                    Cue::Page(PageCue::Enter { token }),
                );
                self.transition = Some(Transition {
                    token,
                    from,
                    to: target,
                    outgoing,
                    entered: false,
                });
                fx.tracer.page_transition(&PageTransitionEvent {
                    at: now,
                    from,
                    to: target,
                    phase: PagePhase::Started,
                });
            }
        }
        true
    }

    /// Cross-fades to the next or previous slide of the current page.
    ///
    /// Ignored while a transition is in flight or when the page has fewer
    /// than two slides.
    pub(crate) fn step_slide(&mut self, forward: bool, now: HostTime, fx: &mut Effects<'_>) -> bool {
        if self.transition.is_some() {
            return false;
        }
        let page = self.page(self.current);
        let count = page.slides.len();
        if count < 2 {
            return false;
        }
        let fade = page.slide_fade;
        let old = page.slides[self.slide];
        self.slide = if forward {
            (self.slide + 1) % count
        } else {
            (self.slide + count - 1) % count
        };
        let new = self.page(self.current).slides[self.slide];

        fx.layers.fade_to(old, 0.0, fade);
        fx.layers.set_opacity(new, 0.0);
        fx.layers.set_visible(new, true);
        fx.layers.fade_to(new, 1.0, fade);
        match fx.ledger.active() {
            Some(epoch) => {
                fx.ledger.schedule(
                    epoch,
                    now,
                    fade.duration,
                    Cue::Page(PageCue::HideSlide { layer: old }),
                );
            }
            None => fx.layers.set_visible(old, false),
        }
        true
    }

    /// Runs a due cue. `at` is the time it was due.
    pub(crate) fn fire(&mut self, cue: PageCue, at: HostTime, fx: &mut Effects<'_>) {
        match cue {
            PageCue::Enter { token } => self.enter(token, at, fx),
            PageCue::Stage { token, index } => {
                if !self.is_live(token, true) {
                    return;
                }
                let page = self.page(self.current);
                let Some(stage) = page.stages.get(index) else {
                    return;
                };
                for &id in &stage.layers {
                    fade_in(fx.layers, id, stage.opacity, stage.fade);
                }
                if index == 0
                    && let Some(&slide) = page.slides.get(self.slide)
                {
                    fade_in(fx.layers, slide, 1.0, stage.fade);
                }
            }
            PageCue::Settled { token } => {
                if !self.is_live(token, true) {
                    return;
                }
                let Some(transition) = self.transition.take() else {
                    return;
                };
                self.settle(transition.to, at, fx);
                fx.tracer.page_transition(&PageTransitionEvent {
                    at,
                    from: transition.from,
                    to: transition.to,
                    phase: PagePhase::Settled,
                });
            }
            PageCue::HideSlide { layer } => {
                if self.current_slide() != Some(layer) {
                    fx.layers.set_visible(layer, false);
                }
            }
        }
    }

    /// Returns to Home with nothing in flight and stops any media.
    ///
    /// Layer state is not touched; the caller resets the registry.
    pub(crate) fn reset(&mut self, collaborators: &mut Collaborators) {
        self.current = Page::Home;
        self.slide = 0;
        self.transition = None;
        if let Some(media) = collaborators.media.as_mut() {
            media.pause();
            media.rewind();
        }
    }

    fn enter(&mut self, token: u64, at: HostTime, fx: &mut Effects<'_>) {
        if !self.is_live(token, false) {
            return;
        }
        let Some(epoch) = fx.ledger.active() else {
            return;
        };
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        for &id in &transition.outgoing {
            fx.layers.set_visible(id, false);
        }
        transition.entered = true;
        let (from, to) = (transition.from, transition.to);
        self.current = to;
        self.slide = 0;
        fx.tracer.page_transition(&PageTransitionEvent {
            at,
            from,
            to,
            phase: PagePhase::Entered,
        });

        let page = self.page(to);
        for (index, stage) in page.stages.iter().enumerate() {
            fx.ledger.schedule(
                epoch,
                at,
                stage.start,
                Cue::Page(PageCue::Stage { token, index }),
            );
        }
        if page.stages.is_empty()
            && let Some(&slide) = page.slides.first()
        {
            fade_in(fx.layers, slide, 1.0, page.first_fade());
        }
        fx.ledger.schedule(
            epoch,
            at,
            page.settle,
            Cue::Page(PageCue::Settled { token }),
        );
    }

    fn leave(&self, from: Page, outgoing: &[LayerId], fx: &mut Effects<'_>) {
        let page = self.page(from);
        for &id in outgoing {
            if page.pulses {
                fx.layers.stop_pulse(id);
            }
            fx.layers.fade_to(id, 0.0, page.fade_out);
        }
        for &id in &page.dismiss_on_exit {
            fx.layers.set_opacity(id, 0.0);
            fx.layers.set_visible(id, false);
        }
        if page.media
            && let Some(media) = fx.collaborators.media.as_mut()
        {
            media.pause();
            media.rewind();
        }
    }

    fn settle(&self, page: Page, at: HostTime, fx: &mut Effects<'_>) {
        let resolved = self.page(page);
        if resolved.pulses {
            let accents = self
                .layers_of(page)
                .into_iter()
                .map(|(id, _)| id)
                .filter(|id| fx.layers.role(*id) == LayerRole::Accent);
            for (n, id) in accents.collect::<Vec<_>>().into_iter().enumerate() {
                fx.layers
                    .start_pulse(id, self.pulse.staggered(self.pulse_stagger, n));
            }
        }
        if resolved.media
            && let Some(media) = fx.collaborators.media.as_mut()
            && let Err(error) = media.play()
        {
            media.pause();
            fx.tracer.collaborator_failed(&CollaboratorFailedEvent {
                at,
                what: "media",
                error: &error,
            });
        }
    }

    fn is_live(&self, token: u64, entered: bool) -> bool {
        self.transition
            .as_ref()
            .is_some_and(|t| t.token == token && t.entered == entered)
    }

    fn page(&self, page: Page) -> &ResolvedPage {
        // Built from `Page::ALL`, so every page is present.
        let index = Page::ALL.iter().position(|p| *p == page).unwrap_or(0);
        &self.pages[index]
    }
}

fn fade_in(layers: &mut LayerRegistry, id: LayerId, opacity: f32, fade: FadeSpec) {
    layers.set_opacity(id, 0.0);
    layers.set_visible(id, true);
    layers.fade_to(id, opacity, fade);
}
