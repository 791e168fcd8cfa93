// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM layer presentation.
//!
//! Applies [`LayerChanges`] to elements that already exist on the page, found
//! by id (the layer name). Fades become CSS opacity transitions and pulses a
//! shared keyframe animation parameterized through custom properties, so the
//! browser animates between frames without further calls.
//!
//! [`LayerChanges`]: marker_reveal_core::layer::LayerChanges

use alloc::format;
use alloc::vec::Vec;

use marker_reveal_core::backend::Presenter;
use marker_reveal_core::layer::{LayerChanges, LayerId, LayerRegistry};
use marker_reveal_core::transition::{Fade, PulseSpec};
use wasm_bindgen::JsCast as _;
use web_sys::{Document, HtmlElement};

const PULSE_ANIMATION: &str = "marker-reveal-pulse";
const PULSE_KEYFRAMES: &str = "@keyframes marker-reveal-pulse {\
     from { opacity: var(--pulse-low); } \
     to { opacity: var(--pulse-high); } }";

/// Maps a [`LayerRegistry`] onto DOM elements with matching ids.
///
/// Layers without an element are skipped silently; the page decides which
/// layers it renders.
pub struct DomPresenter {
    document: Document,
    elements: Vec<Option<HtmlElement>>,
    keyframes_installed: bool,
}

impl core::fmt::Debug for DomPresenter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomPresenter")
            .field("elements_len", &self.elements.len())
            .field("keyframes_installed", &self.keyframes_installed)
            .finish_non_exhaustive()
    }
}

impl DomPresenter {
    /// Creates a presenter that looks layers up in `document`.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            elements: Vec::new(),
            keyframes_installed: false,
        }
    }

    /// Returns the DOM element bound to `id`, if one was found.
    #[must_use]
    pub fn get_element(&self, id: LayerId) -> Option<&HtmlElement> {
        self.elements
            .get(id.index() as usize)
            .and_then(|slot| slot.as_ref())
    }

    fn put_element(&mut self, id: LayerId, el: HtmlElement) {
        let slot = id.index() as usize;
        if self.elements.len() <= slot {
            self.elements.resize_with(slot + 1, || None);
        }
        self.elements[slot] = Some(el);
    }

    fn install_keyframes(&mut self) {
        if self.keyframes_installed {
            return;
        }
        let Some(head) = self.document.head() else {
            return;
        };
        let Ok(style) = self.document.create_element("style") else {
            return;
        };
        style.set_text_content(Some(PULSE_KEYFRAMES));
        if head.append_child(&style).is_ok() {
            self.keyframes_installed = true;
        }
    }
}

impl Presenter for DomPresenter {
    fn apply(&mut self, layers: &LayerRegistry, changes: &LayerChanges) {
        // 1. Bind new layers.
        for &id in &changes.added {
            let Some(el) = self
                .document
                .get_element_by_id(layers.name(id))
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            else {
                continue;
            };
            let s = el.style();
            let _ = s.set_property("z-index", &format!("{}", layers.z_order(id)));
            let _ = s.set_property("opacity", &format!("{}", layers.opacity(id)));
            if !layers.is_visible(id) {
                let _ = s.set_property("display", "none");
            }
            self.put_element(id, el);
        }

        // 2. Instant opacities.
        for &id in &changes.opacities {
            if let Some(el) = self.get_element(id) {
                let s = el.style();
                let _ = s.set_property("transition", "none");
                let _ = s.set_property("opacity", &format!("{}", layers.opacity(id)));
            }
        }

        // 3. Visibility, before fades so a fade-in starts from a laid-out box.
        for &id in &changes.shown {
            if let Some(el) = self.get_element(id) {
                let _ = el.style().remove_property("display");
            }
        }
        for &id in &changes.hidden {
            if let Some(el) = self.get_element(id) {
                let _ = el.style().set_property("display", "none");
            }
        }

        // 4. Fades.
        for &id in &changes.fades {
            if let (Some(el), Some(fade)) = (self.get_element(id), layers.fade(id)) {
                apply_css_fade(el, &fade);
            }
        }

        // 5. Pulses.
        if changes
            .pulses
            .iter()
            .any(|&id| layers.pulse(id).is_some())
        {
            self.install_keyframes();
        }
        for &id in &changes.pulses {
            if let Some(el) = self.get_element(id) {
                apply_css_pulse(el, layers.pulse(id));
            }
        }
    }
}

fn apply_css_fade(el: &HtmlElement, fade: &Fade) {
    let s = el.style();
    let _ = s.set_property("transition", "none");
    let _ = s.set_property("opacity", &format!("{}", fade.from));
    // Reading layout commits the start value so the transition runs from it.
    let _ = el.offset_width();
    let _ = s.set_property(
        "transition",
        &format!(
            "opacity {}ms {}",
            fade.spec.duration.millis(),
            fade.spec.easing.css_name()
        ),
    );
    let _ = s.set_property("opacity", &format!("{}", fade.to));
}

fn apply_css_pulse(el: &HtmlElement, pulse: Option<PulseSpec>) {
    let s = el.style();
    let Some(pulse) = pulse else {
        let _ = s.remove_property("animation");
        return;
    };
    let _ = s.set_property("--pulse-low", &format!("{}", pulse.low));
    let _ = s.set_property("--pulse-high", &format!("{}", pulse.high));
    let _ = s.set_property(
        "animation",
        &format!(
            "{PULSE_ANIMATION} {}ms {} {}ms infinite alternate",
            pulse.period.millis(),
            pulse.easing.css_name(),
            pulse.delay.millis(),
        ),
    );
}
