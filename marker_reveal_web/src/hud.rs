// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Heads-up overlay.

use marker_reveal_core::backend::Hud;
use web_sys::HtmlElement;

const ACTIVE_CLASS: &str = "active";

/// Shows and hides the HUD by toggling the `active` class.
pub struct DomHud {
    element: HtmlElement,
}

impl core::fmt::Debug for DomHud {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomHud").finish_non_exhaustive()
    }
}

impl DomHud {
    /// Wraps the overlay element.
    #[must_use]
    pub fn new(element: HtmlElement) -> Self {
        Self { element }
    }
}

impl Hud for DomHud {
    fn show(&mut self) {
        let _ = self.element.class_list().add_1(ACTIVE_CLASS);
    }

    fn hide(&mut self) {
        let _ = self.element.class_list().remove_1(ACTIVE_CLASS);
    }
}
