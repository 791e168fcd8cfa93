// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for `marker_reveal`.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`RafLoop`]: `requestAnimationFrame` frame source
//! - [`DomPresenter`]: maps registry layers onto existing DOM elements
//! - [`DomScene`], [`VideoMedia`], [`DomHud`], [`BrowserOutbox`]: the
//!   collaborators the experience drives
//!
//! [`collaborators`] looks the collaborator elements up by id and leaves out
//! any that are missing from the page, so a partial page still runs.

#![no_std]

extern crate alloc;

mod hud;
mod media;
mod outbox;
mod presenter;
mod raf;
mod scene;

pub use hud::DomHud;
pub use marker_reveal_core::backend::Presenter;
pub use media::VideoMedia;
pub use outbox::BrowserOutbox;
pub use presenter::DomPresenter;
pub use raf::RafLoop;
pub use scene::DomScene;

use alloc::boxed::Box;

use marker_reveal_core::backend::Collaborators;
use marker_reveal_core::time::HostTime;
use wasm_bindgen::JsCast as _;
use web_sys::{Document, HtmlElement, HtmlVideoElement};

/// Element ids of the collaborator elements on the page.
#[derive(Clone, Copy, Debug)]
pub struct ElementIds<'a> {
    /// The element rotated by drags; clip classes are toggled on it too.
    pub object: &'a str,
    /// The `<video>` element of the video page.
    pub video: &'a str,
    /// The heads-up overlay.
    pub hud: &'a str,
}

impl Default for ElementIds<'_> {
    fn default() -> Self {
        Self {
            object: "cube",
            video: "video",
            hud: "hud",
        }
    }
}

/// Returns the current host time from `performance.now()`, in milliseconds.
#[must_use]
pub fn now() -> HostTime {
    to_host_time(raf::performance_now())
}

/// Converts a `DOMHighResTimeStamp` to [`HostTime`], clamping junk to zero.
#[must_use]
pub fn to_host_time(timestamp_ms: f64) -> HostTime {
    if !timestamp_ms.is_finite() || timestamp_ms <= 0.0 {
        return HostTime(0);
    }
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "checked positive and finite above; ms since page load fits in u64"
    )]
    let ms = timestamp_ms as u64;
    HostTime(ms)
}

/// Builds browser collaborators from the elements found in `document`.
///
/// The outbox needs only the window and is always present when one exists.
#[must_use]
pub fn collaborators(document: &Document, ids: ElementIds<'_>) -> Collaborators {
    let object = document
        .get_element_by_id(ids.object)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    let video = document
        .get_element_by_id(ids.video)
        .and_then(|el| el.dyn_into::<HtmlVideoElement>().ok());
    let hud = document
        .get_element_by_id(ids.hud)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());

    Collaborators {
        scene: object.map(|el| Box::new(DomScene::new(el)) as _),
        media: video.map(|el| Box::new(VideoMedia::new(el)) as _),
        hud: hud.map(|el| Box::new(DomHud::new(el)) as _),
        outbox: BrowserOutbox::new(document.clone()).map(|o| Box::new(o) as _),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_time_is_whole_milliseconds() {
        assert_eq!(to_host_time(16.9), HostTime(16));
        assert_eq!(to_host_time(1_000.0), HostTime(1_000));
    }

    #[test]
    fn junk_timestamps_clamp_to_zero() {
        assert_eq!(to_host_time(f64::NAN), HostTime(0));
        assert_eq!(to_host_time(-3.0), HostTime(0));
        assert_eq!(to_host_time(f64::INFINITY), HostTime(0));
    }
}
