// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `<video>` playback.

use alloc::boxed::Box;

use marker_reveal_core::backend::{Media, MediaError};
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::HtmlVideoElement;

/// Drives one `<video>` element.
///
/// `play()` resolves asynchronously in the browser. A video that has been
/// removed from the document is [`MediaError::Unavailable`]. A synchronous
/// failure is reported as [`MediaError::Rejected`]; a later rejection
/// (autoplay policy) pauses the element so it is never left half-started.
pub struct VideoMedia {
    video: HtmlVideoElement,
    on_rejected: Closure<dyn FnMut(JsValue)>,
}

impl core::fmt::Debug for VideoMedia {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VideoMedia")
            .field("paused", &self.video.paused())
            .finish_non_exhaustive()
    }
}

impl VideoMedia {
    /// Wraps the video element.
    #[must_use]
    pub fn new(video: HtmlVideoElement) -> Self {
        let target = video.clone();
        let on_rejected = Closure::wrap(Box::new(move |_reason: JsValue| {
            let _ = target.pause();
        }) as Box<dyn FnMut(JsValue)>);
        Self { video, on_rejected }
    }
}

impl Media for VideoMedia {
    fn play(&mut self) -> Result<(), MediaError> {
        if !self.video.is_connected() {
            return Err(MediaError::Unavailable);
        }
        let promise = self.video.play().map_err(|_| MediaError::Rejected)?;
        let _ = promise.catch(&self.on_rejected);
        Ok(())
    }

    fn pause(&mut self) {
        let _ = self.video.pause();
    }

    fn rewind(&mut self) {
        self.video.set_current_time(0.0);
    }
}
