// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator contracts for platform integrations.
//!
//! The core owns sequencing and state. Everything it drives lives behind a
//! trait so that a browser build, a headless trace replay, and unit-test
//! doubles can all sit on the other side:
//!
//! - **Presenter**: applies [`LayerChanges`] to the native surfaces
//!   (e.g. DOM elements). Not owned by the core; the host calls
//!   [`Experience::present`](crate::Experience::present) once per frame.
//! - **Scene**: the 3D object renderer. Plays named one-shot or looping
//!   clips and takes the object's rotation.
//! - **Media**: a single video resource with a play / pause / rewind
//!   contract.
//! - **Hud**: the overlay shown while the card is interactive.
//! - **Outbox**: hands generated files and external links to the platform.
//!
//! Every owned collaborator is optional. A missing one is reported once at
//! wiring time and the feature it backs is skipped; sequencing continues.
//!
//! # Frame loop pseudocode
//!
//! ```rust,ignore
//! fn on_frame(now: HostTime) {
//!     // Fire any choreography steps that are due.
//!     experience.advance(now);
//!
//!     // Drain dirty channels and apply incremental changes.
//!     experience.present(&mut presenter);
//! }
//! ```

use alloc::boxed::Box;
use core::fmt;

use crate::layer::{LayerChanges, LayerRegistry};
use crate::transform::Transform3d;

/// Applies evaluated layer changes to a platform-native presentation tree.
///
/// DOM presenters and test doubles implement this trait.
pub trait Presenter {
    /// Applies the given [`LayerChanges`], reading current property values
    /// from `layers` as needed.
    fn apply(&mut self, layers: &LayerRegistry, changes: &LayerChanges);
}

/// Whether a scene clip plays once or loops until stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClipMode {
    /// Play once and stop on the last frame.
    Once,
    /// Repeat until [`Scene::stop_clip`] is called.
    Loop,
}

/// The renderer of the interactive 3D object.
pub trait Scene {
    /// Starts the named clip. Unknown names are ignored by the renderer.
    fn play_clip(&mut self, name: &str, mode: ClipMode);

    /// Stops the named clip and returns it to its first frame.
    fn stop_clip(&mut self, name: &str);

    /// Sets the object's rotation.
    fn set_rotation(&mut self, rotation: &Transform3d);
}

/// Errors from the media collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaError {
    /// The platform refused playback (autoplay policy, decode failure).
    Rejected,
    /// The media element is not available.
    Unavailable,
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected => f.write_str("playback was rejected by the platform"),
            Self::Unavailable => f.write_str("media element is not available"),
        }
    }
}

impl core::error::Error for MediaError {}

/// A single video resource.
pub trait Media {
    /// Starts or resumes playback.
    fn play(&mut self) -> Result<(), MediaError>;

    /// Pauses playback. Pausing paused media is a no-op.
    fn pause(&mut self);

    /// Seeks back to the start.
    fn rewind(&mut self);
}

/// The heads-up overlay.
pub trait Hud {
    /// Shows the overlay.
    fn show(&mut self);

    /// Hides the overlay.
    fn hide(&mut self);
}

/// Errors from the outbox collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutboxError {
    /// The platform has no way to perform this request.
    Unsupported,
    /// The platform tried and failed.
    Failed,
}

impl fmt::Display for OutboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => f.write_str("not supported on this platform"),
            Self::Failed => f.write_str("the platform reported a failure"),
        }
    }
}

impl core::error::Error for OutboxError {}

/// Hands user-facing artifacts to the platform.
pub trait Outbox {
    /// Offers `body` to the user as a downloadable file.
    fn download(&mut self, file_name: &str, mime_type: &str, body: &str)
    -> Result<(), OutboxError>;

    /// Opens an external link.
    fn open_link(&mut self, url: &str) -> Result<(), OutboxError>;
}

/// The set of owned collaborators. Any of them may be absent.
#[derive(Default)]
pub struct Collaborators {
    /// Renderer of the interactive object.
    pub scene: Option<Box<dyn Scene>>,
    /// Video player.
    pub media: Option<Box<dyn Media>>,
    /// Heads-up overlay.
    pub hud: Option<Box<dyn Hud>>,
    /// File and link handoff.
    pub outbox: Option<Box<dyn Outbox>>,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field("scene", &self.scene.is_some())
            .field("media", &self.media.is_some())
            .field("hud", &self.hud.is_some())
            .field("outbox", &self.outbox.is_some())
            .finish()
    }
}

impl Collaborators {
    /// No collaborators at all; useful for headless runs.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns the names of the absent collaborators.
    pub fn missing(&self) -> impl Iterator<Item = &'static str> {
        [
            ("scene", self.scene.is_none()),
            ("media", self.media.is_none()),
            ("hud", self.hud.is_none()),
            ("outbox", self.outbox.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    struct NullHud;

    impl Hud for NullHud {
        fn show(&mut self) {}
        fn hide(&mut self) {}
    }

    #[test]
    fn missing_lists_absent_collaborators() {
        let mut collaborators = Collaborators::none();
        assert_eq!(
            collaborators.missing().collect::<Vec<_>>(),
            ["scene", "media", "hud", "outbox"]
        );
        collaborators.hud = Some(Box::new(NullHud));
        assert_eq!(
            collaborators.missing().collect::<Vec<_>>(),
            ["scene", "media", "outbox"]
        );
    }

    #[test]
    fn errors_display() {
        assert_eq!(
            alloc::format!("{}", MediaError::Rejected),
            "playback was rejected by the platform"
        );
        assert_eq!(
            alloc::format!("{}", OutboxError::Unsupported),
            "not supported on this platform"
        );
    }
}
