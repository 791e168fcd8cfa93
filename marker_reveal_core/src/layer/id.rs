// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer identity.

use core::fmt;

/// A handle to a layer in a [`LayerRegistry`](super::LayerRegistry).
///
/// Layers are created once at startup and never destroyed during a session,
/// so a handle is just the slot index.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub(crate) u32);

impl LayerId {
    /// Returns the raw slot index.
    ///
    /// Presenters use this to index their own per-layer storage, matching the
    /// indices reported in [`LayerChanges`](super::LayerChanges).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({})", self.0)
    }
}

/// What part of the experience a layer belongs to.
///
/// Roles decide the rest state a layer is forced into when the marker is
/// lost; see [`LayerRegistry::reset_to_rest`](super::LayerRegistry::reset_to_rest).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerRole {
    /// The card backdrop aligned with the physical marker.
    Base,
    /// The printed-text overlay that fades away after the reveal.
    Text,
    /// Decorative layers that pulse while the home page is showing.
    Accent,
    /// Layers owned by a content page (slides, panels, controls).
    Content,
}
