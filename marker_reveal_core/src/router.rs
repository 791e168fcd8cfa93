// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interaction routing.
//!
//! Every discrete user action (a tap resolved to a face, or a HUD button)
//! enters through one [`Router`]. The router maps it to an [`Action`] and
//! suppresses a repeat of the same request arriving within
//! [`RouterConfig::dedupe_window`](crate::config::RouterConfig::dedupe_window),
//! which is what happens when two listeners observe the same physical tap.

use alloc::string::String;
use alloc::vec::Vec;

use crate::config::RouterConfig;
use crate::face::Face;
use crate::page::Page;
use crate::time::{Duration, HostTime};

/// Something the user asked for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Transition to a page.
    ShowPage(Page),
    /// Offer the contact record as a download.
    ExportContact,
    /// Open an external link.
    OpenLink(String),
    /// Show the previous slide of the current page.
    PreviousSlide,
    /// Show the next slide of the current page.
    NextSlide,
}

/// Binds one face of the interactive object to an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceBinding {
    /// The face.
    pub face: Face,
    /// Caption shown on the face.
    pub label: String,
    /// What a tap on the face does.
    pub action: Action,
}

impl FaceBinding {
    /// Creates a binding.
    #[must_use]
    pub fn new(face: Face, label: impl Into<String>, action: Action) -> Self {
        Self {
            face,
            label: label.into(),
            action,
        }
    }
}

/// Buttons on the heads-up overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HudButton {
    /// Return to the home page.
    Home,
    /// Previous slide.
    Previous,
    /// Next slide.
    Next,
    /// Export the contact record.
    Contact,
}

impl HudButton {
    /// Returns the action the button performs.
    #[must_use]
    pub fn action(self) -> Action {
        match self {
            Self::Home => Action::ShowPage(Page::Home),
            Self::Previous => Action::PreviousSlide,
            Self::Next => Action::NextSlide,
            Self::Contact => Action::ExportContact,
        }
    }
}

/// Identity of a request, used for duplicate suppression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKey {
    /// A tap on a face.
    Face(Face),
    /// A HUD button press.
    Button(HudButton),
}

/// Maps taps and buttons to actions, at most once per request.
#[derive(Clone, Debug)]
pub struct Router {
    bindings: Vec<FaceBinding>,
    window: Duration,
    last: Option<(ActionKey, HostTime)>,
}

impl Router {
    /// Creates a router from its configuration.
    ///
    /// When a face is bound more than once the first binding wins.
    #[must_use]
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            bindings: config.bindings.clone(),
            window: config.dedupe_window,
            last: None,
        }
    }

    /// Returns the binding for `face`, if any.
    #[must_use]
    pub fn binding(&self, face: Face) -> Option<&FaceBinding> {
        self.bindings.iter().find(|b| b.face == face)
    }

    /// Returns all bindings.
    #[must_use]
    pub fn bindings(&self) -> &[FaceBinding] {
        &self.bindings
    }

    /// Records a request and returns `false` if it repeats the previous one
    /// within the suppression window.
    pub fn admit(&mut self, key: ActionKey, now: HostTime) -> bool {
        if let Some((last_key, at)) = self.last
            && last_key == key
            && now.saturating_duration_since(at) < self.window
        {
            return false;
        }
        self.last = Some((key, now));
        true
    }

    /// Forgets the previous request.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
