// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays layer storage with registration and property management.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use understory_dirty::{CycleHandling, DirtyTracker};

use super::id::{LayerId, LayerRole};
use crate::dirty;
use crate::transition::{Fade, FadeSpec, PulseSpec};

/// Static description of one layer, used to register it.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerSpec {
    /// Unique name, also used by presenters to find the matching surface.
    pub name: String,
    /// Which part of the experience the layer belongs to.
    pub role: LayerRole,
    /// Fixed depth; higher is nearer the viewer.
    pub z_order: i32,
    /// Opacity the layer returns to when the marker is lost.
    pub rest_opacity: f32,
}

impl LayerSpec {
    /// Creates a spec with a rest opacity of 1.
    #[must_use]
    pub fn new(name: impl Into<String>, role: LayerRole, z_order: i32) -> Self {
        Self {
            name: name.into(),
            role,
            z_order,
            rest_opacity: 1.0,
        }
    }

    /// Returns a copy with a different rest opacity.
    #[must_use]
    pub fn with_rest_opacity(mut self, rest_opacity: f32) -> Self {
        self.rest_opacity = rest_opacity;
        self
    }
}

/// Errors returned when registering layers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// A layer with this name already exists.
    DuplicateName(String),
    /// The rest opacity is outside `[0, 1]` or not a number.
    InvalidOpacity(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName(name) => write!(f, "layer `{name}` is already registered"),
            Self::InvalidOpacity(name) => {
                write!(f, "layer `{name}` has a rest opacity outside [0, 1]")
            }
        }
    }
}

impl core::error::Error for RegistryError {}

/// Struct-of-arrays storage for all layers.
///
/// Layers are addressed by [`LayerId`] handles. Every mutation marks the
/// matching dirty channel so that [`evaluate`](Self::evaluate) can report
/// incremental [`LayerChanges`] to a presenter.
///
/// Opacity is stored as the *target* value: [`fade_to`](Self::fade_to)
/// updates it immediately and records the [`Fade`] so the renderer can
/// animate towards it. Sequencing code never waits on the renderer; it
/// schedules its next step after the same [`FadeSpec::duration`].
#[derive(Debug)]
pub struct LayerRegistry {
    // -- Static data --
    pub(crate) names: Vec<String>,
    pub(crate) roles: Vec<LayerRole>,
    pub(crate) z_order: Vec<i32>,
    pub(crate) rest_opacity: Vec<f32>,

    // -- Mutable properties --
    pub(crate) opacity: Vec<f32>,
    pub(crate) visible: Vec<bool>,
    pub(crate) fade: Vec<Option<Fade>>,
    pub(crate) pulse: Vec<Option<PulseSpec>>,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<LayerId>,
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            roles: Vec::new(),
            z_order: Vec::new(),
            rest_opacity: Vec::new(),
            opacity: Vec::new(),
            visible: Vec::new(),
            fade: Vec::new(),
            pulse: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            pending_added: Vec::new(),
        }
    }

    // -- Registration --

    /// Registers a layer and returns its handle.
    ///
    /// The layer starts in its rest state: hidden, at its rest opacity, with
    /// no fade or pulse.
    pub fn create_layer(&mut self, spec: &LayerSpec) -> Result<LayerId, RegistryError> {
        if self.find(&spec.name).is_some() {
            return Err(RegistryError::DuplicateName(spec.name.clone()));
        }
        if !(0.0..=1.0).contains(&spec.rest_opacity) {
            return Err(RegistryError::InvalidOpacity(spec.name.clone()));
        }

        let idx = u32::try_from(self.names.len()).unwrap_or(u32::MAX);
        self.names.push(spec.name.clone());
        self.roles.push(spec.role);
        self.z_order.push(spec.z_order);
        self.rest_opacity.push(spec.rest_opacity);
        self.opacity.push(spec.rest_opacity);
        self.visible.push(false);
        self.fade.push(None);
        self.pulse.push(None);

        let id = LayerId(idx);
        self.pending_added.push(id);
        Ok(id)
    }

    /// Looks a layer up by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<LayerId> {
        self.names
            .iter()
            .position(|n| n == name)
            .and_then(|idx| u32::try_from(idx).ok())
            .map(LayerId)
    }

    /// Returns the number of registered layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no layers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over all layer handles in registration order.
    pub fn ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        (0..self.names.len()).filter_map(|idx| u32::try_from(idx).ok().map(LayerId))
    }

    /// Iterates over the layers with the given role.
    pub fn with_role(&self, role: LayerRole) -> impl Iterator<Item = LayerId> + '_ {
        self.ids().filter(move |id| self.roles[id.0 as usize] == role)
    }

    // -- Getters (read-only, no dirty marking) --

    /// Returns the layer's name.
    #[must_use]
    pub fn name(&self, id: LayerId) -> &str {
        self.validate(id);
        &self.names[id.0 as usize]
    }

    /// Returns the layer's role.
    #[must_use]
    pub fn role(&self, id: LayerId) -> LayerRole {
        self.validate(id);
        self.roles[id.0 as usize]
    }

    /// Returns the layer's fixed depth.
    #[must_use]
    pub fn z_order(&self, id: LayerId) -> i32 {
        self.validate(id);
        self.z_order[id.0 as usize]
    }

    /// Returns the layer's current (target) opacity.
    #[must_use]
    pub fn opacity(&self, id: LayerId) -> f32 {
        self.validate(id);
        self.opacity[id.0 as usize]
    }

    /// Returns whether the layer is visible.
    #[must_use]
    pub fn is_visible(&self, id: LayerId) -> bool {
        self.validate(id);
        self.visible[id.0 as usize]
    }

    /// Returns the most recently requested fade, if it has not been
    /// superseded by an instant change.
    #[must_use]
    pub fn fade(&self, id: LayerId) -> Option<Fade> {
        self.validate(id);
        self.fade[id.0 as usize]
    }

    /// Returns the active pulse, if any.
    #[must_use]
    pub fn pulse(&self, id: LayerId) -> Option<PulseSpec> {
        self.validate(id);
        self.pulse[id.0 as usize]
    }

    /// Returns `true` if the layer is visible and fully opaque.
    #[must_use]
    pub fn is_fully_shown(&self, id: LayerId) -> bool {
        self.is_visible(id) && self.opacity(id) >= 1.0
    }

    // -- Mutation API (auto-marks dirty) --

    /// Sets the opacity instantly, cancelling any fade in progress.
    ///
    /// The value is clamped to `[0, 1]`; NaN is treated as 0.
    pub fn set_opacity(&mut self, id: LayerId, value: f32) {
        self.validate(id);
        let idx = id.0 as usize;
        self.opacity[idx] = clamp_opacity(value);
        self.fade[idx] = None;
        self.dirty.mark(id.0, dirty::OPACITY);
    }

    /// Shows or hides the layer.
    pub fn set_visible(&mut self, id: LayerId, visible: bool) {
        self.validate(id);
        let idx = id.0 as usize;
        if self.visible[idx] != visible {
            self.visible[idx] = visible;
            self.dirty.mark(id.0, dirty::VISIBILITY);
        }
    }

    /// Requests a timed fade towards `target` and returns immediately.
    ///
    /// The stored opacity jumps to the target; the [`Fade`] record tells the
    /// renderer where to animate from. A zero-length spec behaves like
    /// [`set_opacity`](Self::set_opacity).
    pub fn fade_to(&mut self, id: LayerId, target: f32, spec: FadeSpec) {
        if spec.duration.is_zero() {
            self.set_opacity(id, target);
            return;
        }
        self.validate(id);
        let idx = id.0 as usize;
        let to = clamp_opacity(target);
        self.fade[idx] = Some(Fade {
            from: self.opacity[idx],
            to,
            spec,
        });
        self.opacity[idx] = to;
        self.dirty.mark(id.0, dirty::FADE);
    }

    /// Starts a looping pulse, replacing any pulse already running.
    pub fn start_pulse(&mut self, id: LayerId, spec: PulseSpec) {
        self.validate(id);
        self.pulse[id.0 as usize] = Some(spec);
        self.dirty.mark(id.0, dirty::PULSE);
    }

    /// Stops the layer's pulse, if any.
    pub fn stop_pulse(&mut self, id: LayerId) {
        self.validate(id);
        if self.pulse[id.0 as usize].take().is_some() {
            self.dirty.mark(id.0, dirty::PULSE);
        }
    }

    /// Forces one layer back to its rest state: hidden, rest opacity, no fade,
    /// no pulse.
    pub fn reset_to_rest(&mut self, id: LayerId) {
        self.validate(id);
        let rest = self.rest_opacity[id.0 as usize];
        self.stop_pulse(id);
        self.set_opacity(id, rest);
        self.set_visible(id, false);
    }

    /// Forces every layer back to its rest state.
    pub fn reset_all_to_rest(&mut self) {
        for idx in 0..self.names.len() {
            if let Ok(idx) = u32::try_from(idx) {
                self.reset_to_rest(LayerId(idx));
            }
        }
    }

    // -- Internal helpers --

    /// Panics if the handle does not belong to this registry.
    fn validate(&self, id: LayerId) {
        assert!(
            (id.0 as usize) < self.names.len(),
            "unknown LayerId: {id:?} (registry has {} layers)",
            self.names.len()
        );
    }
}

fn clamp_opacity(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Duration;
    use crate::transition::Easing;

    fn registry_with(names: &[&str]) -> (LayerRegistry, Vec<LayerId>) {
        let mut registry = LayerRegistry::new();
        let ids = names
            .iter()
            .enumerate()
            .map(|(z, name)| {
                registry
                    .create_layer(&LayerSpec::new(
                        *name,
                        LayerRole::Content,
                        i32::try_from(z).unwrap(),
                    ))
                    .unwrap()
            })
            .collect();
        (registry, ids)
    }

    #[test]
    fn create_and_find() {
        let (registry, ids) = registry_with(&["cardBase", "cardText"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find("cardText"), Some(ids[1]));
        assert_eq!(registry.find("missing"), None);
        assert_eq!(registry.name(ids[0]), "cardBase");
        assert_eq!(registry.z_order(ids[1]), 1);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let (mut registry, _) = registry_with(&["tri1"]);
        let err = registry
            .create_layer(&LayerSpec::new("tri1", LayerRole::Accent, 9))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("tri1".into()));
    }

    #[test]
    fn invalid_rest_opacity_is_rejected() {
        let mut registry = LayerRegistry::new();
        let spec = LayerSpec::new("glow", LayerRole::Accent, 0).with_rest_opacity(1.5);
        assert!(matches!(
            registry.create_layer(&spec),
            Err(RegistryError::InvalidOpacity(_))
        ));
    }

    #[test]
    fn new_layers_start_at_rest() {
        let mut registry = LayerRegistry::new();
        let id = registry
            .create_layer(&LayerSpec::new("tri1", LayerRole::Accent, 2).with_rest_opacity(0.5))
            .unwrap();
        assert!(!registry.is_visible(id));
        assert_eq!(registry.opacity(id), 0.5);
        assert_eq!(registry.fade(id), None);
        assert_eq!(registry.pulse(id), None);
    }

    #[test]
    fn set_opacity_clamps_and_cancels_fade() {
        let (mut registry, ids) = registry_with(&["a"]);
        registry.fade_to(ids[0], 0.0, FadeSpec::new(Duration(500), Easing::Linear));
        assert!(registry.fade(ids[0]).is_some());

        registry.set_opacity(ids[0], 4.0);
        assert_eq!(registry.opacity(ids[0]), 1.0);
        assert_eq!(registry.fade(ids[0]), None);

        registry.set_opacity(ids[0], f32::NAN);
        assert_eq!(registry.opacity(ids[0]), 0.0);
    }

    #[test]
    fn fade_records_start_and_target() {
        let (mut registry, ids) = registry_with(&["a"]);
        registry.set_opacity(ids[0], 1.0);
        let spec = FadeSpec::new(Duration(1200), Easing::EaseInOutQuad);
        registry.fade_to(ids[0], 0.0, spec);

        assert_eq!(registry.opacity(ids[0]), 0.0);
        assert_eq!(
            registry.fade(ids[0]),
            Some(Fade {
                from: 1.0,
                to: 0.0,
                spec
            })
        );
    }

    #[test]
    fn zero_length_fade_is_instant() {
        let (mut registry, ids) = registry_with(&["a"]);
        registry.fade_to(ids[0], 0.25, FadeSpec::INSTANT);
        assert_eq!(registry.opacity(ids[0]), 0.25);
        assert_eq!(registry.fade(ids[0]), None);
    }

    #[test]
    fn reset_to_rest_clears_everything() {
        let mut registry = LayerRegistry::new();
        let id = registry
            .create_layer(&LayerSpec::new("tri1", LayerRole::Accent, 2).with_rest_opacity(0.5))
            .unwrap();
        registry.set_visible(id, true);
        registry.fade_to(id, 1.0, FadeSpec::new(Duration(300), Easing::Linear));
        registry.start_pulse(
            id,
            PulseSpec {
                low: 0.25,
                high: 1.0,
                period: Duration(900),
                delay: Duration::ZERO,
                easing: Easing::EaseInOutSine,
            },
        );

        registry.reset_all_to_rest();
        assert!(!registry.is_visible(id));
        assert_eq!(registry.opacity(id), 0.5);
        assert_eq!(registry.fade(id), None);
        assert_eq!(registry.pulse(id), None);
    }

    #[test]
    fn with_role_filters() {
        let mut registry = LayerRegistry::new();
        let base = registry
            .create_layer(&LayerSpec::new("cardBase", LayerRole::Base, 0))
            .unwrap();
        let tri = registry
            .create_layer(&LayerSpec::new("tri1", LayerRole::Accent, 1))
            .unwrap();
        assert_eq!(registry.with_role(LayerRole::Base).collect::<Vec<_>>(), [base]);
        assert_eq!(registry.with_role(LayerRole::Accent).collect::<Vec<_>>(), [tri]);
    }

    #[test]
    #[should_panic(expected = "unknown LayerId")]
    fn foreign_handle_panics() {
        let (registry, _) = registry_with(&["a"]);
        let _ = registry.opacity(LayerId(7));
    }
}
