// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change collection for presenters.
//!
//! Evaluation drains each dirty channel and reports which layers changed in
//! that category. There is nothing to recompute: layers are flat, so the
//! stored values are already what the presenter should show.

use alloc::vec::Vec;

use super::id::LayerId;
use super::registry::LayerRegistry;
use crate::dirty;

/// The set of changes produced by a single [`LayerRegistry::evaluate`] call.
///
/// Presenters read the current values for each listed layer from the
/// registry.
#[derive(Clone, Debug, Default)]
pub struct LayerChanges {
    /// Layers registered since the last evaluate.
    pub added: Vec<LayerId>,
    /// Layers whose opacity was set instantly.
    pub opacities: Vec<LayerId>,
    /// Layers with a newly requested fade.
    pub fades: Vec<LayerId>,
    /// Layers whose pulse started, changed or stopped.
    pub pulses: Vec<LayerId>,
    /// Layers that became visible.
    pub shown: Vec<LayerId>,
    /// Layers that became hidden.
    pub hidden: Vec<LayerId>,
}

impl LayerChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.added.clear();
        self.opacities.clear();
        self.fades.clear();
        self.pulses.clear();
        self.shown.clear();
        self.hidden.clear();
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.opacities.is_empty()
            && self.fades.is_empty()
            && self.pulses.is_empty()
            && self.shown.is_empty()
            && self.hidden.is_empty()
    }
}

impl LayerRegistry {
    /// Drains all dirty channels and returns the set of changes.
    pub fn evaluate(&mut self) -> LayerChanges {
        let mut changes = LayerChanges::default();
        self.evaluate_into(&mut changes);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided buffer
    /// to avoid allocation.
    pub fn evaluate_into(&mut self, changes: &mut LayerChanges) {
        changes.clear();

        let fades: Vec<u32> = self
            .dirty
            .drain(dirty::FADE)
            .deterministic()
            .run()
            .collect();
        let opacities: Vec<u32> = self
            .dirty
            .drain(dirty::OPACITY)
            .deterministic()
            .run()
            .collect();

        // A fade and an instant set in the same frame: whichever is stored
        // now wins, so report the layer in exactly one list.
        for idx in fades {
            if self.fade[idx as usize].is_some() {
                changes.fades.push(LayerId(idx));
            } else {
                changes.opacities.push(LayerId(idx));
            }
        }
        for idx in opacities {
            let id = LayerId(idx);
            if self.fade[idx as usize].is_none() && !changes.opacities.contains(&id) {
                changes.opacities.push(id);
            }
        }

        changes.pulses = self
            .dirty
            .drain(dirty::PULSE)
            .deterministic()
            .run()
            .map(LayerId)
            .collect();

        let visibility: Vec<u32> = self
            .dirty
            .drain(dirty::VISIBILITY)
            .deterministic()
            .run()
            .collect();
        for idx in visibility {
            if self.visible[idx as usize] {
                changes.shown.push(LayerId(idx));
            } else {
                changes.hidden.push(LayerId(idx));
            }
        }

        core::mem::swap(&mut self.pending_added, &mut changes.added);
    }
}
