// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The layer registry uses multi-channel dirty tracking (via
//! [`understory_dirty`]) so presenters only touch layers that actually
//! changed since the last [`evaluate`](crate::layer::LayerRegistry::evaluate).
//! Layers are flat (no parent links), so every channel is local-only: only
//! the explicitly marked layer appears in the drain output.
//!
//! # Consumption
//!
//! Callers never query dirty state directly. Each evaluate call drains all
//! channels and surfaces the results as
//! [`LayerChanges`](crate::layer::LayerChanges), which presenters
//! [consume](crate::backend::Presenter::apply).

use understory_dirty::Channel;

/// Opacity changed instantly (no transition).
pub const OPACITY: Channel = Channel::new(0);

/// Visibility flag changed.
pub const VISIBILITY: Channel = Channel::new(1);

/// A fade was requested; the presenter should start a timed transition.
pub const FADE: Channel = Channel::new(2);

/// A looping pulse was started or stopped.
pub const PULSE: Channel = Channel::new(3);
