// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer registry data model.
//!
//! A *layer* is a flat visual surface stacked at a fixed depth. Each layer
//! has:
//!
//! - An identity ([`LayerId`]) and a unique name.
//! - A [`LayerRole`] deciding its rest state.
//! - **Properties** mutated by the sequencer and the page state machine:
//!   [`opacity`](LayerRegistry::set_opacity),
//!   [`visibility`](LayerRegistry::set_visible), and the transition requests
//!   [`fade_to`](LayerRegistry::fade_to) and
//!   [`start_pulse`](LayerRegistry::start_pulse).
//!
//! Layers are created once at startup and never destroyed.
//!
//! # Dirty tracking
//!
//! Mutations mark the corresponding channel (see [`dirty`](crate::dirty)).
//! [`evaluate`](LayerRegistry::evaluate) drains them into [`LayerChanges`].

mod evaluate;
mod id;
mod registry;

pub use evaluate::LayerChanges;
pub use id::{LayerId, LayerRole};
pub use registry::{LayerRegistry, LayerSpec, RegistryError};
