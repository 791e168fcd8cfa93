// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation sequencer and interaction state machine for marker-triggered
//! overlays.
//!
//! `marker_reveal_core` drives a small augmented-reality business card: when
//! an image marker is recognized a timed reveal plays, after which a cube on
//! the card can be rotated by dragging and its faces tapped to navigate
//! pages, export a contact card or open links. Losing the marker puts
//! everything back to rest. The crate is `no_std` compatible (with `alloc`)
//! and never reads a clock; every handler takes the host's monotonic time.
//!
//! # Architecture
//!
//! ```text
//!   Host events (marker, pointer, HUD, frame tick)
//!       │
//!       ▼
//!   Experience ──► Sequencer / PageMachine / GestureClassifier / Router
//!       │                    │
//!       │                    ▼
//!       │            TimerLedger (epoch-scoped cues)
//!       ▼
//!   LayerRegistry::evaluate() ──► LayerChanges ──► Presenter::apply()
//! ```
//!
//! **[`experience`]** — The [`Experience`] facade that owns all components
//! and fires due cues after every event.
//!
//! **[`sequencer`]** — Reveal choreography: idle, revealing, steady and
//! resetting states, one timed step per cue.
//!
//! **[`page`]** — Page transitions with fade-out, staged fade-in, slides,
//! media and supersession of in-flight transitions.
//!
//! **[`ledger`]** — Delayed actions scoped to an epoch, so a single cancel
//! drops everything a lost session scheduled.
//!
//! **[`layer`]** — Struct-of-arrays registry of named overlay layers with
//! opacity, visibility, fades and pulses. Mutations mark dirty channels
//! (see [`dirty`]) that evaluation drains.
//!
//! **[`gesture`]**, **[`face`]** and **[`router`]** — Tap versus drag
//! classification, hit-to-face resolution and face-to-action routing with
//! duplicate suppression.
//!
//! **[`backend`]** — Traits for the presenter and the external collaborators
//! (scene renderer, media, HUD, outbox).
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types,
//! with a [`Tracer`](trace::Tracer) wrapper that compiles away without the
//! `trace` feature.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod config;
pub mod contact;
pub mod dirty;
pub mod experience;
pub mod face;
pub mod gesture;
pub mod layer;
pub mod ledger;
pub mod page;
pub mod router;
pub mod sequencer;
pub mod time;
pub mod trace;
pub mod transform;
pub mod transition;

pub use experience::Experience;
