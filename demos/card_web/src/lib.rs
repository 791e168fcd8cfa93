// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser demo: the business card revealed over an image marker.
//!
//! The page supplies the markup (see `index.html`): one element per layer
//! with the layer name as id, a `#marker` element that receives the
//! tracker's `targetFound` and `targetLost` events, cube faces tagged with
//! `data-face`, and HUD buttons. This crate only wires DOM events into the
//! [`Experience`] and presents layer changes once per animation frame.
//!
//! Build with: `wasm-pack build --target web demos/card_web`
//! Then serve `demos/card_web/` and open `index.html`.

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use kurbo::Point;
use marker_reveal_core::Experience;
use marker_reveal_core::config::ExperienceConfig;
use marker_reveal_core::face::{Face, Hit};
use marker_reveal_core::router::HudButton;
use marker_reveal_core::trace::Tracer;
use marker_reveal_web::{DomPresenter, ElementIds, RafLoop};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, PointerEvent};

struct CardState {
    experience: Experience,
    presenter: DomPresenter,
}

type Shared = Rc<RefCell<CardState>>;

/// Entry point for the card demo.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let collaborators = marker_reveal_web::collaborators(&document, ElementIds::default());
    let experience = Experience::new(
        ExperienceConfig::business_card(),
        collaborators,
        Tracer::none(),
    )
    .map_err(|e| JsValue::from_str(&alloc::format!("{e:?}")))?;

    let state: Shared = Rc::new(RefCell::new(CardState {
        experience,
        presenter: DomPresenter::new(document.clone()),
    }));

    bind_marker(&document, &state)?;
    bind_pointer(&document, &state)?;
    bind_hud(&document, &state)?;

    let frame_state = Rc::clone(&state);
    let raf = RafLoop::new(move |now| {
        let mut s = frame_state.borrow_mut();
        let CardState {
            experience,
            presenter,
        } = &mut *s;
        experience.advance(now);
        experience.present(presenter);
    });
    raf.start();
    core::mem::forget(raf);

    Ok(())
}

fn listen(
    target: &Element,
    event: &str,
    state: &Shared,
    handler: impl Fn(&mut CardState, Event) + 'static,
) -> Result<(), JsValue> {
    let state = Rc::clone(state);
    let cb = Closure::wrap(Box::new(move |event: Event| {
        handler(&mut state.borrow_mut(), event);
    }) as Box<dyn FnMut(_)>);
    target.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

fn by_id(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&alloc::format!("missing #{id}")))
}

fn bind_marker(document: &Document, state: &Shared) -> Result<(), JsValue> {
    let marker = by_id(document, "marker")?;
    listen(&marker, "targetFound", state, |s, _| {
        s.experience.target_found(marker_reveal_web::now());
    })?;
    listen(&marker, "targetLost", state, |s, _| {
        s.experience.target_lost(marker_reveal_web::now());
    })
}

fn bind_pointer(document: &Document, state: &Shared) -> Result<(), JsValue> {
    let cube = by_id(document, "cube")?;
    listen(&cube, "pointerdown", state, |s, event| {
        if let Some(point) = pointer_point(&event) {
            // Keep receiving moves and the release once the drag leaves the cube.
            capture_pointer(&event);
            s.experience.pointer_down(marker_reveal_web::now(), point);
        }
    })?;
    listen(&cube, "pointermove", state, |s, event| {
        if let Some(point) = pointer_point(&event) {
            s.experience.pointer_move(marker_reveal_web::now(), point);
        }
    })?;
    listen(&cube, "pointerup", state, |s, event| {
        let hit = face_under(&event).map(Hit::Element);
        s.experience.pointer_up(marker_reveal_web::now(), hit);
    })?;
    listen(&cube, "pointercancel", state, |s, _| {
        s.experience.pointer_up(marker_reveal_web::now(), None);
    })
}

fn bind_hud(document: &Document, state: &Shared) -> Result<(), JsValue> {
    for (id, button) in [
        ("hud-home", HudButton::Home),
        ("hud-prev", HudButton::Previous),
        ("hud-next", HudButton::Next),
        ("hud-contact", HudButton::Contact),
    ] {
        let Some(el) = document.get_element_by_id(id) else {
            continue;
        };
        listen(&el, "click", state, move |s, _| {
            s.experience.hud_button(marker_reveal_web::now(), button);
        })?;
    }
    Ok(())
}

fn pointer_point(event: &Event) -> Option<Point> {
    let event = event.dyn_ref::<PointerEvent>()?;
    Some(Point::new(
        f64::from(event.client_x()),
        f64::from(event.client_y()),
    ))
}

fn capture_pointer(event: &Event) {
    let Some(pointer) = event.dyn_ref::<PointerEvent>() else {
        return;
    };
    if let Some(cube) = event
        .current_target()
        .and_then(|target| target.dyn_into::<Element>().ok())
    {
        let _ = cube.set_pointer_capture(pointer.pointer_id());
    }
}

/// Resolves the face from the `data-face` attribute of the element (or an
/// ancestor) under the pointer when it went up.
///
/// A captured pointer's events target the cube itself, so this hit-tests the
/// release point instead of reading the event target.
fn face_under(event: &Event) -> Option<Face> {
    let pointer = event.dyn_ref::<PointerEvent>()?;
    let document = web_sys::window()?.document()?;
    let hit = document.element_from_point(pointer.client_x() as f32, pointer.client_y() as f32)?;
    let tagged = hit.closest("[data-face]").ok()??;
    Face::from_name(&tagged.get_attribute("data-face")?)
}
