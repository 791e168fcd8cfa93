// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! CSS-driven scene object.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use marker_reveal_core::backend::{ClipMode, Scene};
use marker_reveal_core::transform::Transform3d;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast as _, JsValue};
use web_sys::{Event, HtmlElement};

/// Rotates one element with a CSS `matrix3d()` and plays clips by toggling
/// `clip-<name>` classes that the page's stylesheet animates.
///
/// A looping clip also gets `clip-<name>-loop`, which the stylesheet can use
/// to set `animation-iteration-count: infinite` for that clip alone. A clip
/// played once loses its class on `animationend`, or when another clip
/// starts, so its animation never outlives it. Once clips should therefore
/// end on the element's resting style.
pub struct DomScene {
    object: HtmlElement,
    classes: Rc<RefCell<ClipClasses>>,
    on_animation_end: Closure<dyn FnMut(Event)>,
}

impl core::fmt::Debug for DomScene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomScene")
            .field("classes", &self.classes.borrow())
            .finish_non_exhaustive()
    }
}

impl DomScene {
    /// Wraps the element to rotate.
    #[must_use]
    pub fn new(object: HtmlElement) -> Self {
        let classes = Rc::new(RefCell::new(ClipClasses::default()));

        let target = object.clone();
        let pending = Rc::clone(&classes);
        let on_animation_end = Closure::wrap(Box::new(move |event: Event| {
            // Animations on the faces bubble up; only the object's own count.
            let own = event.target().is_some_and(|t| {
                let t: &JsValue = t.as_ref();
                let object: &JsValue = target.as_ref();
                t == object
            });
            if own {
                let edits = pending.borrow_mut().ended();
                apply(&target, &edits);
            }
        }) as Box<dyn FnMut(Event)>);
        let _ = object.add_event_listener_with_callback(
            "animationend",
            on_animation_end.as_ref().unchecked_ref(),
        );

        Self {
            object,
            classes,
            on_animation_end,
        }
    }
}

impl Drop for DomScene {
    fn drop(&mut self) {
        let _ = self.object.remove_event_listener_with_callback(
            "animationend",
            self.on_animation_end.as_ref().unchecked_ref(),
        );
    }
}

impl Scene for DomScene {
    fn play_clip(&mut self, name: &str, mode: ClipMode) {
        let edits = self.classes.borrow_mut().play(name, mode);
        apply(&self.object, &edits);
    }

    fn stop_clip(&mut self, name: &str) {
        let edits = self.classes.borrow_mut().stop(name);
        apply(&self.object, &edits);
    }

    fn set_rotation(&mut self, rotation: &Transform3d) {
        let _ = self
            .object
            .style()
            .set_property("transform", &css_matrix3d(rotation));
    }
}

/// One change to the object's class list.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Edit {
    Add(String),
    Remove(String),
    /// Remove, force a reflow, then add, so the animation starts over.
    Restart(String),
}

fn apply(object: &HtmlElement, edits: &[Edit]) {
    let list = object.class_list();
    for edit in edits {
        match edit {
            Edit::Add(class) => {
                let _ = list.add_1(class);
            }
            Edit::Remove(class) => {
                let _ = list.remove_1(class);
            }
            Edit::Restart(class) => {
                let _ = list.remove_1(class);
                let _ = object.offset_width();
                let _ = list.add_1(class);
            }
        }
    }
}

/// Which clip classes are on the object, kept apart from the DOM.
#[derive(Debug, Default)]
struct ClipClasses {
    /// Class of the clip currently playing once.
    once: Option<String>,
}

impl ClipClasses {
    fn play(&mut self, name: &str, mode: ClipMode) -> Vec<Edit> {
        let class = clip_class(name);
        let looped = loop_class(&class);
        let mut edits = Vec::new();
        if let Some(previous) = self.once.take()
            && previous != class
        {
            edits.push(Edit::Remove(previous));
        }
        edits.push(Edit::Restart(class.clone()));
        match mode {
            ClipMode::Loop => edits.push(Edit::Add(looped)),
            ClipMode::Once => {
                edits.push(Edit::Remove(looped));
                self.once = Some(class);
            }
        }
        edits
    }

    fn stop(&mut self, name: &str) -> Vec<Edit> {
        let class = clip_class(name);
        if self.once.as_deref() == Some(class.as_str()) {
            self.once = None;
        }
        let looped = loop_class(&class);
        vec![Edit::Remove(class), Edit::Remove(looped)]
    }

    fn ended(&mut self) -> Vec<Edit> {
        self.once.take().map(Edit::Remove).into_iter().collect()
    }
}

/// Maps a clip name onto a class name: characters outside `[A-Za-z0-9_-]`
/// become `-`.
fn clip_class(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("clip-{sanitized}")
}

fn loop_class(clip_class: &str) -> String {
    format!("{clip_class}-loop")
}

/// Formats a transform as a CSS `matrix3d()` value (column-major).
fn css_matrix3d(xf: &Transform3d) -> String {
    let m = xf.to_cols_array();
    format!(
        "matrix3d({},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{})",
        m[0], m[1], m[2], m[3], m[4], m[5], m[6], m[7], m[8], m[9], m[10], m[11], m[12], m[13],
        m[14], m[15],
    )
}
