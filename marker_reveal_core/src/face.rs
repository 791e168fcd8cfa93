// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Face resolution for the interactive object.
//!
//! A tap on the object arrives either as a raycast hit normal in the object's
//! local space, or as a face identifier attached to a clickable element. Both
//! resolve to one of six [`Face`]s.
//!
//! For normals, the component with the greatest magnitude picks the axis and
//! its sign picks the side. Exact ties (a hit on an edge or corner) resolve by
//! axis priority X, then Y, then Z. A zero or non-finite normal resolves to
//! nothing.

use core::fmt;

/// One of the six symbolic faces of the interactive object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    /// +Z, facing the viewer at rest.
    Front,
    /// −Z.
    Back,
    /// −X.
    Left,
    /// +X.
    Right,
    /// +Y.
    Top,
    /// −Y.
    Bottom,
}

impl Face {
    /// All faces in a fixed order.
    pub const ALL: [Self; 6] = [
        Self::Front,
        Self::Back,
        Self::Left,
        Self::Right,
        Self::Top,
        Self::Bottom,
    ];

    /// Returns the lowercase identifier used in element attributes.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    /// Parses an identifier produced by [`name`](Self::name).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|face| face.name() == name)
    }

    /// Returns the outward unit normal in object space.
    #[must_use]
    pub const fn normal(self) -> [f64; 3] {
        match self {
            Self::Front => [0.0, 0.0, 1.0],
            Self::Back => [0.0, 0.0, -1.0],
            Self::Left => [-1.0, 0.0, 0.0],
            Self::Right => [1.0, 0.0, 0.0],
            Self::Top => [0.0, 1.0, 0.0],
            Self::Bottom => [0.0, -1.0, 0.0],
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the input collaborator reports for a tap on the object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Hit {
    /// A raycast hit with the surface normal in object-local space.
    Normal([f64; 3]),
    /// A flat-button overlay element that already names its face.
    Element(Face),
}

/// Resolves a hit to a face.
#[must_use]
pub fn resolve(hit: Hit) -> Option<Face> {
    match hit {
        Hit::Element(face) => Some(face),
        Hit::Normal(n) => resolve_normal(n),
    }
}

/// Resolves an object-space normal to the face it points out of.
#[must_use]
pub fn resolve_normal(n: [f64; 3]) -> Option<Face> {
    if n.iter().any(|c| !c.is_finite()) {
        return None;
    }
    let [ax, ay, az] = [n[0].abs(), n[1].abs(), n[2].abs()];
    if ax == 0.0 && ay == 0.0 && az == 0.0 {
        return None;
    }
    let face = if ax >= ay && ax >= az {
        if n[0] > 0.0 { Face::Right } else { Face::Left }
    } else if ay >= az {
        if n[1] > 0.0 { Face::Top } else { Face::Bottom }
    } else if n[2] > 0.0 {
        Face::Front
    } else {
        Face::Back
    };
    Some(face)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_normals_resolve_to_their_face() {
        for face in Face::ALL {
            assert_eq!(resolve_normal(face.normal()), Some(face), "{face}");
        }
    }

    #[test]
    fn dominant_component_wins() {
        assert_eq!(resolve_normal([0.2, -0.9, 0.3]), Some(Face::Bottom));
        assert_eq!(resolve_normal([-0.7, 0.1, 0.69]), Some(Face::Left));
        assert_eq!(resolve_normal([0.0, 0.1, -0.2]), Some(Face::Back));
    }

    #[test]
    fn ties_prefer_x_then_y() {
        assert_eq!(resolve_normal([0.5, 0.5, 0.5]), Some(Face::Right));
        assert_eq!(resolve_normal([-0.5, 0.5, 0.0]), Some(Face::Left));
        assert_eq!(resolve_normal([0.0, -0.5, 0.5]), Some(Face::Bottom));
    }

    #[test]
    fn degenerate_normals_resolve_to_nothing() {
        assert_eq!(resolve_normal([0.0, 0.0, 0.0]), None);
        assert_eq!(resolve_normal([f64::NAN, 1.0, 0.0]), None);
        assert_eq!(resolve_normal([0.0, f64::INFINITY, 0.0]), None);
    }

    #[test]
    fn element_hits_pass_through() {
        assert_eq!(resolve(Hit::Element(Face::Top)), Some(Face::Top));
    }

    #[test]
    fn names_round_trip() {
        assert_eq!(Face::from_name("right"), Some(Face::Right));
        assert_eq!(Face::from_name("RIGHT"), None);
    }
}
