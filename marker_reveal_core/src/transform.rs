// Copyright 2026 the Marker Reveal Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal column-major 4×4 transform.
//!
//! Covers what the interactive object needs (identity, axis rotations and
//! multiply) without pulling in a linear-algebra crate.
//! Presenters turn it into their native form, e.g. a CSS `matrix3d()`.

use core::ops::Mul;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// A column-major 4×4 affine transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix, which is also the
/// argument order CSS `matrix3d()` expects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Returns the sixteen entries in column-major order.
    #[must_use]
    pub fn to_cols_array(self) -> [f64; 16] {
        let mut out = [0.0; 16];
        for (j, col) in self.cols.iter().enumerate() {
            out[j * 4..j * 4 + 4].copy_from_slice(col);
        }
        out
    }

    /// Creates a rotation around the X axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_x(radians: f64) -> Self {
        let (s, c) = sin_cos(radians);
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, s, 0.0],
                [0.0, -s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Y axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_y(radians: f64) -> Self {
        let (s, c) = sin_cos(radians);
        Self {
            cols: [
                [c, 0.0, -s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Is every entry [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        let mut j = 0;
        while j < 4 {
            let mut i = 0;
            while i < 4 {
                out[j][i] =
                    a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
                i += 1;
            }
            j += 1;
        }
        Self { cols: out }
    }
}

fn sin_cos(radians: f64) -> (f64, f64) {
    #[cfg(feature = "std")]
    let (s, c) = radians.sin_cos();
    #[cfg(not(feature = "std"))]
    let (s, c) = (radians.sin(), radians.cos());
    (s, c)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: [f64; 3], b: [f64; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < EPS)
    }

    /// Applies `xf` to a direction (w = 0).
    fn rotate(xf: Transform3d, v: [f64; 3]) -> [f64; 3] {
        let c = &xf.cols;
        [
            c[0][0] * v[0] + c[1][0] * v[1] + c[2][0] * v[2],
            c[0][1] * v[0] + c[1][1] * v[1] + c[2][1] * v[2],
            c[0][2] * v[0] + c[1][2] * v[1] + c[2][2] * v[2],
        ]
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform3d::default(), Transform3d::IDENTITY);
    }

    #[test]
    fn identity_multiply() {
        let r = Transform3d::from_rotation_x(0.3);
        assert_eq!(Transform3d::IDENTITY * r, r);
        assert_eq!(r * Transform3d::IDENTITY, r);
    }

    #[test]
    fn yaw_quarter_turn_moves_front_to_right() {
        let r = Transform3d::from_rotation_y(core::f64::consts::FRAC_PI_2);
        assert!(close(rotate(r, [0.0, 0.0, 1.0]), [1.0, 0.0, 0.0]));
    }

    #[test]
    fn pitch_quarter_turn_moves_top_to_front() {
        let r = Transform3d::from_rotation_x(core::f64::consts::FRAC_PI_2);
        assert!(close(rotate(r, [0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]));
    }

    #[test]
    fn rotations_compose_right_to_left() {
        let yaw = Transform3d::from_rotation_y(core::f64::consts::FRAC_PI_2);
        let pitch = Transform3d::from_rotation_x(core::f64::consts::FRAC_PI_2);
        // Yaw first (front -> right), then pitch leaves +X alone.
        let v = rotate(pitch * yaw, [0.0, 0.0, 1.0]);
        assert!(close(v, [1.0, 0.0, 0.0]));
    }

    #[test]
    fn cols_array_is_column_major() {
        let arr = Transform3d::IDENTITY.to_cols_array();
        assert_eq!(arr[0], 1.0);
        assert_eq!(arr[5], 1.0);
        assert_eq!(arr[1], 0.0);
        assert_eq!(arr[15], 1.0);
    }

    #[test]
    fn nan_detected() {
        let mut t = Transform3d::IDENTITY;
        t.cols[2][1] = f64::NAN;
        assert!(!t.is_finite());
        assert!(Transform3d::IDENTITY.is_finite());
    }
}
