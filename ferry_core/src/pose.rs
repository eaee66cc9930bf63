// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 2-D pose: translation, rotation, and uniform scale.
//!
//! A [`Pose`] is the transform an external renderer reads for a stack or an
//! item. Stack poses live in scene space; item poses are local to their owning
//! stack, or in scene space while the item is airborne.

use kurbo::{Affine, Point};

/// Position, rotation (radians), and uniform scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Translation.
    pub position: Point,
    /// Rotation in radians, applied before translation.
    pub rotation: f64,
    /// Uniform scale, applied before rotation.
    pub scale: f64,
}

impl Pose {
    /// The identity pose.
    pub const IDENTITY: Self = Self {
        position: Point::ORIGIN,
        rotation: 0.0,
        scale: 1.0,
    };

    /// Creates an unscaled pose.
    #[inline]
    #[must_use]
    pub const fn new(position: Point, rotation: f64) -> Self {
        Self {
            position,
            rotation,
            scale: 1.0,
        }
    }

    /// Creates an unrotated, unscaled pose at `position`.
    #[inline]
    #[must_use]
    pub const fn at(position: Point) -> Self {
        Self::new(position, 0.0)
    }

    /// Returns this pose with a different scale.
    #[inline]
    #[must_use]
    pub const fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Converts to an affine transform (`translate * rotate * scale`).
    #[must_use]
    pub fn to_affine(self) -> Affine {
        Affine::translate(self.position.to_vec2())
            * Affine::rotate(self.rotation)
            * Affine::scale(self.scale)
    }

    /// Expresses a pose local to `self` in `self`'s parent space.
    #[must_use]
    pub fn compose(self, local: Self) -> Self {
        Self {
            position: self.to_affine() * local.position,
            rotation: self.rotation + local.rotation,
            scale: self.scale * local.scale,
        }
    }

    /// Expresses a pose given in `self`'s parent space as local to `self`.
    ///
    /// Inverse of [`compose`](Self::compose). A degenerate (zero) scale is
    /// treated as unit scale.
    #[must_use]
    pub fn localize(self, parent_space: Self) -> Self {
        let frame = if self.scale == 0.0 {
            self.with_scale(1.0)
        } else {
            self
        };
        Self {
            position: frame.to_affine().inverse() * parent_space.position,
            rotation: parent_space.rotation - frame.rotation,
            scale: parent_space.scale / frame.scale,
        }
    }

    /// Component-wise linear blend from `self` (t = 0) to `other` (t = 1).
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation + (other.rotation - self.rotation) * t,
            scale: self.scale + (other.scale - self.scale) * t,
        }
    }

    /// Is every component [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.rotation.is_finite()
            && self.scale.is_finite()
    }
}

impl Default for Pose {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use core::f64::consts::FRAC_PI_2;

    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-9
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(Pose::default(), Pose::IDENTITY);
        assert_eq!(Pose::IDENTITY.to_affine(), Affine::IDENTITY);
    }

    #[test]
    fn compose_rotates_then_translates() {
        let parent = Pose::new(Point::new(10.0, 0.0), FRAC_PI_2);
        let child = Pose::at(Point::new(0.0, -5.0));
        let world = parent.compose(child);
        // (0, -5) rotated +90deg is (5, 0); then shifted by (10, 0).
        assert!(close(world.position, Point::new(15.0, 0.0)), "{world:?}");
        assert!((world.rotation - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn localize_inverts_compose() {
        let parent = Pose::new(Point::new(-30.0, 12.0), 2.1);
        let child = Pose::new(Point::new(3.0, -7.0), 0.4).with_scale(1.2);
        let back = parent.localize(parent.compose(child));
        assert!(close(back.position, child.position));
        assert!((back.rotation - child.rotation).abs() < 1e-12);
        assert!((back.scale - child.scale).abs() < 1e-12);
    }

    #[test]
    fn lerp_blends_all_components() {
        let a = Pose::new(Point::new(0.0, 0.0), 0.0);
        let b = Pose::new(Point::new(10.0, -20.0), 1.0).with_scale(3.0);
        let mid = a.lerp(b, 0.5);
        assert!(close(mid.position, Point::new(5.0, -10.0)));
        assert_eq!(mid.rotation, 0.5);
        assert_eq!(mid.scale, 2.0);
    }

    #[test]
    fn nan_detected() {
        let mut p = Pose::IDENTITY;
        assert!(p.is_finite());
        p.rotation = f64::NAN;
        assert!(!p.is_finite());
    }
}
