// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stack placement and pile geometry.
//!
//! Stacks sit evenly on a circle in the fixed design canvas. Stack `i` is at
//! angle `-π/2 + i·τ/n` (stack 0 at the top), rotated by `angle + π/2` so its
//! local up axis points away from the centre.
//!
//! Inside a stack, items share one local axis: the top item sits on the stack
//! anchor and the item `d` places below it is shifted to `y = -d · step`. The
//! step is a fixed fraction of one scaled item height, so density does not
//! depend on the window resolution.
//!
//! [`ViewportFit`] maps the design canvas into the actual window with a
//! uniform letterbox fit.

use alloc::vec::Vec;
use core::f64::consts::{FRAC_PI_2, TAU};

use kurbo::{Affine, Point, Size, Vec2};

use crate::config::SceneConfig;
use crate::pose::Pose;

/// Smallest viewport dimension accepted; zero-sized windows clamp to this.
const MIN_VIEWPORT_EXTENT: f64 = 1.0;

/// Fixed inputs to [`layout`], taken from a [`SceneConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    /// Centre of the stack circle.
    pub center: Point,
    /// Radius of the stack circle.
    pub radius: f64,
    /// Nominal item scale.
    pub item_scale: f64,
    /// Pile step as a fraction of one scaled item height.
    pub pile_step_fraction: f64,
}

impl LayoutParams {
    /// Extracts the layout parameters from a scene configuration.
    #[must_use]
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            center: Point::new(
                config.design_size.width / 2.0,
                config.design_size.height / 2.0,
            ),
            radius: config.radius,
            item_scale: config.item_scale,
            pile_step_fraction: config.pile_step_fraction,
        }
    }
}

/// The result of a layout pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    /// Scene-space pose of each stack, indexed by stack id.
    pub stacks: Vec<Pose>,
    /// Distance between neighbouring items in a pile.
    pub pile_step: f64,
}

/// Places `stack_count` stacks on the circle and derives the pile step for
/// items of `item_extent`.
///
/// Deterministic for a given count and extent.
#[must_use]
pub fn layout(stack_count: usize, item_extent: Size, params: &LayoutParams) -> Layout {
    Layout {
        stacks: circle_layout(stack_count, params.center, params.radius),
        pile_step: pile_step(item_extent, params.item_scale, params.pile_step_fraction),
    }
}

/// Angle of stack `index` on a circle of `count` stacks.
#[must_use]
pub fn stack_angle(index: usize, count: usize) -> f64 {
    if count == 0 {
        return -FRAC_PI_2;
    }
    -FRAC_PI_2 + index as f64 * TAU / count as f64
}

/// Poses for `count` stacks evenly spaced on a circle.
#[must_use]
pub fn circle_layout(count: usize, center: Point, radius: f64) -> Vec<Pose> {
    (0..count)
        .map(|i| {
            let angle = stack_angle(i, count);
            let offset = Vec2::new(libm::cos(angle), libm::sin(angle)) * radius;
            Pose::new(center + offset, angle + FRAC_PI_2)
        })
        .collect()
}

/// Distance between neighbouring items in a pile.
///
/// Degenerate inputs produce a flat pile rather than a non-finite step.
#[must_use]
pub fn pile_step(item_extent: Size, item_scale: f64, fraction: f64) -> f64 {
    let step = item_extent.height * item_scale * fraction;
    if step.is_finite() && step > 0.0 {
        step
    } else {
        0.0
    }
}

/// Local offset of the item at `index` (0 = bottom) in a pile of `len`.
///
/// The top item (`index == len - 1`) sits on the anchor; an item `d` places
/// below the top is offset by `d` steps along local `-y`.
#[must_use]
pub fn pile_offset(index: usize, len: usize, step: f64) -> Point {
    let depth = len.saturating_sub(1).saturating_sub(index);
    Point::new(0.0, -(depth as f64) * step)
}

/// Uniform letterbox fit of the design canvas into a window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportFit {
    /// Scale from design units to window pixels.
    pub scale: f64,
    /// Window-space position of the design canvas origin.
    pub offset: Vec2,
}

impl ViewportFit {
    /// Fit used before any window size is known.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: Vec2::ZERO,
    };

    /// Fits `design` into `viewport`, centring the canvas.
    ///
    /// Zero or negative window dimensions are clamped to one pixel.
    #[must_use]
    pub fn new(design: Size, viewport: Size) -> Self {
        let vw = clamp_extent(viewport.width);
        let vh = clamp_extent(viewport.height);
        let dw = clamp_extent(design.width);
        let dh = clamp_extent(design.height);
        let scale = (vw / dw).min(vh / dh);
        Self {
            scale,
            offset: Vec2::new((vw - dw * scale) / 2.0, (vh - dh * scale) / 2.0),
        }
    }

    /// The design-to-window transform.
    #[must_use]
    pub fn affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }
}

impl Default for ViewportFit {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn clamp_extent(v: f64) -> f64 {
    if v.is_finite() && v > MIN_VIEWPORT_EXTENT {
        v
    } else {
        MIN_VIEWPORT_EXTENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> LayoutParams {
        LayoutParams::from_config(&SceneConfig::ace_of_shadows())
    }

    #[test]
    fn stacks_are_evenly_spaced_on_the_circle() {
        let p = params();
        let result = layout(12, Size::new(70.0, 100.0), &p);
        assert_eq!(result.stacks.len(), 12);
        for pose in &result.stacks {
            let r = (pose.position - p.center).hypot();
            assert!((r - p.radius).abs() < 1e-9, "radius {r}");
        }
        // Stack 0 is at the top of the circle, unrotated.
        let top = result.stacks[0];
        assert!((top.position.x - p.center.x).abs() < 1e-9);
        assert!((top.position.y - (p.center.y - p.radius)).abs() < 1e-9);
        assert!(top.rotation.abs() < 1e-12);
        // Neighbours are 30 degrees apart.
        let delta = result.stacks[1].rotation - result.stacks[0].rotation;
        assert!((delta - TAU / 12.0).abs() < 1e-12);
    }

    #[test]
    fn layout_is_deterministic() {
        let p = params();
        let a = layout(7, Size::new(10.0, 20.0), &p);
        let b = layout(7, Size::new(10.0, 20.0), &p);
        assert_eq!(a, b);
    }

    #[test]
    fn pile_step_tracks_item_height() {
        assert!((pile_step(Size::new(70.0, 100.0), 1.0, 0.02) - 2.0).abs() < 1e-12);
        assert!((pile_step(Size::new(70.0, 200.0), 1.0, 0.02) - 4.0).abs() < 1e-12);
        assert_eq!(pile_step(Size::new(70.0, f64::NAN), 1.0, 0.02), 0.0);
        assert_eq!(pile_step(Size::ZERO, 1.0, 0.02), 0.0);
    }

    #[test]
    fn pile_offsets_stack_upwards() {
        let step = 2.0;
        assert_eq!(pile_offset(0, 3, step), Point::new(0.0, -4.0));
        assert_eq!(pile_offset(1, 3, step), Point::new(0.0, -2.0));
        assert_eq!(pile_offset(2, 3, step), Point::new(0.0, 0.0));
        assert_eq!(pile_offset(0, 1, step), Point::new(0.0, 0.0));
    }

    #[test]
    fn viewport_fit_letterboxes() {
        let fit = ViewportFit::new(Size::new(1280.0, 720.0), Size::new(1280.0, 1440.0));
        assert_eq!(fit.scale, 1.0);
        assert_eq!(fit.offset, Vec2::new(0.0, 360.0));

        let fit = ViewportFit::new(Size::new(1280.0, 720.0), Size::new(640.0, 720.0));
        assert_eq!(fit.scale, 0.5);
        assert_eq!(fit.offset, Vec2::new(0.0, 180.0));
    }

    #[test]
    fn zero_viewport_is_clamped() {
        let fit = ViewportFit::new(Size::new(1280.0, 720.0), Size::ZERO);
        assert!(fit.scale.is_finite() && fit.scale > 0.0);
        assert!(fit.offset.x.is_finite() && fit.offset.y.is_finite());
        assert!(fit.affine().is_finite());
    }
}
