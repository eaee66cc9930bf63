// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pure flight trajectory model.
//!
//! Every function here is deterministic: the same start pose, end pose,
//! progress and shape always produce the same sample. Randomness (the arc
//! height) is drawn once at launch and passed in through [`FlightShape`].

use core::f64::consts::PI;

use kurbo::{Point, Vec2};

use crate::pose::Pose;

/// Per-flight trajectory parameters, fixed at launch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightShape {
    /// Peak upward displacement at mid-flight.
    pub arc_height: f64,
    /// Peak sideways displacement for near-vertical flights.
    pub side_offset: f64,
    /// Extra scale at mid-flight, added to `base_scale`.
    pub lift_scale: f64,
    /// Glow intensity at mid-flight.
    pub glow_peak: f64,
    /// Nominal item scale.
    pub base_scale: f64,
}

/// One evaluated point on a trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightSample {
    /// Scene-space pose.
    pub pose: Pose,
    /// Glow intensity.
    pub glow: f64,
}

/// `sin(t·π)` for `t` in `[0, 1]`, exactly zero at both ends.
#[must_use]
pub fn hump(t: f64) -> f64 {
    if t <= 0.0 || t >= 1.0 || t.is_nan() {
        0.0
    } else {
        libm::sin(t * PI)
    }
}

/// Upward arc displacement at eased progress `t`.
#[must_use]
pub fn arc_offset(t: f64, arc_height: f64) -> f64 {
    arc_height * hump(t)
}

/// Which way a flight bows sideways, as `-1`, `0` or `+1`.
///
/// Flights whose displacement is mostly vertical (`|dx| < |dy| / 2`) bow
/// sideways so they do not pass straight through the pile between them; even
/// sources bow left and odd sources bow right. Other flights do not bow.
#[must_use]
pub fn lateral_sign(displacement: Vec2, source_even: bool) -> f64 {
    if displacement.x.abs() < displacement.y.abs() * 0.5 {
        if source_even { -1.0 } else { 1.0 }
    } else {
        0.0
    }
}

/// Evaluates a trajectory at eased progress `t`.
///
/// Position blends linearly from `start` to `end`, is lifted by the arc and
/// pushed sideways by `side_sign · side_offset`, both scaled by [`hump`].
/// Rotation is the raw linear blend of the two rotations. Scale and glow
/// rise and fall with the same hump.
#[must_use]
pub fn sample(start: Pose, end: Pose, t: f64, shape: &FlightShape, side_sign: f64) -> FlightSample {
    let bump = hump(t);
    let linear = start.position.lerp(end.position, t);
    let position = Point::new(
        linear.x + shape.side_offset * side_sign * bump,
        linear.y - shape.arc_height * bump,
    );
    FlightSample {
        pose: Pose {
            position,
            rotation: start.rotation + (end.rotation - start.rotation) * t,
            scale: shape.base_scale + shape.lift_scale * bump,
        },
        glow: shape.glow_peak * bump,
    }
}
