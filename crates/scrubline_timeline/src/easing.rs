// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves used to blend between neighbouring keyframes.
//!
//! Every shape except [`Easing::None`] is a power curve: `ease_in(t) = t^n`
//! and `ease_out(t) = 1 - (1 - t)^n`. A segment between two keyframes is
//! shaped by the outgoing keyframe's `ease_out` and the incoming keyframe's
//! `ease_in`, combined by [`ease_in_out`].

use serde::{Deserialize, Serialize};

/// Shape of an easing curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Easing {
    /// No motion on this side of the segment
    None,
    /// Straight line
    #[default]
    Linear,
    /// Power of two
    Quadratic,
    /// Power of three
    Cubic,
    /// Power of four
    Quartic,
    /// Power of five
    Quintic,
}

impl Easing {
    /// All shapes, in order of increasing exponent
    pub const ALL: [Easing; 6] = [
        Easing::None,
        Easing::Linear,
        Easing::Quadratic,
        Easing::Cubic,
        Easing::Quartic,
        Easing::Quintic,
    ];

    /// Exponent of the power curve for this shape.
    ///
    /// This is the single place the shape-to-curve mapping lives.
    pub fn exponent(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Linear => 1,
            Self::Quadratic => 2,
            Self::Cubic => 3,
            Self::Quartic => 4,
            Self::Quintic => 5,
        }
    }

    /// Get the display name
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Linear => "Linear",
            Self::Quadratic => "Quadratic",
            Self::Cubic => "Cubic",
            Self::Quartic => "Quartic",
            Self::Quintic => "Quintic",
        }
    }
}

/// Accelerating curve: `t` raised to the shape's exponent
pub fn ease_in(t: f64, shape: Easing) -> f64 {
    t.powi(shape.exponent())
}

/// Decelerating curve, the time-reversal of [`ease_in`]
pub fn ease_out(t: f64, shape: Easing) -> f64 {
    1.0 - ease_in(1.0 - t, shape)
}

/// Combine the outgoing shape of one keyframe with the incoming shape of the next.
///
/// Near `t = 0` the result follows `ease_in(t, start)`, near `t = 1` it
/// follows `ease_out(t, end)`. A `None` side defers entirely to the other
/// side; two `None` sides freeze the segment at its start.
pub fn ease_in_out(t: f64, start: Easing, end: Easing) -> f64 {
    match (start, end) {
        (Easing::None, Easing::None) => 0.0,
        (Easing::None, end) => ease_out(t, end),
        (start, Easing::None) => ease_in(t, start),
        (start, end) => lerp(ease_in(t, start), ease_out(t, end), t),
    }
}

/// Linear interpolation that is exact at both ends
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    (1.0 - t) * from + t * to
}

/// Eased blend between two values across one segment
pub fn blend(t: f64, from: f64, to: f64, start: Easing, end: Easing) -> f64 {
    lerp(from, to, ease_in_out(t, start, end))
}
