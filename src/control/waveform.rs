use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Periodic signal shapes, period 2π, output in [-1, 1]
// ---------------------------------------------------------------------------

/// Gain applied to the sine before clipping in [`flat_top`].
const FLAT_TOP_GAIN: f64 = 2.0;

/// Sine level above which [`one_input`] fires.
const ONE_INPUT_THRESHOLD: f64 = 0.5;

/// Fraction of the cycle, in [0, 1).
fn cycle_fraction(angle: f64) -> f64 {
    angle.rem_euclid(TAU) / TAU
}

pub fn sine(angle: f64) -> f64 {
    angle.sin()
}

/// Triangle in phase with `sine`: 0 at 0, peak 1 at π/2, trough -1 at 3π/2.
pub fn triangle(angle: f64) -> f64 {
    let p = cycle_fraction(angle);
    if p < 0.25 {
        4.0 * p
    } else if p < 0.75 {
        2.0 - 4.0 * p
    } else {
        4.0 * p - 4.0
    }
}

/// Sine overdriven and clipped, so it dwells at ±1.
pub fn flat_top(angle: f64) -> f64 {
    (FLAT_TOP_GAIN * angle.sin()).clamp(-1.0, 1.0)
}

/// +1 for the first half cycle, -1 for the second.
pub fn square(angle: f64) -> f64 {
    if cycle_fraction(angle) < 0.5 {
        1.0
    } else {
        -1.0
    }
}

/// A single one-sided input per cycle: 1 while the sine is above the
/// threshold, otherwise 0.
pub fn one_input(angle: f64) -> f64 {
    if angle.sin() > ONE_INPUT_THRESHOLD {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    FlatTop,
    Square,
    OneInput,
}

impl Waveform {
    pub fn eval(self, angle: f64) -> f64 {
        match self {
            Waveform::Sine => sine(angle),
            Waveform::Triangle => triangle(angle),
            Waveform::FlatTop => flat_top(angle),
            Waveform::Square => square(angle),
            Waveform::OneInput => one_input(angle),
        }
    }
}
