use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use super::waveform::Waveform;
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Line-length strategies
// ---------------------------------------------------------------------------

/// Target line lengths in metres for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TetherLengths {
    pub front: f64,
    pub rear: f64,
    /// Winch drop-line, when the assembly has one.
    pub drop: Option<f64>,
}

/// Source of per-tick line lengths.
///
/// Implement this to drive the lines from anything that can be indexed
/// by a wrapping phase counter.
pub trait LengthSchedule {
    /// Ticks per cycle; the phase counter wraps here. Must be at least 1.
    fn cycle_length(&self) -> usize;

    /// Lengths for `phase` in `0..cycle_length()`. `amplitude` is the
    /// operator-adjustable primary displacement in metres.
    fn lengths(&self, phase: usize, amplitude: f64) -> TetherLengths;

    fn name(&self) -> &str {
        "unnamed"
    }
}

// ---------------------------------------------------------------------------
// Waypoint replay
// ---------------------------------------------------------------------------

/// Replays a pre-authored table of `(front, rear)` lengths, one row per
/// tick.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointSchedule {
    points: Vec<(f64, f64)>,
}

impl WaypointSchedule {
    /// Every length must be positive and finite.
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self, ConfigError> {
        if points.is_empty() {
            return Err(ConfigError::MissingWaypoints);
        }
        let usable = |l: f64| l.is_finite() && l > 0.0;
        if let Some(row) = points.iter().position(|&(f, r)| !(usable(f) && usable(r))) {
            let (front, rear) = points[row];
            return Err(ConfigError::Invalid(format!(
                "waypoint {row} has unusable lengths ({front}, {rear})"
            )));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}

impl LengthSchedule for WaypointSchedule {
    fn cycle_length(&self) -> usize {
        self.points.len()
    }

    fn lengths(&self, phase: usize, _amplitude: f64) -> TetherLengths {
        let (front, rear) = self.points[phase % self.points.len()];
        TetherLengths { front, rear, drop: None }
    }

    fn name(&self) -> &str {
        "waypoints"
    }
}

// ---------------------------------------------------------------------------
// Closed-form waveform
// ---------------------------------------------------------------------------

/// Nominal lengths plus a shared sine displacement and a differential
/// steering signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformSchedule {
    /// Ticks per cycle.
    pub cycle_length: usize,
    /// Nominal front line, metres.
    pub front: f64,
    /// Nominal rear line, metres.
    pub rear: f64,
    pub steering: Waveform,
    /// Steering displacement in metres, added to front and taken off rear.
    pub steering_effect: f64,
    /// Steering phase lead as a fraction of π.
    pub steering_phase: f64,
    /// Nominal winch drop-line, metres.
    pub drop: Option<f64>,
    /// Route the shared displacement to the drop-line instead of the
    /// front and rear lines.
    pub winch_absorbs_primary: bool,
}

impl Default for WaveformSchedule {
    fn default() -> Self {
        Self {
            cycle_length: 240,
            front: 7.0,
            rear: 8.0,
            steering: Waveform::Sine,
            steering_effect: 0.0,
            steering_phase: 0.5,
            drop: None,
            winch_absorbs_primary: false,
        }
    }
}

impl LengthSchedule for WaveformSchedule {
    fn cycle_length(&self) -> usize {
        self.cycle_length.max(1)
    }

    fn lengths(&self, phase: usize, amplitude: f64) -> TetherLengths {
        let angle = TAU * phase as f64 / self.cycle_length() as f64;
        let primary = amplitude * angle.sin();
        let steer = self.steering_effect * self.steering.eval(angle + self.steering_phase * PI);

        match self.drop {
            Some(drop) if self.winch_absorbs_primary => TetherLengths {
                front: self.front + steer,
                rear: self.rear - steer,
                drop: Some(drop + primary),
            },
            drop => TetherLengths {
                front: self.front + primary + steer,
                rear: self.rear + primary - steer,
                drop,
            },
        }
    }

    fn name(&self) -> &str {
        "waveform"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn waypoints_index_with_wrap() {
        let s = WaypointSchedule::new(vec![(7.0, 8.0), (7.1, 8.1), (7.2, 8.2)]).unwrap();
        assert_eq!(s.cycle_length(), 3);
        assert_eq!(s.lengths(1, 0.0).front, 7.1);
        assert_eq!(s.lengths(4, 0.0).rear, 8.1);
        assert_eq!(s.lengths(0, 5.0).drop, None);
    }

    #[test]
    fn empty_waypoints_rejected() {
        assert!(matches!(WaypointSchedule::new(vec![]), Err(ConfigError::MissingWaypoints)));
    }

    #[test]
    fn non_positive_waypoints_rejected() {
        let err = WaypointSchedule::new(vec![(7.0, 8.0), (0.0, 8.0)]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(m) if m.contains("waypoint 1")));
        assert!(WaypointSchedule::new(vec![(7.0, f64::NAN)]).is_err());
    }

    #[test]
    fn primary_moves_both_lines_together() {
        let s = WaveformSchedule { cycle_length: 4, ..WaveformSchedule::default() };
        let quarter = s.lengths(1, 0.5);
        assert_abs_diff_eq!(quarter.front, 7.5, epsilon = 1e-12);
        assert_abs_diff_eq!(quarter.rear, 8.5, epsilon = 1e-12);
        let three_quarter = s.lengths(3, 0.5);
        assert_abs_diff_eq!(three_quarter.front, 6.5, epsilon = 1e-12);
    }

    #[test]
    fn steering_is_differential() {
        let s = WaveformSchedule {
            cycle_length: 4,
            steering: Waveform::Square,
            steering_effect: 0.3,
            steering_phase: 0.0,
            ..WaveformSchedule::default()
        };
        let l = s.lengths(0, 0.0);
        assert_abs_diff_eq!(l.front, 7.3, epsilon = 1e-12);
        assert_abs_diff_eq!(l.rear, 7.7, epsilon = 1e-12);
    }

    #[test]
    fn winch_absorbs_primary() {
        let s = WaveformSchedule {
            cycle_length: 4,
            drop: Some(2.0),
            winch_absorbs_primary: true,
            ..WaveformSchedule::default()
        };
        let l = s.lengths(1, 0.5);
        assert_abs_diff_eq!(l.front, 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(l.rear, 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(l.drop.unwrap(), 2.5, epsilon = 1e-12);

        let passive = WaveformSchedule { winch_absorbs_primary: false, ..s };
        let l = passive.lengths(1, 0.5);
        assert_abs_diff_eq!(l.front, 7.5, epsilon = 1e-12);
        assert_eq!(l.drop, Some(2.0));
    }
}
