use nalgebra::Vector2;

use super::event::SimEvent;
use crate::control::schedule::TetherLengths;
use crate::physics::engine::BodySnapshot;
use crate::vehicle::wing::WingState;

// ---------------------------------------------------------------------------
// Per-tick record
// ---------------------------------------------------------------------------

/// State after one physics tick. Positions and velocities in metres,
/// forces in world force units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub tick: u64,
    pub time: f64,
    pub wing_position: Vector2<f64>,
    pub wing_velocity: Vector2<f64>,
    pub wing_angle: f64,
    pub pilot_position: Vector2<f64>,
    pub pilot_velocity: Vector2<f64>,
    /// Degrees.
    pub angle_of_attack: Option<f64>,
    pub lift: Vector2<f64>,
    pub drag: Vector2<f64>,
    /// Scripted lengths applied this tick, metres.
    pub lengths: Option<TetherLengths>,
    pub tethers_attached: usize,
    pub thrust: bool,
}

impl Sample {
    pub fn pilot_height(&self) -> f64 {
        self.pilot_position.y
    }

    pub fn pilot_speed(&self) -> f64 {
        self.pilot_velocity.norm()
    }

    /// Every numeric field is finite.
    pub fn is_finite(&self) -> bool {
        let vectors = [
            self.wing_position,
            self.wing_velocity,
            self.pilot_position,
            self.pilot_velocity,
            self.lift,
            self.drag,
        ];
        let lengths = self
            .lengths
            .map_or(true, |l| l.front.is_finite() && l.rear.is_finite() && l.drop.map_or(true, f64::is_finite));
        self.time.is_finite()
            && self.wing_angle.is_finite()
            && self.angle_of_attack.map_or(true, f64::is_finite)
            && vectors.iter().all(|v| v.iter().all(|c| c.is_finite()))
            && lengths
    }
}

/// Everything a headless run produced.
#[derive(Debug, Clone, Default)]
pub struct FlightLog {
    pub samples: Vec<Sample>,
    pub events: Vec<SimEvent>,
}

// ---------------------------------------------------------------------------
// Render read-out
// ---------------------------------------------------------------------------

/// Read-only view for the rendering collaborator. Body states are in
/// world units, the way they are drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tick: u64,
    pub time: f64,
    pub wing: Option<BodySnapshot>,
    pub pilot: Option<BodySnapshot>,
    pub centre: Option<BodySnapshot>,
    pub wing_state: WingState,
    /// Unit vector along the effective chord.
    pub chord: Option<Vector2<f64>>,
    /// Metres above y = 0.
    pub pilot_height: Option<f64>,
    /// World-space endpoints of each attached line.
    pub lines: Vec<[Vector2<f64>; 2]>,
    pub thrust: bool,
    pub paused: bool,
    pub fast_forward: f64,
    pub amplitude: Option<f64>,
}

impl Snapshot {
    pub fn chord_from_angle(angle_of_wing: f64) -> Vector2<f64> {
        Vector2::new(angle_of_wing.cos(), angle_of_wing.sin())
    }
}
