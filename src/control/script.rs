use tracing::trace;

use super::schedule::{LengthSchedule, TetherLengths};
use crate::physics::engine::PhysicsWorld;
use crate::vehicle::assembly::TetherSet;

// ---------------------------------------------------------------------------
// Tether script controller
// ---------------------------------------------------------------------------

/// Steps a [`LengthSchedule`] once per tick and pushes the resulting
/// lengths into whichever tethers are still attached.
pub struct TetherScriptController {
    schedule: Box<dyn LengthSchedule>,
    phase: usize,
    amplitude: f64,
    /// Floor for every scripted length, metres.
    min_length: f64,
    /// World units per metre.
    length_scale: f64,
}

impl TetherScriptController {
    pub fn new(schedule: Box<dyn LengthSchedule>, amplitude: f64, length_scale: f64) -> Self {
        Self {
            schedule,
            phase: 0,
            amplitude: amplitude.max(0.0),
            min_length: 0.0,
            length_scale,
        }
    }

    /// Never write a length below `min_length` metres into the world.
    pub fn with_min_length(mut self, min_length: f64) -> Self {
        self.min_length = min_length.max(0.0);
        self
    }

    pub fn min_length(&self) -> f64 {
        self.min_length
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Primary displacement in metres; never negative.
    pub fn set_amplitude(&mut self, amplitude: f64) {
        self.amplitude = amplitude.max(0.0);
    }

    pub fn schedule_name(&self) -> &str {
        self.schedule.name()
    }

    fn bounded(&self, lengths: TetherLengths) -> TetherLengths {
        // `max` maps NaN to the floor as well.
        let floor = |l: f64| l.max(self.min_length);
        TetherLengths {
            front: floor(lengths.front),
            rear: floor(lengths.rear),
            drop: lengths.drop.map(floor),
        }
    }

    /// Compute this tick's lengths, write them into the world and advance
    /// the phase counter. Removed tethers are skipped. Returns the lengths
    /// in metres, after the minimum-length floor.
    pub fn advance_and_apply(
        &mut self,
        world: &mut dyn PhysicsWorld,
        tethers: &TetherSet,
    ) -> TetherLengths {
        let cycle = self.schedule.cycle_length().max(1);
        let lengths = self.bounded(self.schedule.lengths(self.phase, self.amplitude));
        let scale = self.length_scale;

        if let Some(front) = tethers.front {
            world.set_tether_length(front, lengths.front * scale);
        }
        if let Some(rear) = tethers.rear {
            world.set_tether_length(rear, lengths.rear * scale);
        }
        if let (Some(drop), Some(length)) = (tethers.drop, lengths.drop) {
            world.set_tether_length(drop, length * scale);
        }

        trace!(phase = self.phase, front = lengths.front, rear = lengths.rear, "tether lengths");
        self.phase = (self.phase + 1) % cycle;
        lengths
    }
}

impl std::fmt::Debug for TetherScriptController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TetherScriptController")
            .field("schedule", &self.schedule.name())
            .field("phase", &self.phase)
            .field("amplitude", &self.amplitude)
            .field("min_length", &self.min_length)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::schedule::{WaveformSchedule, WaypointSchedule};
    use crate::physics::engine::{BodyDef, PolygonShape, TetherDef, TetherKind};
    use crate::physics::world::{World2D, WorldSettings};
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    fn rig() -> (World2D, TetherSet) {
        let mut world = World2D::new(WorldSettings { ground: None, ..WorldSettings::default() });
        let mut spawn = |x: f64| {
            let id = world.create_body(BodyDef {
                position: Vector2::new(x, 0.0),
                velocity: Vector2::zeros(),
                angle: 0.0,
            });
            world
                .attach_polygon(
                    id,
                    PolygonShape {
                        vertices: vec![
                            Vector2::new(-1.0, -1.0),
                            Vector2::new(1.0, -1.0),
                            Vector2::new(0.0, 1.0),
                        ],
                        mass: 1.0,
                        friction: 0.7,
                    },
                )
                .unwrap();
            id
        };
        let wing = spawn(0.0);
        let pilot = spawn(10.0);
        let mut tether = |anchor: f64, length: f64| {
            world
                .add_tether(TetherDef {
                    kind: TetherKind::Slide,
                    body_a: wing,
                    body_b: pilot,
                    anchor_a: Vector2::new(anchor, 0.0),
                    anchor_b: Vector2::zeros(),
                    min: 1.0,
                    length,
                })
                .unwrap()
        };
        let front = tether(-0.7, 140.0);
        let rear = tether(1.6, 160.0);
        (world, TetherSet { front: Some(front), rear: Some(rear), drop: None })
    }

    fn three_rows() -> Box<dyn LengthSchedule> {
        Box::new(WaypointSchedule::new(vec![(7.0, 8.0), (7.5, 8.5), (6.5, 7.5)]).unwrap())
    }

    #[test]
    fn waypoint_phase_wraps_at_table_length() {
        let (mut world, tethers) = rig();
        let mut script = TetherScriptController::new(three_rows(), 0.0, 20.0);
        let first = script.advance_and_apply(&mut world, &tethers);
        script.advance_and_apply(&mut world, &tethers);
        script.advance_and_apply(&mut world, &tethers);
        assert_eq!(script.phase(), 0);
        let fourth = script.advance_and_apply(&mut world, &tethers);
        assert_eq!(first, fourth);
        assert_relative_eq!(world.tether_length(tethers.front.unwrap()).unwrap(), 140.0);
        assert_relative_eq!(world.tether_length(tethers.rear.unwrap()).unwrap(), 160.0);
    }

    #[test]
    fn removed_front_tether_is_skipped() {
        let (mut world, mut tethers) = rig();
        let front = tethers.remove_front(&mut world);
        assert!(front);
        let mut script = TetherScriptController::new(three_rows(), 0.0, 20.0);
        script.advance_and_apply(&mut world, &tethers);
        script.advance_and_apply(&mut world, &tethers);
        assert_relative_eq!(world.tether_length(tethers.rear.unwrap()).unwrap(), 8.5 * 20.0);
    }

    #[test]
    fn stale_handle_is_tolerated() {
        let (mut world, tethers) = rig();
        // Removed behind the controller's back.
        world.remove_tether(tethers.front.unwrap());
        let mut script = TetherScriptController::new(three_rows(), 0.0, 20.0);
        let lengths = script.advance_and_apply(&mut world, &tethers);
        assert_eq!(lengths.front, 7.0);
        assert_relative_eq!(world.tether_length(tethers.rear.unwrap()).unwrap(), 160.0);
    }

    #[test]
    fn waveform_amplitude_is_clamped_and_applied() {
        let (mut world, tethers) = rig();
        let schedule = WaveformSchedule { cycle_length: 4, ..WaveformSchedule::default() };
        let mut script = TetherScriptController::new(Box::new(schedule), 0.5, 20.0);
        script.set_amplitude(-1.0);
        assert_eq!(script.amplitude(), 0.0);
        script.set_amplitude(0.5);
        script.advance_and_apply(&mut world, &tethers);
        let quarter = script.advance_and_apply(&mut world, &tethers);
        assert_relative_eq!(quarter.front, 7.5, epsilon = 1e-12);
        assert_relative_eq!(world.tether_length(tethers.front.unwrap()).unwrap(), 150.0, epsilon = 1e-9);
    }

    #[test]
    fn large_amplitude_is_floored_at_min_length() {
        let (mut world, tethers) = rig();
        let schedule = WaveformSchedule { cycle_length: 4, ..WaveformSchedule::default() };
        let mut script =
            TetherScriptController::new(Box::new(schedule), 9.0, 20.0).with_min_length(0.05);
        let mut fronts = Vec::new();
        for _ in 0..8 {
            let lengths = script.advance_and_apply(&mut world, &tethers);
            assert!(lengths.front >= 0.05 && lengths.rear >= 0.05, "{:?}", lengths);
            let applied = world.tether_length(tethers.front.unwrap()).unwrap();
            assert!(applied >= 1.0 - 1e-9, "front written as {}", applied);
            fronts.push(lengths.front);
        }
        // Phase 3 wants 7 - 9 m.
        assert_relative_eq!(fronts[3], 0.05);
        assert_relative_eq!(fronts[1], 16.0, epsilon = 1e-9);
    }
}
