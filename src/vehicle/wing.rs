use nalgebra::Vector2;
use tracing::trace;

use super::hook::{ForceHook, TickContext};
use crate::config::SimulationConfig;
use crate::physics::aerodynamics::{self, AeroTables, ForceLimits};
use crate::physics::engine::BodyId;

// ---------------------------------------------------------------------------
// Aerodynamic surface
// ---------------------------------------------------------------------------

/// Last computed aerodynamic state, for display.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WingState {
    /// Degrees. `None` until the wing first sees airflow.
    pub angle_of_attack: Option<f64>,
    /// Chord angle after rigging offset and brake, radians.
    pub angle_of_wing: Option<f64>,
    pub lift: Vector2<f64>,
    pub drag: Vector2<f64>,
    /// Metres along the chord.
    pub pressure_pos: f64,
    pub brake: bool,
    pub let_up: bool,
}

#[derive(Debug, Clone)]
pub struct Wing {
    body: BodyId,
    tables: AeroTables,
    lift_scale: f64,
    rigging_offset: f64,
    brake_angle: f64,
    limits: Option<ForceLimits>,
    /// World force units.
    thrust: Option<Vector2<f64>>,
    length_scale: f64,
    state: WingState,
}

impl Wing {
    pub fn new(body: BodyId, config: &SimulationConfig) -> Self {
        let wing = &config.wing;
        Self {
            body,
            tables: wing.tables(),
            lift_scale: wing.lift_scale,
            rigging_offset: wing.rigging_offset,
            brake_angle: wing.brake_angle,
            limits: wing.force_limits,
            thrust: wing.thrust.map(|t| config.kgf_to_world(t)),
            length_scale: config.length_scale,
            state: WingState::default(),
        }
    }

    pub fn state(&self) -> &WingState {
        &self.state
    }
}

impl ForceHook for Wing {
    fn apply_force(&mut self, ctx: &mut TickContext<'_>) {
        if let Some(body) = ctx.world.body(self.body) {
            let angle_of_wing =
                body.angle - self.rigging_offset + ctx.input.pitch_adjustment(self.brake_angle);
            self.state.angle_of_wing = Some(angle_of_wing);
            self.state.brake = ctx.input.brake;
            self.state.let_up = ctx.input.let_up && !ctx.input.brake;

            let forces = aerodynamics::evaluate(
                &self.tables,
                self.lift_scale,
                &body.velocity,
                self.length_scale,
                angle_of_wing,
                self.limits.as_ref(),
            );

            match forces {
                Some(f) => {
                    self.state.angle_of_attack = Some(f.angle_of_attack);
                    self.state.lift = f.lift;
                    self.state.drag = f.drag;
                    self.state.pressure_pos = f.pressure_pos;
                    let local = Vector2::new(f.pressure_pos * self.length_scale, 0.0);
                    if let Some(point) = ctx.world.local_to_world(self.body, local) {
                        ctx.world.apply_force_at_world_point(self.body, f.total(), point);
                    }
                    trace!(tick = ctx.tick, aoa = f.angle_of_attack, "wing forces");
                }
                None => {
                    // At rest: no airflow, no force.
                    self.state.lift = Vector2::zeros();
                    self.state.drag = Vector2::zeros();
                }
            }

            if let (true, Some(thrust)) = (ctx.input.thrust, self.thrust) {
                if let Some(point) = ctx.world.local_to_world(self.body, Vector2::zeros()) {
                    ctx.world.apply_force_at_world_point(self.body, thrust, point);
                }
            }
        }

        if let Some(script) = ctx.script.as_deref_mut() {
            ctx.applied_lengths = Some(script.advance_and_apply(&mut *ctx.world, ctx.tethers));
        }
    }

    fn body(&self) -> BodyId {
        self.body
    }

    fn name(&self) -> &str {
        "wing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::input::InputState;
    use crate::physics::engine::{BodyDef, PhysicsWorld, PolygonShape};
    use crate::physics::world::{World2D, WorldSettings};
    use crate::vehicle::assembly::TetherSet;
    use crate::vehicle::presets;
    use approx::assert_abs_diff_eq;

    fn world_with_wing(velocity: Vector2<f64>, angle: f64) -> (World2D, Wing) {
        let config = SimulationConfig::default();
        let mut world = World2D::new(WorldSettings {
            gravity: Vector2::zeros(),
            ground: None,
            ..WorldSettings::default()
        });
        let id = world.create_body(BodyDef { position: Vector2::zeros(), velocity, angle });
        world
            .attach_polygon(
                id,
                PolygonShape {
                    vertices: presets::wing_polygon().iter().map(|v| v * 20.0).collect(),
                    mass: 4.0,
                    friction: 0.7,
                },
            )
            .unwrap();
        (world, Wing::new(id, &config))
    }

    fn tick(world: &mut World2D, wing: &mut Wing, input: InputState) {
        let tethers = TetherSet::default();
        let mut ctx = TickContext {
            world,
            input,
            tethers: &tethers,
            script: None,
            applied_lengths: None,
            tick: 0,
        };
        wing.apply_force(&mut ctx);
    }

    #[test]
    fn zero_velocity_applies_no_force() {
        let (mut world, mut wing) = world_with_wing(Vector2::zeros(), 0.8);
        tick(&mut world, &mut wing, InputState::default());
        assert_eq!(wing.state().angle_of_attack, None);
        assert_eq!(wing.state().lift, Vector2::zeros());
        world.step(1.0 / 60.0);
        let s = world.body(wing.body()).unwrap();
        assert_eq!(s.velocity, Vector2::zeros());
        assert_eq!(s.angular_velocity, 0.0);
    }

    #[test]
    fn level_flight_at_zero_aoa() {
        // Chord along -x, flying along -x.
        let (mut world, mut wing) = world_with_wing(Vector2::new(-200.0, 0.0), 3.4 + std::f64::consts::PI);
        tick(&mut world, &mut wing, InputState::default());
        let state = wing.state();
        assert_abs_diff_eq!(state.angle_of_attack.unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(state.lift.y, 140.0 * 100.0 * 0.42, epsilon = 1e-6);
        assert!(state.drag.x > 0.0);
    }

    #[test]
    fn brake_raises_angle_of_attack() {
        let (mut world, mut wing) = world_with_wing(Vector2::new(-200.0, 0.0), 3.4 + std::f64::consts::PI);
        let input = InputState { brake: true, let_up: true, ..InputState::default() };
        tick(&mut world, &mut wing, input);
        let aoa = wing.state().angle_of_attack.unwrap();
        assert_abs_diff_eq!(aoa, 0.1_f64.to_degrees(), epsilon = 1e-9);
        assert!(wing.state().brake);
        assert!(!wing.state().let_up);
    }
}
