use nalgebra::Vector2;

use super::hook::{ForceHook, TickContext};
use crate::config::{MassBodyConfig, SimulationConfig};
use crate::physics::aerodynamics;
use crate::physics::engine::BodyId;

// ---------------------------------------------------------------------------
// Point-like bodies hanging under the wing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MassBodyKind {
    Pilot,
    /// Winch / centre-of-mass node between the lines and the pilot.
    CentreNode,
}

/// A body that only feels thrust and parasitic drag.
#[derive(Debug, Clone)]
pub struct MassBody {
    kind: MassBodyKind,
    body: BodyId,
    /// World force units.
    thrust: Option<Vector2<f64>>,
    parasitic_drag: f64,
    length_scale: f64,
}

impl MassBody {
    pub fn new(
        kind: MassBodyKind,
        body: BodyId,
        body_config: &MassBodyConfig,
        config: &SimulationConfig,
    ) -> Self {
        Self {
            kind,
            body,
            thrust: body_config.thrust.map(|t| config.kgf_to_world(t)),
            parasitic_drag: body_config.parasitic_drag,
            length_scale: config.length_scale,
        }
    }

    pub fn kind(&self) -> MassBodyKind {
        self.kind
    }

    /// `-c * v^2` along the velocity, with v in m/s. Zero at rest.
    pub fn parasitic_drag_force(&self, velocity: &Vector2<f64>) -> Vector2<f64> {
        match aerodynamics::airflow(velocity) {
            Some((direction, speed)) if self.parasitic_drag > 0.0 => {
                let v = speed / self.length_scale;
                -direction * (self.parasitic_drag * v * v)
            }
            _ => Vector2::zeros(),
        }
    }
}

impl ForceHook for MassBody {
    fn apply_force(&mut self, ctx: &mut TickContext<'_>) {
        let Some(body) = ctx.world.body(self.body) else {
            return;
        };
        let Some(point) = ctx.world.local_to_world(self.body, Vector2::zeros()) else {
            return;
        };

        let mut force = self.parasitic_drag_force(&body.velocity);
        if let (true, Some(thrust)) = (ctx.input.thrust, self.thrust) {
            force += thrust;
        }
        if force != Vector2::zeros() {
            ctx.world.apply_force_at_world_point(self.body, force, point);
        }
    }

    fn body(&self) -> BodyId {
        self.body
    }

    fn name(&self) -> &str {
        match self.kind {
            MassBodyKind::Pilot => "pilot",
            MassBodyKind::CentreNode => "centre",
        }
    }
}
