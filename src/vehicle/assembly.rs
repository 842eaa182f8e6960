use tracing::{debug, info};

use super::hook::ForceHook;
use super::mass_body::{MassBody, MassBodyKind};
use super::wing::Wing;
use crate::config::{BodyConfig, LineConfig, SimulationConfig};
use crate::error::Result;
use crate::physics::engine::{
    BodyDef, BodyId, PhysicsWorld, PolygonShape, TetherDef, TetherId, TetherKind,
};

// ---------------------------------------------------------------------------
// Tethers
// ---------------------------------------------------------------------------

/// Handles of the lines still attached. `None` once removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TetherSet {
    pub front: Option<TetherId>,
    pub rear: Option<TetherId>,
    pub drop: Option<TetherId>,
}

impl TetherSet {
    /// Detach the front line. Returns `false` if it was already gone.
    pub fn remove_front(&mut self, world: &mut dyn PhysicsWorld) -> bool {
        Self::remove(&mut self.front, world, "front")
    }

    pub fn remove_rear(&mut self, world: &mut dyn PhysicsWorld) -> bool {
        Self::remove(&mut self.rear, world, "rear")
    }

    fn remove(slot: &mut Option<TetherId>, world: &mut dyn PhysicsWorld, which: &str) -> bool {
        match slot.take() {
            Some(id) => {
                world.remove_tether(id);
                info!(tether = which, "tether released");
                true
            }
            None => false,
        }
    }

    pub fn attached(&self) -> usize {
        [self.front, self.rear, self.drop].iter().flatten().count()
    }
}

// ---------------------------------------------------------------------------
// Wing + pilot (+ centre node) assembly
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Assembly {
    pub wing: Wing,
    pub pilot: MassBody,
    pub centre: Option<MassBody>,
    pub tethers: TetherSet,
}

fn spawn(world: &mut dyn PhysicsWorld, body: &BodyConfig, scale: f64) -> Result<BodyId> {
    let id = world.create_body(BodyDef {
        position: body.position * scale,
        velocity: body.velocity * scale,
        angle: body.angle,
    });
    world.attach_polygon(
        id,
        PolygonShape {
            vertices: body.polygon.iter().map(|v| v * scale).collect(),
            mass: body.mass,
            friction: body.friction,
        },
    )?;
    Ok(id)
}

fn line(
    world: &mut dyn PhysicsWorld,
    kind: TetherKind,
    (body_a, body_b): (BodyId, BodyId),
    line: &LineConfig,
    min: f64,
    scale: f64,
) -> Result<TetherId> {
    world.add_tether(TetherDef {
        kind,
        body_a,
        body_b,
        anchor_a: line.anchor_a * scale,
        anchor_b: line.anchor_b * scale,
        min: min * scale,
        length: line.length * scale,
    })
}

impl Assembly {
    /// Create every body and line described by `config` in `world`.
    pub fn build(config: &SimulationConfig, world: &mut dyn PhysicsWorld) -> Result<Self> {
        let scale = config.length_scale;

        let wing_id = spawn(world, &config.wing.body, scale)?;
        let pilot_id = spawn(world, &config.pilot.body, scale)?;
        let wing = Wing::new(wing_id, config);
        let pilot = MassBody::new(MassBodyKind::Pilot, pilot_id, &config.pilot, config);

        let (centre, lower) = match &config.centre {
            Some(centre_config) => {
                let id = spawn(world, &centre_config.body, scale)?;
                let node = MassBody::new(MassBodyKind::CentreNode, id, centre_config, config);
                (Some(node), id)
            }
            None => (None, pilot_id),
        };

        let t = &config.tethers;
        let front = line(world, t.kind, (wing_id, lower), &t.front, t.min, scale)?;
        let rear = line(world, t.kind, (wing_id, lower), &t.rear, t.min, scale)?;
        let drop = match (&t.drop, &centre) {
            (Some(drop), Some(node)) => {
                Some(line(world, TetherKind::Pin, (node.body(), pilot_id), drop, 0.0, scale)?)
            }
            _ => None,
        };

        let tethers = TetherSet { front: Some(front), rear: Some(rear), drop };
        info!(
            centre = centre.is_some(),
            tethers = tethers.attached(),
            kind = ?t.kind,
            "assembly built"
        );
        debug!(?wing_id, ?pilot_id, "body handles");

        Ok(Self { wing, pilot, centre, tethers })
    }
}
