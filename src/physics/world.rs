use std::fmt;
use std::num::NonZeroUsize;

use ::nalgebra::Vector2;
use rapier2d::prelude::*;
use tracing::{debug, warn};

use super::engine::{
    BodyDef, BodyId, BodySnapshot, PhysicsWorld, PolygonShape, TetherDef, TetherId, TetherKind,
};
use crate::error::{ConfigError, Result, SimError};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Static ground line `y = height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ground {
    pub height: f64,
    pub friction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldSettings {
    pub gravity: Vector2<f64>,
    /// Solver substeps per step.
    pub iterations: usize,
    /// World units per metre; scales the solver's tolerances.
    pub length_unit: f64,
    pub ground: Option<Ground>,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            gravity: Vector2::new(0.0, -9.8 * 20.0),
            iterations: 10,
            length_unit: 20.0,
            ground: Some(Ground { height: 0.0, friction: 1.0 }),
        }
    }
}

// Bodies only collide with the ground, never with each other.
const GROUND_GROUP: Group = Group::GROUP_1;
const BODY_GROUP: Group = Group::GROUP_2;

const GROUND_HALF_WIDTH: f64 = 1.0e7;
const GROUND_DEPTH: f64 = 1.0e3;

fn to_vector(v: &Vector2<f64>) -> Vector<Real> {
    vector![v.x, v.y]
}

fn to_point(v: &Vector2<f64>) -> Point<Real> {
    point![v.x, v.y]
}

fn from_vector(v: &Vector<Real>) -> Vector2<f64> {
    Vector2::new(v.x, v.y)
}

fn finite(v: &Vector2<f64>) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

/// True if the outline has some extent off the line through its first
/// two distinct vertices.
fn spans_area(vertices: &[Vector2<f64>]) -> bool {
    let Some(origin) = vertices.first() else {
        return false;
    };
    let Some(axis) = vertices.iter().map(|v| v - origin).find(|d| d.norm() > 1e-9) else {
        return false;
    };
    vertices.iter().any(|v| {
        let d = v - origin;
        (axis.x * d.y - axis.y * d.x).abs() > 1e-9 * axis.norm()
    })
}

/// Distance limits of the joint backing a tether.
fn distance_limits(kind: TetherKind, min: f64, length: f64) -> [Real; 2] {
    match kind {
        TetherKind::Slide => [min.min(length), length],
        TetherKind::Pin => [length, length],
    }
}

#[derive(Debug, Clone, Copy)]
struct Tether {
    handle: ImpulseJointHandle,
    kind: TetherKind,
    body_a: BodyId,
    body_b: BodyId,
    min: f64,
    length: f64,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// 2D rigid-body world on rapier. Tethers are rope joints whose distance
/// limits are `[min, length]` for slides and `[length, length]` for pins;
/// the ground is a static box with its top face at the ground height.
pub struct World2D {
    settings: WorldSettings,
    gravity: Vector<Real>,
    parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    handles: Vec<Option<RigidBodyHandle>>,
    tethers: Vec<Option<Tether>>,
    time: f64,
    faults: u64,
}

impl World2D {
    pub fn new(settings: WorldSettings) -> Self {
        let mut parameters = IntegrationParameters::default();
        parameters.num_solver_iterations =
            NonZeroUsize::new(settings.iterations).unwrap_or(NonZeroUsize::MIN);
        parameters.length_unit = settings.length_unit;

        let mut colliders = ColliderSet::new();
        if let Some(ground) = settings.ground {
            colliders.insert(
                ColliderBuilder::cuboid(GROUND_HALF_WIDTH, GROUND_DEPTH)
                    .translation(vector![0.0, ground.height - GROUND_DEPTH])
                    .friction(ground.friction)
                    .friction_combine_rule(CoefficientCombineRule::Multiply)
                    .collision_groups(InteractionGroups::new(GROUND_GROUP, Group::ALL))
                    .build(),
            );
        }

        Self {
            settings,
            gravity: to_vector(&settings.gravity),
            parameters,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders,
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            handles: Vec::new(),
            tethers: Vec::new(),
            time: 0.0,
            faults: 0,
        }
    }

    /// Simulated seconds so far.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    /// Bodies reset after a step left them with a non-finite state.
    pub fn faults(&self) -> u64 {
        self.faults
    }

    fn handle(&self, id: BodyId) -> Option<RigidBodyHandle> {
        self.handles.get(id.0 as usize).copied().flatten()
    }

    fn rigid_body(&self, id: BodyId) -> Option<&RigidBody> {
        self.handle(id).and_then(|h| self.bodies.get(h))
    }

    fn tether(&self, id: TetherId) -> Option<&Tether> {
        self.tethers.get(id.0 as usize).and_then(|t| t.as_ref())
    }

    /// Put back bodies the solver left non-finite and clear every
    /// accumulated force.
    fn settle(&mut self, before: &[(RigidBodyHandle, Isometry<Real>)]) {
        for (handle, position) in before {
            let Some(body) = self.bodies.get_mut(*handle) else {
                continue;
            };
            body.reset_forces(false);

            let ok = body.translation().iter().all(|v| v.is_finite())
                && body.rotation().angle().is_finite()
                && body.linvel().iter().all(|v| v.is_finite())
                && body.angvel().is_finite();
            if !ok {
                body.set_position(*position, false);
                body.set_linvel(vector![0.0, 0.0], false);
                body.set_angvel(0.0, false);
                self.faults += 1;
                warn!(?handle, time = self.time, "non-finite body state reset");
            }
        }
    }
}

impl Default for World2D {
    fn default() -> Self {
        Self::new(WorldSettings::default())
    }
}

impl fmt::Debug for World2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World2D")
            .field("settings", &self.settings)
            .field("bodies", &self.bodies.len())
            .field("tethers", &self.tethers.iter().flatten().count())
            .field("time", &self.time)
            .field("faults", &self.faults)
            .finish()
    }
}

impl PhysicsWorld for World2D {
    fn create_body(&mut self, def: BodyDef) -> BodyId {
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(&def.position))
            .rotation(def.angle)
            .linvel(to_vector(&def.velocity))
            .can_sleep(false)
            .build();
        let id = BodyId(self.handles.len() as u32);
        self.handles.push(Some(self.bodies.insert(body)));
        id
    }

    fn attach_polygon(&mut self, id: BodyId, shape: PolygonShape) -> Result<()> {
        if !(shape.mass > 0.0) {
            return Err(ConfigError::Invalid(format!("body {:?} needs a positive mass", id)).into());
        }
        let handle = self.handle(id).ok_or(SimError::UnknownBody(id))?;
        if !spans_area(&shape.vertices) {
            return Err(SimError::DegeneratePolygon(id));
        }

        let points: Vec<Point<Real>> = shape.vertices.iter().map(to_point).collect();
        let collider = ColliderBuilder::convex_hull(&points)
            .ok_or(SimError::DegeneratePolygon(id))?
            .mass(shape.mass)
            .friction(shape.friction)
            .collision_groups(InteractionGroups::new(BODY_GROUP, GROUND_GROUP))
            .build();
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);

        // The hull's centroid becomes the centre of gravity.
        if let Some(body) = self.bodies.get_mut(handle) {
            body.recompute_mass_properties_from_colliders(&self.colliders);
        }
        Ok(())
    }

    fn add_tether(&mut self, def: TetherDef) -> Result<TetherId> {
        if def.body_a == def.body_b {
            return Err(ConfigError::Invalid("a tether needs two distinct bodies".into()).into());
        }
        let a = self.handle(def.body_a).ok_or(SimError::UnknownBody(def.body_a))?;
        let b = self.handle(def.body_b).ok_or(SimError::UnknownBody(def.body_b))?;

        let mut joint = RopeJointBuilder::new(def.length)
            .local_anchor1(to_point(&def.anchor_a))
            .local_anchor2(to_point(&def.anchor_b))
            .build();
        joint
            .data
            .set_limits(JointAxis::LinX, distance_limits(def.kind, def.min, def.length));
        let handle = self.impulse_joints.insert(a, b, joint, true);

        let id = TetherId(self.tethers.len() as u32);
        self.tethers.push(Some(Tether {
            handle,
            kind: def.kind,
            body_a: def.body_a,
            body_b: def.body_b,
            min: def.min,
            length: def.length,
        }));
        Ok(id)
    }

    fn set_tether_length(&mut self, tether: TetherId, length: f64) -> bool {
        let Some(slot) = self.tethers.get_mut(tether.0 as usize).and_then(|t| t.as_mut()) else {
            return false;
        };
        if !length.is_finite() {
            warn!(?tether, length, "non-finite tether length ignored");
            return true;
        }
        slot.length = length;
        let limits = distance_limits(slot.kind, slot.min, length);
        // At most three lines, so a scan is enough.
        if let Some((_, joint)) = self.impulse_joints.iter_mut().find(|(h, _)| *h == slot.handle) {
            joint.data.set_limits(JointAxis::LinX, limits);
        }
        true
    }

    fn tether_length(&self, tether: TetherId) -> Option<f64> {
        self.tether(tether).map(|t| t.length)
    }

    fn remove_tether(&mut self, tether: TetherId) -> bool {
        match self.tethers.get_mut(tether.0 as usize).and_then(|t| t.take()) {
            Some(slot) => {
                self.impulse_joints.remove(slot.handle, true);
                debug!(?tether, "tether removed from world");
                true
            }
            None => false,
        }
    }

    fn remove_body(&mut self, body: BodyId) -> bool {
        let Some(handle) = self.handles.get_mut(body.0 as usize).and_then(|h| h.take()) else {
            return false;
        };
        // Attached joints go with the body.
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        for slot in &mut self.tethers {
            if slot.is_some_and(|t| t.body_a == body || t.body_b == body) {
                *slot = None;
            }
        }
        debug!(?body, "body removed from world");
        true
    }

    fn apply_force_at_world_point(&mut self, id: BodyId, force: Vector2<f64>, point: Vector2<f64>) {
        if !finite(&force) || !finite(&point) {
            warn!(body = ?id, "non-finite force ignored");
            return;
        }
        let Some(handle) = self.handle(id) else {
            return;
        };
        if let Some(body) = self.bodies.get_mut(handle) {
            body.add_force_at_point(to_vector(&force), to_point(&point), true);
        }
    }

    fn step(&mut self, dt: f64) {
        self.parameters.dt = dt;
        let before: Vec<(RigidBodyHandle, Isometry<Real>)> =
            self.bodies.iter().map(|(h, b)| (h, *b.position())).collect();

        self.pipeline.step(
            &self.gravity,
            &self.parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );

        self.settle(&before);
        self.time += dt;
    }

    fn body(&self, id: BodyId) -> Option<BodySnapshot> {
        self.rigid_body(id).map(|b| BodySnapshot {
            position: from_vector(b.translation()),
            velocity: from_vector(b.linvel()),
            angle: b.rotation().angle(),
            angular_velocity: b.angvel(),
            mass: b.mass(),
        })
    }

    fn local_to_world(&self, id: BodyId, local: Vector2<f64>) -> Option<Vector2<f64>> {
        self.rigid_body(id).map(|b| {
            let p = b.position() * to_point(&local);
            Vector2::new(p.x, p.y)
        })
    }
}
