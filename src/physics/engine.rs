use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TetherId(pub u32);

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Initial kinematic state of a new body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDef {
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub angle: f64,
}

/// Solid convex polygon attached to a body. Vertices are in the body's
/// local frame; non-convex input is replaced by its hull.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonShape {
    pub vertices: Vec<Vector2<f64>>,
    pub mass: f64,
    pub friction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TetherKind {
    /// Distance may vary between `min` and the length; slack inside.
    Slide,
    /// Distance held at the length.
    Pin,
}

/// Distance constraint between an anchor on each of two bodies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TetherDef {
    pub kind: TetherKind,
    pub body_a: BodyId,
    pub body_b: BodyId,
    pub anchor_a: Vector2<f64>,
    pub anchor_b: Vector2<f64>,
    /// Lower bound for slide tethers, ignored for pins.
    pub min: f64,
    pub length: f64,
}

/// Read-only view of a body after the last step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySnapshot {
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub angle: f64,
    pub angular_velocity: f64,
    pub mass: f64,
}

// ---------------------------------------------------------------------------
// Engine interface
// ---------------------------------------------------------------------------

/// The narrow surface the flight model needs from a rigid-body engine.
///
/// Operations on removed handles are no-ops (`false` / `None`), never
/// errors: losing a tether mid-flight is a normal state.
pub trait PhysicsWorld {
    fn create_body(&mut self, def: BodyDef) -> BodyId;

    /// Give a body its shape, mass and friction.
    fn attach_polygon(&mut self, body: BodyId, shape: PolygonShape) -> Result<()>;

    fn add_tether(&mut self, def: TetherDef) -> Result<TetherId>;

    /// Update the (maximum or fixed) length. Returns `false` if the tether
    /// no longer exists.
    fn set_tether_length(&mut self, tether: TetherId, length: f64) -> bool;

    fn tether_length(&self, tether: TetherId) -> Option<f64>;

    fn remove_tether(&mut self, tether: TetherId) -> bool;

    fn remove_body(&mut self, body: BodyId) -> bool;

    /// Accumulate a force for the next step.
    fn apply_force_at_world_point(&mut self, body: BodyId, force: Vector2<f64>, point: Vector2<f64>);

    /// Advance by `dt` seconds and clear accumulated forces.
    fn step(&mut self, dt: f64);

    fn body(&self, body: BodyId) -> Option<BodySnapshot>;

    fn local_to_world(&self, body: BodyId, local: Vector2<f64>) -> Option<Vector2<f64>>;
}
