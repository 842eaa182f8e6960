pub mod aerodynamics;
pub mod curve;
pub mod engine;
pub mod world;

pub use aerodynamics::{AeroForces, AeroTables, ForceLimits};
pub use curve::Curve;
pub use engine::{
    BodyDef, BodyId, BodySnapshot, PhysicsWorld, PolygonShape, TetherDef, TetherId, TetherKind,
};
pub use world::{Ground, World2D, WorldSettings};
