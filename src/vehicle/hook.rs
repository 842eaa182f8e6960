use crate::control::input::InputState;
use crate::control::schedule::TetherLengths;
use crate::control::script::TetherScriptController;
use crate::physics::engine::{BodyId, PhysicsWorld};

use super::assembly::TetherSet;

/// Everything a force hook may touch during one tick.
pub struct TickContext<'a> {
    pub world: &'a mut dyn PhysicsWorld,
    pub input: InputState,
    pub tethers: &'a TetherSet,
    /// Present when line lengths are being scripted this run.
    pub script: Option<&'a mut TetherScriptController>,
    /// Filled in by whichever hook drove the script this tick.
    pub applied_lengths: Option<TetherLengths>,
    pub tick: u64,
}

/// Per-tick force application for one body, called before the world
/// steps.
pub trait ForceHook {
    fn apply_force(&mut self, ctx: &mut TickContext<'_>);

    fn body(&self) -> BodyId;

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}
