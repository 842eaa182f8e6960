pub mod assembly;
pub mod hook;
pub mod mass_body;
pub mod presets;
pub mod wing;

pub use assembly::{Assembly, TetherSet};
pub use hook::{ForceHook, TickContext};
pub use mass_body::{MassBody, MassBodyKind};
pub use wing::{Wing, WingState};
