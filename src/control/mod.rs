pub mod input;
pub mod schedule;
pub mod script;
pub mod waveform;

pub use input::{InputEvent, InputState, ScheduledInput};
pub use schedule::{LengthSchedule, TetherLengths, WaveformSchedule, WaypointSchedule};
pub use script::TetherScriptController;
pub use waveform::Waveform;
