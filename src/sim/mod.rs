pub mod event;
pub mod record;
pub mod runner;

pub use event::{EventDetector, EventKind, SimEvent};
pub use record::{FlightLog, Sample, Snapshot};
pub use runner::{run_frames, simulate, FastForward, LoopState, Simulation, SimulationLoop};
