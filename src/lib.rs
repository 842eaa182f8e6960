pub mod config;
pub mod control;
pub mod error;
pub mod io;
pub mod physics;
pub mod sim;
pub mod vehicle;

pub use config::SimulationConfig;
pub use error::{ConfigError, Result, SimError};
pub use sim::{simulate, Simulation, SimulationLoop};
