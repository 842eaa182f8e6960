use std::io;
use thiserror::Error;

use crate::physics::engine::BodyId;

/// Startup-time configuration problems. All of these are fatal: the
/// simulation refuses to start rather than run with a bad table.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("curve `{name}` has no samples")]
    EmptyCurve { name: String },

    #[error("curve `{name}` is not strictly increasing in x at sample {index}")]
    UnsortedCurve { name: String, index: usize },

    #[error("curve `{name}` contains a non-finite sample")]
    NonFinite { name: String },

    #[error("waypoint replay selected but no waypoints were supplied")]
    MissingWaypoints,

    #[error("waypoint file line {line}: {message}")]
    Waypoint { line: usize, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown body {0:?}")]
    UnknownBody(BodyId),

    #[error("polygon for body {0:?} is degenerate (zero area)")]
    DegeneratePolygon(BodyId),
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
