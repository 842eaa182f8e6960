use std::fs;
use std::path::{Path, PathBuf};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::control::schedule::WaveformSchedule;
use crate::error::ConfigError;
use crate::physics::aerodynamics::{AeroTables, ForceLimits};
use crate::physics::curve::Curve;
use crate::physics::engine::TetherKind;
use crate::physics::world::{Ground, WorldSettings};
use crate::vehicle::presets;

// ---------------------------------------------------------------------------
// Simulation configuration
// ---------------------------------------------------------------------------
//
// Lengths are metres, masses kilograms, thrusts kilogram-force. The world
// itself runs in scaled units (`length_scale` per metre) and the
// aerodynamic constants are expressed directly in world force units.

/// Standard gravity used to turn kilogram-force into newtons.
pub const KGF: f64 = 9.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// m/s^2, pointing down.
    pub gravity: f64,
    /// World units per metre.
    pub length_scale: f64,
    /// Physics ticks per simulated second.
    pub tick_rate: f64,
    /// Ticks per frame; below 1 means some frames run no tick.
    pub fast_forward: f64,
    pub ground: Option<GroundConfig>,
    pub solver_iterations: usize,
    pub wing: WingConfig,
    pub pilot: MassBodyConfig,
    /// Winch / centre-of-mass node between the lines and the pilot.
    pub centre: Option<MassBodyConfig>,
    pub tethers: TetherConfig,
    pub script: Option<ScriptConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: KGF,
            length_scale: 20.0,
            tick_rate: 60.0,
            fast_forward: 1.0,
            ground: Some(GroundConfig::default()),
            solver_iterations: 10,
            wing: WingConfig::default(),
            pilot: MassBodyConfig::pilot(),
            centre: None,
            tethers: TetherConfig::default(),
            script: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub height: f64,
    pub friction: f64,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self { height: 0.0, friction: 1.0 }
    }
}

/// Starting state and shape of one rigid body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    pub angle: f64,
    pub mass: f64,
    pub friction: f64,
    /// Body-local outline, metres.
    pub polygon: Vec<Vector2<f64>>,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            position: Vector2::zeros(),
            velocity: Vector2::zeros(),
            angle: 0.0,
            mass: 1.0,
            friction: 0.7,
            polygon: presets::node_polygon(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WingConfig {
    pub body: BodyConfig,
    /// Radians between body angle and chord line.
    pub rigging_offset: f64,
    /// Radians of pitch change while brake or let-up is held.
    pub brake_angle: f64,
    /// World force units per (m/s)^2 per unit coefficient.
    pub lift_scale: f64,
    pub lift: Curve,
    pub drag: Curve,
    /// Centre of pressure along the chord, metres, by angle of attack.
    pub pressure: Curve,
    /// Force saturation, world force units. `null` disables clamping.
    pub force_limits: Option<ForceLimits>,
    /// Auxiliary thrust applied while thrust is on, kilogram-force.
    pub thrust: Option<Vector2<f64>>,
}

impl Default for WingConfig {
    fn default() -> Self {
        Self {
            body: BodyConfig {
                position: Vector2::new(30.0, 75.0),
                velocity: Vector2::zeros(),
                angle: 0.8,
                mass: 4.0,
                friction: 0.7,
                polygon: presets::wing_polygon(),
            },
            rigging_offset: 3.4,
            brake_angle: 0.1,
            lift_scale: 140.0,
            lift: presets::lift_curve(),
            drag: presets::drag_curve(),
            pressure: Curve::constant(0.0),
            force_limits: Some(ForceLimits { lift_max: 30_000.0, drag_max: 10_000.0 }),
            thrust: None,
        }
    }
}

impl WingConfig {
    pub fn tables(&self) -> AeroTables {
        AeroTables {
            lift: self.lift.clone(),
            drag: self.drag.clone(),
            pressure: self.pressure.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassBodyConfig {
    pub body: BodyConfig,
    /// Applied while thrust is on, kilogram-force.
    pub thrust: Option<Vector2<f64>>,
    /// Parasitic drag, world force units per (m/s)^2.
    pub parasitic_drag: f64,
}

impl Default for MassBodyConfig {
    fn default() -> Self {
        Self {
            body: BodyConfig::default(),
            thrust: None,
            parasitic_drag: 0.0,
        }
    }
}

impl MassBodyConfig {
    /// 90 kg pilot launched forward and slightly down, 20 kgf motor.
    pub fn pilot() -> Self {
        Self {
            body: BodyConfig {
                position: Vector2::new(35.0, 75.0),
                velocity: Vector2::new(-10.0, -1.5),
                angle: 0.0,
                mass: 90.0,
                friction: 0.7,
                polygon: presets::pilot_polygon(),
            },
            thrust: Some(Vector2::new(-20.0, 0.0)),
            parasitic_drag: 0.0,
        }
    }
}

/// One line: anchor on the upper body (wing, or centre node for the
/// drop-line) and on the lower body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineConfig {
    pub anchor_a: Vector2<f64>,
    pub anchor_b: Vector2<f64>,
    pub length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TetherConfig {
    pub kind: TetherKind,
    /// Minimum length of slide tethers, metres.
    pub min: f64,
    pub front: LineConfig,
    pub rear: LineConfig,
    /// Winch drop-line from the centre node to the pilot. Always a pin.
    pub drop: Option<LineConfig>,
}

impl Default for TetherConfig {
    fn default() -> Self {
        Self {
            kind: TetherKind::Slide,
            min: 0.05,
            front: LineConfig {
                anchor_a: Vector2::new(-0.7, 0.0),
                anchor_b: Vector2::zeros(),
                length: 7.0,
            },
            rear: LineConfig {
                anchor_a: Vector2::new(1.6, 0.0),
                anchor_b: Vector2::zeros(),
                length: 8.0,
            },
            drop: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Replay `(front, rear)` rows, inline or from a waypoint file.
    Waypoints {
        #[serde(default)]
        file: Option<PathBuf>,
        #[serde(default)]
        points: Vec<(f64, f64)>,
    },
    Waveform(WaveformSchedule),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptConfig {
    pub strategy: StrategyConfig,
    /// Initial primary displacement, metres.
    #[serde(default)]
    pub amplitude: f64,
    /// Change per amplitude up/down event, metres.
    #[serde(default = "default_amplitude_step")]
    pub amplitude_step: f64,
}

fn default_amplitude_step() -> f64 {
    0.1
}

impl SimulationConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        info!(path = %path.display(), "loaded simulation config");
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Fixed physics timestep, seconds.
    pub fn dt(&self) -> f64 {
        1.0 / self.tick_rate
    }

    /// Gravity in world units.
    pub fn gravity_world(&self) -> Vector2<f64> {
        Vector2::new(0.0, -self.gravity * self.length_scale)
    }

    /// Settings for the built-in world, in world units.
    pub fn world_settings(&self) -> WorldSettings {
        WorldSettings {
            gravity: self.gravity_world(),
            iterations: self.solver_iterations,
            length_unit: self.length_scale,
            ground: self.ground.map(|g| Ground {
                height: g.height * self.length_scale,
                friction: g.friction,
            }),
        }
    }

    /// Kilogram-force to world force units.
    pub fn kgf_to_world(&self, kgf: Vector2<f64>) -> Vector2<f64> {
        kgf * KGF * self.length_scale
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {v}")))
            }
        };

        positive("length_scale", self.length_scale)?;
        positive("tick_rate", self.tick_rate)?;
        positive("fast_forward", self.fast_forward)?;
        positive("wing.lift_scale", self.wing.lift_scale)?;
        positive("tethers.front.length", self.tethers.front.length)?;
        positive("tethers.rear.length", self.tethers.rear.length)?;
        if !self.gravity.is_finite() {
            return Err(ConfigError::Invalid("gravity must be finite".into()));
        }
        if !(self.tethers.min.is_finite() && self.tethers.min >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "tethers.min must be finite and >= 0, got {}",
                self.tethers.min
            )));
        }

        let mut bodies = vec![("wing", &self.wing.body), ("pilot", &self.pilot.body)];
        if let Some(centre) = &self.centre {
            bodies.push(("centre", &centre.body));
        }
        for (name, body) in bodies {
            positive(&format!("{name}.mass"), body.mass)?;
            if body.polygon.len() < 3 {
                return Err(ConfigError::Invalid(format!(
                    "{name}.polygon needs at least 3 vertices"
                )));
            }
        }

        if let Some(limits) = &self.wing.force_limits {
            positive("wing.force_limits.lift_max", limits.lift_max)?;
            positive("wing.force_limits.drag_max", limits.drag_max)?;
        }

        match (&self.centre, &self.tethers.drop) {
            (Some(_), None) => {
                return Err(ConfigError::Invalid("a centre node needs tethers.drop".into()))
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid("tethers.drop needs a centre node".into()))
            }
            (Some(_), Some(drop)) => positive("tethers.drop.length", drop.length)?,
            (None, None) => {}
        }

        if let Some(script) = &self.script {
            if !(script.amplitude.is_finite() && script.amplitude >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "script.amplitude must be finite and >= 0, got {}",
                    script.amplitude
                )));
            }
            if !script.amplitude_step.is_finite() {
                return Err(ConfigError::Invalid("script.amplitude_step must be finite".into()));
            }
            match &script.strategy {
                StrategyConfig::Waypoints { file: None, points } if points.is_empty() => {
                    return Err(ConfigError::MissingWaypoints);
                }
                StrategyConfig::Waypoints { points, .. } => {
                    for (row, &(front, rear)) in points.iter().enumerate() {
                        positive(&format!("waypoint {row} front"), front)?;
                        positive(&format!("waypoint {row} rear"), rear)?;
                    }
                }
                StrategyConfig::Waveform(w) => {
                    if w.cycle_length == 0 {
                        return Err(ConfigError::Invalid(
                            "waveform cycle_length must be >= 1".into(),
                        ));
                    }
                    positive("waveform.front", w.front)?;
                    positive("waveform.rear", w.rear)?;
                    if let Some(drop) = w.drop {
                        positive("waveform.drop", drop)?;
                    }
                    if !(w.steering_effect.is_finite() && w.steering_phase.is_finite()) {
                        return Err(ConfigError::Invalid(
                            "waveform steering must be finite".into(),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}
