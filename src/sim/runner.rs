use nalgebra::Vector2;
use tracing::{debug, info, warn};

use super::event::{EventDetector, SimEvent, StallDetector, TetherLossDetector, TouchdownDetector};
use super::record::{FlightLog, Sample, Snapshot};
use crate::config::{ScriptConfig, SimulationConfig, StrategyConfig};
use crate::control::input::{InputEvent, InputState, ScheduledInput};
use crate::control::schedule::{LengthSchedule, TetherLengths, WaypointSchedule};
use crate::control::script::TetherScriptController;
use crate::error::{ConfigError, Result};
use crate::io::waypoints;
use crate::physics::engine::{BodyId, PhysicsWorld};
use crate::physics::world::World2D;
use crate::vehicle::assembly::Assembly;
use crate::vehicle::hook::{ForceHook, TickContext};

// ---------------------------------------------------------------------------
// Script construction
// ---------------------------------------------------------------------------

fn build_script(
    script: &ScriptConfig,
    config: &SimulationConfig,
) -> Result<TetherScriptController, ConfigError> {
    let schedule: Box<dyn LengthSchedule> = match &script.strategy {
        StrategyConfig::Waypoints { file: Some(path), .. } => {
            Box::new(WaypointSchedule::new(waypoints::read_file(path)?)?)
        }
        StrategyConfig::Waypoints { file: None, points } => {
            Box::new(WaypointSchedule::new(points.clone())?)
        }
        StrategyConfig::Waveform(waveform) => Box::new(waveform.clone()),
    };
    info!(
        schedule = schedule.name(),
        cycle = schedule.cycle_length(),
        amplitude = script.amplitude,
        "tether script ready"
    );
    Ok(TetherScriptController::new(schedule, script.amplitude, config.length_scale)
        .with_min_length(config.tethers.min))
}

// ---------------------------------------------------------------------------
// Simulation context
// ---------------------------------------------------------------------------

/// One flight: the world, the bodies in it and the line script. Owns
/// everything a tick touches.
#[derive(Debug)]
pub struct Simulation<W: PhysicsWorld = World2D> {
    config: SimulationConfig,
    world: W,
    assembly: Assembly,
    script: Option<TetherScriptController>,
    tick: u64,
    last_lengths: Option<TetherLengths>,
}

impl Simulation<World2D> {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let world = World2D::new(config.world_settings());
        Self::with_world(config, world)
    }
}

impl<W: PhysicsWorld> Simulation<W> {
    /// Build the assembly inside an existing world.
    pub fn with_world(config: SimulationConfig, mut world: W) -> Result<Self> {
        config.validate()?;
        let script = match &config.script {
            Some(script) => Some(build_script(script, &config)?),
            None => None,
        };
        let assembly = Assembly::build(&config, &mut world)?;
        Ok(Self {
            config,
            world,
            assembly,
            script,
            tick: 0,
            last_lengths: None,
        })
    }

    /// Replace the line script, e.g. with a custom [`LengthSchedule`].
    pub fn set_script(&mut self, script: Option<TetherScriptController>) {
        self.script = script;
    }

    /// Run every force hook, then advance the world by one fixed step.
    /// The wing goes first so scripted lengths land before the solver.
    pub fn tick(&mut self, input: InputState) {
        let tethers = self.assembly.tethers;
        let Assembly { wing, pilot, centre, .. } = &mut self.assembly;

        let mut hooks: Vec<&mut dyn ForceHook> = Vec::with_capacity(3);
        hooks.push(wing);
        hooks.push(pilot);
        if let Some(centre) = centre.as_mut() {
            hooks.push(centre);
        }

        let mut ctx = TickContext {
            world: &mut self.world,
            input,
            tethers: &tethers,
            script: self.script.as_mut(),
            applied_lengths: None,
            tick: self.tick,
        };
        for hook in hooks {
            hook.apply_force(&mut ctx);
        }
        let lengths = ctx.applied_lengths;

        self.world.step(self.config.dt());
        self.last_lengths = lengths;
        self.tick += 1;
    }

    pub fn remove_front_tether(&mut self) -> bool {
        self.assembly.tethers.remove_front(&mut self.world)
    }

    pub fn remove_rear_tether(&mut self) -> bool {
        self.assembly.tethers.remove_rear(&mut self.world)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    pub fn script(&self) -> Option<&TetherScriptController> {
        self.script.as_ref()
    }

    pub fn script_mut(&mut self) -> Option<&mut TetherScriptController> {
        self.script.as_mut()
    }

    /// Ticks executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds.
    pub fn time(&self) -> f64 {
        self.tick as f64 * self.config.dt()
    }

    /// Record of the current state. `None` if a body has been removed.
    pub fn sample(&self, input: InputState) -> Option<Sample> {
        let scale = self.config.length_scale;
        let wing = self.world.body(self.assembly.wing.body())?;
        let pilot = self.world.body(self.assembly.pilot.body())?;
        let state = self.assembly.wing.state();
        Some(Sample {
            tick: self.tick,
            time: self.time(),
            wing_position: wing.position / scale,
            wing_velocity: wing.velocity / scale,
            wing_angle: wing.angle,
            pilot_position: pilot.position / scale,
            pilot_velocity: pilot.velocity / scale,
            angle_of_attack: state.angle_of_attack,
            lift: state.lift,
            drag: state.drag,
            lengths: self.last_lengths,
            tethers_attached: self.assembly.tethers.attached(),
            thrust: input.thrust,
        })
    }

    fn line_ends(
        &self,
        upper: BodyId,
        lower: BodyId,
        a: Vector2<f64>,
        b: Vector2<f64>,
    ) -> Option<[Vector2<f64>; 2]> {
        let scale = self.config.length_scale;
        Some([
            self.world.local_to_world(upper, a * scale)?,
            self.world.local_to_world(lower, b * scale)?,
        ])
    }

    /// Render read-out. Pacing fields are filled in by the loop.
    pub fn snapshot(&self, input: InputState) -> Snapshot {
        let wing_id = self.assembly.wing.body();
        let pilot_id = self.assembly.pilot.body();
        let centre_id = self.assembly.centre.as_ref().map(|c| c.body());
        let lower = centre_id.unwrap_or(pilot_id);
        let t = &self.config.tethers;

        let mut lines = Vec::with_capacity(3);
        if self.assembly.tethers.front.is_some() {
            lines.extend(self.line_ends(wing_id, lower, t.front.anchor_a, t.front.anchor_b));
        }
        if self.assembly.tethers.rear.is_some() {
            lines.extend(self.line_ends(wing_id, lower, t.rear.anchor_a, t.rear.anchor_b));
        }
        if let (Some(_), Some(centre), Some(drop)) =
            (self.assembly.tethers.drop, centre_id, &t.drop)
        {
            lines.extend(self.line_ends(centre, pilot_id, drop.anchor_a, drop.anchor_b));
        }

        let pilot = self.world.body(pilot_id);
        let wing_state = *self.assembly.wing.state();
        Snapshot {
            tick: self.tick,
            time: self.time(),
            wing: self.world.body(wing_id),
            pilot,
            centre: centre_id.and_then(|id| self.world.body(id)),
            wing_state,
            chord: wing_state.angle_of_wing.map(Snapshot::chord_from_angle),
            pilot_height: pilot.map(|p| p.position.y / self.config.length_scale),
            lines,
            thrust: input.thrust,
            paused: false,
            fast_forward: self.config.fast_forward,
            amplitude: self.script.as_ref().map(|s| s.amplitude()),
        }
    }
}

// ---------------------------------------------------------------------------
// Frame pacing
// ---------------------------------------------------------------------------

pub const MIN_FAST_FORWARD: f64 = 1.0 / 16.0;
pub const MAX_FAST_FORWARD: f64 = 64.0;

/// Slack when the accumulator is compared against whole ticks, so ten
/// frames at 0.1 make exactly one tick.
const ACCUMULATOR_SLACK: f64 = 1e-9;

/// Turns the fast-forward multiplier into whole ticks per frame. Below 1
/// the fraction accumulates and a single tick runs once it reaches 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FastForward {
    multiplier: f64,
    accumulator: f64,
}

impl FastForward {
    pub fn new(multiplier: f64) -> Self {
        Self {
            multiplier: multiplier.clamp(MIN_FAST_FORWARD, MAX_FAST_FORWARD),
            accumulator: 0.0,
        }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn ticks_for_frame(&mut self) -> u32 {
        self.accumulator += self.multiplier;
        let whole = (self.accumulator + ACCUMULATOR_SLACK).floor();
        self.accumulator -= whole;
        whole as u32
    }

    pub fn faster(&mut self) -> f64 {
        self.multiplier = (self.multiplier * 2.0).min(MAX_FAST_FORWARD);
        self.multiplier
    }

    pub fn slower(&mut self) -> f64 {
        self.multiplier = (self.multiplier / 2.0).max(MIN_FAST_FORWARD);
        self.multiplier
    }
}

// ---------------------------------------------------------------------------
// Simulation loop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Paused,
}

/// Frame-driven driver: applies the frame's input events, then runs the
/// number of ticks the pacing asks for.
pub struct SimulationLoop<W: PhysicsWorld = World2D> {
    sim: Simulation<W>,
    state: LoopState,
    input: InputState,
    pacing: FastForward,
    amplitude_step: f64,
    detectors: Vec<Box<dyn EventDetector>>,
    last: Option<Sample>,
    log: FlightLog,
    record: bool,
}

impl<W: PhysicsWorld> SimulationLoop<W> {
    /// Wrap `sim` with the default detectors. Nothing is recorded until
    /// [`SimulationLoop::recording`] is enabled.
    pub fn new(sim: Simulation<W>) -> Self {
        let config = sim.config();
        let touchdown = config
            .pilot
            .body
            .polygon
            .iter()
            .map(|v| v.norm())
            .fold(0.0, f64::max)
            + config.ground.map_or(0.0, |g| g.height);
        let detectors: Vec<Box<dyn EventDetector>> = vec![
            Box::new(StallDetector::for_curve(&config.wing.lift)),
            Box::new(TouchdownDetector::new(touchdown)),
            Box::new(TetherLossDetector),
        ];
        let pacing = FastForward::new(config.fast_forward);
        let amplitude_step = config.script.as_ref().map_or(0.1, |s| s.amplitude_step);
        let input = InputState::default();
        let last = sim.sample(input);

        Self {
            sim,
            state: LoopState::Running,
            input,
            pacing,
            amplitude_step,
            detectors,
            last,
            log: FlightLog::default(),
            record: false,
        }
    }

    pub fn recording(mut self, record: bool) -> Self {
        self.record = record;
        self
    }

    pub fn add_detector(&mut self, detector: Box<dyn EventDetector>) {
        self.detectors.push(detector);
    }

    pub fn simulation(&self) -> &Simulation<W> {
        &self.sim
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation<W> {
        &mut self.sim
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn input(&self) -> InputState {
        self.input
    }

    pub fn fast_forward(&self) -> f64 {
        self.pacing.multiplier()
    }

    pub fn log(&self) -> &FlightLog {
        &self.log
    }

    pub fn into_log(self) -> FlightLog {
        self.log
    }

    /// Hand over the samples recorded since the last call, leaving the
    /// events in place.
    pub fn take_samples(&mut self) -> Vec<Sample> {
        std::mem::take(&mut self.log.samples)
    }

    /// Run one visible frame. Returns the number of physics ticks executed.
    pub fn frame(&mut self, events: &[InputEvent]) -> u32 {
        for &event in events {
            self.handle(event);
        }
        if self.state == LoopState::Paused {
            return 0;
        }

        let ticks = self.pacing.ticks_for_frame();
        for _ in 0..ticks {
            self.step_tick();
        }
        ticks
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            paused: self.state == LoopState::Paused,
            fast_forward: self.pacing.multiplier(),
            ..self.sim.snapshot(self.input)
        }
    }

    fn step_tick(&mut self) {
        self.sim.tick(self.input);
        let Some(current) = self.sim.sample(self.input) else {
            return;
        };
        if !current.is_finite() {
            warn!(tick = current.tick, "non-finite sample");
        }

        if let Some(prev) = self.last {
            for detector in self.detectors.iter_mut() {
                if let Some(kind) = detector.check(&prev, &current) {
                    info!(tick = current.tick, time = current.time, event = ?kind, "flight event");
                    self.log.events.push(SimEvent {
                        tick: current.tick,
                        time: current.time,
                        kind,
                        sample: current,
                    });
                }
            }
        }
        if self.record {
            self.log.samples.push(current);
        }
        self.last = Some(current);
    }

    fn handle(&mut self, event: InputEvent) {
        if self.input.apply(event) {
            debug!(?event, input = ?self.input, "input changed");
            return;
        }

        match event {
            InputEvent::TogglePause => {
                self.state = match self.state {
                    LoopState::Running => LoopState::Paused,
                    LoopState::Paused => LoopState::Running,
                };
                info!(state = ?self.state, tick = self.sim.tick_count(), "pause toggled");
            }
            InputEvent::RemoveFrontTether => {
                if !self.sim.remove_front_tether() {
                    debug!("front tether already gone");
                }
            }
            InputEvent::RemoveRearTether => {
                if !self.sim.remove_rear_tether() {
                    debug!("rear tether already gone");
                }
            }
            InputEvent::FastForwardUp => {
                info!(multiplier = self.pacing.faster(), "fast-forward");
            }
            InputEvent::FastForwardDown => {
                info!(multiplier = self.pacing.slower(), "fast-forward");
            }
            InputEvent::AmplitudeUp | InputEvent::AmplitudeDown => {
                let step = if event == InputEvent::AmplitudeUp {
                    self.amplitude_step
                } else {
                    -self.amplitude_step
                };
                match self.sim.script_mut() {
                    Some(script) => {
                        script.set_amplitude(script.amplitude() + step);
                        info!(amplitude = script.amplitude(), "amplitude changed");
                    }
                    None => warn!("no tether script to adjust"),
                }
            }
            InputEvent::ToggleThrust | InputEvent::Brake(_) | InputEvent::LetUp(_) => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Headless runs
// ---------------------------------------------------------------------------

/// Run `frames` frames of the built-in world, feeding `inputs` on their
/// frames, and return every sample and event.
pub fn simulate(
    config: SimulationConfig,
    frames: u64,
    inputs: &[ScheduledInput],
) -> Result<FlightLog> {
    let mut sim_loop = SimulationLoop::new(Simulation::new(config)?).recording(true);
    run_frames(&mut sim_loop, frames, inputs);
    Ok(sim_loop.into_log())
}

/// Drive an existing loop. `inputs` need not be sorted.
pub fn run_frames<W: PhysicsWorld>(
    sim_loop: &mut SimulationLoop<W>,
    frames: u64,
    inputs: &[ScheduledInput],
) {
    let mut pending: Vec<ScheduledInput> = inputs.to_vec();
    pending.sort_by_key(|i| i.frame);
    let mut next = 0;

    for frame in 0..frames {
        let start = next;
        while next < pending.len() && pending[next].frame <= frame {
            next += 1;
        }
        let events: Vec<InputEvent> = pending[start..next].iter().map(|i| i.event).collect();
        sim_loop.frame(&events);
    }
    debug!(frames, ticks = sim_loop.simulation().tick_count(), "run finished");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BodyConfig, LineConfig, MassBodyConfig};
    use crate::control::schedule::WaveformSchedule;
    use crate::sim::event::EventKind;

    fn scripted_config() -> SimulationConfig {
        SimulationConfig {
            script: Some(ScriptConfig {
                strategy: StrategyConfig::Waveform(WaveformSchedule {
                    cycle_length: 60,
                    ..WaveformSchedule::default()
                }),
                amplitude: 0.3,
                amplitude_step: 0.1,
            }),
            ..SimulationConfig::default()
        }
    }

    fn assert_finite(log: &FlightLog) {
        if let Some(bad) = log.samples.iter().find(|s| !s.is_finite()) {
            panic!("non-finite sample at tick {}: {:?}", bad.tick, bad);
        }
    }

    fn positions(log: &FlightLog) -> Vec<(Vector2<f64>, Vector2<f64>)> {
        log.samples.iter().map(|s| (s.wing_position, s.pilot_position)).collect()
    }

    #[test]
    fn identical_runs_are_identical() {
        let inputs = [
            ScheduledInput { frame: 20, event: InputEvent::ToggleThrust },
            ScheduledInput { frame: 40, event: InputEvent::Brake(true) },
            ScheduledInput { frame: 70, event: InputEvent::Brake(false) },
        ];
        let a = simulate(scripted_config(), 120, &inputs).unwrap();
        let b = simulate(scripted_config(), 120, &inputs).unwrap();
        assert_eq!(a.samples.len(), 120);
        assert_eq!(a.samples, b.samples);
    }

    #[test]
    fn fast_forward_only_changes_pacing() {
        let slow = simulate(scripted_config(), 90, &[]).unwrap();
        let fast_config = SimulationConfig { fast_forward: 2.0, ..scripted_config() };
        let fast = simulate(fast_config, 45, &[]).unwrap();
        assert_eq!(slow.samples.len(), 90);
        assert_eq!(positions(&slow), positions(&fast));
    }

    #[test]
    fn fractional_fast_forward_skips_frames() {
        let mut pacing = FastForward::new(0.25);
        let ticks: Vec<u32> = (0..8).map(|_| pacing.ticks_for_frame()).collect();
        assert_eq!(ticks, vec![0, 0, 0, 1, 0, 0, 0, 1]);

        let config = SimulationConfig { fast_forward: 0.5, ..SimulationConfig::default() };
        let log = simulate(config, 10, &[]).unwrap();
        assert_eq!(log.samples.len(), 5);
    }

    #[test]
    fn tenth_speed_ticks_every_tenth_frame() {
        let mut pacing = FastForward::new(0.1);
        let ticks: Vec<u32> = (0..100).map(|_| pacing.ticks_for_frame()).collect();
        assert_eq!(ticks[..9], [0; 9]);
        assert_eq!(ticks[9], 1);
        assert_eq!(ticks.iter().sum::<u32>(), 10);
        for (frame, &t) in ticks.iter().enumerate() {
            assert_eq!(t, u32::from(frame % 10 == 9), "frame {}", frame);
        }
    }

    #[test]
    fn default_flight_stays_finite() {
        for config in [SimulationConfig::default(), scripted_config()] {
            let log = simulate(config, 600, &[]).unwrap();
            assert_eq!(log.samples.len(), 600);
            assert_finite(&log);
        }
        let powered = simulate(
            scripted_config(),
            600,
            &[
                ScheduledInput { frame: 0, event: InputEvent::ToggleThrust },
                ScheduledInput { frame: 200, event: InputEvent::Brake(true) },
                ScheduledInput { frame: 260, event: InputEvent::Brake(false) },
            ],
        )
        .unwrap();
        assert_finite(&powered);
    }

    #[test]
    fn runaway_amplitude_keeps_lines_positive() {
        let inputs: Vec<ScheduledInput> = (0..100)
            .map(|frame| ScheduledInput { frame, event: InputEvent::AmplitudeUp })
            .collect();
        let log = simulate(scripted_config(), 240, &inputs).unwrap();
        assert_finite(&log);
        let min = SimulationConfig::default().tethers.min;
        for s in &log.samples {
            let l = s.lengths.unwrap();
            assert!(l.front >= min && l.rear >= min, "tick {}: {:?}", s.tick, l);
        }
    }

    #[test]
    fn taken_samples_are_not_kept() {
        let mut sim_loop =
            SimulationLoop::new(Simulation::new(SimulationConfig::default()).unwrap()).recording(true);
        sim_loop.frame(&[]);
        sim_loop.frame(&[]);
        let taken = sim_loop.take_samples();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[1].tick, 2);
        assert!(sim_loop.log().samples.is_empty());
        sim_loop.frame(&[]);
        assert_eq!(sim_loop.take_samples()[0].tick, 3);
    }

    #[test]
    fn fast_forward_is_clamped() {
        let mut pacing = FastForward::new(1.0);
        for _ in 0..10 {
            pacing.faster();
        }
        assert_eq!(pacing.multiplier(), MAX_FAST_FORWARD);
        for _ in 0..20 {
            pacing.slower();
        }
        assert_eq!(pacing.multiplier(), MIN_FAST_FORWARD);
        assert_eq!(FastForward::new(3.0).ticks_for_frame(), 3);
    }

    #[test]
    fn paused_frames_run_no_ticks() {
        let mut sim_loop = SimulationLoop::new(Simulation::new(SimulationConfig::default()).unwrap());
        assert_eq!(sim_loop.frame(&[]), 1);
        let before = sim_loop.snapshot();
        assert_eq!(sim_loop.frame(&[InputEvent::TogglePause]), 0);
        assert_eq!(sim_loop.frame(&[]), 0);
        let paused = sim_loop.snapshot();
        assert!(paused.paused);
        assert_eq!(paused.pilot, before.pilot);
        assert_eq!(sim_loop.frame(&[InputEvent::TogglePause]), 1);
        assert_eq!(sim_loop.simulation().tick_count(), 2);
    }

    #[test]
    fn tether_removal_mid_flight() {
        let inputs = [
            ScheduledInput { frame: 10, event: InputEvent::RemoveFrontTether },
            ScheduledInput { frame: 12, event: InputEvent::RemoveFrontTether },
            ScheduledInput { frame: 20, event: InputEvent::RemoveRearTether },
        ];
        let log = simulate(scripted_config(), 40, &inputs).unwrap();
        assert_eq!(log.samples.len(), 40);
        assert_eq!(log.samples[5].tethers_attached, 2);
        assert_eq!(log.samples[15].tethers_attached, 1);
        assert_eq!(log.samples[39].tethers_attached, 0);
        let losses: Vec<_> = log
            .events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::TetherLost { .. }))
            .collect();
        assert_eq!(losses.len(), 2);
        assert_finite(&log);
    }

    #[test]
    fn amplitude_events_adjust_script() {
        let mut sim_loop = SimulationLoop::new(Simulation::new(scripted_config()).unwrap());
        sim_loop.frame(&[InputEvent::AmplitudeUp, InputEvent::AmplitudeUp]);
        let amplitude = sim_loop.simulation().script().unwrap().amplitude();
        assert!((amplitude - 0.5).abs() < 1e-12);
        for _ in 0..10 {
            sim_loop.frame(&[InputEvent::AmplitudeDown]);
        }
        assert_eq!(sim_loop.simulation().script().unwrap().amplitude(), 0.0);
    }

    #[test]
    fn scripted_lengths_are_recorded() {
        let log = simulate(scripted_config(), 16, &[]).unwrap();
        let first = log.samples[0].lengths.unwrap();
        assert_eq!(first.front, 7.0);
        assert_eq!(first.rear, 8.0);
        // Quarter cycle: primary at full amplitude
        let quarter = log.samples[15].lengths.unwrap();
        assert!((quarter.front - 7.3).abs() < 1e-12);

        let unscripted = simulate(SimulationConfig::default(), 2, &[]).unwrap();
        assert!(unscripted.samples[0].lengths.is_none());
    }

    #[test]
    fn pilot_thrust_changes_the_flight() {
        let coast = simulate(SimulationConfig::default(), 30, &[]).unwrap();
        let powered = simulate(
            SimulationConfig::default(),
            30,
            &[ScheduledInput { frame: 0, event: InputEvent::ToggleThrust }],
        )
        .unwrap();
        assert!(powered.samples[29].thrust);
        assert!(powered.samples[29].pilot_position.x < coast.samples[29].pilot_position.x);
    }

    #[test]
    fn winch_variant_runs() {
        let mut config = scripted_config();
        config.centre = Some(MassBodyConfig {
            body: BodyConfig { position: Vector2::new(35.0, 77.0), mass: 2.0, ..Default::default() },
            ..Default::default()
        });
        config.tethers.drop = Some(LineConfig {
            anchor_a: Vector2::zeros(),
            anchor_b: Vector2::zeros(),
            length: 2.0,
        });
        let sim_loop = {
            let mut l = SimulationLoop::new(Simulation::new(config).unwrap());
            for _ in 0..30 {
                l.frame(&[]);
            }
            l
        };
        let snapshot = sim_loop.snapshot();
        assert_eq!(snapshot.lines.len(), 3);
        assert!(snapshot.centre.is_some());
        assert!(snapshot.pilot_height.unwrap().is_finite());
    }

    #[test]
    fn ground_landing_is_detected() {
        let mut config = SimulationConfig::default();
        config.wing.body.position.y = 5.0;
        config.pilot.body.position.y = 2.0;
        config.pilot.body.velocity = Vector2::new(0.0, -5.0);
        let log = simulate(config, 120, &[]).unwrap();
        assert!(log.events.iter().any(|e| matches!(e.kind, EventKind::Touchdown { .. })));
        let last = log.samples.last().unwrap();
        assert!(last.pilot_position.y > -0.5);
    }
}
