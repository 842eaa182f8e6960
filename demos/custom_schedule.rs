//! Drives the lines with a hand-written schedule, then bakes one cycle of
//! it into a waypoint file that `paraglider-sim --waypoints` can replay.

use paraglider_sim::control::{InputEvent, LengthSchedule, TetherLengths, TetherScriptController};
use paraglider_sim::io::waypoints;
use paraglider_sim::sim::run_frames;
use paraglider_sim::{Simulation, SimulationConfig, SimulationLoop};

/// Pulls the rear line in for a short burst once per cycle.
struct RearPump {
    cycle: usize,
    burst: usize,
}

impl LengthSchedule for RearPump {
    fn cycle_length(&self) -> usize {
        self.cycle
    }

    fn lengths(&self, phase: usize, amplitude: f64) -> TetherLengths {
        let pull = if phase < self.burst { amplitude } else { 0.0 };
        TetherLengths { front: 7.0, rear: 8.0 - pull, drop: None }
    }

    fn name(&self) -> &str {
        "rear-pump"
    }
}

fn main() -> paraglider_sim::Result<()> {
    let config = SimulationConfig::default();
    let pump = RearPump { cycle: 120, burst: 20 };

    let table: Vec<(f64, f64)> = (0..pump.cycle_length())
        .map(|phase| {
            let l = pump.lengths(phase, 0.5);
            (l.front, l.rear)
        })
        .collect();
    let path = std::env::temp_dir().join("rear_pump.txt");
    waypoints::write_file(&path, &table)?;

    let mut sim = Simulation::new(config.clone())?;
    sim.set_script(Some(TetherScriptController::new(Box::new(pump), 0.5, config.length_scale)));

    let mut sim_loop = SimulationLoop::new(sim).recording(true);
    sim_loop.frame(&[InputEvent::ToggleThrust]);
    run_frames(&mut sim_loop, 599, &[]);

    let log = sim_loop.log();
    if let Some(last) = log.samples.last() {
        println!(
            "{} ticks, pilot at ({:.1}, {:.1}) m, {} events; waypoints in {}",
            log.samples.len(),
            last.pilot_position.x,
            last.pilot_position.y,
            log.events.len(),
            path.display()
        );
    }
    Ok(())
}
