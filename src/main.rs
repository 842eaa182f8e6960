use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use paraglider_sim::config::{ScriptConfig, StrategyConfig};
use paraglider_sim::control::ScheduledInput;
use paraglider_sim::error::ConfigError;
use paraglider_sim::io::{csv, json};
use paraglider_sim::sim::{EventKind, FlightLog};
use paraglider_sim::{simulate, Result, SimulationConfig};

/// Headless tethered paraglider flight.
#[derive(Parser, Debug)]
#[command(name = "paraglider-sim", version, about)]
struct Args {
    /// YAML configuration; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Replay line lengths from a waypoint file (`front rear` per line).
    #[arg(short, long)]
    waypoints: Option<PathBuf>,

    /// Visible frames to run.
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Physics ticks per frame; fractions run a tick every few frames.
    #[arg(long)]
    fast_forward: Option<f64>,

    /// YAML list of `{ frame, event }` inputs.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write every tick to this CSV file.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write a JSON flight summary to this file.
    #[arg(long)]
    summary: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(path) = &args.waypoints {
        let amplitude = config.script.as_ref().map_or(0.0, |s| s.amplitude);
        let amplitude_step = config.script.as_ref().map_or(0.1, |s| s.amplitude_step);
        config.script = Some(ScriptConfig {
            strategy: StrategyConfig::Waypoints { file: Some(path.clone()), points: Vec::new() },
            amplitude,
            amplitude_step,
        });
    }
    if let Some(ff) = args.fast_forward {
        config.fast_forward = ff;
    }
    config.validate()?;
    Ok(config)
}

fn load_inputs(args: &Args) -> Result<Vec<ScheduledInput>> {
    match &args.input {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            let inputs: Vec<ScheduledInput> =
                serde_yaml::from_str(&text).map_err(ConfigError::from)?;
            info!(path = %path.display(), count = inputs.len(), "loaded scripted inputs");
            Ok(inputs)
        }
        None => Ok(Vec::new()),
    }
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let inputs = load_inputs(args)?;
    let log = simulate(config.clone(), args.frames, &inputs)?;

    if let Some(path) = &args.csv {
        csv::write_trajectory_file(path, &log.samples)?;
        info!(path = %path.display(), rows = log.samples.len(), "trajectory written");
    }
    let summary = json::FlightSummary::from_log(&log);
    if let (Some(path), Some(summary)) = (&args.summary, &summary) {
        json::write_summary_file(path, summary)?;
        info!(path = %path.display(), "summary written");
    }

    print_report(&config, args.frames, &log, summary.as_ref());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn print_report(
    config: &SimulationConfig,
    frames: u64,
    log: &FlightLog,
    summary: Option<&json::FlightSummary>,
) {
    println!();
    println!("====================================================================");
    println!("  TETHERED WING FLIGHT");
    println!("====================================================================");
    println!();
    println!("  Configuration");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Wing mass:     {:>8.1} kg    Pilot mass:   {:>8.1} kg",
        config.wing.body.mass, config.pilot.body.mass
    );
    println!(
        "  Tick:          {:>8.4} s     Fast-forward: {:>8.3}",
        config.dt(),
        config.fast_forward
    );
    println!(
        "  Lines:         {:>8}       Front/rear:   {:>4.1} / {:.1} m",
        format!("{:?}", config.tethers.kind),
        config.tethers.front.length,
        config.tethers.rear.length
    );
    let script = config.script.as_ref().map_or("none", |s| match s.strategy {
        StrategyConfig::Waypoints { .. } => "waypoints",
        StrategyConfig::Waveform(_) => "waveform",
    });
    println!("  Line script:   {:>8}", script);
    println!();

    println!("  Flight Events");
    println!("  ──────────────────────────────────────────────────────────────────");
    if log.events.is_empty() {
        println!("  (none)");
    }
    for event in &log.events {
        let s = &event.sample;
        let what = match &event.kind {
            EventKind::Stall { angle_of_attack } => format!("STALL     aoa={angle_of_attack:>6.1} deg"),
            EventKind::Recovered { angle_of_attack } => {
                format!("RECOVERED aoa={angle_of_attack:>6.1} deg")
            }
            EventKind::Touchdown { speed } => format!("TOUCHDOWN v={speed:>6.1} m/s"),
            EventKind::TetherLost { remaining } => format!("LINE LOST {remaining} left"),
        };
        println!(
            "  t={:>6.2}s  {:<26} pilot=({:>7.1}, {:>6.1}) m",
            event.time, what, s.pilot_position.x, s.pilot_position.y
        );
    }
    println!();

    if let Some(summary) = summary {
        println!("  Performance Summary");
        println!("  ──────────────────────────────────────────────────────────────────");
        println!(
            "  Pilot height:  {:>8.1} m max  {:>8.1} m min",
            summary.max_height, summary.min_height
        );
        println!("  Max speed:     {:>8.1} m/s", summary.max_speed);
        if let (Some(lo), Some(hi)) = (summary.min_angle_of_attack, summary.max_angle_of_attack) {
            println!("  AoA range:     {:>8.1} .. {:.1} deg", lo, hi);
        }
        println!("  Flight time:   {:>8.1} s", summary.flight_time);
        println!();
    }

    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>8}  {:>8}  {:>8}  {:>8}  {:>6}",
        "t (s)", "x (m)", "h (m)", "v (m/s)", "aoa", "lines"
    );
    println!("  {}", "─".repeat(56));

    let interval = (log.samples.len() / 30).max(1);
    for (i, s) in log.samples.iter().enumerate() {
        if i % interval != 0 && i + 1 != log.samples.len() {
            continue;
        }
        let aoa = s.angle_of_attack.map_or("-".to_string(), |a| format!("{a:.1}"));
        println!(
            "  {:>7.2}  {:>8.1}  {:>8.1}  {:>8.1}  {:>8}  {:>6}",
            s.time,
            s.pilot_position.x,
            s.pilot_position.y,
            s.pilot_speed(),
            aoa,
            s.tethers_attached
        );
    }

    println!();
    println!("  Simulation: {} frames, {} ticks", frames, log.samples.len());
    println!("====================================================================");
    println!();
}
