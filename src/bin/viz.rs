use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints, Points};

use paraglider_sim::control::InputEvent;
use paraglider_sim::sim::{Sample, SimulationLoop};
use paraglider_sim::{Simulation, SimulationConfig};

/// Visible frames per wall-clock second.
const FRAME_RATE: f64 = 60.0;
/// Most frames run in one repaint after a stall.
const MAX_CATCH_UP: u32 = 4;
/// Ticks of history kept for the plots.
const HISTORY: usize = 60 * 120;

/// Interactive viewer: flies the assembly live and plots its history.
#[derive(Parser, Debug)]
#[command(name = "paraglider-viz", version)]
struct Args {
    /// YAML configuration; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    let sim_loop = SimulationLoop::new(Simulation::new(config)?).recording(true);

    let app = FlightViz {
        sim_loop,
        history: VecDeque::with_capacity(HISTORY),
        pending: Vec::new(),
        last_update: Instant::now(),
        frame_budget: 0.0,
        brake: false,
        let_up: false,
    };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Paraglider Flight Simulator", options, Box::new(|_| Ok(Box::new(app))))?;
    Ok(())
}

struct FlightViz {
    sim_loop: SimulationLoop,
    history: VecDeque<Sample>,
    /// Input waiting for the next frame to run.
    pending: Vec<InputEvent>,
    last_update: Instant,
    /// Frames owed to the wall clock.
    frame_budget: f64,
    brake: bool,
    let_up: bool,
}

impl FlightViz {
    /// Run as many frames as wall-clock time allows. Input goes to the
    /// first of them.
    fn advance(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.last_update = now;
        self.frame_budget = (self.frame_budget + elapsed * FRAME_RATE).min(f64::from(MAX_CATCH_UP));

        while self.frame_budget >= 1.0 {
            self.frame_budget -= 1.0;
            let events = std::mem::take(&mut self.pending);
            self.sim_loop.frame(&events);
        }

        for sample in self.sim_loop.take_samples() {
            if self.history.len() == HISTORY {
                self.history.pop_front();
            }
            self.history.push_back(sample);
        }
    }

    fn collect_input(&mut self, ctx: &egui::Context) -> Vec<InputEvent> {
        use egui::Key;

        let mut events = Vec::new();
        ctx.input(|i| {
            let pressed = [
                (Key::P, InputEvent::TogglePause),
                (Key::T, InputEvent::ToggleThrust),
                (Key::F, InputEvent::RemoveFrontTether),
                (Key::R, InputEvent::RemoveRearTether),
                (Key::Plus, InputEvent::FastForwardUp),
                (Key::Minus, InputEvent::FastForwardDown),
                (Key::ArrowUp, InputEvent::AmplitudeUp),
                (Key::ArrowDown, InputEvent::AmplitudeDown),
            ];
            for (key, event) in pressed {
                if i.key_pressed(key) {
                    events.push(event);
                }
            }

            let brake = i.key_down(Key::B);
            if brake != self.brake {
                self.brake = brake;
                events.push(InputEvent::Brake(brake));
            }
            let let_up = i.key_down(Key::U);
            if let_up != self.let_up {
                self.let_up = let_up;
                events.push(InputEvent::LetUp(let_up));
            }
        });
        events
    }
}

fn series(samples: &[&Sample], f: impl Fn(&Sample) -> Option<f64>) -> Vec<[f64; 2]> {
    samples
        .iter()
        .filter_map(|s| f(s).map(|y| [s.time, y]))
        .collect()
}

impl eframe::App for FlightViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let events = self.collect_input(ctx);
        self.pending.extend(events);
        self.advance();
        let snapshot = self.sim_loop.snapshot();

        let step = (self.history.len() / 2000).max(1);
        let sampled: Vec<&Sample> = self.history.iter().step_by(step).collect();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(if snapshot.paused { "Flight (paused)" } else { "Flight" });
            ui.label(format!(
                "t = {:.1} s  |  height {:.1} m  |  AoA {}  |  thrust {}  |  x{}  |  amplitude {}",
                snapshot.time,
                snapshot.pilot_height.unwrap_or(f64::NAN),
                snapshot
                    .wing_state
                    .angle_of_attack
                    .map_or("-".to_string(), |a| format!("{a:.1} deg")),
                if snapshot.thrust { "on" } else { "off" },
                snapshot.fast_forward,
                snapshot.amplitude.map_or("-".to_string(), |a| format!("{a:.2} m")),
            ));
            ui.label("P pause  T thrust  B brake  U let-up  F/R release line  +/- speed  Up/Down amplitude");
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let half_h = available.y / 2.0 - 8.0;

            ui.horizontal(|ui| {
                // Current assembly, world units
                ui.vertical(|ui| {
                    ui.label("Assembly");
                    Plot::new("assembly")
                        .width(half_w)
                        .height(half_h)
                        .data_aspect(1.0)
                        .show(ui, |plot_ui| {
                            for (n, [a, b]) in snapshot.lines.iter().enumerate() {
                                let points: PlotPoints = vec![[a.x, a.y], [b.x, b.y]].into();
                                plot_ui.line(Line::new(format!("line {n}"), points));
                            }
                            let bodies: PlotPoints = [snapshot.wing, snapshot.pilot, snapshot.centre]
                                .iter()
                                .flatten()
                                .map(|b| [b.position.x, b.position.y])
                                .collect();
                            plot_ui.points(Points::new("bodies", bodies).radius(4.0));
                        });
                });

                // Flight path
                ui.vertical(|ui| {
                    ui.label("Flight path (m)");
                    let pilot: PlotPoints = sampled
                        .iter()
                        .map(|s| [s.pilot_position.x, s.pilot_position.y])
                        .collect();
                    let wing: PlotPoints = sampled
                        .iter()
                        .map(|s| [s.wing_position.x, s.wing_position.y])
                        .collect();
                    Plot::new("path")
                        .width(half_w)
                        .height(half_h)
                        .data_aspect(1.0)
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Pilot", pilot));
                            plot_ui.line(Line::new("Wing", wing));
                        });
                });
            });

            ui.horizontal(|ui| {
                // Angle of attack vs Time
                ui.vertical(|ui| {
                    ui.label("Angle of attack (deg)");
                    let points: PlotPoints = series(&sampled, |s| s.angle_of_attack).into();
                    Plot::new("aoa")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("AoA", points));
                        });
                });

                // Line lengths vs Time
                ui.vertical(|ui| {
                    ui.label("Scripted line lengths (m)");
                    let front: PlotPoints = series(&sampled, |s| s.lengths.map(|l| l.front)).into();
                    let rear: PlotPoints = series(&sampled, |s| s.lengths.map(|l| l.rear)).into();
                    Plot::new("lengths")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Front", front));
                            plot_ui.line(Line::new("Rear", rear));
                        });
                });
            });
        });

        ctx.request_repaint_after(Duration::from_secs_f64(1.0 / FRAME_RATE));
    }
}
