use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::sim::event::EventKind;
use crate::sim::record::FlightLog;

/// Summary statistics computed from a recorded flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightSummary {
    pub ticks: u64,
    pub flight_time: f64,
    /// Pilot height, metres.
    pub max_height: f64,
    pub min_height: f64,
    /// Pilot speed, m/s.
    pub max_speed: f64,
    pub min_angle_of_attack: Option<f64>,
    pub max_angle_of_attack: Option<f64>,
    pub stalls: usize,
    pub touchdown_time: Option<f64>,
    pub touchdown_speed: Option<f64>,
    pub tethers_lost: usize,
    pub final_pilot_position: [f64; 2],
}

impl FlightSummary {
    /// `None` for a log with no samples.
    pub fn from_log(log: &FlightLog) -> Option<Self> {
        let last = log.samples.last()?;

        let heights = log.samples.iter().map(|s| s.pilot_height());
        let max_height = heights.clone().fold(f64::NEG_INFINITY, f64::max);
        let min_height = heights.fold(f64::INFINITY, f64::min);
        let max_speed = log.samples.iter().map(|s| s.pilot_speed()).fold(0.0_f64, f64::max);

        let aoas = log.samples.iter().filter_map(|s| s.angle_of_attack);
        let min_angle_of_attack = aoas.clone().reduce(f64::min);
        let max_angle_of_attack = aoas.reduce(f64::max);

        let mut stalls = 0;
        let mut tethers_lost = 0;
        let mut touchdown = None;
        for event in &log.events {
            match event.kind {
                EventKind::Stall { .. } => stalls += 1,
                EventKind::TetherLost { .. } => tethers_lost += 1,
                EventKind::Touchdown { speed } if touchdown.is_none() => {
                    touchdown = Some((event.time, speed))
                }
                _ => {}
            }
        }

        Some(FlightSummary {
            ticks: last.tick,
            flight_time: last.time,
            max_height,
            min_height,
            max_speed,
            min_angle_of_attack,
            max_angle_of_attack,
            stalls,
            touchdown_time: touchdown.map(|(t, _)| t),
            touchdown_speed: touchdown.map(|(_, v)| v),
            tethers_lost,
            final_pilot_position: [last.pilot_position.x, last.pilot_position.y],
        })
    }
}

/// Write flight summary as pretty JSON to a writer.
pub fn write_summary<W: Write>(writer: &mut W, summary: &FlightSummary) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)?;
    Ok(())
}

/// Write flight summary JSON to a file.
pub fn write_summary_file(path: impl AsRef<Path>, summary: &FlightSummary) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)
}
