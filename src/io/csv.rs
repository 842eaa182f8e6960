use std::io::{self, Write};
use std::path::Path;

use crate::sim::record::Sample;

/// Write trajectory data to CSV format.
///
/// Columns: tick, time, wing_x, wing_y, wing_angle, pilot_x, pilot_y,
///          pilot_vx, pilot_vy, aoa_deg, lift_x, lift_y, drag_x, drag_y,
///          front_len, rear_len, drop_len, tethers, thrust
///
/// Positions in metres. Columns without a value (no airflow yet, no
/// script) are left empty.
pub fn write_trajectory<W: Write>(writer: &mut W, trajectory: &[Sample]) -> io::Result<()> {
    writeln!(
        writer,
        "tick,time,wing_x,wing_y,wing_angle,pilot_x,pilot_y,pilot_vx,pilot_vy,\
         aoa_deg,lift_x,lift_y,drag_x,drag_y,front_len,rear_len,drop_len,tethers,thrust"
    )?;

    let opt = |v: Option<f64>, precision: usize| match v {
        Some(v) => format!("{:.*}", precision, v),
        None => String::new(),
    };

    for s in trajectory {
        let lengths = s.lengths;
        writeln!(
            writer,
            "{},{:.4},{:.4},{:.4},{:.6},{:.4},{:.4},{:.4},{:.4},\
             {},{:.3},{:.3},{:.3},{:.3},{},{},{},{},{}",
            s.tick,
            s.time,
            s.wing_position.x, s.wing_position.y, s.wing_angle,
            s.pilot_position.x, s.pilot_position.y,
            s.pilot_velocity.x, s.pilot_velocity.y,
            opt(s.angle_of_attack, 3),
            s.lift.x, s.lift.y,
            s.drag.x, s.drag.y,
            opt(lengths.map(|l| l.front), 4),
            opt(lengths.map(|l| l.rear), 4),
            opt(lengths.and_then(|l| l.drop), 4),
            s.tethers_attached,
            u8::from(s.thrust),
        )?;
    }

    Ok(())
}

/// Write trajectory to a CSV file at the given path.
pub fn write_trajectory_file(path: impl AsRef<Path>, trajectory: &[Sample]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_trajectory(&mut file, trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::schedule::TetherLengths;
    use nalgebra::Vector2;

    fn sample(tick: u64, lengths: Option<TetherLengths>, aoa: Option<f64>) -> Sample {
        Sample {
            tick,
            time: tick as f64 / 60.0,
            wing_position: Vector2::new(30.0, 75.0),
            wing_velocity: Vector2::zeros(),
            wing_angle: 0.8,
            pilot_position: Vector2::new(35.0, 75.0),
            pilot_velocity: Vector2::new(-10.0, -1.5),
            angle_of_attack: aoa,
            lift: Vector2::zeros(),
            drag: Vector2::zeros(),
            lengths,
            tethers_attached: 2,
            thrust: tick > 0,
        }
    }

    #[test]
    fn csv_output_has_header_and_rows() {
        let traj = vec![
            sample(0, None, None),
            sample(1, Some(TetherLengths { front: 7.0, rear: 8.0, drop: None }), Some(12.5)),
        ];

        let mut buf = Vec::new();
        write_trajectory(&mut buf, &traj).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("tick,time,"));
        assert_eq!(lines.len(), 3); // header + 2 data rows
        let header_cols = lines[0].split(',').count();
        assert!(lines.iter().all(|l| l.split(',').count() == header_cols));

        let first: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(first[9], "");
        assert_eq!(first[18], "0");
        let second: Vec<&str> = lines[2].split(',').collect();
        assert_eq!(second[9], "12.500");
        assert_eq!(second[14], "7.0000");
        assert_eq!(second[16], "");
        assert_eq!(second[18], "1");
    }
}
