use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::info;

use crate::error::ConfigError;

/// Parse a waypoint table: one `front rear` pair (metres) per line,
/// separated by whitespace or a comma. Blank lines and `#` comments are
/// skipped. Line numbers in errors are 1-based.
pub fn parse(text: &str) -> Result<Vec<(f64, f64)>, ConfigError> {
    let mut points = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let fail = |message: String| ConfigError::Waypoint { line: index + 1, message };

        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        if fields.len() != 2 {
            return Err(fail(format!("expected 2 values, found {}", fields.len())));
        }
        let mut pair = [0.0; 2];
        for (slot, field) in pair.iter_mut().zip(&fields) {
            let value: f64 = field
                .parse()
                .map_err(|_| fail(format!("`{field}` is not a number")))?;
            if !value.is_finite() {
                return Err(fail(format!("`{field}` is not finite")));
            }
            if value <= 0.0 {
                return Err(fail(format!("`{field}` is not a positive length")));
            }
            *slot = value;
        }
        points.push((pair[0], pair[1]));
    }

    if points.is_empty() {
        return Err(ConfigError::MissingWaypoints);
    }
    Ok(points)
}

pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<(f64, f64)>, ConfigError> {
    let path = path.as_ref();
    let points = parse(&fs::read_to_string(path)?)?;
    info!(path = %path.display(), rows = points.len(), "loaded waypoints");
    Ok(points)
}

/// Write a table `parse` reads back.
pub fn write<W: Write>(writer: &mut W, points: &[(f64, f64)]) -> io::Result<()> {
    writeln!(writer, "# front rear (metres), one row per tick")?;
    for (front, rear) in points {
        writeln!(writer, "{front} {rear}")?;
    }
    Ok(())
}

pub fn write_file(path: impl AsRef<Path>, points: &[(f64, f64)]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    write(&mut file, points)
}
