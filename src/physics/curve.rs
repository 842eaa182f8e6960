use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Piecewise-linear lookup table
// ---------------------------------------------------------------------------

/// Ordered (x, y) samples, strictly increasing in x.
///
/// Between samples the value is linearly interpolated; outside the sampled
/// range the nearest end value is held (flat extrapolation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct Curve {
    points: Vec<(f64, f64)>,
}

impl Curve {
    /// Build a curve, rejecting empty, non-finite or unsorted tables.
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self, ConfigError> {
        Self::named("curve", points)
    }

    /// Same as [`Curve::new`] but reports `name` in the error.
    pub fn named(name: &str, points: Vec<(f64, f64)>) -> Result<Self, ConfigError> {
        if points.is_empty() {
            return Err(ConfigError::EmptyCurve { name: name.into() });
        }
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(ConfigError::NonFinite { name: name.into() });
        }
        if let Some(index) = points.windows(2).position(|w| w[1].0 <= w[0].0) {
            return Err(ConfigError::UnsortedCurve {
                name: name.into(),
                index: index + 1,
            });
        }
        Ok(Self { points })
    }

    /// A curve that returns `y` everywhere.
    pub fn constant(y: f64) -> Self {
        Self { points: vec![(0.0, y)] }
    }

    /// Interpolated y at `x`. O(n) scan; tables are short.
    pub fn evaluate(&self, x: f64) -> f64 {
        let mut prev: Option<(f64, f64)> = None;
        for &(px, py) in &self.points {
            if x < px {
                return match prev {
                    Some((x0, y0)) => y0 + (x - x0) / (px - x0) * (py - y0),
                    None => py,
                };
            }
            prev = Some((px, py));
        }
        // Non-empty by construction, so the loop always sets prev.
        prev.map_or(0.0, |(_, y)| y)
    }

    /// Smallest and largest sampled x.
    pub fn domain(&self) -> (f64, f64) {
        let first = self.points.first().map_or(0.0, |p| p.0);
        let last = self.points.last().map_or(0.0, |p| p.0);
        (first, last)
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}

impl TryFrom<Vec<(f64, f64)>> for Curve {
    type Error = ConfigError;

    fn try_from(points: Vec<(f64, f64)>) -> Result<Self, Self::Error> {
        Curve::new(points)
    }
}

impl From<Curve> for Vec<(f64, f64)> {
    fn from(curve: Curve) -> Self {
        curve.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp() -> Curve {
        Curve::new(vec![(0.0, 0.0), (10.0, 10.0)]).unwrap()
    }

    #[test]
    fn interpolates_between_samples() {
        assert_relative_eq!(ramp().evaluate(5.0), 5.0);
        assert_relative_eq!(ramp().evaluate(2.5), 2.5);
    }

    #[test]
    fn flat_outside_range() {
        assert_relative_eq!(ramp().evaluate(-5.0), 0.0);
        assert_relative_eq!(ramp().evaluate(15.0), 10.0);
        assert_relative_eq!(ramp().evaluate(10.0), 10.0);
    }

    #[test]
    fn exact_sample_hits_sample_value() {
        let c = Curve::new(vec![(-4.0, 0.0), (0.0, 0.42), (2.0, 0.66)]).unwrap();
        assert_relative_eq!(c.evaluate(0.0), 0.42);
        assert_relative_eq!(c.evaluate(1.0), 0.54, epsilon = 1e-12);
    }

    #[test]
    fn rejects_empty_and_unsorted() {
        assert!(matches!(Curve::new(vec![]), Err(ConfigError::EmptyCurve { .. })));
        let err = Curve::named("lift", vec![(0.0, 1.0), (2.0, 1.0), (1.0, 0.0)]).unwrap_err();
        match err {
            ConfigError::UnsortedCurve { name, index } => {
                assert_eq!(name, "lift");
                assert_eq!(index, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(Curve::new(vec![(0.0, 1.0), (0.0, 2.0)]).is_err());
        assert!(matches!(
            Curve::new(vec![(f64::NAN, 1.0)]),
            Err(ConfigError::NonFinite { .. })
        ));
    }

    #[test]
    fn single_sample_is_constant() {
        let c = Curve::constant(0.3);
        assert_relative_eq!(c.evaluate(-100.0), 0.3);
        assert_relative_eq!(c.evaluate(100.0), 0.3);
    }

    #[test]
    fn deserializes_from_pairs_and_validates() {
        let c: Curve = serde_yaml::from_str("[[0.0, 1.0], [1.0, 3.0]]").unwrap();
        assert_relative_eq!(c.evaluate(0.5), 2.0);
        let bad: Result<Curve, _> = serde_yaml::from_str("[[1.0, 1.0], [0.0, 3.0]]");
        assert!(bad.is_err());
    }
}
