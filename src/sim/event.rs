use super::record::Sample;
use crate::physics::curve::Curve;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// Kinds of simulation events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Angle of attack left the lift table's domain.
    Stall { angle_of_attack: f64 },
    /// Angle of attack came back inside the lift table's domain.
    Recovered { angle_of_attack: f64 },
    Touchdown { speed: f64 },
    TetherLost { remaining: usize },
}

/// A discrete event that occurred during simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimEvent {
    pub tick: u64,
    pub time: f64,
    pub kind: EventKind,
    pub sample: Sample,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive samples and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &Sample, current: &Sample) -> Option<EventKind>;
}

/// Reports transitions in and out of the range the lift table covers.
pub struct StallDetector {
    min: f64,
    max: f64,
    stalled: bool,
}

impl StallDetector {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max, stalled: false }
    }

    pub fn for_curve(lift: &Curve) -> Self {
        let (min, max) = lift.domain();
        Self::new(min, max)
    }
}

impl EventDetector for StallDetector {
    fn check(&mut self, _prev: &Sample, current: &Sample) -> Option<EventKind> {
        let aoa = current.angle_of_attack?;
        let outside = aoa < self.min || aoa > self.max;
        match (self.stalled, outside) {
            (false, true) => {
                self.stalled = true;
                Some(EventKind::Stall { angle_of_attack: aoa })
            }
            (true, false) => {
                self.stalled = false;
                Some(EventKind::Recovered { angle_of_attack: aoa })
            }
            _ => None,
        }
    }
}

/// Fires once, the first time the pilot descends through `height`.
pub struct TouchdownDetector {
    pub height: f64,
    fired: bool,
}

impl TouchdownDetector {
    pub fn new(height: f64) -> Self {
        Self { height, fired: false }
    }
}

impl EventDetector for TouchdownDetector {
    fn check(&mut self, prev: &Sample, current: &Sample) -> Option<EventKind> {
        if self.fired {
            return None;
        }
        if prev.pilot_height() > self.height && current.pilot_height() <= self.height {
            self.fired = true;
            Some(EventKind::Touchdown { speed: current.pilot_speed() })
        } else {
            None
        }
    }
}

/// Reports each drop in the number of attached lines.
pub struct TetherLossDetector;

impl EventDetector for TetherLossDetector {
    fn check(&mut self, prev: &Sample, current: &Sample) -> Option<EventKind> {
        (current.tethers_attached < prev.tethers_attached)
            .then_some(EventKind::TetherLost { remaining: current.tethers_attached })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    fn make_sample(height: f64, aoa: Option<f64>, tethers: usize) -> Sample {
        Sample {
            tick: 0,
            time: 0.0,
            wing_position: Vector2::new(0.0, height + 7.0),
            wing_velocity: Vector2::zeros(),
            wing_angle: 0.0,
            pilot_position: Vector2::new(0.0, height),
            pilot_velocity: Vector2::new(-3.0, -4.0),
            angle_of_attack: aoa,
            lift: Vector2::zeros(),
            drag: Vector2::zeros(),
            lengths: None,
            tethers_attached: tethers,
            thrust: false,
        }
    }

    #[test]
    fn stall_fires_on_entry_and_exit() {
        let mut det = StallDetector::new(-30.0, 50.0);
        let prev = make_sample(10.0, Some(10.0), 2);
        assert_eq!(det.check(&prev, &prev), None);
        let high = make_sample(10.0, Some(55.0), 2);
        assert_eq!(det.check(&prev, &high), Some(EventKind::Stall { angle_of_attack: 55.0 }));
        // Still stalled: no repeat
        assert_eq!(det.check(&high, &high), None);
        // No airflow says nothing either way
        assert_eq!(det.check(&high, &make_sample(10.0, None, 2)), None);
        assert!(matches!(det.check(&high, &prev), Some(EventKind::Recovered { .. })));
    }

    #[test]
    fn touchdown_fires_once() {
        let mut det = TouchdownDetector::new(0.5);
        let prev = make_sample(1.0, None, 2);
        let curr = make_sample(0.4, None, 2);
        assert_eq!(det.check(&prev, &curr), Some(EventKind::Touchdown { speed: 5.0 }));
        // Should not fire again
        assert!(det.check(&prev, &curr).is_none());
    }

    #[test]
    fn tether_loss_reports_remaining() {
        let mut det = TetherLossDetector;
        let prev = make_sample(10.0, None, 2);
        let curr = make_sample(10.0, None, 1);
        assert_eq!(det.check(&prev, &curr), Some(EventKind::TetherLost { remaining: 1 }));
        assert_eq!(det.check(&curr, &curr), None);
    }
}
