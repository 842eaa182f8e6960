use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::curve::Curve;

// ---------------------------------------------------------------------------
// Table-driven 2D wing model
// ---------------------------------------------------------------------------

/// Below this airspeed (world units/s) the airflow direction is undefined
/// and no aerodynamic force is produced.
pub const MIN_AIRSPEED: f64 = 1e-9;

/// Lift, drag and centre-of-pressure tables, all indexed by angle of
/// attack in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AeroTables {
    pub lift: Curve,
    pub drag: Curve,
    /// Chordwise offset (metres) of the point where the force is applied.
    pub pressure: Curve,
}

/// Saturation applied to the force magnitudes. Used with slide tethers,
/// which go unstable when the wing yanks on them too hard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceLimits {
    pub lift_max: f64,
    pub drag_max: f64,
}

/// Output of one evaluation of the force model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AeroForces {
    /// Degrees, in (-180, 180].
    pub angle_of_attack: f64,
    pub lift: Vector2<f64>,
    pub drag: Vector2<f64>,
    /// Metres along the chord.
    pub pressure_pos: f64,
}

impl AeroForces {
    pub fn total(&self) -> Vector2<f64> {
        self.lift + self.drag
    }
}

/// Wrap an angle in degrees into (-180, 180].
pub fn normalize_degrees(raw: f64) -> f64 {
    let wrapped = raw.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Split a velocity into unit direction and magnitude.
/// Returns `None` when the body is (numerically) at rest or the velocity
/// is not finite.
pub fn airflow(velocity: &Vector2<f64>) -> Option<(Vector2<f64>, f64)> {
    let speed = velocity.norm();
    if speed.is_finite() && speed > MIN_AIRSPEED {
        Some((velocity / speed, speed))
    } else {
        None
    }
}

/// Angle of attack in degrees between the relative airflow direction and
/// the wing chord angle (radians).
pub fn angle_of_attack(direction: &Vector2<f64>, angle_of_wing: f64) -> f64 {
    let airflow_angle = direction.y.atan2(direction.x);
    normalize_degrees((airflow_angle - angle_of_wing).to_degrees())
}

/// `k * v^2 * c` for lift and drag, optionally saturated.
/// Lift is clamped symmetrically, drag to `[0, drag_max]`.
pub fn force_magnitudes(
    k: f64,
    speed_mps: f64,
    cl: f64,
    cd: f64,
    limits: Option<&ForceLimits>,
) -> (f64, f64) {
    let q = k * speed_mps * speed_mps;
    let lift = q * cl;
    let drag = q * cd;
    match limits {
        Some(l) => (lift.clamp(-l.lift_max, l.lift_max), drag.clamp(0.0, l.drag_max)),
        None => (lift, drag),
    }
}

/// Lift acts along the airflow direction rotated -90°, drag straight
/// against it.
pub fn force_vectors(direction: &Vector2<f64>, lift: f64, drag: f64) -> (Vector2<f64>, Vector2<f64>) {
    let perpendicular = Vector2::new(-direction.y, direction.x);
    (-perpendicular * lift, -direction * drag)
}

/// Full force model for one wing at one instant.
///
/// `velocity` is in world units/s, `length_scale` converts world units to
/// metres for the dynamic-pressure term. Returns `None` at zero airspeed
/// and whenever the inputs or the resulting forces are not finite.
pub fn evaluate(
    tables: &AeroTables,
    k: f64,
    velocity: &Vector2<f64>,
    length_scale: f64,
    angle_of_wing: f64,
    limits: Option<&ForceLimits>,
) -> Option<AeroForces> {
    if !angle_of_wing.is_finite() {
        return None;
    }
    let (direction, speed) = airflow(velocity)?;
    let speed_mps = speed / length_scale;
    let aoa = angle_of_attack(&direction, angle_of_wing);

    let cl = tables.lift.evaluate(aoa);
    let cd = tables.drag.evaluate(aoa);
    let (lift, drag) = force_magnitudes(k, speed_mps, cl, cd, limits);
    let (lift, drag) = force_vectors(&direction, lift, drag);
    if !lift.iter().chain(drag.iter()).all(|v| v.is_finite()) {
        return None;
    }

    Some(AeroForces {
        angle_of_attack: aoa,
        lift,
        drag,
        pressure_pos: tables.pressure.evaluate(aoa),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn tables() -> AeroTables {
        AeroTables {
            lift: Curve::new(vec![(-10.0, -0.5), (0.0, 0.42), (10.0, 1.4)]).unwrap(),
            drag: Curve::new(vec![(-10.0, 0.2), (0.0, 0.15), (10.0, 0.2)]).unwrap(),
            pressure: Curve::constant(0.0),
        }
    }

    #[test]
    fn normalizes_into_half_open_range() {
        assert_relative_eq!(normalize_degrees(200.0), -160.0);
        assert_relative_eq!(normalize_degrees(-200.0), 160.0);
        assert_relative_eq!(normalize_degrees(180.0), 180.0);
        assert_relative_eq!(normalize_degrees(-180.0), 180.0);
        assert_relative_eq!(normalize_degrees(45.0), 45.0);
        assert_relative_eq!(normalize_degrees(725.0), 5.0, epsilon = 1e-9);
        for i in -2000..2000 {
            let a = normalize_degrees(i as f64 * 0.77);
            assert!(a > -180.0 && a <= 180.0, "{} out of range", a);
        }
    }

    #[test]
    fn zero_velocity_yields_no_force() {
        assert!(airflow(&Vector2::zeros()).is_none());
        assert!(evaluate(&tables(), 140.0, &Vector2::zeros(), 20.0, 0.0, None).is_none());
    }

    #[test]
    fn non_finite_state_yields_no_force() {
        let t = tables();
        let nan = Vector2::new(f64::NAN, -200.0);
        assert!(airflow(&nan).is_none());
        assert!(evaluate(&t, 140.0, &nan, 20.0, 0.0, None).is_none());
        let inf = Vector2::new(f64::INFINITY, 0.0);
        assert!(evaluate(&t, 140.0, &inf, 20.0, 0.0, None).is_none());
        let vel = Vector2::new(-200.0, 0.0);
        assert!(evaluate(&t, 140.0, &vel, 20.0, f64::NAN, None).is_none());
        // Finite speed, overflowing dynamic pressure.
        let fast = Vector2::new(-1e150, 0.0);
        assert!(evaluate(&t, 1e12, &fast, 20.0, 0.0, None).is_none());
        let limits = ForceLimits { lift_max: 100.0, drag_max: 50.0 };
        let f = evaluate(&t, 1e12, &fast, 20.0, 0.0, Some(&limits)).unwrap();
        assert_relative_eq!(f.drag.x, 50.0);
    }

    #[test]
    fn drag_opposes_velocity_and_lift_is_perpendicular() {
        let vel = Vector2::new(-200.0, 0.0);
        let f = evaluate(&tables(), 140.0, &vel, 20.0, std::f64::consts::PI, None).unwrap();
        assert_abs_diff_eq!(f.angle_of_attack, 0.0, epsilon = 1e-9);
        // 10 m/s, Cd 0.15
        assert_relative_eq!(f.drag.x, 140.0 * 100.0 * 0.15, epsilon = 1e-9);
        assert_abs_diff_eq!(f.drag.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(f.lift.dot(&vel), 0.0, epsilon = 1e-6);
        // Flying in -x, positive lift points up.
        assert!(f.lift.y > 0.0);
        assert_relative_eq!(f.lift.y, 140.0 * 100.0 * 0.42, epsilon = 1e-9);
    }

    #[test]
    fn limits_saturate_magnitudes() {
        let limits = ForceLimits { lift_max: 100.0, drag_max: 50.0 };
        let (l, d) = force_magnitudes(140.0, 10.0, 1.0, 0.5, Some(&limits));
        assert_relative_eq!(l, 100.0);
        assert_relative_eq!(d, 50.0);
        let (l, d) = force_magnitudes(140.0, 10.0, -1.0, -0.5, Some(&limits));
        assert_relative_eq!(l, -100.0);
        assert_relative_eq!(d, 0.0);
        let (l, _) = force_magnitudes(140.0, 10.0, -1.0, 0.5, None);
        assert_relative_eq!(l, -14_000.0);
    }
}
