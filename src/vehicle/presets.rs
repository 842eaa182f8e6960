use nalgebra::Vector2;

use crate::physics::curve::Curve;

// ---------------------------------------------------------------------------
// Reference paraglider: sprite-traced outlines and coefficient tables
// ---------------------------------------------------------------------------

/// Sprite resolution the outlines were traced at.
pub const SPRITE_PIXELS_PER_METRE: f64 = 63.0;

/// Outline of the canopy, sprite pixels (y down).
const WING_OUTLINE: [(f64, f64); 7] = [
    (133.0, 224.0),
    (90.0, 217.0),
    (40.0, 158.0),
    (10.0, 12.0),
    (31.0, 3.0),
    (178.0, 40.0),
    (157.0, 143.0),
];
const WING_ORIGIN: (f64, f64) = (93.0, 93.0);

/// Outline of the pilot in harness, sprite pixels (y down).
const PILOT_OUTLINE: [(f64, f64); 5] = [
    (68.0, 25.0),
    (14.0, 66.0),
    (11.0, 109.0),
    (53.0, 93.0),
    (76.0, 50.0),
];
const PILOT_ORIGIN: (f64, f64) = (49.0, 49.0);

const LIFT_TABLE: [(f64, f64); 15] = [
    (-10.0, -0.5),
    (-8.0, -0.4),
    (-6.0, -0.2),
    (-4.0, 0.0),
    (-2.0, 0.2),
    (0.0, 0.42),
    (2.0, 0.66),
    (4.0, 0.82),
    (6.0, 1.1),
    (8.0, 1.2),
    (10.0, 1.4),
    (12.0, 1.45),
    (14.0, 1.52),
    (16.0, 1.5),
    (18.0, 1.45),
];

const DRAG_TABLE: [(f64, f64); 6] = [
    (-10.0, 0.2),
    (0.0, 0.15),
    (8.0, 0.2),
    (12.0, 0.28),
    (15.0, 0.5),
    (18.0, 0.9),
];

/// Convert sprite pixels (y down, `origin` at the body reference point)
/// to body-local metres (y up).
pub fn outline_to_local(outline: &[(f64, f64)], origin: (f64, f64)) -> Vec<Vector2<f64>> {
    outline
        .iter()
        .map(|&(x, y)| {
            Vector2::new(
                (x - origin.0) / SPRITE_PIXELS_PER_METRE,
                (origin.1 - y) / SPRITE_PIXELS_PER_METRE,
            )
        })
        .collect()
}

pub fn wing_polygon() -> Vec<Vector2<f64>> {
    outline_to_local(&WING_OUTLINE, WING_ORIGIN)
}

pub fn pilot_polygon() -> Vec<Vector2<f64>> {
    outline_to_local(&PILOT_OUTLINE, PILOT_ORIGIN)
}

/// Small diamond for the winch/centre-of-mass node.
pub fn node_polygon() -> Vec<Vector2<f64>> {
    vec![
        Vector2::new(0.0, -0.2),
        Vector2::new(0.2, 0.0),
        Vector2::new(0.0, 0.2),
        Vector2::new(-0.2, 0.0),
    ]
}

fn table(points: &[(f64, f64)]) -> Curve {
    // The built-in tables are sorted and non-empty.
    Curve::new(points.to_vec()).unwrap_or_else(|_| Curve::constant(0.0))
}

pub fn lift_curve() -> Curve {
    table(&LIFT_TABLE)
}

pub fn drag_curve() -> Curve {
    table(&DRAG_TABLE)
}
