//! Field coordinate helpers
//!
//! All positions in a drill chart live in field coordinates:
//! X = 0-100 yards (end zone to end zone), Y = 0-53.33 yards
//! (sideline to sideline).

use glam::Vec2;

/// Field length in yards (end zone to end zone).
pub const FIELD_LENGTH_YD: f32 = 100.0;
/// Field width in yards (sideline to sideline).
pub const FIELD_WIDTH_YD: f32 = 53.33;

/// Standard marching step size (22.5 inches).
pub const STEP_SIZE_YD: f32 = 0.625;

/// College hash mark distance from the home sideline.
pub const HOME_HASH_YD: f32 = 17.78;
/// College hash mark distance from the visitor sideline.
pub const VISITOR_HASH_YD: f32 = 35.56;

/// Clamp a position to the field bounds.
pub fn clamp_to_field(pos: Vec2) -> Vec2 {
    Vec2::new(
        pos.x.clamp(0.0, FIELD_LENGTH_YD),
        pos.y.clamp(0.0, FIELD_WIDTH_YD),
    )
}

/// Snap a position to a regular grid (defaults to one marching step).
pub fn snap_to_grid(pos: Vec2, grid: f32) -> Vec2 {
    if grid.abs() < f32::EPSILON {
        return pos;
    }
    Vec2::new(
        (pos.x / grid).round() * grid,
        (pos.y / grid).round() * grid,
    )
}

/// Snap the X coordinate to the nearest 5-yard line, leaving Y untouched.
pub fn snap_to_yard_lines(pos: Vec2) -> Vec2 {
    Vec2::new((pos.x / 5.0).round() * 5.0, pos.y)
}

/// Interpolate between two facing angles (degrees) along the shortest
/// angular path.
pub fn lerp_angle_deg(a: f32, b: f32, t: f32) -> f32 {
    let mut delta = (b - a).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    a + delta * t
}
