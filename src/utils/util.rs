//! # Utility Module
//!
//! Angle helpers shared by the half-edge factory, the vertex fans and the
//! leaf builder.
//!
//! All angles are in degrees, normalised to `[0, 360)` and measured
//! anti-clockwise from the +x axis.

/// Tolerance used when two angles are compared for equality.
pub const ANG_EPSILON: f64 = 1.0 / 1024.0;

/// Computes the direction of `(dx, dy)` in degrees.
///
/// # Examples
///
/// ```
/// use map_bsp::utils::util::compute_angle;
///
/// assert_eq!(compute_angle(1.0, 0.0), 0.0);
/// assert_eq!(compute_angle(0.0, 1.0), 90.0);
/// assert_eq!(compute_angle(0.0, -1.0), 270.0);
/// ```
pub fn compute_angle(dx: f64, dy: f64) -> f64 {
    // Axis-aligned directions are exact; most map walls are.
    if dx == 0.0 {
        return if dy > 0.0 {
            90.0
        } else if dy < 0.0 {
            270.0
        } else {
            0.0
        };
    }
    if dy == 0.0 {
        return if dx > 0.0 { 0.0 } else { 180.0 };
    }
    let angle = dy.atan2(dx).to_degrees();
    normalize_angle(angle)
}

/// Wraps an angle into `[0, 360)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Anti-clockwise sweep from `from` to `to`, in `[0, 360)`.
///
/// # Examples
///
/// ```
/// use map_bsp::utils::util::angle_delta_ccw;
///
/// assert_eq!(angle_delta_ccw(350.0, 10.0), 20.0);
/// assert_eq!(angle_delta_ccw(10.0, 350.0), 340.0);
/// ```
pub fn angle_delta_ccw(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

/// Returns true if both angles point the same way, within [`ANG_EPSILON`].
pub fn angles_equal(a: f64, b: f64) -> bool {
    let diff = (a - b).abs();
    diff < ANG_EPSILON || diff > 360.0 - ANG_EPSILON
}
