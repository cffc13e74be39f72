//! Head roll geometry: tilt angle from two reference keypoints and the
//! angular speed between successive smoothed samples.

use crate::constants::{FULL_TURN_DEGREES, HALF_TURN_DEGREES, MILLIS_PER_SECOND};
use crate::pose::Keypoint;

/// Normalize an angle or angle difference into `(-180°, 180°]`.
#[must_use]
pub fn wrap_degrees(angle: f64) -> f64 {
    let turned = angle.rem_euclid(FULL_TURN_DEGREES);
    if turned > HALF_TURN_DEGREES {
        turned - FULL_TURN_DEGREES
    } else {
        turned
    }
}

/// Calculate the roll angle (head tilt) in degrees from the left and right
/// reference keypoints.
///
/// The result is `atan2(right.y - left.y, right.x - left.x)` in degrees,
/// normalized into `(-180°, 180°]`. A positive value means the right point
/// sits lower in the image than the left one (image y grows downwards).
#[must_use]
pub fn calculate_roll_angle(left: &Keypoint, right: &Keypoint) -> f64 {
    let delta_x = right.x - left.x;
    let delta_y = right.y - left.y;
    wrap_degrees(delta_y.atan2(delta_x).to_degrees())
}

/// Calculate angular speed in degrees per second between two smoothed
/// angles taken `elapsed_ms` apart.
///
/// The difference is taken along the short arc, so crossing the ±180°
/// boundary never reads as a near full turn. Returns 0 when no time has
/// elapsed.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Millisecond spans are far below 2^52
pub fn calculate_angular_velocity(current: f64, previous: f64, elapsed_ms: u64) -> f64 {
    if elapsed_ms == 0 {
        return 0.0;
    }
    let diff = wrap_degrees(current - previous);
    diff.abs() / (elapsed_ms as f64 / MILLIS_PER_SECOND)
}
