//! Constants used throughout the application

/// Default keypoint names for the two roll reference points
pub const DEFAULT_LEFT_KEYPOINT: &str = "left_ear";
pub const DEFAULT_RIGHT_KEYPOINT: &str = "right_ear";

/// Minimum keypoint confidence for a tick to count
pub const DEFAULT_MIN_KEYPOINT_SCORE: f64 = 0.3;

/// Default detection cadence (cycles per second)
pub const DEFAULT_TARGET_FPS: u32 = 30;

/// Consecutive empty ticks before surfacing a "no pose" hint
pub const DEFAULT_NO_POSE_HINT_AFTER: u32 = 30;

/// Default gesture thresholds
pub const DEFAULT_ANGLE_THRESHOLD: f64 = 45.0;
pub const DEFAULT_DEAD_ZONE: f64 = 15.0;
pub const DEFAULT_HOLD_DURATION_MS: u64 = 800;
pub const DEFAULT_COOLDOWN_MS: u64 = 1500;

/// Default smoothing window size
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 5;

/// Samples collected before the neutral angle is frozen
pub const DEFAULT_CALIBRATION_SAMPLES: usize = 30;

/// Half turn in degrees, used for wraparound
pub const HALF_TURN_DEGREES: f64 = 180.0;
pub const FULL_TURN_DEGREES: f64 = 360.0;

/// Milliseconds per second
pub const MILLIS_PER_SECOND: f64 = 1000.0;
