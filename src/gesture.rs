//! Gesture state machine turning calibrated roll deviation into discrete,
//! debounced page-turn triggers.
//!
//! Each tick is evaluated in priority order:
//!
//! 1. `|deviation| <= dead_zone` cancels any pending gesture.
//! 2. `|deviation| > angle_threshold` starts or continues a hold in the
//!    tilt direction. A hold that has lasted `hold_duration_ms` fires once
//!    the cooldown since the previous trigger has passed. A reversal
//!    restarts the hold timer.
//! 3. Anything in between leaves the state untouched.
//!
//! Ticks without usable keypoints never reach the state machine, so a hold
//! survives brief detection dropouts.

use std::fmt;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tilt direction of a gesture.
///
/// Positive deviation is [`Direction::Right`], which advances to the next
/// page; negative deviation is [`Direction::Left`], which goes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Negative deviation, retreats one page
    Left,
    /// Positive deviation, advances one page
    Right,
}

impl Direction {
    /// Direction of a non-zero deviation
    #[must_use]
    pub fn from_deviation(deviation: f64) -> Self {
        if deviation > 0.0 {
            Self::Right
        } else {
            Self::Left
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// Hold tracking state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    /// No direction pending
    #[default]
    Idle,
    /// Deviation has stayed past the threshold in `direction` since `since_ms`
    Pending {
        /// Direction being held
        direction: Direction,
        /// Timestamp the hold started
        since_ms: u64,
    },
}

/// Tunables for the state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureParams {
    /// Deviation magnitude (degrees) a tilt must exceed to count
    pub angle_threshold: f64,
    /// Deviation magnitude (degrees) at or below which a hold is cancelled
    pub dead_zone: f64,
    /// How long a tilt must be held before it fires
    pub hold_duration_ms: u64,
    /// Minimum spacing between fired triggers
    pub cooldown_ms: u64,
}

impl Default for GestureParams {
    fn default() -> Self {
        use crate::constants::{
            DEFAULT_ANGLE_THRESHOLD, DEFAULT_COOLDOWN_MS, DEFAULT_DEAD_ZONE, DEFAULT_HOLD_DURATION_MS,
        };
        Self {
            angle_threshold: DEFAULT_ANGLE_THRESHOLD,
            dead_zone: DEFAULT_DEAD_ZONE,
            hold_duration_ms: DEFAULT_HOLD_DURATION_MS,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }
}

impl GestureParams {
    /// Check that the thresholds leave room for a hold to start
    pub fn validate(&self) -> Result<()> {
        if !self.angle_threshold.is_finite() || self.angle_threshold <= 0.0 || self.angle_threshold >= 180.0 {
            return Err(Error::ConfigError(
                "Angle threshold must be between 0 and 180 degrees".to_string(),
            ));
        }
        if !self.dead_zone.is_finite() || self.dead_zone < 0.0 {
            return Err(Error::ConfigError("Dead zone must be non-negative".to_string()));
        }
        if self.dead_zone >= self.angle_threshold {
            return Err(Error::ConfigError(format!(
                "Dead zone ({}°) must be smaller than the angle threshold ({}°)",
                self.dead_zone, self.angle_threshold
            )));
        }
        Ok(())
    }
}

/// Debounced directional trigger detector
#[derive(Debug, Clone)]
pub struct GestureStateMachine {
    params: GestureParams,
    state: GestureState,
    last_trigger_at: Option<u64>,
}

impl GestureStateMachine {
    /// Create a state machine, rejecting inconsistent thresholds
    pub fn new(params: GestureParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            state: GestureState::Idle,
            last_trigger_at: None,
        })
    }

    /// Evaluate one tick, returning the direction if a trigger fires
    pub fn update(&mut self, deviation: f64, now_ms: u64) -> Option<Direction> {
        let magnitude = deviation.abs();

        if magnitude <= self.params.dead_zone {
            if self.state != GestureState::Idle {
                debug!("Deviation {deviation:.1}° back in dead zone, cancelling hold");
            }
            self.state = GestureState::Idle;
            return None;
        }

        if magnitude <= self.params.angle_threshold {
            return None;
        }

        let direction = Direction::from_deviation(deviation);
        match self.state {
            GestureState::Pending { direction: held, since_ms } if held == direction => {
                let held_for = now_ms.saturating_sub(since_ms);
                if held_for >= self.params.hold_duration_ms && self.cooldown_elapsed(now_ms) {
                    info!("Gesture {direction} fired after {held_for} ms hold (deviation {deviation:.1}°)");
                    self.last_trigger_at = Some(now_ms);
                    self.state = GestureState::Idle;
                    return Some(direction);
                }
            }
            _ => {
                debug!("Hold started: {direction} at {now_ms} ms (deviation {deviation:.1}°)");
                self.state = GestureState::Pending {
                    direction,
                    since_ms: now_ms,
                };
            }
        }
        None
    }

    fn cooldown_elapsed(&self, now_ms: u64) -> bool {
        self.last_trigger_at
            .map_or(true, |last| now_ms.saturating_sub(last) > self.params.cooldown_ms)
    }

    /// Whether a trigger fired within the cooldown window before `now_ms`
    #[must_use]
    pub fn in_cooldown(&self, now_ms: u64) -> bool {
        !self.cooldown_elapsed(now_ms)
    }

    /// Current hold state
    #[must_use]
    pub const fn state(&self) -> GestureState {
        self.state
    }

    /// Timestamp of the last fired trigger
    #[must_use]
    pub const fn last_trigger_at(&self) -> Option<u64> {
        self.last_trigger_at
    }

    #[must_use]
    pub const fn params(&self) -> &GestureParams {
        &self.params
    }

    /// Drop any pending hold and forget the last trigger
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.last_trigger_at = None;
    }
}
