//! Per-session head-tilt pipeline.
//!
//! A [`HeadTracker`] owns every piece of per-session state (smoothing
//! window, neutral baseline, pending hold, cooldown) and advances it by one
//! pose result per tick. It is created when tracking is enabled and dropped
//! with the session.

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    angles::{calculate_angular_velocity, calculate_roll_angle},
    calibration::{CalibrationStatus, NeutralCalibrator},
    config::Config,
    filters::AngleFilter,
    gesture::{Direction, GestureParams, GestureStateMachine},
    pose::{Detection, Pose, ReferenceSelector},
    Result,
};

/// Why a tick did not reach the gesture logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Pose source returned no subject
    NoPose,
    /// Reference keypoints missing or below the confidence floor
    LowConfidence,
    /// Pose source failed for this tick
    EstimationFailed,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Tick ignored, all state retained
    Skipped(SkipReason),
    /// Sample went into the neutral baseline
    Calibrating {
        /// Fraction of baseline samples collected
        progress: f64,
    },
    /// Deviation evaluated by the gesture state machine
    Tracked {
        /// Signed displacement from neutral in degrees
        deviation: f64,
        /// Direction of a trigger fired on this tick
        trigger: Option<Direction>,
    },
}

impl TickOutcome {
    /// Direction fired on this tick, if any
    #[must_use]
    pub const fn trigger(&self) -> Option<Direction> {
        match self {
            Self::Tracked { trigger, .. } => *trigger,
            _ => None,
        }
    }
}

/// User-facing indicator state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum Indicator {
    /// Waiting for the first ready video frame
    Loading,
    /// Collecting the neutral baseline
    Calibrating {
        /// Fraction collected
        progress: f64,
    },
    /// No usable pose for a sustained run of ticks
    NoPose,
    /// A trigger fired recently and further triggers are held back
    CoolingDown,
    /// Watching for gestures
    Ready,
}

/// Snapshot published to UI observers after every tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingStatus {
    /// Indicator state
    pub indicator: Indicator,
    /// Whether the last tick found a subject
    pub pose_detected: bool,
    /// Last smoothed roll angle in degrees
    pub roll_angle: Option<f64>,
    /// Last angular speed in degrees per second
    pub angular_velocity: Option<f64>,
    /// Last deviation from neutral in degrees
    pub deviation: Option<f64>,
    /// Calibrated neutral angle
    pub neutral_angle: Option<f64>,
    /// Triggers fired this session
    pub trigger_count: u64,
    /// Direction of the most recent trigger
    pub last_trigger: Option<Direction>,
}

impl Default for TrackingStatus {
    fn default() -> Self {
        Self {
            indicator: Indicator::Loading,
            pose_detected: false,
            roll_angle: None,
            angular_velocity: None,
            deviation: None,
            neutral_angle: None,
            trigger_count: 0,
            last_trigger: None,
        }
    }
}

/// Head-tilt gesture pipeline for one tracking session
pub struct HeadTracker {
    selector: ReferenceSelector,
    filter: Box<dyn AngleFilter>,
    calibrator: NeutralCalibrator,
    gesture: GestureStateMachine,
    previous: Option<(f64, u64)>,
    missed_ticks: u32,
    no_pose_hint_after: u32,
    status: TrackingStatus,
}

impl HeadTracker {
    /// Assemble a tracker from explicit components
    #[must_use]
    pub fn new(
        selector: ReferenceSelector,
        filter: Box<dyn AngleFilter>,
        calibrator: NeutralCalibrator,
        gesture: GestureStateMachine,
        no_pose_hint_after: u32,
    ) -> Self {
        Self {
            selector,
            filter,
            calibrator,
            gesture,
            previous: None,
            missed_ticks: 0,
            no_pose_hint_after,
            status: TrackingStatus::default(),
        }
    }

    /// Build a tracker from validated configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let selector = ReferenceSelector::new(
            config.detection.left_keypoint.clone(),
            config.detection.right_keypoint.clone(),
            config.detection.min_keypoint_score,
        );
        let filter = config.create_filter()?;
        info!(
            "Tracker using {} filter, {} calibration samples, threshold {}° / dead zone {}°",
            filter.name(),
            config.calibration.samples,
            config.gesture.angle_threshold,
            config.gesture.dead_zone
        );
        Ok(Self::new(
            selector,
            filter,
            NeutralCalibrator::new(config.calibration.samples),
            GestureStateMachine::new(config.gesture_params())?,
            config.detection.no_pose_hint_after,
        ))
    }

    /// Advance the pipeline by one pose result observed at `now_ms`
    pub fn process(&mut self, poses: &[Pose], now_ms: u64) -> TickOutcome {
        let (left, right) = match self.selector.select(poses) {
            Detection::Ready { left, right } => (left, right),
            Detection::NoPose => return self.skip(SkipReason::NoPose, now_ms),
            Detection::LowConfidence => return self.skip(SkipReason::LowConfidence, now_ms),
        };

        if self.missed_ticks >= self.no_pose_hint_after {
            info!("Pose reacquired after {} ticks", self.missed_ticks);
        }
        self.missed_ticks = 0;
        self.status.pose_detected = true;

        let raw_angle = calculate_roll_angle(left, right);
        let smoothed = self.filter.apply(raw_angle);
        self.status.angular_velocity = self.previous.and_then(|(previous, at)| {
            let elapsed = now_ms.saturating_sub(at);
            (elapsed > 0).then(|| calculate_angular_velocity(smoothed, previous, elapsed))
        });
        self.previous = Some((smoothed, now_ms));
        self.status.roll_angle = Some(smoothed);

        let outcome = match self.calibrator.observe(smoothed) {
            CalibrationStatus::Calibrating { .. } => TickOutcome::Calibrating {
                progress: self.calibrator.progress(),
            },
            CalibrationStatus::Finalized { neutral_angle } => {
                self.status.neutral_angle = Some(neutral_angle);
                match self.calibrator.deviation(smoothed) {
                    Some(deviation) => {
                        let trigger = self.gesture.update(deviation, now_ms);
                        self.status.deviation = Some(deviation);
                        if let Some(direction) = trigger {
                            self.status.trigger_count += 1;
                            self.status.last_trigger = Some(direction);
                        }
                        TickOutcome::Tracked { deviation, trigger }
                    }
                    None => TickOutcome::Calibrating {
                        progress: self.calibrator.progress(),
                    },
                }
            }
        };

        self.refresh_indicator(now_ms);
        outcome
    }

    /// Count a failed estimation as a skipped tick
    pub fn record_failure(&mut self, now_ms: u64) -> TickOutcome {
        self.skip(SkipReason::EstimationFailed, now_ms)
    }

    fn skip(&mut self, reason: SkipReason, now_ms: u64) -> TickOutcome {
        self.missed_ticks = self.missed_ticks.saturating_add(1);
        self.status.pose_detected = reason == SkipReason::LowConfidence;
        if self.missed_ticks == self.no_pose_hint_after {
            warn!("No usable pose for {} consecutive ticks", self.missed_ticks);
        } else {
            debug!("Tick skipped: {reason:?}");
        }
        self.refresh_indicator(now_ms);
        TickOutcome::Skipped(reason)
    }

    fn refresh_indicator(&mut self, now_ms: u64) {
        self.status.indicator = if self.missed_ticks >= self.no_pose_hint_after {
            Indicator::NoPose
        } else if !self.calibrator.is_calibrated() {
            Indicator::Calibrating {
                progress: self.calibrator.progress(),
            }
        } else if self.gesture.in_cooldown(now_ms) {
            Indicator::CoolingDown
        } else {
            Indicator::Ready
        };
    }

    /// Latest status snapshot
    #[must_use]
    pub const fn status(&self) -> &TrackingStatus {
        &self.status
    }

    #[must_use]
    pub const fn gesture_params(&self) -> &GestureParams {
        self.gesture.params()
    }

    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.calibrator.is_calibrated()
    }
}
