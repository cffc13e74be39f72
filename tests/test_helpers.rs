//! Helper functions and utilities for tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use nodturn::{
    config::Config,
    gesture::Direction,
    navigation::NavigationSink,
    pose::{FrameSource, Keypoint, Pose, PoseSource},
    session::SessionHandle,
    Error, Result,
};

/// Single pose whose ears are tilted by `angle` degrees
pub fn tilted_pose(angle: f64) -> Vec<Pose> {
    let (sin, cos) = angle.to_radians().sin_cos();
    vec![Pose::new(
        vec![
            Keypoint::new("nose", 140.0, 60.0, Some(0.95)),
            Keypoint::new("left_ear", 100.0, 100.0, Some(0.9)),
            Keypoint::new("right_ear", 100.0 + 80.0 * cos, 100.0 + 80.0 * sin, Some(0.9)),
        ],
        Some(0.9),
    )]
}

/// Pose where the right ear falls below the confidence floor
pub fn unconfident_pose() -> Vec<Pose> {
    let mut poses = tilted_pose(0.0);
    poses[0].keypoints[2].score = Some(0.05);
    poses
}

/// Small, fast configuration: 100 ms ticks, 3 calibration samples, no smoothing lag
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.gesture.angle_threshold = 20.0;
    config.gesture.dead_zone = 5.0;
    config.gesture.hold_duration_ms = 100;
    config.gesture.cooldown_ms = 500;
    config.smoothing.window = 1;
    config.calibration.samples = 3;
    config.detection.target_fps = 10;
    config.detection.no_pose_hint_after = 3;
    config
}

/// Frame source yielding increasing frame numbers after `not_ready_for` empty polls
pub struct CountingFrames {
    next: u64,
    not_ready_for: u64,
}

impl CountingFrames {
    pub fn new(not_ready_for: u64) -> Self {
        Self { next: 0, not_ready_for }
    }
}

impl FrameSource for CountingFrames {
    type Frame = u64;

    fn latest_frame(&mut self) -> Option<u64> {
        if self.not_ready_for > 0 {
            self.not_ready_for -= 1;
            return None;
        }
        self.next += 1;
        Some(self.next)
    }
}

/// One scripted estimation result
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Subject tilted by this many degrees
    Tilt(f64),
    /// Nothing detected
    Empty,
    /// Reference keypoint below confidence
    Unconfident,
    /// Estimation error
    Fail,
    /// Cancel the session while estimating, then report this tilt
    CancelThen(f64),
}

/// Pose source replaying a script; cancels the session when it runs out
pub struct ScriptedPoses {
    steps: VecDeque<Step>,
    handle: SessionHandle,
    calls: Arc<AtomicUsize>,
}

impl ScriptedPoses {
    pub fn new(steps: impl IntoIterator<Item = Step>, handle: &SessionHandle) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            handle: handle.clone(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter of estimate calls
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl PoseSource<u64> for ScriptedPoses {
    async fn estimate(&mut self, _frame: &u64) -> Result<Vec<Pose>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.steps.pop_front() {
            Some(Step::Tilt(angle)) => Ok(tilted_pose(angle)),
            Some(Step::Empty) => Ok(Vec::new()),
            Some(Step::Unconfident) => Ok(unconfident_pose()),
            Some(Step::Fail) => Err(Error::PoseEstimation("backend hiccup".to_string())),
            Some(Step::CancelThen(angle)) => {
                self.handle.cancel();
                Ok(tilted_pose(angle))
            }
            None => {
                self.handle.cancel();
                Ok(Vec::new())
            }
        }
    }
}

/// Navigation sink recording every turn it receives
#[derive(Clone, Default)]
pub struct RecordingNavigator {
    turns: Arc<Mutex<Vec<Direction>>>,
}

impl RecordingNavigator {
    pub fn turns(&self) -> Vec<Direction> {
        self.turns.lock().unwrap().clone()
    }
}

impl NavigationSink for RecordingNavigator {
    fn advance(&mut self) {
        self.turns.lock().unwrap().push(Direction::Right);
    }

    fn retreat(&mut self) {
        self.turns.lock().unwrap().push(Direction::Left);
    }
}
