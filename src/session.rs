//! Detection loop driver.
//!
//! A [`TrackingSession`] pulls one frame per tick, awaits a single pose
//! estimation on it and feeds the result through its [`HeadTracker`].
//! Fired triggers go to the navigation sink. At most one estimation is in
//! flight at a time, so the per-session state needs no synchronization.
//!
//! The session stops when its [`SessionHandle`] is cancelled. An estimation
//! already running at that moment is allowed to finish, but its result is
//! dropped so no trigger can fire from a stale cycle.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::{
    config::Config,
    navigation::NavigationSink,
    pose::{FrameSource, PoseSource},
    tracker::{HeadTracker, TrackingStatus},
    Result,
};

/// Millisecond time source used to timestamp ticks
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_ms(&self) -> u64;
}

/// Monotonic clock backed by the tokio timer, pausable in tests
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    start: Instant,
}

impl TokioClock {
    #[must_use]
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Control and observation side of a tracking session
#[derive(Debug, Clone)]
pub struct SessionHandle {
    cancel: Arc<watch::Sender<bool>>,
    status: Arc<watch::Sender<TrackingStatus>>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    #[must_use]
    pub fn new() -> Self {
        let (cancel, _) = watch::channel(false);
        let (status, _) = watch::channel(TrackingStatus::default());
        Self {
            cancel: Arc::new(cancel),
            status: Arc::new(status),
        }
    }

    /// Stop the session before its next tick
    pub fn cancel(&self) {
        if !self.cancel.send_replace(true) {
            info!("Tracking session cancelled");
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Subscribe to status snapshots published after every tick
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TrackingStatus> {
        self.status.subscribe()
    }

    /// Most recently published status
    #[must_use]
    pub fn status(&self) -> TrackingStatus {
        self.status.borrow().clone()
    }
}

/// Counters reported when a session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Scheduling ticks taken
    pub ticks: u64,
    /// Ticks where no frame was ready
    pub frames_not_ready: u64,
    /// Completed estimations whose result was used
    pub estimations: u64,
    /// Estimations that failed transiently
    pub failures: u64,
    /// Results dropped because the session was cancelled mid-estimation
    pub stale_results: u64,
    /// Triggers forwarded to the navigation sink
    pub triggers: u64,
}

/// One head-tracking session: owns the tracker and its collaborators
pub struct TrackingSession<S, P, N, C = TokioClock> {
    tracker: HeadTracker,
    frames: S,
    poses: P,
    navigator: N,
    clock: C,
    tick_interval: Duration,
    cancelled: watch::Receiver<bool>,
    status: Arc<watch::Sender<TrackingStatus>>,
}

impl<S, P, N> TrackingSession<S, P, N, TokioClock>
where
    S: FrameSource,
    P: PoseSource<S::Frame>,
    N: NavigationSink,
{
    /// Create a session timed by the tokio clock
    pub fn new(config: &Config, frames: S, poses: P, navigator: N, handle: &SessionHandle) -> Result<Self> {
        Self::with_clock(config, frames, poses, navigator, TokioClock::new(), handle)
    }
}

impl<S, P, N, C> TrackingSession<S, P, N, C>
where
    S: FrameSource,
    P: PoseSource<S::Frame>,
    N: NavigationSink,
    C: Clock,
{
    /// Create a session with an explicit clock
    pub fn with_clock(
        config: &Config,
        frames: S,
        poses: P,
        navigator: N,
        clock: C,
        handle: &SessionHandle,
    ) -> Result<Self> {
        let tracker = HeadTracker::from_config(config)?;
        Ok(Self {
            tracker,
            frames,
            poses,
            navigator,
            clock,
            tick_interval: Duration::from_millis(config.tick_interval_ms()),
            cancelled: handle.cancel.subscribe(),
            status: Arc::clone(&handle.status),
        })
    }

    fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Run detection cycles until the handle is cancelled.
    ///
    /// All per-session state is dropped when this returns.
    pub async fn run(mut self) -> SessionSummary {
        let mut summary = SessionSummary::default();
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Tracking session started, tick interval {:?}", self.tick_interval);

        loop {
            if self.is_cancelled() {
                break;
            }
            tokio::select! {
                biased;
                changed = self.cancelled.changed() => {
                    if changed.is_err() {
                        debug!("All session handles dropped");
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }
            if self.is_cancelled() {
                break;
            }
            summary.ticks += 1;

            let Some(frame) = self.frames.latest_frame() else {
                summary.frames_not_ready += 1;
                continue;
            };

            let result = self.poses.estimate(&frame).await;
            if self.is_cancelled() {
                summary.stale_results += 1;
                debug!("Discarding estimation result from cancelled session");
                break;
            }

            match result {
                Ok(poses) => {
                    summary.estimations += 1;
                    let now = self.clock.now_ms();
                    let outcome = self.tracker.process(&poses, now);
                    if let Some(direction) = outcome.trigger() {
                        self.navigator.turn(direction);
                        summary.triggers += 1;
                    }
                    self.status.send_replace(self.tracker.status().clone());
                }
                Err(e) => {
                    summary.failures += 1;
                    if e.is_transient() {
                        warn!("Pose estimation failed, skipping tick: {e}");
                    } else {
                        error!("Pose source error, skipping tick: {e}");
                    }
                    let now = self.clock.now_ms();
                    self.tracker.record_failure(now);
                    self.status.send_replace(self.tracker.status().clone());
                }
            }
        }

        info!(
            "Tracking session stopped after {} ticks ({} triggers, {} failed estimations)",
            summary.ticks, summary.triggers, summary.failures
        );
        summary
    }
}
