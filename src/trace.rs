//! Recorded pose traces and offline replay.
//!
//! A trace is a CSV file with one row per captured frame:
//!
//! ```text
//! timestamp_ms,left_x,left_y,left_score,right_x,right_y,right_score
//! 0,212.0,180.5,0.91,298.4,182.0,0.88
//! 33,,,,,,
//! ```
//!
//! Empty coordinates mean the keypoint was not found; a row with neither
//! keypoint is a frame where no subject was detected. An empty score means
//! "not observed". Replaying a trace drives a real [`TrackingSession`]
//! with the recorded timestamps as its clock.
//!
//! [`TrackingSession`]: crate::session::TrackingSession

use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use csv::ReaderBuilder;
use log::{debug, info};
use serde::Deserialize;

use crate::{
    pose::{FrameSource, Keypoint, Pose, PoseSource},
    session::{Clock, SessionHandle},
    Error, Result,
};

#[derive(Debug, Deserialize)]
struct TraceRecord {
    timestamp_ms: u64,
    left_x: Option<f64>,
    left_y: Option<f64>,
    left_score: Option<f64>,
    right_x: Option<f64>,
    right_y: Option<f64>,
    right_score: Option<f64>,
}

/// One recorded frame and the poses observed on it
#[derive(Debug, Clone, PartialEq)]
pub struct TraceFrame {
    /// Capture time in milliseconds
    pub timestamp_ms: u64,
    /// Poses detected on the frame, empty if none
    pub poses: Vec<Pose>,
}

/// Recorded sequence of pose estimates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseTrace {
    frames: Vec<TraceFrame>,
}

fn keypoint(name: &str, x: Option<f64>, y: Option<f64>, score: Option<f64>) -> Option<Keypoint> {
    match (x, y) {
        (Some(x), Some(y)) => Some(Keypoint::new(name, x, y, score)),
        _ => None,
    }
}

impl PoseTrace {
    /// Load a trace from a CSV file, naming the two keypoints as given
    pub fn from_path<P: AsRef<Path>>(path: P, left_name: &str, right_name: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let trace = Self::from_reader(file, left_name, right_name)?;
        info!("Loaded {} frames from {}", trace.len(), path.display());
        Ok(trace)
    }

    /// Parse a trace from CSV text
    pub fn from_reader<R: Read>(reader: R, left_name: &str, right_name: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);

        let mut frames: Vec<TraceFrame> = Vec::new();
        for (row_idx, result) in reader.deserialize::<TraceRecord>().enumerate() {
            let record = result.map_err(|e| Error::TraceError(format!("Invalid row {}: {e}", row_idx + 1)))?;

            if let Some(previous) = frames.last() {
                if record.timestamp_ms < previous.timestamp_ms {
                    return Err(Error::TraceError(format!(
                        "Row {} goes back in time ({} ms after {} ms)",
                        row_idx + 1,
                        record.timestamp_ms,
                        previous.timestamp_ms
                    )));
                }
            }

            let keypoints: Vec<Keypoint> = [
                keypoint(left_name, record.left_x, record.left_y, record.left_score),
                keypoint(right_name, record.right_x, record.right_y, record.right_score),
            ]
            .into_iter()
            .flatten()
            .collect();

            let poses = if keypoints.is_empty() {
                Vec::new()
            } else {
                vec![Pose::new(keypoints, None)]
            };
            frames.push(TraceFrame {
                timestamp_ms: record.timestamp_ms,
                poses,
            });
        }

        if frames.is_empty() {
            return Err(Error::TraceError("Trace contains no frames".to_string()));
        }
        Ok(Self { frames })
    }

    #[must_use]
    pub fn frames(&self) -> &[TraceFrame] {
        &self.frames
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Split the trace into the collaborators of a replay session.
    ///
    /// The frame source cancels `handle` once the trace is exhausted.
    #[must_use]
    pub fn into_replay(self, handle: &SessionHandle) -> (ReplayFrames, ReplayPoses, ReplayClock) {
        let now = Arc::new(AtomicU64::new(0));
        (
            ReplayFrames {
                frames: self.frames.into_iter(),
                now: Arc::clone(&now),
                handle: handle.clone(),
            },
            ReplayPoses,
            ReplayClock { now },
        )
    }
}

/// Frame source yielding recorded frames one per tick
pub struct ReplayFrames {
    frames: std::vec::IntoIter<TraceFrame>,
    now: Arc<AtomicU64>,
    handle: SessionHandle,
}

impl FrameSource for ReplayFrames {
    type Frame = TraceFrame;

    fn latest_frame(&mut self) -> Option<TraceFrame> {
        let Some(frame) = self.frames.next() else {
            debug!("Trace exhausted");
            self.handle.cancel();
            return None;
        };
        self.now.store(frame.timestamp_ms, Ordering::Release);
        Some(frame)
    }
}

/// Pose source returning the poses recorded with each frame
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayPoses;

impl PoseSource<TraceFrame> for ReplayPoses {
    async fn estimate(&mut self, frame: &TraceFrame) -> Result<Vec<Pose>> {
        Ok(frame.poses.clone())
    }
}

/// Clock reporting the timestamp of the frame being replayed
#[derive(Debug, Clone)]
pub struct ReplayClock {
    now: Arc<AtomicU64>,
}

impl Clock for ReplayClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}
