//! Hands-free page turning from head-tilt gestures.
//!
//! This library turns a stream of noisy per-frame pose keypoints into
//! discrete, debounced "turn page" triggers. The pose-estimation model and
//! the video capture pipeline are consumed as external capabilities.
//!
//! The pipeline run on every tick:
//! 1. Roll angle from two reference keypoints (ears by default)
//! 2. Moving average smoothing
//! 3. Angular velocity between smoothed samples
//! 4. Deviation from a self-calibrated neutral posture
//! 5. Gesture state machine with dead zone, hold duration and cooldown
//!
//! # Examples
//!
//! ## Gesture State Machine
//!
//! ```
//! use nodturn::gesture::{Direction, GestureParams, GestureStateMachine};
//!
//! # fn main() -> nodturn::Result<()> {
//! let mut gestures = GestureStateMachine::new(GestureParams {
//!     angle_threshold: 45.0,
//!     dead_zone: 15.0,
//!     hold_duration_ms: 800,
//!     cooldown_ms: 1500,
//! })?;
//!
//! // Tilt right past the threshold and hold it
//! assert_eq!(gestures.update(50.0, 0), None);
//! assert_eq!(gestures.update(50.0, 400), None);
//! assert_eq!(gestures.update(50.0, 800), Some(Direction::Right));
//! # Ok(())
//! # }
//! ```
//!
//! ## Running a Tracking Session
//!
//! ```no_run
//! use std::sync::{Arc, Mutex};
//! use nodturn::{
//!     config::Config,
//!     navigation::PageNavigator,
//!     session::{SessionHandle, TrackingSession},
//!     trace::PoseTrace,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> nodturn::Result<()> {
//! let config = Config::default();
//! let trace = PoseTrace::from_path("session.csv", "left_ear", "right_ear")?;
//! let navigator = Arc::new(Mutex::new(PageNavigator::new(12)));
//!
//! let handle = SessionHandle::new();
//! let (frames, poses, clock) = trace.into_replay(&handle);
//! let session = TrackingSession::with_clock(&config, frames, poses, Arc::clone(&navigator), clock, &handle)?;
//!
//! let mut status = handle.subscribe();
//! tokio::spawn(async move {
//!     while status.changed().await.is_ok() {
//!         println!("{:?}", status.borrow().indicator);
//!     }
//! });
//!
//! let summary = session.run().await;
//! println!("{} page turns", summary.triggers);
//! # Ok(())
//! # }
//! ```

/// Roll angle, wraparound and angular velocity math
pub mod angles;

/// Neutral posture calibration
pub mod calibration;

/// Signal filtering algorithms for smoothing roll angles
pub mod filters;

/// Gesture state machine producing page-turn triggers
pub mod gesture;

/// Pose data model and pose/frame source capabilities
pub mod pose;

/// Page navigation collaborator
pub mod navigation;

/// Per-session tracking pipeline
pub mod tracker;

/// Detection loop driver
pub mod session;

/// Recorded pose traces and replay
pub mod trace;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
