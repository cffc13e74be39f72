//! Pose data model and the capabilities the tracker consumes.
//!
//! The pose-estimation model and the video capture pipeline are external
//! collaborators. They are consumed through [`PoseSource`] and
//! [`FrameSource`]; the tracker only ever reads the first pose of a result
//! set and two named keypoints from it.

use std::future::Future;

use crate::Result;

/// Named anatomical landmark in pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct Keypoint {
    /// Landmark name, e.g. `left_ear`
    pub name: String,
    /// Horizontal pixel coordinate
    pub x: f64,
    /// Vertical pixel coordinate (grows downwards)
    pub y: f64,
    /// Confidence in `0..=1`; `None` means not observed
    pub score: Option<f64>,
}

impl Keypoint {
    /// Create a new keypoint
    pub fn new(name: impl Into<String>, x: f64, y: f64, score: Option<f64>) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            score,
        }
    }

    /// Whether the keypoint was observed with confidence above `min_score`
    #[must_use]
    pub fn is_confident(&self, min_score: f64) -> bool {
        self.score.is_some_and(|score| score > min_score) && self.x.is_finite() && self.y.is_finite()
    }
}

/// Keypoints for one detected subject
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
    /// Ordered keypoints as produced by the model
    pub keypoints: Vec<Keypoint>,
    /// Overall pose confidence
    pub score: Option<f64>,
}

impl Pose {
    /// Create a pose from its keypoints
    #[must_use]
    pub fn new(keypoints: Vec<Keypoint>, score: Option<f64>) -> Self {
        Self { keypoints, score }
    }

    /// Look up a keypoint by name
    #[must_use]
    pub fn keypoint(&self, name: &str) -> Option<&Keypoint> {
        self.keypoints.iter().find(|kp| kp.name == name)
    }
}

/// Outcome of looking for the roll reference points in a pose result set
#[derive(Debug, Clone, PartialEq)]
pub enum Detection<'a> {
    /// The result set was empty
    NoPose,
    /// A subject was found but a reference point is missing or unconfident
    LowConfidence,
    /// Both reference points, ordered viewer-left first
    Ready {
        /// Reference point with the smaller image x
        left: &'a Keypoint,
        /// Reference point with the larger image x
        right: &'a Keypoint,
    },
}

/// Picks the two roll reference keypoints out of a pose result set
#[derive(Debug, Clone)]
pub struct ReferenceSelector {
    left_name: String,
    right_name: String,
    min_score: f64,
}

impl ReferenceSelector {
    /// Create a selector for the named keypoints
    pub fn new(left_name: impl Into<String>, right_name: impl Into<String>, min_score: f64) -> Self {
        Self {
            left_name: left_name.into(),
            right_name: right_name.into(),
            min_score,
        }
    }

    /// Select the reference points from the first pose.
    ///
    /// Points are returned in image order so the neutral roll sits near 0°
    /// whether or not the camera feed is mirrored.
    #[must_use]
    pub fn select<'a>(&self, poses: &'a [Pose]) -> Detection<'a> {
        let Some(pose) = poses.first() else {
            return Detection::NoPose;
        };

        let (Some(a), Some(b)) = (pose.keypoint(&self.left_name), pose.keypoint(&self.right_name)) else {
            return Detection::LowConfidence;
        };
        if !a.is_confident(self.min_score) || !b.is_confident(self.min_score) {
            return Detection::LowConfidence;
        }

        if a.x <= b.x {
            Detection::Ready { left: a, right: b }
        } else {
            Detection::Ready { left: b, right: a }
        }
    }
}

/// Supplies video frames; `None` while the capture device is not ready
pub trait FrameSource {
    /// Frame handle handed to the pose source
    type Frame;

    /// Latest ready frame, if any
    fn latest_frame(&mut self) -> Option<Self::Frame>;
}

/// Pose-estimation capability
///
/// An empty result is a valid "nothing detected" outcome. Errors are
/// treated as transient and only cost the current tick.
pub trait PoseSource<F> {
    /// Estimate poses on one frame
    fn estimate(&mut self, frame: &F) -> impl Future<Output = Result<Vec<Pose>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ears(left: (f64, f64, Option<f64>), right: (f64, f64, Option<f64>)) -> Vec<Pose> {
        vec![Pose::new(
            vec![
                Keypoint::new("nose", 0.0, 0.0, Some(0.9)),
                Keypoint::new("left_ear", left.0, left.1, left.2),
                Keypoint::new("right_ear", right.0, right.1, right.2),
            ],
            Some(0.8),
        )]
    }

    #[test]
    fn test_select_orders_by_image_x() {
        let selector = ReferenceSelector::new("left_ear", "right_ear", 0.3);
        // Subject's left ear appears on the viewer's right
        let poses = ears((300.0, 110.0, Some(0.9)), (200.0, 100.0, Some(0.9)));
        match selector.select(&poses) {
            Detection::Ready { left, right } => {
                assert_eq!(left.name, "right_ear");
                assert_eq!(right.name, "left_ear");
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[test]
    fn test_select_empty_result() {
        let selector = ReferenceSelector::new("left_ear", "right_ear", 0.3);
        assert_eq!(selector.select(&[]), Detection::NoPose);
    }

    #[test]
    fn test_select_low_confidence() {
        let selector = ReferenceSelector::new("left_ear", "right_ear", 0.3);
        let poses = ears((100.0, 100.0, Some(0.29)), (200.0, 100.0, Some(0.9)));
        assert_eq!(selector.select(&poses), Detection::LowConfidence);

        let poses = ears((100.0, 100.0, None), (200.0, 100.0, Some(0.9)));
        assert_eq!(selector.select(&poses), Detection::LowConfidence);

        // The floor itself is not enough
        let poses = ears((100.0, 100.0, Some(0.3)), (200.0, 100.0, Some(0.9)));
        assert_eq!(selector.select(&poses), Detection::LowConfidence);
    }

    #[test]
    fn test_select_missing_keypoint() {
        let selector = ReferenceSelector::new("left_ear", "right_ear", 0.3);
        let poses = vec![Pose::new(vec![Keypoint::new("left_ear", 1.0, 1.0, Some(1.0))], None)];
        assert_eq!(selector.select(&poses), Detection::LowConfidence);
    }

    #[test]
    fn test_only_first_pose_is_used() {
        let selector = ReferenceSelector::new("left_ear", "right_ear", 0.3);
        let mut poses = ears((100.0, 100.0, Some(0.1)), (200.0, 100.0, Some(0.1)));
        poses.extend(ears((100.0, 100.0, Some(0.9)), (200.0, 100.0, Some(0.9))));
        assert_eq!(selector.select(&poses), Detection::LowConfidence);
    }
}
