//! Neutral head orientation calibration.
//!
//! Users rarely hold their head at true vertical. The calibrator averages
//! the first smoothed samples of a session into a neutral angle and reports
//! every later angle as a deviation from it.

use log::info;

use crate::angles::wrap_degrees;

/// Result of feeding a sample to the calibrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationStatus {
    /// Still collecting baseline samples
    Calibrating {
        /// Samples collected so far
        collected: usize,
        /// Samples needed before the baseline is frozen
        required: usize,
    },
    /// Baseline frozen at `neutral_angle` degrees
    Finalized {
        /// Calibrated resting roll angle
        neutral_angle: f64,
    },
}

/// Self-calibrating baseline for the roll angle
#[derive(Debug, Clone)]
pub struct NeutralCalibrator {
    required: usize,
    samples: Vec<f64>,
    neutral_angle: Option<f64>,
}

impl NeutralCalibrator {
    /// Create a calibrator that freezes after `required` samples
    #[must_use]
    pub fn new(required: usize) -> Self {
        assert!(required > 0, "Calibration sample count must be greater than 0");
        Self {
            required,
            samples: Vec::with_capacity(required),
            neutral_angle: None,
        }
    }

    /// Feed one smoothed angle.
    ///
    /// Samples after finalization are ignored; the neutral angle only
    /// changes through [`reset`](Self::reset).
    pub fn observe(&mut self, smoothed_angle: f64) -> CalibrationStatus {
        if let Some(neutral_angle) = self.neutral_angle {
            return CalibrationStatus::Finalized { neutral_angle };
        }

        self.samples.push(smoothed_angle);
        if self.samples.len() < self.required {
            return CalibrationStatus::Calibrating {
                collected: self.samples.len(),
                required: self.required,
            };
        }

        let neutral_angle = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
        self.neutral_angle = Some(neutral_angle);
        info!(
            "Calibration finalized after {} samples, neutral angle {:.2}°",
            self.samples.len(),
            neutral_angle
        );
        CalibrationStatus::Finalized { neutral_angle }
    }

    /// Signed displacement from the neutral angle in `(-180°, 180°]`.
    ///
    /// Returns `None` until calibration has finalized.
    #[must_use]
    pub fn deviation(&self, smoothed_angle: f64) -> Option<f64> {
        self.neutral_angle
            .map(|neutral| wrap_degrees(smoothed_angle - neutral))
    }

    /// Calibrated neutral angle, if finalized
    #[must_use]
    pub const fn neutral_angle(&self) -> Option<f64> {
        self.neutral_angle
    }

    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.neutral_angle.is_some()
    }

    /// Fraction of baseline samples collected, in `0..=1`
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.samples.len() as f64 / self.required as f64
    }

    /// Discard the baseline and start collecting again
    pub fn reset(&mut self) {
        self.samples.clear();
        self.neutral_angle = None;
    }
}
