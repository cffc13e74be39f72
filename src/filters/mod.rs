//! Temporal smoothing of roll angle samples.
//!
//! Raw roll angles from successive frames jitter by a few degrees; the
//! tracker runs them through an [`AngleFilter`] before computing velocity
//! or deviation.

/// Moving average filter for simple smoothing
pub mod moving_average;

use crate::Result;

/// Trait for all angle filters
pub trait AngleFilter: Send + Sync {
    /// Add a raw sample and return the smoothed angle
    fn apply(&mut self, angle: f64) -> f64;

    /// Reset filter state so the next sample starts fresh
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes through values unchanged
pub struct NoFilter;

impl AngleFilter for NoFilter {
    fn apply(&mut self, angle: f64) -> f64 {
        angle
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// Create an angle filter from a type name with optional parameter,
/// e.g. `none`, `moving_average` or `moving_average:3`.
pub fn create_filter(description: &str) -> Result<Box<dyn AngleFilter>> {
    let lowered = description.to_lowercase();
    let mut parts = lowered.split(':');
    let name = parts.next().unwrap_or_default();
    let param = parts.next();
    if parts.next().is_some() {
        return Err(crate::Error::FilterError(format!("Too many filter parameters: {description}")));
    }

    match name {
        "none" | "nofilter" => match param {
            None => Ok(Box::new(NoFilter)),
            Some(_) => Err(crate::Error::FilterError("NoFilter takes no parameters".to_string())),
        },
        "moving_average" | "movingaverage" => {
            let window = match param {
                Some(raw) => raw
                    .parse::<usize>()
                    .map_err(|_| crate::Error::FilterError(format!("Invalid window size: {raw}")))?,
                None => crate::constants::DEFAULT_MOVING_AVERAGE_WINDOW,
            };
            if window == 0 {
                return Err(crate::Error::FilterError("Window size must be greater than 0".to_string()));
            }
            Ok(Box::new(moving_average::MovingAverageFilter::new(window)))
        }
        _ => Err(crate::Error::FilterError(format!("Unknown filter type: {description}"))),
    }
}
