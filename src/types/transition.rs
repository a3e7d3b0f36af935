//! Transition durations.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Duration of a state transition, in deciseconds.
///
/// Applies only to the request it is attached to; the bridge does not remember it.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(transparent)]
pub struct TransitionTime {
    pub(crate) deciseconds: u16,
}

impl TransitionTime {
    /// The bridge default, 400ms.
    pub const DEFAULT: TransitionTime = TransitionTime { deciseconds: 4 };

    pub fn from_deciseconds(deciseconds: u16) -> Self {
        TransitionTime { deciseconds }
    }

    /// Round fractional deciseconds to the nearest integer.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_bridge_rs::TransitionTime;
    ///
    /// assert_eq!(TransitionTime::rounded(2.6).deciseconds(), 3);
    /// assert_eq!(TransitionTime::rounded(-1.0).deciseconds(), 0);
    /// ```
    pub fn rounded(deciseconds: f64) -> Self {
        let clamped = deciseconds.round().clamp(0.0, u16::MAX as f64);
        TransitionTime {
            deciseconds: clamped as u16,
        }
    }

    pub fn deciseconds(&self) -> u16 {
        self.deciseconds
    }

    pub fn as_secs_f32(&self) -> f32 {
        self.deciseconds as f32 / 10.0
    }
}

impl From<Duration> for TransitionTime {
    fn from(duration: Duration) -> Self {
        Self::rounded(duration.as_secs_f64() * 10.0)
    }
}

impl From<TransitionTime> for Duration {
    fn from(time: TransitionTime) -> Self {
        Duration::from_millis(time.deciseconds as u64 * 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_duration() {
        assert_eq!(
            TransitionTime::from(Duration::from_millis(1500)).deciseconds(),
            15
        );
        assert_eq!(
            TransitionTime::from(Duration::from_millis(149)).deciseconds(),
            1
        );
        assert_eq!(
            Duration::from(TransitionTime::from_deciseconds(4)),
            Duration::from_millis(400)
        );
    }
}
