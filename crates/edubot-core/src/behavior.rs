//! Behavioral stress heuristic.
//!
//! The client measures how the student types and sends a [`BehaviorSignal`]
//! alongside each message. Four independent threshold checks decide whether
//! the student looks stressed; any one firing is enough.

use serde::{Deserialize, Serialize};

/// Relative typing-speed spread above which the student counts as stressed.
pub const TYPING_FLUCTUATION_THRESHOLD: f64 = 0.5;

/// Key-interval standard deviation threshold (milliseconds).
pub const KEY_INTERVAL_STD_THRESHOLD_MS: f64 = 200.0;

/// Consecutive backspaces that count as stressed.
pub const CONSECUTIVE_BACKSPACE_THRESHOLD: u32 = 3;

/// Response interval threshold (milliseconds).
pub const RESPONSE_INTERVAL_THRESHOLD_MS: f64 = 45_000.0;

/// Typing-speed statistics for the message being sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypingSpeed {
    #[serde(default)]
    pub average: Option<f64>,
    /// Defaults to `average` when absent.
    #[serde(default)]
    pub min: Option<f64>,
    /// Defaults to `average` when absent.
    #[serde(default)]
    pub max: Option<f64>,
}

impl TypingSpeed {
    /// Spread of the speed range relative to the average, or `None` when the
    /// average is absent or not positive.
    pub fn fluctuation(&self) -> Option<f64> {
        let average = self.average.unwrap_or(0.0);
        if average <= 0.0 {
            return None;
        }
        let min = self.min.unwrap_or(average);
        let max = self.max.unwrap_or(average);
        Some(((max - min) / average).max((min - max) / average))
    }
}

/// Per-request interaction statistics reported by the client.
///
/// Every field is optional; an absent field can never trigger its check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorSignal {
    #[serde(default)]
    pub typing_speed: Option<TypingSpeed>,
    /// Standard deviation of the interval between key presses (ms).
    #[serde(default)]
    pub key_interval_std: Option<f64>,
    #[serde(default)]
    pub consecutive_backspaces: Option<u32>,
    /// Time since the previous assistant reply (ms).
    #[serde(default)]
    pub response_interval: Option<f64>,
}

impl BehaviorSignal {
    /// Returns true if any stress check fires.
    pub fn is_stressed(&self) -> bool {
        self.typing_fluctuates()
            || self.key_interval_std.unwrap_or(0.0) > KEY_INTERVAL_STD_THRESHOLD_MS
            || self.consecutive_backspaces.unwrap_or(0) >= CONSECUTIVE_BACKSPACE_THRESHOLD
            || self.response_interval.unwrap_or(0.0) > RESPONSE_INTERVAL_THRESHOLD_MS
    }

    fn typing_fluctuates(&self) -> bool {
        self.typing_speed
            .as_ref()
            .and_then(TypingSpeed::fluctuation)
            .is_some_and(|f| f > TYPING_FLUCTUATION_THRESHOLD)
    }
}

/// Stress verdict for an optional signal. No signal means not stressed.
pub fn is_stressed(signal: Option<&BehaviorSignal>) -> bool {
    signal.is_some_and(BehaviorSignal::is_stressed)
}
