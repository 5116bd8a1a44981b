use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulation policy applied when an event is forwarded.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    #[default]
    Normal,
    Offline,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeValidationError {
    InvalidMode,
    InvalidTimeout,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::Normal => "normal",
            DeliveryMode::Offline => "offline",
            DeliveryMode::Timeout => "timeout",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ModeValidationError> {
        match value {
            "normal" => Ok(DeliveryMode::Normal),
            "offline" => Ok(DeliveryMode::Offline),
            "timeout" => Ok(DeliveryMode::Timeout),
            _ => Err(ModeValidationError::InvalidMode),
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate a simulated delay against the configured ceiling.
pub fn validate_timeout_ms(value: i64, max_ms: u32) -> Result<u32, ModeValidationError> {
    if value <= 0 || value > i64::from(max_ms) {
        return Err(ModeValidationError::InvalidTimeout);
    }
    Ok(value as u32)
}
