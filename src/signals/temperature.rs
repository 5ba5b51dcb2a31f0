//! Display temperature, mapped 1:1 from the signal level.

use serde::{Deserialize, Serialize};

use super::commercial::SignalLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Temperature {
    Hot,
    Warm,
    Cold,
}

impl Temperature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Temperature::Hot => "HOT",
            Temperature::Warm => "WARM",
            Temperature::Cold => "COLD",
        }
    }

    /// Parse a user-supplied filter value (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "HOT" => Some(Temperature::Hot),
            "WARM" => Some(Temperature::Warm),
            "COLD" => Some(Temperature::Cold),
            _ => None,
        }
    }

    /// Queue rank: lower sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            Temperature::Hot => 0,
            Temperature::Warm => 1,
            Temperature::Cold => 2,
        }
    }
}

impl From<SignalLevel> for Temperature {
    fn from(level: SignalLevel) -> Self {
        match level {
            SignalLevel::High => Temperature::Hot,
            SignalLevel::Medium => Temperature::Warm,
            SignalLevel::Low => Temperature::Cold,
        }
    }
}

pub fn temperature_for(level: SignalLevel) -> Temperature {
    Temperature::from(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping() {
        assert_eq!(temperature_for(SignalLevel::High), Temperature::Hot);
        assert_eq!(temperature_for(SignalLevel::Medium), Temperature::Warm);
        assert_eq!(temperature_for(SignalLevel::Low), Temperature::Cold);
    }

    #[test]
    fn test_from_label() {
        assert_eq!(Temperature::from_label("hot"), Some(Temperature::Hot));
        assert_eq!(Temperature::from_label(" Warm "), Some(Temperature::Warm));
        assert_eq!(Temperature::from_label("tepid"), None);
    }

    #[test]
    fn test_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Temperature::Cold).unwrap(), "\"COLD\"");
    }
}
