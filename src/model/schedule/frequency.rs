use crate::model::error::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hourly" => Ok(Frequency::Hourly),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(ConfigError::invalid_frequency(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_frequencies_case_insensitively() {
        assert_eq!("hourly".parse::<Frequency>().ok(), Some(Frequency::Hourly));
        assert_eq!(" Daily ".parse::<Frequency>().ok(), Some(Frequency::Daily));
        assert_eq!("WEEKLY".parse::<Frequency>().ok(), Some(Frequency::Weekly));
        assert_eq!("monthly".parse::<Frequency>().ok(), Some(Frequency::Monthly));
    }

    #[test]
    fn unknown_frequency_is_a_config_error() {
        let error = "fortnightly".parse::<Frequency>().unwrap_err();
        assert!(matches!(error, ConfigError::InvalidFrequency { ref value } if value == "fortnightly"));
    }
}
