use crate::model::error::config::ConfigError;
use crate::model::schedule::frequency::Frequency;
use chrono::{DateTime, Duration, Months, Utc};

/// Next due timestamp one step after `current`.
///
/// Monthly steps keep the day of month and clamp to the last day of shorter
/// months, so Jan 31 becomes Feb 28 (or Feb 29 in a leap year).
pub fn next(current: DateTime<Utc>, frequency: Frequency) -> Result<DateTime<Utc>, ConfigError> {
    let next = match frequency {
        Frequency::Hourly => current.checked_add_signed(Duration::hours(1)),
        Frequency::Daily => current.checked_add_signed(Duration::days(1)),
        Frequency::Weekly => current.checked_add_signed(Duration::days(7)),
        Frequency::Monthly => current.checked_add_months(Months::new(1)),
    };
    match next {
        Some(next) if next > current => Ok(next),
        _ => Err(ConfigError::due_date_out_of_range(current)),
    }
}
