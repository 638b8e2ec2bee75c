mod day_of_week;
mod time_of_day;

pub use day_of_week::DayOfWeek;
pub use time_of_day::{MINUTES_PER_DAY, TimeOfDay};

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClinicUtilsError {
    #[error("Invalid time of day: {0}")]
    InvalidTimeOfDay(String),

    #[error("Minute of day out of range: {0}")]
    MinuteOutOfRange(u32),

    #[error("Invalid day of week number: {0}")]
    InvalidDayOfWeek(u8),
}

/// Implement `From<T>` for a type which already implement From<&T>
#[macro_export]
macro_rules! derive_from_reference {
    ($from_type:ty, $impl_type:ty) => {
        impl From<$from_type> for $impl_type {
            fn from(value: $from_type) -> Self {
                Self::from(&value)
            }
        }
    };
}
