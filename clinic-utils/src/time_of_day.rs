use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::ClinicUtilsError;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A wall clock time as minute of the day.
///
/// The range is `00:00` up to and including `24:00` so that a working day
/// or a slot may end exactly at midnight. Textual form is `HH:mm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(MINUTES_PER_DAY as u16);

    pub fn from_minutes(minutes: u32) -> Result<Self, ClinicUtilsError> {
        if minutes > MINUTES_PER_DAY {
            return Err(ClinicUtilsError::MinuteOutOfRange(minutes));
        }
        Ok(Self(minutes as u16))
    }

    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, ClinicUtilsError> {
        if minute > 59 {
            return Err(ClinicUtilsError::InvalidTimeOfDay(format!(
                "{:02}:{:02}",
                hour, minute
            )));
        }
        Self::from_minutes(hour as u32 * 60 + minute as u32)
    }

    pub fn minutes(self) -> u32 {
        self.0 as u32
    }

    pub fn hour(self) -> u8 {
        (self.0 / 60) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % 60) as u8
    }

    pub fn add_minutes(self, minutes: u32) -> Result<Self, ClinicUtilsError> {
        Self::from_minutes(self.minutes() + minutes)
    }

    /// Minutes from `self` until `later`, zero if `later` is not after `self`.
    pub fn minutes_until(self, later: TimeOfDay) -> u32 {
        later.minutes().saturating_sub(self.minutes())
    }
}

impl FromStr for TimeOfDay {
    type Err = ClinicUtilsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || ClinicUtilsError::InvalidTimeOfDay(value.to_string());
        let (hour, minute) = value.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        if hour > 24 || minute > 59 || (hour == 24 && minute != 0) {
            return Err(invalid());
        }
        Self::from_hm(hour, minute)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<time::Time> for TimeOfDay {
    fn from(time: time::Time) -> Self {
        Self(time.hour() as u16 * 60 + time.minute() as u16)
    }
}

impl TryFrom<TimeOfDay> for time::Time {
    type Error = ClinicUtilsError;

    fn try_from(time_of_day: TimeOfDay) -> Result<Self, Self::Error> {
        time::Time::from_hms(time_of_day.hour(), time_of_day.minute(), 0)
            .map_err(|_| ClinicUtilsError::InvalidTimeOfDay(time_of_day.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::time;

    #[test]
    fn test_parse_and_display() {
        let nine = TimeOfDay::from_str("09:00").unwrap();
        assert_eq!(540, nine.minutes());
        assert_eq!("09:00", nine.to_string());
        assert_eq!(
            "16:30",
            TimeOfDay::from_str("16:30").unwrap().to_string()
        );
        assert_eq!(TimeOfDay::END_OF_DAY, TimeOfDay::from_str("24:00").unwrap());
        assert_eq!(555, TimeOfDay::from_str("9:15").unwrap().minutes());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for value in ["", "9", "09:5", "25:00", "24:01", "12:60", "ab:cd", "09:000"] {
            assert!(
                TimeOfDay::from_str(value).is_err(),
                "Expected {:?} to be rejected",
                value
            );
        }
    }

    #[test]
    fn test_add_minutes() {
        let start = TimeOfDay::from_hm(9, 0).unwrap();
        assert_eq!(
            TimeOfDay::from_hm(9, 45).unwrap(),
            start.add_minutes(45).unwrap()
        );
        assert_eq!(
            Err(ClinicUtilsError::MinuteOutOfRange(1441)),
            TimeOfDay::from_hm(23, 59).unwrap().add_minutes(2)
        );
    }

    #[test]
    fn test_time_conversion() {
        assert_eq!(
            TimeOfDay::from_hm(14, 30).unwrap(),
            TimeOfDay::from(time!(14:30:59))
        );
        assert_eq!(
            time!(8:15),
            time::Time::try_from(TimeOfDay::from_hm(8, 15).unwrap()).unwrap()
        );
        assert!(time::Time::try_from(TimeOfDay::END_OF_DAY).is_err());
    }

    #[test]
    fn test_serialize_as_string() {
        let json = serde_json::to_string(&TimeOfDay::from_hm(7, 5).unwrap()).unwrap();
        assert_eq!("\"07:05\"", json);
    }

    #[test]
    fn test_minutes_until() {
        let nine = TimeOfDay::from_hm(9, 0).unwrap();
        let ten = TimeOfDay::from_hm(10, 0).unwrap();
        assert_eq!(60, nine.minutes_until(ten));
        assert_eq!(0, ten.minutes_until(nine));
    }
}
