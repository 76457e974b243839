//! Wall-clock time of day and inclusive time windows.
//!
//! Times are exchanged as "HH:MM" strings. Internally they are kept as
//! seconds from midnight so simulated clocks can advance by fractional
//! travel times without drifting. There is no date component and no
//! wraparound across midnight: advancing past the end of the day saturates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

const SECONDS_PER_MINUTE: u32 = 60;
const SECONDS_PER_HOUR: u32 = 3600;
const LAST_SECOND_OF_DAY: u32 = 24 * SECONDS_PER_HOUR - 1;

/// A time of day, second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(LAST_SECOND_OF_DAY);

    /// Validated constructor: hour below 24, minute below 60.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, PlannerError> {
        if hour > 23 || minute > 59 {
            return Err(PlannerError::InvalidTime(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self(hour * SECONDS_PER_HOUR + minute * SECONDS_PER_MINUTE))
    }

    /// Builds a time from seconds after midnight, saturating at 23:59:59.
    pub const fn from_seconds(seconds: u32) -> Self {
        if seconds > LAST_SECOND_OF_DAY {
            Self(LAST_SECOND_OF_DAY)
        } else {
            Self(seconds)
        }
    }

    /// Seconds since midnight.
    pub fn seconds(self) -> u32 {
        self.0
    }

    /// Hour of day, 0..=23.
    pub fn hour(self) -> u32 {
        self.0 / SECONDS_PER_HOUR
    }

    /// Minute of the hour, 0..=59.
    pub fn minute(self) -> u32 {
        (self.0 % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE
    }

    /// Drops the seconds component. Window membership is judged per minute.
    pub fn truncate_to_minute(self) -> Self {
        Self(self.0 - self.0 % SECONDS_PER_MINUTE)
    }

    /// Advances by a (possibly fractional) number of seconds.
    pub fn advance(self, seconds: f64) -> Self {
        if !seconds.is_finite() || seconds <= 0.0 {
            return self;
        }
        let advanced = self.0 as f64 + seconds.round();
        if advanced >= LAST_SECOND_OF_DAY as f64 {
            Self::END_OF_DAY
        } else {
            Self(advanced as u32)
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PlannerError::InvalidTime(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = PlannerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Closed interval `[start, end]` within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(TimeOfDay, TimeOfDay)", into = "(TimeOfDay, TimeOfDay)")]
pub struct TimeWindow {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TimeWindow {
    /// Inclusive window. Fails when `start` is after `end`.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, PlannerError> {
        if start > end {
            return Err(PlannerError::InvalidTimeWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses a window from two "HH:MM" strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, PlannerError> {
        Self::new(start.parse()?, end.parse()?)
    }

    /// The whole day, 00:00 through 23:59.
    pub fn all_day() -> Self {
        Self {
            start: TimeOfDay::MIDNIGHT,
            end: TimeOfDay::END_OF_DAY.truncate_to_minute(),
        }
    }

    /// First minute of the window.
    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    /// Last minute of the window, inclusive.
    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    /// Inclusive membership at minute precision: 10:30:45 is inside a window
    /// ending at 10:30.
    pub fn contains(&self, time: TimeOfDay) -> bool {
        let time = time.truncate_to_minute();
        self.start <= time && time <= self.end
    }
}

impl TryFrom<(TimeOfDay, TimeOfDay)> for TimeWindow {
    type Error = PlannerError;

    fn try_from((start, end): (TimeOfDay, TimeOfDay)) -> Result<Self, Self::Error> {
        Self::new(start, end)
    }
}

impl From<TimeWindow> for (TimeOfDay, TimeOfDay) {
    fn from(window: TimeWindow) -> Self {
        (window.start, window.end)
    }
}
