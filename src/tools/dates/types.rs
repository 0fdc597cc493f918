use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::Serialize;

/// Default event length when only a start time is known.
pub const DEFAULT_DURATION_HOURS: i64 = 2;

/// Default length for festivals, workshops and similar long-form events.
pub const LONG_FORM_DURATION_HOURS: i64 = 4;

/// Parsed start/end dates. A successful parse always sets at least one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: Some(date),
            end: None,
        }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn until(end: NaiveDate) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// True when both ends are known and differ.
    pub fn is_multi_day(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s != e)
    }
}

/// Dates plus an optional same-day time span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Schedule {
    pub dates: Option<DateRange>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

impl Schedule {
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.dates.and_then(|d| d.start)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.dates.and_then(|d| d.end)
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_none() && self.start_time.is_none()
    }

    /// Fill a missing end time from the default duration, clamped to 23:59.
    pub fn with_default_duration(mut self, long_form: bool) -> Self {
        if let (Some(start), None) = (self.start_time, self.end_time) {
            let hours = if long_form {
                LONG_FORM_DURATION_HOURS
            } else {
                DEFAULT_DURATION_HOURS
            };
            let (end, wrapped) = start.overflowing_add_signed(Duration::hours(hours));
            self.end_time = if wrapped != 0 || end < start {
                NaiveTime::from_hms_opt(23, 59, 0)
            } else {
                Some(end.with_second(0).unwrap_or(end))
            };
        }
        self
    }
}
