//! List filters
//!
//! The API filters by instants, the admin picks calendar days. A picked day
//! covers local midnight through 23:59:59.999 local time, sent as UTC
//! ISO-8601.

use crate::error::{AdminError, Result};
use chrono::{DateTime, Local, LocalResult, NaiveDate, SecondsFormat, TimeZone, Utc};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRangeFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRangeFilter {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from > to => Err(AdminError::validation(
                "Start date must be on or before end date",
            )),
            _ => Ok(()),
        }
    }

    /// `(start, end)` instants in the local timezone
    pub fn bounds(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        self.bounds_in(&Local)
    }

    pub fn bounds_in<Tz: TimeZone>(&self, tz: &Tz) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        (
            self.from.and_then(|d| start_of_day(tz, d)),
            self.to.and_then(|d| end_of_day(tz, d)),
        )
    }

    /// Query parameters under the given keys, empty sides omitted
    pub fn query(&self, start_key: &'static str, end_key: &'static str) -> Vec<(&'static str, String)> {
        self.query_in(&Local, start_key, end_key)
    }

    pub fn query_in<Tz: TimeZone>(
        &self,
        tz: &Tz,
        start_key: &'static str,
        end_key: &'static str,
    ) -> Vec<(&'static str, String)> {
        let (start, end) = self.bounds_in(tz);
        let mut query = vec![];
        if let Some(start) = start {
            query.push((start_key, iso(start)));
        }
        if let Some(end) = end {
            query.push((end_key, iso(end)));
        }
        query
    }
}

fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = day.and_hms_opt(0, 0, 0)?;
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(t) => Some(t.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        // Midnight skipped by a DST jump, first instant of the day is an hour on
        LocalResult::None => tz
            .from_local_datetime(&day.and_hms_opt(1, 0, 0)?)
            .earliest()
            .map(|t| t.with_timezone(&Utc)),
    }
}

fn end_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> Option<DateTime<Utc>> {
    let last = day.and_hms_milli_opt(23, 59, 59, 999)?;
    tz.from_local_datetime(&last).latest().map(|t| t.with_timezone(&Utc))
}

fn iso(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}
