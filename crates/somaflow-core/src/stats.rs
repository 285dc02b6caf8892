//! Weekly counts and the summary/progress views built on history.
//!
//! A week runs from Sunday 00:00 local time (inclusive) to the following
//! Sunday 00:00 (exclusive), in the time zone of the supplied `now`.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone};
use serde::Serialize;

use crate::storage::SessionRecord;

/// Sessions shown in the progress view's recent list.
pub const RECENT_SESSIONS: usize = 20;

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// `[start, end)` of the calendar week containing `now`.
///
/// `None` only when local midnight does not exist on both boundary days
/// (a time zone skipping midnight twice in a week).
pub fn week_bounds<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<(DateTime<Tz>, DateTime<Tz>)> {
    let today = now.date_naive();
    let start_date = today.checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_sunday())))?;
    let end_date = start_date.checked_add_days(Days::new(7))?;
    let tz = now.timezone();
    Some((local_midnight(&tz, start_date)?, local_midnight(&tz, end_date)?))
}

/// First instant of `date` in `tz`. Where midnight falls in a DST gap the
/// day starts at the first valid hour.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    (0..3).find_map(|hour| {
        let naive = date.and_hms_opt(hour, 0, 0)?;
        tz.from_local_datetime(&naive).earliest()
    })
}

fn in_week<'a, Tz: TimeZone>(
    records: &'a [SessionRecord],
    now: &DateTime<Tz>,
) -> impl Iterator<Item = DateTime<Tz>> + 'a
where
    Tz: 'a,
{
    let bounds = week_bounds(now);
    let tz = now.timezone();
    records.iter().filter_map(move |record| {
        let (start, end) = bounds.as_ref()?;
        let Some(ts) = record.timestamp() else {
            tracing::debug!(date = %record.date, "skipping session with malformed date");
            return None;
        };
        let local = ts.with_timezone(&tz);
        (local >= *start && local < *end).then_some(local)
    })
}

/// How many of `records` were completed during the week containing `now`.
pub fn count_sessions_this_week<Tz: TimeZone>(records: &[SessionRecord], now: &DateTime<Tz>) -> usize {
    in_week(records, now).count()
}

/// Days of the current week with at least one session, Sunday first.
pub fn completed_days<Tz: TimeZone>(records: &[SessionRecord], now: &DateTime<Tz>) -> [bool; 7] {
    let mut days = [false; 7];
    for local in in_week(records, now) {
        days[local.weekday().num_days_from_sunday() as usize] = true;
    }
    days
}

/// What the post-session screen shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub last_session: Option<SessionRecord>,
    pub last_session_description: Option<&'static str>,
    pub total_sessions: u64,
    pub sessions_this_week: usize,
}

impl Summary {
    pub fn build<Tz: TimeZone>(history: &[SessionRecord], total_sessions: u64, now: &DateTime<Tz>) -> Self {
        let last_session = history.first().cloned();
        Self {
            last_session_description: last_session
                .as_ref()
                .map(|s| s.technique.technique().description),
            last_session,
            total_sessions,
            sessions_this_week: count_sessions_this_week(history, now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayMark {
    pub day: &'static str,
    pub completed: bool,
}

/// What the progress tab shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressReport {
    pub total_sessions: u64,
    pub sessions_this_week: usize,
    pub week: Vec<DayMark>,
    pub recent: Vec<SessionRecord>,
}

impl ProgressReport {
    pub fn build<Tz: TimeZone>(history: &[SessionRecord], total_sessions: u64, now: &DateTime<Tz>) -> Self {
        let week = WEEKDAY_NAMES
            .iter()
            .zip(completed_days(history, now))
            .map(|(&day, completed)| DayMark { day, completed })
            .collect();
        Self {
            total_sessions,
            sessions_this_week: count_sessions_this_week(history, now),
            week,
            recent: history.iter().take(RECENT_SESSIONS).cloned().collect(),
        }
    }
}
