//! Race-weekend sessions: which one is next, how long until it starts, and
//! whether one is running right now.
//!
//! The API gives each session as a separate `date` + `time` pair in UTC.
//! Everything here works on [`DateTime<Utc>`] and takes `now` as a parameter,
//! so the UI decides which clock to use and tests can pin it.

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::debug;

use crate::f1::model::{Race, SessionTime};

/// A session that could be the next thing to count down to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCandidate {
    pub label: String,
    pub instant: DateTime<Utc>,
}

/// Combine an API date and time into an instant.
///
/// The API sometimes omits the trailing `Z`; it is always UTC.  A missing
/// time means the session has not been scheduled to the minute yet.
pub fn parse_session(label: &str, date: &str, time: Option<&str>) -> Option<SessionCandidate> {
    let time = time.filter(|t| !t.is_empty())?;
    let stamp = if time.ends_with('Z') {
        format!("{date}T{time}")
    } else {
        format!("{date}T{time}Z")
    };

    match DateTime::parse_from_rfc3339(&stamp) {
        Ok(t) => Some(SessionCandidate {
            label: label.to_string(),
            instant: t.with_timezone(&Utc),
        }),
        Err(e) => {
            debug!(session = label, %stamp, error = %e, "unparseable session time");
            None
        }
    }
}

/// Every timed session of a race weekend, in weekend order.
pub fn weekend_sessions(race: &Race) -> Vec<SessionCandidate> {
    let optional: [(&str, &Option<SessionTime>); 6] = [
        ("Practice 1", &race.first_practice),
        ("Practice 2", &race.second_practice),
        ("Practice 3", &race.third_practice),
        ("Sprint Qualifying", &race.sprint_qualifying),
        ("Sprint", &race.sprint),
        ("Qualifying", &race.qualifying),
    ];

    let mut sessions: Vec<_> = optional
        .into_iter()
        .filter_map(|(label, s)| {
            let s = s.as_ref()?;
            parse_session(label, &s.date, s.time.as_deref())
        })
        .collect();
    sessions.extend(parse_session("Race", &race.date, race.time.as_deref()));
    sessions
}

/// The closest session strictly after `now`.
pub fn next_session(race: &Race, now: DateTime<Utc>) -> Option<SessionCandidate> {
    weekend_sessions(race)
        .into_iter()
        .filter(|s| s.instant > now)
        .min_by_key(|s| s.instant)
}

/// Countdown status line for the header bar.
pub fn countdown_text(race: Option<&Race>, now: DateTime<Utc>) -> String {
    let Some(race) = race else {
        return "Next: N/A".into();
    };
    match next_session(race, now) {
        Some(next) => format!(
            "Next: {} - {} in {}",
            race.race_name,
            next.label,
            Countdown(next.instant - now)
        ),
        None if weekend_sessions(race).is_empty() => "Next: N/A".into(),
        None => "Next session started".into(),
    }
}

/// `1w 2d 03h 04m 05s`, dropping leading zero weeks and days.
pub struct Countdown(pub Duration);

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.0.num_seconds().max(0);
        let weeks = total / (7 * 24 * 3600);
        let days = (total % (7 * 24 * 3600)) / (24 * 3600);
        let hours = (total % (24 * 3600)) / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;

        if weeks > 0 {
            write!(f, "{weeks}w {days}d {hours:02}h {minutes:02}m {seconds:02}s")
        } else if days > 0 {
            write!(f, "{days}d {hours:02}h {minutes:02}m {seconds:02}s")
        } else {
            write!(f, "{hours:02}h {minutes:02}m {seconds:02}s")
        }
    }
}

/// Whether a session is live (or about to be) at `now`.
///
/// Each session type shows as live some minutes before its start and for
/// its typical length afterwards.
pub fn is_session_active(label: &str, start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let (early, length) = match label {
        l if l.starts_with("Practice") => (15, 60),
        "Sprint Qualifying" => (15, 60),
        "Qualifying" | "Sprint" => (30, 90),
        "Race" => (60, 120),
        _ => return false,
    };
    let visible_from = start - Duration::minutes(early);
    let ends = start + Duration::minutes(length);
    now > visible_from && now < ends
}

/// Clock time in `tz`, 24-hour or 12-hour.
pub fn format_clock<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz, use_24h: bool) -> String
where
    Tz::Offset: fmt::Display,
{
    let local = instant.with_timezone(tz);
    if use_24h {
        local.format("%H:%M").to_string()
    } else {
        local.format("%-I:%M %p").to_string()
    }
}
