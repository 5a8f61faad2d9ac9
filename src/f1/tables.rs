//! Turn decoded payloads into rows of text for the table widget.
//!
//! Builders are pure: the current time and display preferences come in via
//! [`TableContext`], so the same payload can be re-rendered every frame
//! (the "Next" marker and live indicators move with the clock).

use chrono::{DateTime, FixedOffset, Utc};

use super::model::{
    ConstructorStandingsResponse, DriverStandingsResponse, Race, ResultItem, ResultsResponse,
    ScheduleResponse, SessionTime,
};
use super::Payload;
use crate::session::{format_clock, is_session_active, parse_session};

/// Inputs that change between frames, not between fetches.
#[derive(Debug, Clone, Copy)]
pub struct TableContext {
    pub now: DateTime<Utc>,
    pub offset: FixedOffset,
    pub use_24h: bool,
}

/// A titled grid of cells, or a message when there is nothing to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableView {
    pub title: String,
    pub header: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    /// Row to emphasise (the next race on the schedule).
    pub marked: Option<usize>,
    pub message: Option<String>,
}

impl TableView {
    fn message(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

pub fn build(payload: &Payload, ctx: &TableContext) -> TableView {
    match payload {
        Payload::Schedule(s) => schedule(s, ctx),
        Payload::Upcoming(s) => upcoming(s, ctx),
        Payload::DriverStandings(s) => driver_standings(s),
        Payload::ConstructorStandings(s) => constructor_standings(s),
        Payload::RaceResults(r) => race_results(r),
        Payload::Qualifying(r) => qualifying(r),
        Payload::Sprint(r) => sprint(r),
    }
}

fn race_start(race: &Race) -> Option<DateTime<Utc>> {
    parse_session("Race", &race.date, race.time.as_deref()).map(|s| s.instant)
}

/// Index of the first race that has not started yet.
pub fn next_race_index(races: &[Race], now: DateTime<Utc>) -> Option<usize> {
    races
        .iter()
        .position(|r| race_start(r).is_some_and(|t| t > now))
}

fn schedule(resp: &ScheduleResponse, ctx: &TableContext) -> TableView {
    let races = resp.races();
    let season = &resp.mr_data.race_table.season;
    if races.is_empty() {
        return TableView::message(format!("Schedule – {season}"), "No races scheduled.");
    }

    let next = next_race_index(races, ctx.now);
    let rows = races
        .iter()
        .enumerate()
        .map(|(i, race)| {
            let finished = race_start(race).is_some_and(|t| t <= ctx.now);
            let round = if Some(i) == next {
                "Next".to_string()
            } else {
                race.round.clone()
            };
            let name = if finished {
                format!("{} 🏁", race.race_name)
            } else {
                race.race_name.clone()
            };
            let loc = &race.circuit.location;
            vec![
                round,
                name,
                race.circuit.circuit_name.clone(),
                format!("{}, {}", loc.locality, loc.country),
                race.date.clone(),
            ]
        })
        .collect();

    TableView {
        title: format!("Schedule – {season}"),
        header: vec!["Round", "Race", "Circuit", "Location", "Date"],
        rows,
        marked: next,
        message: None,
    }
}

fn upcoming(resp: &ScheduleResponse, ctx: &TableContext) -> TableView {
    let Some(race) = resp.races().first() else {
        return TableView::message("Upcoming", "No upcoming races available.");
    };

    let race_time = SessionTime {
        date: race.date.clone(),
        time: race.time.clone(),
    };
    let mut sessions: Vec<(&str, Option<&SessionTime>)> = vec![
        ("Practice 1", race.first_practice.as_ref()),
        ("Practice 2", race.second_practice.as_ref()),
        ("Practice 3", race.third_practice.as_ref()),
        ("Sprint Qualifying", race.sprint_qualifying.as_ref()),
        ("Sprint", race.sprint.as_ref()),
        ("Qualifying", race.qualifying.as_ref()),
    ];
    sessions.retain(|(_, s)| s.is_some_and(|s| !s.date.is_empty()));
    sessions.push(("Race", Some(&race_time)));

    let rows = sessions
        .into_iter()
        .filter_map(|(label, s)| s.map(|s| (label, s)))
        .map(|(label, s)| match parse_session(label, &s.date, s.time.as_deref()) {
            Some(c) => {
                let local = c.instant.with_timezone(&ctx.offset);
                let mut time = format_clock(c.instant, &ctx.offset, ctx.use_24h);
                if is_session_active(label, c.instant, ctx.now) {
                    time.push_str("  ● LIVE");
                }
                vec![label.to_string(), local.format("%Y-%m-%d").to_string(), time]
            }
            None => vec![
                label.to_string(),
                s.date.clone(),
                s.time.clone().unwrap_or_else(|| "TBC".into()),
            ],
        })
        .collect();

    TableView {
        title: format!(
            "Upcoming: {} at {}",
            race.race_name, race.circuit.circuit_name
        ),
        header: vec!["Session", "Date", "Time"],
        rows,
        marked: None,
        message: None,
    }
}

fn driver_standings(resp: &DriverStandingsResponse) -> TableView {
    let season = &resp.mr_data.standings_table.season;
    let title = format!("Driver Standings – {season}");
    let standings = resp.standings();
    if standings.is_empty() {
        return TableView::message(title, "No driver standings available.");
    }

    let rows = standings
        .iter()
        .map(|s| {
            let team = s
                .constructors
                .first()
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "—".into());
            vec![
                s.position.clone(),
                s.driver.full_name(),
                s.driver.nationality.clone(),
                team,
                s.points.clone(),
                s.wins.clone(),
            ]
        })
        .collect();

    TableView {
        title,
        header: vec!["Pos", "Driver", "Nationality", "Constructor", "Points", "Wins"],
        rows,
        marked: None,
        message: None,
    }
}

fn constructor_standings(resp: &ConstructorStandingsResponse) -> TableView {
    let season = &resp.mr_data.standings_table.season;
    let title = format!("Constructor Standings – {season}");
    let standings = resp.standings();
    if standings.is_empty() {
        return TableView::message(title, "No constructor standings available.");
    }

    let rows = standings
        .iter()
        .map(|s| {
            vec![
                s.position.clone(),
                s.constructor.name.clone(),
                s.constructor.nationality.clone(),
                s.points.clone(),
                s.wins.clone(),
            ]
        })
        .collect();

    TableView {
        title,
        header: vec!["Pos", "Constructor", "Nationality", "Points", "Wins"],
        rows,
        marked: None,
        message: None,
    }
}

const RESULT_HEADER: [&str; 9] = [
    "Pos", "No", "Driver", "Constructor", "Grid", "Laps", "Time/Status", "Points", "Fastest Lap",
];

fn result_rows(items: &[ResultItem]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|r| {
            let finish = r
                .time
                .as_ref()
                .map(|t| t.time.clone())
                .unwrap_or_else(|| r.status.clone());
            let fastest = r
                .fastest_lap
                .as_ref()
                .map(|f| f.time.time.clone())
                .unwrap_or_default();
            let pos = if r.position_text.is_empty() {
                r.position.clone()
            } else {
                r.position_text.clone()
            };
            vec![
                pos,
                r.number.clone(),
                r.driver.full_name(),
                r.constructor.name.clone(),
                r.grid.clone(),
                r.laps.clone(),
                finish,
                r.points.clone(),
                fastest,
            ]
        })
        .collect()
}

fn race_results(resp: &ResultsResponse) -> TableView {
    match resp.race() {
        Some(race) if !race.results.is_empty() => TableView {
            title: format!(
                "Race Results for {} – {}",
                race.race_name, race.circuit.circuit_name
            ),
            header: RESULT_HEADER.to_vec(),
            rows: result_rows(&race.results),
            marked: None,
            message: None,
        },
        _ => TableView::message("Race Results", "No race results available."),
    }
}

fn qualifying(resp: &ResultsResponse) -> TableView {
    let Some(race) = resp.race().filter(|r| !r.qualifying_results.is_empty()) else {
        return TableView::message("Qualifying", "No qualifying results available.");
    };

    let rows = race
        .qualifying_results
        .iter()
        .map(|q| {
            vec![
                q.position.clone(),
                q.number.clone(),
                q.driver.full_name(),
                q.constructor.name.clone(),
                q.q1.clone().unwrap_or_default(),
                q.q2.clone().unwrap_or_default(),
                q.q3.clone().unwrap_or_default(),
            ]
        })
        .collect();

    TableView {
        title: format!(
            "Qualifying Results for {} – {}",
            race.race_name, race.circuit.circuit_name
        ),
        header: vec!["Pos", "No", "Driver", "Constructor", "Q1", "Q2", "Q3"],
        rows,
        marked: None,
        message: None,
    }
}

fn sprint(resp: &ResultsResponse) -> TableView {
    match resp.race() {
        Some(race) if !race.sprint_results.is_empty() => TableView {
            title: format!(
                "Sprint Results for {} – {}",
                race.race_name, race.circuit.circuit_name
            ),
            header: RESULT_HEADER.to_vec(),
            rows: result_rows(&race.sprint_results),
            marked: None,
            message: None,
        },
        Some(race) => TableView::message(
            format!(
                "Sprint Results for {} at {}",
                race.race_name, race.circuit.circuit_name
            ),
            "Not a Sprint Race event.",
        ),
        None => TableView::message(
            "Sprint Results for Unknown Race at Unknown Circuit",
            "Not a Sprint Race event.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::f1::{fixtures, Feed, Selection, DEFAULT_API_BASE};

    fn ctx(now: &str) -> TableContext {
        TableContext {
            now: DateTime::parse_from_rfc3339(now).unwrap().with_timezone(&Utc),
            offset: FixedOffset::east_opt(0).unwrap(),
            use_24h: true,
        }
    }

    fn view(feed: Feed, body: &str, now: &str) -> TableView {
        let payload = feed
            .endpoint(DEFAULT_API_BASE, &Selection::new("2025"))
            .decode(body.as_bytes())
            .unwrap();
        build(&payload, &ctx(now))
    }

    #[test]
    fn schedule_marks_next_and_finished_races() {
        let v = view(Feed::Schedule, fixtures::SCHEDULE, "2025-03-20T00:00:00Z");

        assert_eq!(v.title, "Schedule – 2025");
        assert_eq!(v.rows.len(), 3);
        assert_eq!(v.marked, Some(1));
        assert_eq!(v.rows[1][0], "Next");
        assert_eq!(v.rows[0][1], "Australian Grand Prix 🏁");
        assert_eq!(v.rows[2][1], "Japanese Grand Prix");
        assert_eq!(v.rows[0][3], "Melbourne, Australia");
    }

    #[test]
    fn schedule_after_season_has_no_next() {
        let v = view(Feed::Schedule, fixtures::SCHEDULE, "2026-01-01T00:00:00Z");
        assert_eq!(v.marked, None);
        assert!(v.rows.iter().all(|r| r[1].ends_with('🏁')));
    }

    #[test]
    fn upcoming_lists_sessions_with_live_marker() {
        let v = view(Feed::Upcoming, fixtures::NEXT_RACE, "2025-04-05T06:10:00Z");

        assert_eq!(v.title, "Upcoming: Japanese Grand Prix at Suzuka Circuit");
        let labels: Vec<_> = v.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(
            labels,
            ["Practice 1", "Practice 2", "Practice 3", "Qualifying", "Race"]
        );
        assert_eq!(v.rows[3][1], "2025-04-05");
        assert_eq!(v.rows[3][2], "06:00  ● LIVE");
        assert_eq!(v.rows[4][2], "05:00");
    }

    #[test]
    fn standings_tables() {
        let d = view(Feed::DriverStandings, fixtures::DRIVER_STANDINGS, "2025-04-01T00:00:00Z");
        assert_eq!(d.title, "Driver Standings – 2025");
        assert_eq!(d.rows[0], ["1", "Lando Norris", "British", "McLaren", "44", "1"]);
        assert_eq!(d.rows[1][3], "—");

        let c = view(
            Feed::ConstructorStandings,
            fixtures::CONSTRUCTOR_STANDINGS,
            "2025-04-01T00:00:00Z",
        );
        assert_eq!(c.rows[0], ["1", "McLaren", "British", "78", "2"]);
    }

    #[test]
    fn race_results_fall_back_to_status() {
        let v = view(Feed::RaceResults, fixtures::RACE_RESULTS, "2025-04-01T00:00:00Z");
        assert_eq!(
            v.title,
            "Race Results for Chinese Grand Prix – Shanghai International Circuit"
        );
        assert_eq!(v.rows[0][6], "1:30:55.026");
        assert_eq!(v.rows[0][8], "1:35.520");
        assert_eq!(v.rows[1][0], "D");
        assert_eq!(v.rows[1][6], "Disqualified");
    }

    #[test]
    fn qualifying_blanks_missing_segments() {
        let v = view(Feed::Qualifying, fixtures::QUALIFYING, "2025-04-01T00:00:00Z");
        assert_eq!(v.rows[1][4], "1:32.323");
        assert_eq!(v.rows[1][5], "");
        assert_eq!(v.rows[1][6], "");
    }

    #[test]
    fn empty_feeds_render_messages() {
        let v = view(Feed::Sprint, fixtures::NO_SPRINT, "2025-04-01T00:00:00Z");
        assert_eq!(v.message.as_deref(), Some("Not a Sprint Race event."));
        assert!(v.rows.is_empty());

        let v = view(Feed::RaceResults, fixtures::NO_SPRINT, "2025-04-01T00:00:00Z");
        assert_eq!(v.message.as_deref(), Some("No race results available."));

        let v = view(Feed::Upcoming, fixtures::NO_SPRINT, "2025-04-01T00:00:00Z");
        assert_eq!(v.message.as_deref(), Some("No upcoming races available."));
    }

    #[test]
    fn sprint_on_a_normal_weekend_names_the_race() {
        let v = view(Feed::Sprint, fixtures::QUALIFYING, "2025-04-01T00:00:00Z");
        assert_eq!(
            v.title,
            "Sprint Results for Chinese Grand Prix at Shanghai International Circuit"
        );
        assert_eq!(v.message.as_deref(), Some("Not a Sprint Race event."));
    }
}
