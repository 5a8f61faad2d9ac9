//! The F1 data sources the viewer knows about.
//!
//! Each [`Feed`] is one endpoint of the API and one tab in the UI.  A feed
//! turns into a refresh-engine [`Endpoint`] for a given [`Selection`]
//! (season and round), decoding into the matching [`Payload`] variant.
//!
//! ## For contributors: adding a feed
//!
//! 1. Add the response types to [`model`].
//! 2. Add a variant to [`Feed`] and to [`Payload`], and extend `ALL`.
//! 3. Fill in the URL template and decoder in [`Feed::endpoint`].
//! 4. Add a table builder in [`tables`].

pub mod model;
pub mod tables;

use std::fmt;

use anyhow::Context;

use crate::refresh::Endpoint;
use model::{
    ConstructorStandingsResponse, DriverStandingsResponse, ResultsResponse, ScheduleResponse,
};

pub const DEFAULT_API_BASE: &str = "https://api.jolpi.ca/ergast/f1";

/// One logical data source / tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feed {
    Schedule,
    Upcoming,
    DriverStandings,
    ConstructorStandings,
    RaceResults,
    Qualifying,
    Sprint,
}

impl Feed {
    /// Tab order.
    pub const ALL: [Feed; 7] = [
        Feed::Schedule,
        Feed::Upcoming,
        Feed::DriverStandings,
        Feed::ConstructorStandings,
        Feed::RaceResults,
        Feed::Qualifying,
        Feed::Sprint,
    ];

    /// Stable endpoint name, used as the change-detection key.
    pub fn name(self) -> &'static str {
        match self {
            Feed::Schedule => "Schedule",
            Feed::Upcoming => "Upcoming",
            Feed::DriverStandings => "Driver Standings",
            Feed::ConstructorStandings => "Constructor Standings",
            Feed::RaceResults => "Race Results",
            Feed::Qualifying => "Qualifying",
            Feed::Sprint => "Sprint Results",
        }
    }

    /// Short label for the tab bar.
    pub fn tab_title(self) -> &'static str {
        match self {
            Feed::Schedule => "Schedule",
            Feed::Upcoming => "Upcoming",
            Feed::DriverStandings => "Drivers",
            Feed::ConstructorStandings => "Constructors",
            Feed::RaceResults => "Race",
            Feed::Qualifying => "Qualifying",
            Feed::Sprint => "Sprint",
        }
    }

    pub fn from_name(name: &str) -> Option<Feed> {
        Feed::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Whether the URL depends on the selected season.  The upcoming race is
    /// always taken from the live season.
    pub fn follows_season(self) -> bool {
        self != Feed::Upcoming
    }

    /// Whether the URL depends on the selected round.
    pub fn uses_round(self) -> bool {
        matches!(self, Feed::RaceResults | Feed::Qualifying | Feed::Sprint)
    }

    pub fn url(self, api_base: &str, sel: &Selection) -> String {
        let base = api_base.trim_end_matches('/');
        let season = &sel.season;
        let round = &sel.round;
        match self {
            Feed::Schedule => format!("{base}/{season}.json"),
            Feed::Upcoming => format!("{base}/current/next.json"),
            Feed::DriverStandings => format!("{base}/{season}/driverstandings.json"),
            Feed::ConstructorStandings => format!("{base}/{season}/constructorstandings.json"),
            Feed::RaceResults => format!("{base}/{season}/{round}/results.json"),
            Feed::Qualifying => format!("{base}/{season}/{round}/qualifying.json"),
            Feed::Sprint => format!("{base}/{season}/{round}/sprint.json"),
        }
    }

    pub fn endpoint(self, api_base: &str, sel: &Selection) -> Endpoint<Payload> {
        let url = self.url(api_base, sel);
        match self {
            Feed::Schedule => Endpoint::new(self.name(), url, |raw| {
                parse::<ScheduleResponse>(raw).map(Payload::Schedule)
            }),
            Feed::Upcoming => Endpoint::new(self.name(), url, |raw| {
                parse::<ScheduleResponse>(raw).map(Payload::Upcoming)
            }),
            Feed::DriverStandings => Endpoint::new(self.name(), url, |raw| {
                parse::<DriverStandingsResponse>(raw).map(Payload::DriverStandings)
            }),
            Feed::ConstructorStandings => Endpoint::new(self.name(), url, |raw| {
                parse::<ConstructorStandingsResponse>(raw).map(Payload::ConstructorStandings)
            }),
            Feed::RaceResults => Endpoint::new(self.name(), url, |raw| {
                parse::<ResultsResponse>(raw).map(Payload::RaceResults)
            }),
            Feed::Qualifying => Endpoint::new(self.name(), url, |raw| {
                parse::<ResultsResponse>(raw).map(Payload::Qualifying)
            }),
            Feed::Sprint => Endpoint::new(self.name(), url, |raw| {
                parse::<ResultsResponse>(raw).map(Payload::Sprint)
            }),
        }
    }
}

impl fmt::Display for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Endpoints for every feed under one selection.
pub fn endpoints(api_base: &str, sel: &Selection) -> Vec<Endpoint<Payload>> {
    Feed::ALL.into_iter().map(|f| f.endpoint(api_base, sel)).collect()
}

fn parse<T: serde::de::DeserializeOwned>(raw: &[u8]) -> anyhow::Result<T> {
    serde_json::from_slice(raw)
        .with_context(|| format!("not a valid {} body", std::any::type_name::<T>()))
}

/// Which season and round the season-dependent feeds point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// A year, or `current`.
    pub season: String,
    /// A round number, or `last`.
    pub round: String,
}

impl Selection {
    pub fn new(season: impl Into<String>) -> Self {
        Self {
            season: season.into(),
            round: "last".into(),
        }
    }
}

/// A decoded response, tagged with the feed it came from.
#[derive(Debug, Clone)]
pub enum Payload {
    Schedule(ScheduleResponse),
    Upcoming(ScheduleResponse),
    DriverStandings(DriverStandingsResponse),
    ConstructorStandings(ConstructorStandingsResponse),
    RaceResults(ResultsResponse),
    Qualifying(ResultsResponse),
    Sprint(ResultsResponse),
}

impl Payload {
    pub fn feed(&self) -> Feed {
        match self {
            Payload::Schedule(_) => Feed::Schedule,
            Payload::Upcoming(_) => Feed::Upcoming,
            Payload::DriverStandings(_) => Feed::DriverStandings,
            Payload::ConstructorStandings(_) => Feed::ConstructorStandings,
            Payload::RaceResults(_) => Feed::RaceResults,
            Payload::Qualifying(_) => Feed::Qualifying,
            Payload::Sprint(_) => Feed::Sprint,
        }
    }
}
