//! Response shapes of the Ergast-compatible F1 API.
//!
//! Every response is wrapped in an `MRData` object.  Race-based endpoints
//! (schedule, next race, results, qualifying, sprint) carry a `RaceTable`;
//! standings endpoints carry a `StandingsTable`.  The API encodes numbers as
//! strings, and so do these types.
//!
//! Fields the viewer does not show are left out; serde ignores them.  Missing
//! fields fall back to empty values, except the `MRData` envelope itself,
//! whose absence means the body is not an API response at all.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "MRData")]
    pub mr_data: T,
}

// ---------------------------------------------------------------------------
// Races
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RaceData<R> {
    #[serde(rename = "RaceTable")]
    pub race_table: RaceTable<R>,
}

// Derived Default would require `R: Default`.
impl<R> Default for RaceData<R> {
    fn default() -> Self {
        Self {
            race_table: RaceTable::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RaceTable<R> {
    pub season: String,
    #[serde(rename = "Races")]
    pub races: Vec<R>,
}

impl<R> Default for RaceTable<R> {
    fn default() -> Self {
        Self {
            season: String::new(),
            races: Vec::new(),
        }
    }
}

/// A calendar entry, as returned by the schedule and next-race endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Race {
    pub season: String,
    pub round: String,
    pub url: String,
    pub race_name: String,
    #[serde(rename = "Circuit")]
    pub circuit: Circuit,
    pub date: String,
    pub time: Option<String>,
    #[serde(rename = "FirstPractice")]
    pub first_practice: Option<SessionTime>,
    #[serde(rename = "SecondPractice")]
    pub second_practice: Option<SessionTime>,
    #[serde(rename = "ThirdPractice")]
    pub third_practice: Option<SessionTime>,
    #[serde(rename = "Qualifying")]
    pub qualifying: Option<SessionTime>,
    #[serde(rename = "SprintQualifying")]
    pub sprint_qualifying: Option<SessionTime>,
    #[serde(rename = "Sprint")]
    pub sprint: Option<SessionTime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionTime {
    pub date: String,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Circuit {
    pub circuit_id: String,
    pub url: String,
    pub circuit_name: String,
    #[serde(rename = "Location")]
    pub location: Location,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Location {
    pub lat: String,
    pub long: String,
    pub locality: String,
    pub country: String,
}

/// A race weekend with whichever classification the endpoint returned.
///
/// The results, qualifying and sprint endpoints share this shape; only the
/// matching list is populated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassifiedRace {
    pub season: String,
    pub round: String,
    pub race_name: String,
    #[serde(rename = "Circuit")]
    pub circuit: Circuit,
    pub date: String,
    #[serde(rename = "Results")]
    pub results: Vec<ResultItem>,
    #[serde(rename = "SprintResults")]
    pub sprint_results: Vec<ResultItem>,
    #[serde(rename = "QualifyingResults")]
    pub qualifying_results: Vec<QualifyingResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResultItem {
    pub number: String,
    pub position: String,
    pub position_text: String,
    pub points: String,
    #[serde(rename = "Driver")]
    pub driver: Driver,
    #[serde(rename = "Constructor")]
    pub constructor: Constructor,
    pub grid: String,
    pub laps: String,
    pub status: String,
    #[serde(rename = "Time")]
    pub time: Option<RaceTime>,
    #[serde(rename = "FastestLap")]
    pub fastest_lap: Option<FastestLap>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RaceTime {
    pub millis: String,
    pub time: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FastestLap {
    pub rank: String,
    pub lap: String,
    #[serde(rename = "Time")]
    pub time: LapTime,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LapTime {
    pub time: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QualifyingResult {
    pub number: String,
    pub position: String,
    #[serde(rename = "Driver")]
    pub driver: Driver,
    #[serde(rename = "Constructor")]
    pub constructor: Constructor,
    #[serde(rename = "Q1")]
    pub q1: Option<String>,
    #[serde(rename = "Q2")]
    pub q2: Option<String>,
    #[serde(rename = "Q3")]
    pub q3: Option<String>,
}

// ---------------------------------------------------------------------------
// Standings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StandingsData<S> {
    #[serde(rename = "StandingsTable")]
    pub standings_table: StandingsTable<S>,
}

impl<S> Default for StandingsData<S> {
    fn default() -> Self {
        Self {
            standings_table: StandingsTable::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StandingsTable<S> {
    pub season: String,
    #[serde(rename = "StandingsLists")]
    pub standings_lists: Vec<S>,
}

impl<S> Default for StandingsTable<S> {
    fn default() -> Self {
        Self {
            season: String::new(),
            standings_lists: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DriverStandingsList {
    pub season: String,
    pub round: String,
    #[serde(rename = "DriverStandings")]
    pub driver_standings: Vec<DriverStanding>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DriverStanding {
    pub position: String,
    pub points: String,
    pub wins: String,
    #[serde(rename = "Driver")]
    pub driver: Driver,
    #[serde(rename = "Constructors")]
    pub constructors: Vec<Constructor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConstructorStandingsList {
    pub season: String,
    pub round: String,
    #[serde(rename = "ConstructorStandings")]
    pub constructor_standings: Vec<ConstructorStanding>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConstructorStanding {
    pub position: String,
    pub points: String,
    pub wins: String,
    #[serde(rename = "Constructor")]
    pub constructor: Constructor,
}

// ---------------------------------------------------------------------------
// People and teams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Driver {
    pub driver_id: String,
    pub code: Option<String>,
    pub given_name: String,
    pub family_name: String,
    pub nationality: String,
}

impl Driver {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Constructor {
    pub constructor_id: String,
    pub name: String,
    pub nationality: String,
}

// ---------------------------------------------------------------------------
// Aliases per endpoint
// ---------------------------------------------------------------------------

pub type ScheduleResponse = Envelope<RaceData<Race>>;
pub type ResultsResponse = Envelope<RaceData<ClassifiedRace>>;
pub type DriverStandingsResponse = Envelope<StandingsData<DriverStandingsList>>;
pub type ConstructorStandingsResponse = Envelope<StandingsData<ConstructorStandingsList>>;

impl ScheduleResponse {
    pub fn races(&self) -> &[Race] {
        &self.mr_data.race_table.races
    }
}

impl ResultsResponse {
    /// The (single) race weekend the response describes, if any.
    pub fn race(&self) -> Option<&ClassifiedRace> {
        self.mr_data.race_table.races.first()
    }
}

impl DriverStandingsResponse {
    pub fn standings(&self) -> &[DriverStanding] {
        self.mr_data
            .standings_table
            .standings_lists
            .first()
            .map(|l| l.driver_standings.as_slice())
            .unwrap_or_default()
    }
}

impl ConstructorStandingsResponse {
    pub fn standings(&self) -> &[ConstructorStanding] {
        self.mr_data
            .standings_table
            .standings_lists
            .first()
            .map(|l| l.constructor_standings.as_slice())
            .unwrap_or_default()
    }
}
