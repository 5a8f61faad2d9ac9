use std::collections::HashMap;

use chrono::{DateTime, Local, Offset, Utc};
use ratatui::widgets::TableState;

use crate::f1::tables::{self, TableContext, TableView};
use crate::f1::{Feed, Payload};
use crate::poll::{Command, PollMsg};
use crate::session;

/// Oldest season the API has data for.
pub const FIRST_SEASON: i32 = 1950;

pub struct App {
    /// Index into [`Feed::ALL`].
    pub tab: usize,
    /// Last payload delivered for each feed.
    data: HashMap<Feed, Payload>,
    /// Most recent failure per feed, cleared by the next successful update.
    errors: HashMap<Feed, String>,
    /// Row selection state for scrolling.
    pub table_state: TableState,
    pub season: i32,
    current_year: i32,
    pub round: String,
    pub use_24h: bool,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last poll status message.
    pub status: String,
    /// Requests for the poller, drained by the main loop.
    commands: Vec<Command>,
}

impl App {
    pub fn new(season: i32, current_year: i32, use_24h: bool) -> Self {
        Self {
            tab: 0,
            data: HashMap::new(),
            errors: HashMap::new(),
            table_state: TableState::default(),
            season: season.clamp(FIRST_SEASON, current_year),
            current_year,
            round: "last".into(),
            use_24h,
            quit: false,
            status: "Starting…".into(),
            commands: Vec::new(),
        }
    }

    pub fn feed(&self) -> Feed {
        Feed::ALL[self.tab]
    }

    /// Fold one poller message into the state.
    pub fn apply(&mut self, msg: PollMsg) {
        match msg {
            PollMsg::Updated(payload) => {
                let feed = payload.feed();
                self.errors.remove(&feed);
                self.data.insert(feed, payload);
                if feed == self.feed() {
                    self.reset_selection_if_out_of_range();
                }
            }
            PollMsg::Failed { feed, error } => {
                let kind = if error.is_transport() {
                    "unreachable"
                } else {
                    "unreadable"
                };
                self.status = format!("{feed} {kind}: {error}");
                self.errors.insert(feed, error.to_string());
            }
            PollMsg::Cycle {
                updated,
                unchanged,
                failed,
            } => {
                // Keep a failure visible instead of overwriting it.
                if failed == 0 {
                    self.status = format!(
                        "Refreshed at {}: {updated} updated, {unchanged} unchanged",
                        Local::now().format("%H:%M:%S")
                    );
                }
            }
        }
    }

    pub fn payload(&self, feed: Feed) -> Option<&Payload> {
        self.data.get(&feed)
    }

    pub fn error(&self, feed: Feed) -> Option<&str> {
        self.errors.get(&feed).map(String::as_str)
    }

    /// What the current tab shows at `now`.
    pub fn view(&self, now: DateTime<Utc>) -> TableView {
        let feed = self.feed();
        match (self.data.get(&feed), self.errors.get(&feed)) {
            (Some(payload), err) => {
                let mut view = tables::build(payload, &self.context(now));
                if err.is_some() {
                    view.title.push_str(" (stale)");
                }
                view
            }
            (None, Some(err)) => TableView {
                title: feed.name().to_string(),
                message: Some(format!("Failed to load {}: {err}", feed.name())),
                ..TableView::default()
            },
            (None, None) => TableView {
                title: feed.name().to_string(),
                message: Some("Loading…".into()),
                ..TableView::default()
            },
        }
    }

    pub fn context(&self, now: DateTime<Utc>) -> TableContext {
        TableContext {
            now,
            offset: now.with_timezone(&Local).offset().fix(),
            use_24h: self.use_24h,
        }
    }

    /// Header countdown to the next session of the upcoming race.
    pub fn countdown(&self, now: DateTime<Utc>) -> String {
        let race = match self.payload(Feed::Upcoming) {
            Some(Payload::Upcoming(s)) => s.races().first(),
            _ => None,
        };
        session::countdown_text(race, now)
    }

    /// Hand queued commands to the caller.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    // -- tabs ----------------------------------------------------------------

    pub fn next_tab(&mut self) {
        self.tab = (self.tab + 1) % Feed::ALL.len();
        self.reset_selection();
    }

    pub fn previous_tab(&mut self) {
        self.tab = (self.tab + Feed::ALL.len() - 1) % Feed::ALL.len();
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        let view = self.view(Utc::now());
        let selected = view
            .marked
            .or_else(|| (!view.rows.is_empty()).then_some(0));
        self.table_state.select(selected);
    }

    fn reset_selection_if_out_of_range(&mut self) {
        let rows = self.row_count();
        match self.table_state.selected() {
            Some(i) if i < rows => {}
            _ => self.reset_selection(),
        }
    }

    fn row_count(&self) -> usize {
        self.view(Utc::now()).rows.len()
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        let rows = self.row_count();
        if rows == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => (i + 1).min(rows - 1),
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.row_count() == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if self.row_count() > 0 {
            self.table_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let rows = self.row_count();
        if rows > 0 {
            self.table_state.select(Some(rows - 1));
        }
    }

    // -- poller requests -----------------------------------------------------

    pub fn previous_season(&mut self) {
        self.change_season(self.season - 1);
    }

    pub fn next_season(&mut self) {
        self.change_season(self.season + 1);
    }

    fn change_season(&mut self, season: i32) {
        let season = season.clamp(FIRST_SEASON, self.current_year);
        if season == self.season {
            return;
        }
        self.season = season;
        self.round = "last".into();
        self.drop_feeds(Feed::follows_season);
        self.status = format!("Loading season {season}…");
        self.commands.push(Command::SetSeason(season.to_string()));
    }

    /// Refetch the feed on the current tab.
    pub fn refresh_tab(&mut self) {
        let feed = self.feed();
        self.status = format!("Refreshing {feed}…");
        self.commands.push(Command::Refresh(feed));
    }

    pub fn refresh_all(&mut self) {
        self.status = "Refreshing…".into();
        self.commands.push(Command::RefreshNow);
    }

    /// Forget what the feeds matching `moved` showed, so a failed refetch
    /// cannot leave another season's or round's table on screen.
    fn drop_feeds(&mut self, moved: fn(Feed) -> bool) {
        self.data.retain(|&feed, _| !moved(feed));
        self.errors.retain(|&feed, _| !moved(feed));
        self.table_state.select(None);
    }

    /// On the schedule tab, show results for the highlighted race, unless it
    /// is still to be run at `now`.
    pub fn open_selected_race(&mut self, now: DateTime<Utc>) {
        if self.feed() != Feed::Schedule {
            return;
        }
        let Some(Payload::Schedule(schedule)) = self.data.get(&Feed::Schedule) else {
            return;
        };
        let Some(race) = self
            .table_state
            .selected()
            .and_then(|i| schedule.races().get(i))
        else {
            return;
        };
        if tables::next_race_index(schedule.races(), now)
            .is_some_and(|next| self.table_state.selected() >= Some(next))
        {
            self.status = format!("{} has not been raced yet", race.race_name);
            return;
        }

        let (round, name) = (race.round.clone(), race.race_name.clone());
        self.status = format!("Loading results for {name}…");
        self.commands.push(Command::SelectRound(round.clone()));
        self.round = round;
        self.drop_feeds(Feed::uses_round);
        self.tab = Feed::ALL
            .iter()
            .position(|&f| f == Feed::RaceResults)
            .unwrap_or(self.tab);
    }
}
