//! Background feed polling.
//!
//! Runs on a dedicated thread, periodically refreshing every [`Feed`] in
//! selective mode and sending what changed to the UI thread over an
//! [`mpsc`] channel.  The UI talks back with [`Command`]s on a second
//! channel; a command wakes the poller immediately instead of waiting for
//! the next tick.
//!
//! ## For contributors
//!
//! The poller thread is the only owner of the [`RefreshState`].  Anything
//! that wants a refresh (a key press, a season change) sends a [`Command`]
//! rather than running the orchestrator itself, so refreshes never overlap
//! and the state needs no lock.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::f1::{Feed, Payload, Selection};
use crate::refresh::{update_all_if_changed, update_if_changed, RefreshState, RefreshStatus};
use crate::source::Fetcher;

/// Messages sent from the poller thread to the UI thread.
#[derive(Debug)]
pub enum PollMsg {
    /// New or first-seen content for one feed.
    Updated(Payload),
    /// A feed could not be fetched or decoded this cycle.
    Failed { feed: Feed, error: FetchError },
    /// Sent once at the end of every refresh cycle.
    Cycle {
        updated: usize,
        unchanged: usize,
        failed: usize,
    },
}

/// Requests from the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Switch every season-dependent feed; the round goes back to `last`.
    SetSeason(String),
    /// Point the result feeds at one round of the current season.
    SelectRound(String),
    /// Refetch one feed.
    Refresh(Feed),
    /// Refetch every feed.
    RefreshNow,
}

/// Refresh loop state, owned by the poller thread.
pub struct Poller {
    fetcher: Arc<dyn Fetcher>,
    api_base: String,
    selection: Selection,
    state: RefreshState,
}

impl Poller {
    pub fn new(fetcher: Arc<dyn Fetcher>, api_base: impl Into<String>, selection: Selection) -> Self {
        Self {
            fetcher,
            api_base: api_base.into(),
            selection,
            state: RefreshState::new(),
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Apply a command and return the feeds to refetch.
    ///
    /// Feeds whose URL moved are forgotten by the refresh state, so they are
    /// delivered again even if the new body hashes the same as the old one.
    pub fn apply(&mut self, cmd: Command) -> Vec<Feed> {
        match cmd {
            Command::SetSeason(season) => {
                info!(%season, "season selected");
                self.selection = Selection::new(season);
                self.repoint(Feed::follows_season)
            }
            Command::SelectRound(round) => {
                info!(%round, "round selected");
                self.selection.round = round;
                self.repoint(Feed::uses_round)
            }
            Command::Refresh(feed) => vec![feed],
            Command::RefreshNow => Feed::ALL.to_vec(),
        }
    }

    fn repoint(&mut self, moved: fn(Feed) -> bool) -> Vec<Feed> {
        let feeds: Vec<Feed> = Feed::ALL.into_iter().filter(|&f| moved(f)).collect();
        for feed in &feeds {
            self.state.forget(feed.name());
        }
        feeds
    }

    /// Refresh `feeds` concurrently and describe the result as messages.
    pub fn run_cycle(&mut self, feeds: &[Feed]) -> Vec<PollMsg> {
        let mut msgs = Vec::new();
        let deliver = |msgs: &mut Vec<PollMsg>, feed: Feed, payload: Payload| {
            debug!(%feed, "delivering update");
            msgs.push(PollMsg::Updated(payload));
        };

        let outcomes = match feeds {
            // A single feed needs no fan-out.
            [feed] => {
                let endpoint = feed.endpoint(&self.api_base, &self.selection);
                vec![update_if_changed(
                    self.fetcher.as_ref(),
                    &endpoint,
                    *feed,
                    &mut self.state,
                    |feed, payload| deliver(&mut msgs, feed, payload),
                )]
            }
            _ => {
                let jobs = feeds
                    .iter()
                    .map(|&feed| (feed.endpoint(&self.api_base, &self.selection), feed))
                    .collect();
                update_all_if_changed(
                    self.fetcher.as_ref(),
                    jobs,
                    &mut self.state,
                    |feed, payload| deliver(&mut msgs, feed, payload),
                )
            }
        };

        let (mut updated, mut unchanged, mut failed) = (0, 0, 0);
        for outcome in outcomes {
            match outcome.status {
                RefreshStatus::Updated => updated += 1,
                RefreshStatus::Unchanged => unchanged += 1,
                RefreshStatus::Failed(error) => {
                    failed += 1;
                    match Feed::from_name(&outcome.name) {
                        Some(feed) => msgs.push(PollMsg::Failed { feed, error }),
                        None => warn!(endpoint = %outcome.name, "failure for unknown feed"),
                    }
                }
            }
        }
        msgs.push(PollMsg::Cycle {
            updated,
            unchanged,
            failed,
        });
        msgs
    }
}

/// Spawn the background polling thread.
///
/// Returns the command sender and a receiver that the main loop should
/// drain on every tick.  The thread stops when either end is dropped.
pub fn spawn(poller: Poller, interval: Duration) -> (Sender<Command>, Receiver<PollMsg>) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || run(poller, interval, cmd_rx, tx));

    (cmd_tx, rx)
}

fn run(mut poller: Poller, interval: Duration, commands: Receiver<Command>, tx: Sender<PollMsg>) {
    info!(season = %poller.selection().season, ?interval, "poller started");
    let mut feeds = Feed::ALL.to_vec();
    loop {
        for msg in poller.run_cycle(&feeds) {
            // The UI has exited; stop polling.
            if tx.send(msg).is_err() {
                return;
            }
        }

        feeds = match commands.recv_timeout(interval) {
            Ok(cmd) => {
                let mut feeds = poller.apply(cmd);
                // Coalesce whatever else queued up meanwhile.
                while let Ok(cmd) = commands.try_recv() {
                    merge_feeds(&mut feeds, poller.apply(cmd));
                }
                feeds
            }
            Err(RecvTimeoutError::Timeout) => Feed::ALL.to_vec(),
            Err(RecvTimeoutError::Disconnected) => return,
        };
    }
}

fn merge_feeds(into: &mut Vec<Feed>, more: Vec<Feed>) {
    for feed in more {
        if !into.contains(&feed) {
            into.push(feed);
        }
    }
    // Keep tab order so cycles always evaluate in the same sequence.
    into.sort_by_key(|f| Feed::ALL.iter().position(|g| g == f));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::f1::fixtures;
    use crate::source::scripted::ScriptedFetcher;

    const BASE: &str = "http://api";

    fn season_2025() -> ScriptedFetcher {
        ScriptedFetcher::new()
            .body("http://api/2025.json", fixtures::SCHEDULE)
            .body("http://api/current/next.json", fixtures::NEXT_RACE)
            .body("http://api/2025/driverstandings.json", fixtures::DRIVER_STANDINGS)
            .body(
                "http://api/2025/constructorstandings.json",
                fixtures::CONSTRUCTOR_STANDINGS,
            )
            .body("http://api/2025/last/results.json", fixtures::RACE_RESULTS)
            .body("http://api/2025/last/qualifying.json", fixtures::QUALIFYING)
            .body("http://api/2025/last/sprint.json", fixtures::NO_SPRINT)
    }

    fn poller(fetcher: ScriptedFetcher) -> (Poller, Arc<ScriptedFetcher>) {
        let fetcher = Arc::new(fetcher);
        let poller = Poller::new(fetcher.clone(), BASE, Selection::new("2025"));
        (poller, fetcher)
    }

    fn updated_feeds(msgs: &[PollMsg]) -> Vec<Feed> {
        msgs.iter()
            .filter_map(|m| match m {
                PollMsg::Updated(p) => Some(p.feed()),
                _ => None,
            })
            .collect()
    }

    fn cycle(msgs: &[PollMsg]) -> (usize, usize, usize) {
        match msgs.last() {
            Some(&PollMsg::Cycle {
                updated,
                unchanged,
                failed,
            }) => (updated, unchanged, failed),
            other => panic!("cycle summary missing, got {other:?}"),
        }
    }

    #[test]
    fn first_cycle_delivers_every_feed_in_tab_order() {
        let (mut poller, _) = poller(season_2025());

        let msgs = poller.run_cycle(&Feed::ALL);

        assert_eq!(updated_feeds(&msgs), Feed::ALL.to_vec());
        assert_eq!(cycle(&msgs), (7, 0, 0));
    }

    #[test]
    fn repeat_cycle_is_quiet() {
        let (mut poller, fetcher) = poller(season_2025());
        poller.run_cycle(&Feed::ALL);

        let feeds = poller.apply(Command::RefreshNow);
        let msgs = poller.run_cycle(&feeds);

        assert!(updated_feeds(&msgs).is_empty());
        assert_eq!(cycle(&msgs), (0, 7, 0));
        assert_eq!(fetcher.calls(), 14);
    }

    #[test]
    fn selecting_a_round_refetches_only_result_feeds() {
        let fetcher = season_2025().body("http://api/2025/5/results.json", fixtures::QUALIFYING);
        let (mut poller, fetcher) = poller(fetcher);
        poller.run_cycle(&Feed::ALL);

        let feeds = poller.apply(Command::SelectRound("5".into()));
        assert_eq!(feeds, [Feed::RaceResults, Feed::Qualifying, Feed::Sprint]);
        let msgs = poller.run_cycle(&feeds);

        assert_eq!(updated_feeds(&msgs), [Feed::RaceResults]);
        assert_eq!(cycle(&msgs), (1, 0, 2));
        assert!(msgs.iter().any(|m| matches!(
            m,
            PollMsg::Failed {
                feed: Feed::Sprint,
                error: FetchError::Status { status: 404, .. }
            }
        )));
        assert_eq!(fetcher.calls(), 10);
    }

    #[test]
    fn single_feed_refresh_touches_one_endpoint() {
        let fetcher = season_2025().body("http://api/2025/driverstandings.json", "{}");
        let (mut poller, fetcher) = poller(fetcher);
        poller.run_cycle(&Feed::ALL);

        let feeds = poller.apply(Command::Refresh(Feed::DriverStandings));
        let msgs = poller.run_cycle(&feeds);

        assert_eq!(fetcher.calls(), 8);
        assert_eq!(cycle(&msgs), (0, 0, 1));
        assert!(matches!(
            msgs[0],
            PollMsg::Failed {
                feed: Feed::DriverStandings,
                error: FetchError::Decode(_)
            }
        ));
    }

    #[test]
    fn season_change_resets_round() {
        let (mut poller, _) = poller(season_2025());
        poller.apply(Command::SelectRound("3".into()));

        let feeds = poller.apply(Command::SetSeason("2024".into()));

        assert!(!feeds.contains(&Feed::Upcoming));
        assert_eq!(feeds.len(), Feed::ALL.len() - 1);
        assert_eq!(poller.selection(), &Selection::new("2024"));
    }

    #[test]
    fn past_season_keeps_the_live_upcoming_race() {
        let fetcher = season_2025().body("http://api/2019.json", fixtures::SCHEDULE);
        let (mut poller, fetcher) = poller(fetcher);
        poller.run_cycle(&Feed::ALL);

        poller.apply(Command::SetSeason("2019".into()));
        let msgs = poller.run_cycle(&[Feed::Schedule, Feed::Upcoming]);

        assert_eq!(fetcher.calls(), 9);
        assert_eq!(updated_feeds(&msgs), [Feed::Schedule]);
        assert_eq!(cycle(&msgs), (1, 1, 0));
    }

    #[test]
    fn moved_feed_is_delivered_even_with_identical_body() {
        // Same body for round 5 as for `last`.
        let fetcher = season_2025().body("http://api/2025/5/results.json", fixtures::RACE_RESULTS);
        let (mut poller, _) = poller(fetcher);
        poller.run_cycle(&Feed::ALL);

        poller.apply(Command::SelectRound("5".into()));
        let msgs = poller.run_cycle(&[Feed::RaceResults]);

        assert_eq!(updated_feeds(&msgs), [Feed::RaceResults]);
    }

    #[test]
    fn merged_feeds_stay_in_tab_order() {
        let mut feeds = vec![Feed::Sprint, Feed::RaceResults];
        merge_feeds(&mut feeds, vec![Feed::Schedule, Feed::Sprint]);
        assert_eq!(feeds, [Feed::Schedule, Feed::RaceResults, Feed::Sprint]);
    }

    #[test]
    fn thread_wakes_on_command() {
        let (poller, _) = poller(season_2025());
        let (cmd_tx, rx) = spawn(poller, Duration::from_secs(3600));
        let wait = Duration::from_secs(5);

        let mut first = Vec::new();
        while !matches!(first.last(), Some(PollMsg::Cycle { .. })) {
            first.push(rx.recv_timeout(wait).unwrap());
        }
        assert_eq!(cycle(&first), (7, 0, 0));

        cmd_tx.send(Command::RefreshNow).unwrap();
        let msg = rx.recv_timeout(wait).unwrap();
        assert!(matches!(
            msg,
            PollMsg::Cycle {
                updated: 0,
                unchanged: 7,
                failed: 0
            }
        ));
    }
}
