//! Headless mode: refresh every feed on a timer and log what changed.
//!
//! Uses the batch path of the refresh engine, so nothing is decoded into a
//! view and no endpoint is ever marked as delivered.

use std::thread;
use std::time::Duration;

use tracing::info;

use crate::f1::{self, Selection};
use crate::refresh::{load_endpoints, Outcome, RefreshState, RefreshStatus};
use crate::source::Fetcher;

/// Counts for one batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl Summary {
    pub fn of(outcomes: &[Outcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut s, o| {
            match o.status {
                RefreshStatus::Updated => s.updated += 1,
                RefreshStatus::Unchanged => s.unchanged += 1,
                RefreshStatus::Failed(_) => s.failed += 1,
            }
            s
        })
    }
}

/// Run one batch over every feed.
pub fn run_once(
    fetcher: &dyn Fetcher,
    api_base: &str,
    selection: &Selection,
    state: &mut RefreshState,
) -> Summary {
    let endpoints = f1::endpoints(api_base, selection);
    let outcomes = load_endpoints(fetcher, &endpoints, state);
    let summary = Summary::of(&outcomes);
    info!(
        season = %selection.season,
        updated = summary.updated,
        unchanged = summary.unchanged,
        failed = summary.failed,
        "batch complete"
    );
    summary
}

/// Loop forever, one batch per `interval`.
pub fn run(fetcher: &dyn Fetcher, api_base: &str, selection: Selection, interval: Duration) -> ! {
    info!(season = %selection.season, ?interval, "watching feeds");
    let mut state = RefreshState::new();
    loop {
        run_once(fetcher, api_base, &selection, &mut state);
        thread::sleep(interval);
    }
}
