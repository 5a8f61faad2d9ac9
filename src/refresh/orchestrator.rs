//! Concurrent fan-out over endpoints, then change detection.
//!
//! Every entry point follows the same shape: fetch all endpoints in parallel
//! (one scoped thread each), join every thread, and only then read or write
//! [`RefreshState`] on the calling thread.  One endpoint failing never stops
//! its siblings from being evaluated.  Nothing retries; callers re-invoke on
//! their own timer.

use std::panic;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{fetch_endpoint, Endpoint, FetchResult, RefreshState};
use crate::error::FetchError;
use crate::source::Fetcher;

/// Bytes of an undecodable body to show in the debug log.
const BODY_PREVIEW: usize = 200;

/// What happened to one endpoint during one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshStatus {
    /// New or first-seen content; state was updated (and in selective mode
    /// the callback fired).
    Updated,
    /// Same hash as last time and already loaded.
    Unchanged,
    /// Transport or decode failure; state untouched.
    Failed(FetchError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub name: String,
    pub elapsed: Duration,
    pub status: RefreshStatus,
}

/// Batch refresh: fetch everything, record new hashes, log what changed.
///
/// No callbacks fire and no endpoint is marked loaded, since nothing was
/// handed to a consumer.
pub fn load_endpoints<T: Send>(
    fetcher: &dyn Fetcher,
    endpoints: &[Endpoint<T>],
    state: &mut RefreshState,
) -> Vec<Outcome> {
    fetch_all(fetcher, endpoints)
        .into_iter()
        .map(|result| {
            let name = result.name.clone();
            let elapsed = result.elapsed;
            let status = match settle(result) {
                Err(e) => {
                    warn!(endpoint = %name, ?elapsed, error = %e, "fetch failed");
                    RefreshStatus::Failed(e)
                }
                Ok((hash, _)) if state.get(&name) == Some(hash.as_str()) => {
                    info!(endpoint = %name, ?elapsed, "no change");
                    RefreshStatus::Unchanged
                }
                Ok((hash, _)) => {
                    info!(endpoint = %name, ?elapsed, %hash, "updated");
                    state.set(&name, hash);
                    RefreshStatus::Updated
                }
            };
            Outcome {
                name,
                elapsed,
                status,
            }
        })
        .collect()
}

/// Selective refresh of one endpoint.
///
/// `update(target, data)` runs when the content hash differs from the stored
/// one or when `endpoint` has never loaded before.  Every successful fetch
/// stores its hash and marks the endpoint loaded, whether or not the update
/// ran.
pub fn update_if_changed<T, C>(
    fetcher: &dyn Fetcher,
    endpoint: &Endpoint<T>,
    target: C,
    state: &mut RefreshState,
    update: impl FnOnce(C, T),
) -> Outcome {
    let result = fetch_endpoint(fetcher, endpoint);
    apply_selective(result, target, state, update)
}

/// Selective refresh of several endpoints whose fetches overlap.
///
/// Each job pairs an endpoint with the target its update is delivered to.
/// Evaluation runs in job order after all fetches have finished.
pub fn update_all_if_changed<T: Send, C>(
    fetcher: &dyn Fetcher,
    jobs: Vec<(Endpoint<T>, C)>,
    state: &mut RefreshState,
    mut update: impl FnMut(C, T),
) -> Vec<Outcome> {
    let (endpoints, targets): (Vec<_>, Vec<_>) = jobs.into_iter().unzip();

    fetch_all(fetcher, &endpoints)
        .into_iter()
        .zip(targets)
        .map(|(result, target)| apply_selective(result, target, state, &mut update))
        .collect()
}

fn fetch_all<T: Send>(fetcher: &dyn Fetcher, endpoints: &[Endpoint<T>]) -> Vec<FetchResult<T>> {
    thread::scope(|s| {
        let handles: Vec<_> = endpoints
            .iter()
            .map(|ep| s.spawn(move || fetch_endpoint(fetcher, ep)))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
            .collect()
    })
}

fn apply_selective<T, C>(
    result: FetchResult<T>,
    target: C,
    state: &mut RefreshState,
    update: impl FnOnce(C, T),
) -> Outcome {
    let name = result.name.clone();
    let elapsed = result.elapsed;

    let status = match settle(result) {
        Err(e) => {
            warn!(endpoint = %name, ?elapsed, error = %e, "fetch failed");
            RefreshStatus::Failed(e)
        }
        Ok((hash, data)) => {
            let changed = state.get(&name) != Some(hash.as_str());
            let first_load = !state.has_loaded_once(&name);

            state.mark_loaded(&name);
            state.set(&name, hash);

            if changed || first_load {
                info!(endpoint = %name, ?elapsed, first_load, "updated");
                update(target, data);
                RefreshStatus::Updated
            } else {
                info!(endpoint = %name, ?elapsed, "unchanged, skipping");
                RefreshStatus::Unchanged
            }
        }
    };

    Outcome {
        name,
        elapsed,
        status,
    }
}

/// Collapse a result into its hash and payload, or the reason there is none.
///
/// Decode failures count as failures here even though the hash is known, so
/// a malformed payload never replaces the last good one.
fn settle<T>(result: FetchResult<T>) -> Result<(String, T), FetchError> {
    if let Some(e) = result.error {
        if let (FetchError::Decode(_), Some(raw)) = (&e, &result.raw) {
            let head = &raw[..raw.len().min(BODY_PREVIEW)];
            debug!(endpoint = %result.name, body = %String::from_utf8_lossy(head), "undecodable body");
        }
        return Err(e);
    }
    match (result.hash, result.data) {
        (Some(hash), Some(data)) => Ok((hash, data)),
        _ => Err(FetchError::Decode("fetch produced no payload".into())),
    }
}
