//! In-memory [`Fetcher`] for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use super::Fetcher;
use crate::error::FetchError;

type Reply = Result<Vec<u8>, FetchError>;

/// Serves queued replies per URL.  The last reply for a URL repeats once the
/// queue is drained; unknown URLs answer 404.
#[derive(Default)]
pub struct ScriptedFetcher {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    delay: Duration,
    slow: HashMap<String, Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every request for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Hold requests for `url` for `delay`, overriding [`Self::with_delay`].
    pub fn slow(mut self, url: &str, delay: Duration) -> Self {
        self.slow.insert(url.to_string(), delay);
        self
    }

    pub fn body(self, url: &str, body: &str) -> Self {
        self.push(url, Ok(body.as_bytes().to_vec()));
        self
    }

    pub fn error(self, url: &str, err: FetchError) -> Self {
        self.push(url, Err(err));
        self
    }

    pub fn push(&self, url: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Highest number of requests that were in progress at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Requests in progress right now.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self, url: &str) -> Reply {
        let mut replies = self.replies.lock().unwrap();
        match replies.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}

impl Fetcher for ScriptedFetcher {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.slow.get(url).copied().unwrap_or(self.delay);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        let reply = self.next_reply(url);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        reply
    }
}
