//! Network access for the refresh engine.
//!
//! This module defines the [`Fetcher`] trait: one blocking GET that returns
//! the raw response body.  The engine never talks to the network any other
//! way, so tests swap in an in-memory implementation.
//!
//! ## For contributors: adding a new transport
//!
//! 1. Create a new file in this directory (e.g. `file.rs` for fixtures on disk).
//! 2. Define a struct and implement [`Fetcher`] for it.
//! 3. Add `mod file;` below and re-export your struct.
//! 4. Construct it in `main.rs` instead of [`HttpFetcher`].
//!
//! Hashing, decoding and change detection live in [`crate::refresh`] and are
//! transport-agnostic.

mod http;
#[cfg(test)]
pub mod scripted;

pub use http::HttpFetcher;

use crate::error::FetchError;

/// Trait that every transport must implement.
///
/// The orchestrator calls [`get()`](Fetcher::get) from one thread per
/// endpoint, so implementations must be [`Send`] + [`Sync`].
///
/// ## Implementing a new transport
///
/// ```ignore
/// pub struct MyFetcher;
///
/// impl Fetcher for MyFetcher {
///     fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
///         // Perform the request and hand back the exact body bytes.
///         todo!()
///     }
/// }
/// ```
pub trait Fetcher: Send + Sync {
    /// Retrieve `url` and return the body exactly as received.
    ///
    /// Non-2xx responses must be reported as [`FetchError::Status`], not
    /// returned as a body.
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
