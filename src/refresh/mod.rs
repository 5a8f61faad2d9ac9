//! The refresh engine: fetch, hash, compare, update.
//!
//! ```text
//! Endpoint ──► dispatch::fetch_endpoint ──► FetchResult ──► orchestrator ──► callback
//!                (Fetcher → hash → decode)                     │
//!                                                              ▼
//!                                                        RefreshState
//! ```
//!
//! * [`Endpoint`]: name, URL and decoder for one logical data source.
//! * [`fetch_endpoint`]: one blocking fetch, packaged as a [`FetchResult`].
//! * [`RefreshState`]: last-seen hash and loaded-once flag per endpoint name.
//! * [`load_endpoints`] / [`update_if_changed`] / [`update_all_if_changed`]:
//!   concurrent fan-out with a full join before any state is touched.
//!
//! ## For contributors
//!
//! The engine knows nothing about F1 or the terminal.  Payload types are
//! whatever the endpoint decoders return; the update target is whatever
//! context value the caller passes in.  Keep it that way: UI concerns belong
//! in [`crate::poll`] and [`crate::app`].

mod dispatch;
mod endpoint;
mod hash;
mod orchestrator;
mod state;

pub use dispatch::{fetch_endpoint, FetchResult};
pub use endpoint::Endpoint;
pub use hash::content_hash;
pub use orchestrator::{
    load_endpoints, update_all_if_changed, update_if_changed, Outcome, RefreshStatus,
};
pub use state::RefreshState;
