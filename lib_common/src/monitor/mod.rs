//! # Dapurate Monitoring Module
//!
//! This module provides the client-side core for the Dapurate cleanliness
//! monitoring backend: the typed API surface, the domain records it returns,
//! and the dashboard state that is derived from them.
//!
//! ## Contained Modules:
//!
//! - **`model`**: serde models for the score summary, sample records, and
//!   violations, plus the `{message, success, data}` response envelope and
//!   the local-calendar date helpers.
//!
//! - **`api`**: `DapurApi`, one method per backend operation. This is the
//!   validation boundary: any transport failure, non-2xx status, or
//!   malformed response shape degrades to an absent/empty result here and
//!   never propagates to the caller.
//!
//! - **`scoreboard`**: the date-scoped fetcher. A generation counter
//!   guarantees that a response belonging to a superseded date can never
//!   overwrite state belonging to a newer one.
//!
//! - **`pagination`**: a bounded page view over the sample sequence.
//!
//! - **`detail`**: the per-sample detail context (raw/result images,
//!   violations, mutations with full reload).

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Typed client for the Dapurate backend endpoints.
pub mod api;
/// Per-sample detail context with image slots and mutations.
pub mod detail;
/// Domain records, response envelope, and date helpers.
pub mod model;
/// Bounded page derivation over an ordered sequence.
pub mod pagination;
/// Date-scoped summary + sample fetching with stale-response rejection.
pub mod scoreboard;

// --- Public API Re-exports ---
pub use api::DapurApi;
pub use detail::SampleDetail;
pub use model::{Envelope, SampleRecord, ScoreSummary, ViolationRecord};
pub use pagination::Pager;
pub use scoreboard::{FetchTicket, Scoreboard, ScoreboardState};
