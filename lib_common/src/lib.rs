//! Shared client core for the Dapurate monitoring console.
//!
//! The modules mirror the moving parts of the dashboard: `retrieve` talks
//! HTTP, `monitor` owns the domain state (score, samples, pagination,
//! detail), `livefeed` owns the websocket session, and `core` provides the
//! image-buffer ownership both of them rely on.

// Declare the modules to re-export
pub mod core;
pub mod livefeed;
pub mod monitor;
pub mod retrieve;

// Re-export the public surface
pub use crate::core::resource::{BufferLedger, ImageHandle, ImageSlot};
pub use crate::livefeed::session::{
    capture_snapshot, CaptureFlash, LiveFeedSession, SessionState, FLASH_DURATION,
};
pub use crate::monitor::api::DapurApi;
pub use crate::monitor::detail::SampleDetail;
pub use crate::monitor::model::{
    date_query, format_label, today_local, Envelope, SampleRecord, ScoreSummary, ViolationRecord,
};
pub use crate::monitor::pagination::{Pager, DEFAULT_PER_PAGE};
pub use crate::monitor::scoreboard::{FetchTicket, Scoreboard, ScoreboardState};
pub use crate::retrieve::api_client::{ApiClient, ApiResponse};
