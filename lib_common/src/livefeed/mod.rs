//! # Live Feed Module
//!
//! This module owns the one long-lived connection in the system: the
//! websocket over which the backend pushes live camera frames.
//!
//! ## Contained Modules:
//! - **`session`**: the connect/frames/disconnect lifecycle with an
//!   at-most-one-active-connection guarantee, latest-wins frame handling,
//!   and guaranteed frame release on teardown; plus the one-shot snapshot
//!   capture with its 200 ms acknowledgement flash.
//!
//! The feed never reconnects on its own: losing the connection transitions
//! to `Disconnected` and waits for an explicit operator action.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// The websocket session lifecycle and snapshot capture.
pub mod session;

// --- Public API Re-exports ---
pub use session::{capture_snapshot, CaptureFlash, LiveFeedSession, SessionState};
