//! # Core Engine Module
//!
//! This module aggregates the fundamental resource-management components the
//! console is built on. The components here are small, thread-safe, and
//! shared between the live feed session and the sample detail view.
//!
//! ## Core Components:
//!
//! - **`resource`**: Exclusive ownership of in-memory image payloads. A
//!   `BufferLedger` keeps an atomic account of every unreleased handle, an
//!   `ImageHandle` guarantees exactly one release per acquisition, and an
//!   `ImageSlot` enforces the at-most-one-unreleased-handle-per-slot rule
//!   that live frames and the raw/result detail images rely on.
//!
//! By declaring and re-exporting these components, the `core` module
//! provides a unified public API for the rest of the workspace.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Image payload ownership: ledger, handle, and slot.
pub mod resource;

// --- Public API Re-exports ---
pub use resource::{BufferLedger, ImageHandle, ImageSlot};
