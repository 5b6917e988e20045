//! # Image Buffer Ownership and Leak Accounting
//!
//! This module provides the ownership model for in-memory binary image
//! payloads (live frames and the raw/result images of the detail view).
//! Each displayable image slot owns **at most one unreleased handle** at any
//! time; publishing a new payload releases the previous handle first, and
//! teardown releases whatever is still held.
//!
//! ## Core Functionality:
//!
//! - **Atomic Accounting**: a [`BufferLedger`] tracks the number of live
//!   handles and their combined byte size using atomics. Multiple tasks
//!   (the session read loop, the detail loader) update it without locks.
//!
//! - **Exactly-One Release**: an [`ImageHandle`] records its release in the
//!   ledger exactly once. `release` is safe to call repeatedly, and `Drop`
//!   releases on every exit path, so a handle can never leak past the life
//!   of its owner.
//!
//! - **Latest Wins**: an [`ImageSlot`] replaces, never queues. The previous
//!   handle is released *before* the replacement is published, which keeps
//!   the ledger's high-water mark at one payload per slot.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// # Buffer Ledger
///
/// A thread-safe account of every unreleased image payload in the system.
///
/// The ledger does not own any payloads itself; it only mirrors the
/// acquire/release lifecycle of the handles created through it. A non-zero
/// `live_handles` at teardown indicates a leaked payload.
#[derive(Debug, Default)]
pub struct BufferLedger {
    /// Number of handles acquired and not yet released.
    live_handles: AtomicU64,
    /// Combined byte size of all unreleased payloads.
    live_bytes: AtomicU64,
}

impl BufferLedger {
    /// Creates a new, empty ledger. Typically wrapped in an `Arc` and shared
    /// between the components that own image slots.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// # Acquire
    ///
    /// Takes ownership of a binary payload and records it in the ledger.
    /// The returned [`ImageHandle`] is the only way to reach the payload and
    /// must be released (explicitly or by drop) before its slot is reused.
    pub fn acquire(self: &Arc<Self>, payload: Bytes) -> ImageHandle {
        let size = payload.len() as u64;
        // `Relaxed` is sufficient: the counters are eventually-consistent
        // diagnostics, not synchronization points.
        self.live_handles.fetch_add(1, Ordering::Relaxed);
        self.live_bytes.fetch_add(size, Ordering::Relaxed);

        ImageHandle {
            payload,
            size,
            ledger: Arc::clone(self),
            released: false,
        }
    }

    /// Number of handles acquired and not yet released.
    pub fn live_handles(&self) -> u64 {
        self.live_handles.load(Ordering::Relaxed)
    }

    /// Combined byte size of all unreleased payloads.
    pub fn live_bytes(&self) -> u64 {
        self.live_bytes.load(Ordering::Relaxed)
    }

    fn record_release(&self, size: u64) {
        self.live_handles.fetch_sub(1, Ordering::Relaxed);
        self.live_bytes.fetch_sub(size, Ordering::Relaxed);
    }
}

/// # Image Handle
///
/// Exclusive ownership of one binary image payload, accounted for in a
/// [`BufferLedger`]. Exactly one release is recorded per handle regardless
/// of how many times [`release`](Self::release) is called, and dropping an
/// unreleased handle releases it.
#[derive(Debug)]
pub struct ImageHandle {
    payload: Bytes,
    size: u64,
    ledger: Arc<BufferLedger>,
    released: bool,
}

impl ImageHandle {
    /// The payload bytes. `Bytes` clones are cheap reference-count bumps,
    /// so callers may clone freely for display or disk writes.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Payload size in bytes.
    pub fn len(&self) -> u64 {
        self.size
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// # Release
    ///
    /// Marks the payload as released and updates the ledger. Calling this
    /// on an already-released handle is a guarded no-op.
    pub fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.ledger.record_release(self.size);
        }
    }
}

impl Drop for ImageHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// # Image Slot
///
/// One displayable image position (the live frame, the raw image, or the
/// result image). The slot owns at most one unreleased handle; publishing a
/// replacement releases the previous handle first.
#[derive(Debug)]
pub struct ImageSlot {
    ledger: Arc<BufferLedger>,
    current: Option<ImageHandle>,
}

impl ImageSlot {
    /// Creates an empty slot accounted against `ledger`.
    pub fn new(ledger: Arc<BufferLedger>) -> Self {
        Self {
            ledger,
            current: None,
        }
    }

    /// # Publish
    ///
    /// Installs a new payload as the current image. The previous handle, if
    /// any, is released before the new one is acquired, so the slot never
    /// holds two unreleased payloads.
    pub fn publish(&mut self, payload: Bytes) {
        if let Some(mut previous) = self.current.take() {
            previous.release();
        }
        self.current = Some(self.ledger.acquire(payload));
    }

    /// Releases the current handle, if any. Safe to call on an empty slot.
    pub fn clear(&mut self) {
        if let Some(mut previous) = self.current.take() {
            previous.release();
        }
    }

    /// Whether the slot currently holds a payload.
    pub fn is_occupied(&self) -> bool {
        self.current.is_some()
    }

    /// A cheap clone of the current payload, if any.
    pub fn latest(&self) -> Option<Bytes> {
        self.current.as_ref().map(|h| h.payload().clone())
    }
}

impl Drop for ImageSlot {
    fn drop(&mut self) {
        self.clear();
    }
}
