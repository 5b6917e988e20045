//! # Live Feed Session
//!
//! WebSocket session for the backend's live camera stream.
//!
//! ## Key Contracts:
//! - **At most one active connection**: `connect` is a guarded no-op while
//!   a session task is still alive.
//! - **Latest wins**: each inbound binary frame replaces the previous one;
//!   the old payload is released *before* the new one is published, and
//!   frames are never queued.
//! - **No automatic reconnect**: any error or remote close transitions the
//!   session to `Disconnected` and leaves reconnection to an explicit
//!   operator action.
//! - **Guaranteed release**: dropping the session releases the current
//!   frame and signals the connection closed, on every exit path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::core::resource::{BufferLedger, ImageSlot};
use crate::monitor::api::DapurApi;

/// How long the capture acknowledgement flash stays lit.
pub const FLASH_DURATION: Duration = Duration::from_millis(200);

/// The identification token sent to the backend when the socket opens.
const CLIENT_TOKEN: &str = "client";

/// Lifecycle states of the live feed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection; `connect` may open one.
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    /// The socket is open and frames may arrive.
    Connected,
}

/// Transport-level failures of one session attempt. Handled inside the
/// session task; the public surface only ever shows [`SessionState`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The WebSocket connection could not be established.
    #[error("Connection error: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),
    /// The identification token could not be delivered after open.
    #[error("Handshake error: {0}")]
    Handshake(String),
}

/// State shared between the session owner and its read task.
///
/// `attempt` numbers each `connect` call. A dying task from a superseded
/// attempt may still be flushing its close handshake while a newer task is
/// already connected; the guarded writers below keep it from clobbering
/// the newer attempt's state or frames.
#[derive(Debug)]
struct SessionShared {
    state: Mutex<SessionState>,
    frame: Mutex<ImageSlot>,
    attempt: AtomicU64,
}

impl SessionShared {
    fn set_state(&self, next: SessionState) {
        *self.state.lock().expect("Session state lock poisoned") = next;
    }

    fn state(&self) -> SessionState {
        *self.state.lock().expect("Session state lock poisoned")
    }

    fn is_current(&self, attempt: u64) -> bool {
        self.attempt.load(Ordering::SeqCst) == attempt
    }

    /// State write on behalf of one connection attempt; ignored once a
    /// newer `connect` has superseded it.
    fn set_state_for(&self, attempt: u64, next: SessionState) {
        let mut state = self.state.lock().expect("Session state lock poisoned");
        if self.is_current(attempt) {
            *state = next;
        }
    }

    fn publish_frame_for(&self, attempt: u64, payload: Bytes) {
        let mut frame = self.frame.lock().expect("Frame slot lock poisoned");
        if self.is_current(attempt) {
            frame.publish(payload);
        }
    }
}

/// Handle to a spawned session task plus its shutdown signal.
struct SessionLink {
    shutdown: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

/// # Live Feed Session
///
/// Owns the single websocket connection to the backend's live stream and
/// the single "current frame" slot it feeds.
pub struct LiveFeedSession {
    ws_url: String,
    shared: Arc<SessionShared>,
    link: Option<SessionLink>,
}

impl LiveFeedSession {
    /// Creates a disconnected session targeting `ws_url`, with its frame
    /// slot accounted against `ledger`.
    pub fn new(ws_url: impl Into<String>, ledger: &Arc<BufferLedger>) -> Self {
        Self {
            ws_url: ws_url.into(),
            shared: Arc::new(SessionShared {
                state: Mutex::new(SessionState::Disconnected),
                frame: Mutex::new(ImageSlot::new(Arc::clone(ledger))),
                attempt: AtomicU64::new(0),
            }),
            link: None,
        }
    }

    /// # Connect
    ///
    /// Opens the websocket and starts the frame loop in a background task.
    /// A no-op while a previous session task is still alive (connecting or
    /// connected), so calling this twice can never open two connections.
    pub fn connect(&mut self) {
        if let Some(link) = &self.link {
            if !link.task.is_finished() {
                log::debug!("connect ignored: live feed session already active");
                return;
            }
        }

        // Supersede any task still winding down from an earlier attempt.
        let attempt = self.shared.attempt.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.set_state(SessionState::Connecting);
        log::info!("Connecting to live feed: {}", self.ws_url);

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let shared = Arc::clone(&self.shared);
        let url = self.ws_url.clone();
        let task = tokio::spawn(async move {
            if let Err(e) = drive_session(&url, &shared, attempt, shutdown_rx).await {
                log::error!("Live feed session failed: {}", e);
            }
            shared.set_state_for(attempt, SessionState::Disconnected);
        });

        self.link = Some(SessionLink {
            shutdown: shutdown_tx,
            task,
        });
    }

    /// # Disconnect
    ///
    /// Signals the session task to close the socket and clears the link so
    /// a later `connect` can succeed. Safe to call when already
    /// disconnected.
    pub fn disconnect(&mut self) {
        match self.link.take() {
            Some(link) => {
                // The task may already have ended on a remote close; a dead
                // receiver just means there is nothing left to signal.
                let _ = link.shutdown.send(());
                log::info!("Live feed disconnect requested");
            }
            None => log::debug!("disconnect ignored: already disconnected"),
        }
        self.shared.set_state(SessionState::Disconnected);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        // A finished task means the connection is gone even if no one
        // called `disconnect`.
        if let Some(link) = &self.link {
            if link.task.is_finished() {
                return SessionState::Disconnected;
            }
        }
        self.shared.state()
    }

    /// Whether the socket is currently open.
    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    /// A cheap clone of the most recent frame, if any has arrived.
    pub fn latest_frame(&self) -> Option<Bytes> {
        self.shared
            .frame
            .lock()
            .expect("Frame slot lock poisoned")
            .latest()
    }
}

impl Drop for LiveFeedSession {
    fn drop(&mut self) {
        if let Some(link) = self.link.take() {
            let _ = link.shutdown.send(());
        }
        self.shared
            .frame
            .lock()
            .expect("Frame slot lock poisoned")
            .clear();
    }
}

/// One full session attempt: connect, identify, then pump frames until the
/// remote closes, an error occurs, or shutdown is signalled.
async fn drive_session(
    url: &str,
    shared: &SessionShared,
    attempt: u64,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), SessionError> {
    let (ws_stream, _) = connect_async(url).await?;
    let (mut write, mut read) = ws_stream.split();

    // Identify ourselves so the backend starts pushing frames.
    write
        .send(Message::Text(CLIENT_TOKEN.into()))
        .await
        .map_err(|e| SessionError::Handshake(e.to_string()))?;

    shared.set_state_for(attempt, SessionState::Connected);
    log::info!("Live feed connected to {}", url);

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                log::info!("Closing live feed connection");
                let _ = write.close().await;
                break;
            }
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Binary(bin))) => {
                        // Latest wins: the slot releases the previous frame
                        // before this one becomes visible.
                        shared.publish_frame_for(attempt, Bytes::from(bin.to_vec()));
                    }
                    Some(Ok(Message::Text(text))) => {
                        log::trace!("Live feed text frame ignored: {}", text);
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => {
                        log::warn!("Live feed closed by remote host");
                        break;
                    }
                    Some(Err(e)) => {
                        log::error!("Live feed read error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

/// # Capture Flash
///
/// The transient acknowledgement indicator for snapshot captures. Lit for
/// exactly [`FLASH_DURATION`] after an explicit success acknowledgement,
/// never on failure.
#[derive(Debug, Default)]
pub struct CaptureFlash {
    lit_until: Option<Instant>,
}

impl CaptureFlash {
    /// Creates an unlit flash.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lights the flash for [`FLASH_DURATION`] from now.
    pub fn trigger(&mut self) {
        self.lit_until = Some(Instant::now() + FLASH_DURATION);
    }

    /// Whether the flash is currently lit.
    pub fn is_lit(&self) -> bool {
        matches!(self.lit_until, Some(until) if Instant::now() < until)
    }
}

/// # Capture Snapshot
///
/// One-shot request asking the backend to capture and analyze a frame.
/// This is independent of the socket session. The flash is triggered only
/// on an explicit success acknowledgement from the backend.
pub async fn capture_snapshot(api: &DapurApi, flash: &mut CaptureFlash) -> bool {
    if api.trigger_capture().await {
        flash.trigger();
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn flash_goes_dark_after_its_duration() {
        let mut flash = CaptureFlash::new();
        assert!(!flash.is_lit());

        flash.trigger();
        assert!(flash.is_lit());

        tokio::time::sleep(FLASH_DURATION + Duration::from_millis(50)).await;
        assert!(!flash.is_lit());
    }

    #[tokio::test]
    async fn disconnect_when_never_connected_is_a_no_op() {
        let ledger = BufferLedger::new();
        let mut session = LiveFeedSession::new("ws://127.0.0.1:1/", &ledger);

        assert_eq!(session.state(), SessionState::Disconnected);
        session.disconnect();
        session.disconnect();
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(session.latest_frame().is_none());
    }

    #[tokio::test]
    async fn failed_connect_ends_disconnected() {
        let ledger = BufferLedger::new();
        // Port 1 refuses connections; the session task must end in
        // Disconnected without anyone calling disconnect.
        let mut session = LiveFeedSession::new("ws://127.0.0.1:1/", &ledger);
        session.connect();

        for _ in 0..50 {
            if session.state() == SessionState::Disconnected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(session.state(), SessionState::Disconnected);

        // And a fresh connect attempt is permitted again.
        session.connect();
        assert!(session.link.is_some());
    }
}
