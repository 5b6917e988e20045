//! Date-scoped fetching of the daily score and its sample list.
//!
//! The scoreboard owns the dashboard's published state for the currently
//! selected calendar day. Selecting a date bumps a generation counter;
//! every fetch chain carries the ticket it started with and may only
//! publish while its ticket is still current. A slow response for a
//! superseded date therefore lands in the void instead of overwriting the
//! state belonging to a newer selection. Cancellation is cooperative only:
//! the stale request is ignored at publish time, never aborted in flight.

use std::sync::Mutex;

use chrono::NaiveDate;

use crate::monitor::api::DapurApi;
use crate::monitor::model::{SampleRecord, ScoreSummary};
use crate::monitor::pagination::Pager;

/// Proof of which generation a fetch chain belongs to. Obtained from
/// [`Scoreboard::begin`] and presented back at publish time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// The published dashboard state for the selected day.
#[derive(Debug, Clone, Default)]
pub struct ScoreboardState {
    /// The day's summary; `None` when the day has no data or the fetch failed.
    pub summary: Option<ScoreSummary>,
    /// The day's samples in backend order; empty when nothing is available.
    pub samples: Vec<SampleRecord>,
    /// The page cursor over `samples`.
    pub pager: Pager,
}

/// The generation counter and the state it protects, behind one lock.
struct Inner {
    /// Generation of the most recent [`Scoreboard::begin`].
    generation: u64,
    state: ScoreboardState,
}

/// Fetches and holds the score summary plus dependent sample list for one
/// selected date at a time.
pub struct Scoreboard {
    inner: Mutex<Inner>,
}

impl Scoreboard {
    /// Creates an empty scoreboard with the given page size.
    pub fn new(per_page: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                generation: 0,
                state: ScoreboardState {
                    summary: None,
                    samples: Vec::new(),
                    pager: Pager::new(per_page),
                },
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("Scoreboard lock poisoned")
    }

    /// Starts a new fetch generation, invalidating every ticket issued
    /// before this call.
    pub fn begin(&self) -> FetchTicket {
        let mut inner = self.lock();
        inner.generation += 1;
        FetchTicket {
            generation: inner.generation,
        }
    }

    /// # Publish
    ///
    /// Atomically replaces the published state with the outcome of one
    /// fetch chain and resets the page cursor to 1. Returns `false` without
    /// touching anything when `ticket` has been superseded by a newer
    /// [`begin`](Self::begin).
    ///
    /// The generation comparison and the replacement happen inside the same
    /// critical section, so a stale publisher can never pass the check and
    /// then overwrite state that a newer chain installed in between.
    pub fn publish(
        &self,
        ticket: FetchTicket,
        summary: Option<ScoreSummary>,
        samples: Vec<SampleRecord>,
    ) -> bool {
        let mut inner = self.lock();
        if ticket.generation != inner.generation {
            log::debug!(
                "Discarding stale fetch result (generation {} superseded)",
                ticket.generation
            );
            return false;
        }

        // Pagination is recomputed inside the same lock as the replacement,
        // so no observer can see a fresh sequence with a stale page.
        inner.state.summary = summary;
        inner.state.samples = samples;
        inner.state.pager.reset();
        true
    }

    /// # Select Date
    ///
    /// Runs the fetch chain for `date`: summary first, then, only if a
    /// summary exists, its sample list by summary id. Failures have
    /// already been degraded to `None`/empty inside [`DapurApi`], so the
    /// chain always ends in a publish attempt; whether the attempt lands is
    /// decided by the generation check.
    pub async fn select_date(&self, api: &DapurApi, date: NaiveDate) {
        let ticket = self.begin();

        let summary = api.score_for_date(date).await;
        let samples = match &summary {
            Some(summary) => api.samples_for_score(summary.id).await,
            None => Vec::new(),
        };

        if self.publish(ticket, summary, samples) {
            log::info!("Scoreboard refreshed for {}", date);
        }
    }

    /// A clone of the currently published state.
    pub fn snapshot(&self) -> ScoreboardState {
        self.lock().state.clone()
    }

    /// The sample rows visible on the current page, with `(page, total_pages)`.
    pub fn page_view(&self) -> (Vec<SampleRecord>, usize, usize) {
        let inner = self.lock();
        let state = &inner.state;
        let rows = state.pager.slice(&state.samples).to_vec();
        (rows, state.pager.page(), state.pager.total_pages(state.samples.len()))
    }

    /// Advances the page cursor; bounded at the last page.
    pub fn next_page(&self) {
        let mut inner = self.lock();
        let len = inner.state.samples.len();
        inner.state.pager.next(len);
    }

    /// Moves the page cursor back; bounded at page 1.
    pub fn prev_page(&self) {
        self.lock().state.pager.prev();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::Map;

    fn summary(id: i64, score: f64, clean: i64, total: i64) -> ScoreSummary {
        ScoreSummary {
            id,
            score,
            clean_sample: clean,
            total_sample: total,
        }
    }

    fn samples(count: usize) -> Vec<SampleRecord> {
        (0..count)
            .map(|i| SampleRecord {
                id: i as i64,
                created_at: Utc::now(),
                is_clean: i % 2 == 0,
                extra: Map::new(),
            })
            .collect()
    }

    #[test]
    fn stale_ticket_cannot_overwrite_newer_state() {
        let board = Scoreboard::new(10);

        // Select D1 (slow), then immediately select D2 (fast).
        let d1_ticket = board.begin();
        let d2_ticket = board.begin();

        // D2's response arrives first and lands.
        assert!(board.publish(d2_ticket, Some(summary(2, 80.0, 8, 10)), samples(10)));

        // D1's late response must be discarded.
        assert!(!board.publish(d1_ticket, Some(summary(1, 10.0, 1, 10)), samples(3)));

        let state = board.snapshot();
        assert_eq!(state.summary.unwrap().id, 2);
        assert_eq!(state.samples.len(), 10);
    }

    #[test]
    fn racing_publishers_cannot_land_a_superseded_ticket() {
        use std::sync::Arc;

        let board = Arc::new(Scoreboard::new(10));
        for _ in 0..200 {
            let old_ticket = board.begin();
            let racer = Arc::clone(&board);
            let slow_publish = std::thread::spawn(move || {
                racer.publish(old_ticket, Some(summary(1, 10.0, 1, 10)), samples(3))
            });

            // A newer selection starts and publishes while the old chain's
            // publish may be anywhere between its check and its write.
            let new_ticket = board.begin();
            assert!(board.publish(new_ticket, Some(summary(2, 80.0, 8, 10)), samples(10)));
            slow_publish.join().unwrap();

            // Whatever the interleaving, the newest generation owns the state.
            let state = board.snapshot();
            assert_eq!(state.summary.unwrap().id, 2);
            assert_eq!(state.samples.len(), 10);
        }
    }

    #[test]
    fn publish_replaces_wholesale_and_resets_page() {
        let board = Scoreboard::new(10);
        board.publish(board.begin(), Some(summary(7, 92.0, 46, 50)), samples(15));
        board.next_page();

        let (rows, page, total) = board.page_view();
        assert_eq!(page, 2);
        assert_eq!(total, 2);
        assert_eq!(rows.len(), 5);

        // A new day's data lands: page goes back to 1.
        board.publish(board.begin(), Some(summary(8, 50.0, 5, 10)), samples(4));
        let (rows, page, total) = board.page_view();
        assert_eq!(page, 1);
        assert_eq!(total, 1);
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn day_with_fifteen_samples_pages_as_one_of_two() {
        let board = Scoreboard::new(10);
        let day = summary(7, 92.0, 46, 50);
        assert_eq!(day.dirty_sample(), 4);

        board.publish(board.begin(), Some(day), samples(15));
        let (rows, page, total) = board.page_view();
        assert_eq!((page, total), (1, 2));
        assert_eq!(rows.len(), 10);
    }

    #[test]
    fn absent_summary_publishes_one_empty_page() {
        let board = Scoreboard::new(10);
        board.publish(board.begin(), Some(summary(7, 92.0, 46, 50)), samples(15));
        board.next_page();

        // `/score/` returned `{data: null}` for the newly selected day.
        assert!(board.publish(board.begin(), None, Vec::new()));

        let state = board.snapshot();
        assert!(state.summary.is_none());
        assert!(state.samples.is_empty());
        let (rows, page, total) = board.page_view();
        assert!(rows.is_empty());
        assert_eq!((page, total), (1, 1));
    }

    #[test]
    fn page_navigation_is_bounded() {
        let board = Scoreboard::new(10);
        board.publish(board.begin(), Some(summary(7, 92.0, 46, 50)), samples(15));

        board.prev_page();
        assert_eq!(board.page_view().1, 1);

        board.next_page();
        board.next_page(); // bounded at totalPages
        assert_eq!(board.page_view().1, 2);
    }
}
