//! Per-sample detail context: raw image, detection result, violations, and
//! the full record, plus the two mutations the detail view offers.
//!
//! Mutations never trust a partial local update: a successful toggle is
//! followed by a full reload of every piece of the context, so the display
//! always reflects what the backend reconfirmed.

use std::sync::Arc;

use crate::core::resource::{BufferLedger, ImageSlot};
use crate::monitor::api::DapurApi;
use crate::monitor::model::{SampleRecord, ViolationRecord};

/// Everything the detail view shows for one sample.
pub struct SampleDetail {
    sample_id: i64,
    /// The full record, absent until loaded or when the fetch failed.
    pub sample: Option<SampleRecord>,
    /// Detected violations; empty on failure.
    pub violations: Vec<ViolationRecord>,
    /// The unprocessed capture. Owns at most one unreleased payload.
    pub raw: ImageSlot,
    /// The detection overlay. Owns at most one unreleased payload.
    pub result: ImageSlot,
    /// True while a load is in flight.
    pub loading: bool,
}

impl SampleDetail {
    /// Creates an empty context for `sample_id`, accounting its image slots
    /// against `ledger`.
    pub fn new(sample_id: i64, ledger: &Arc<BufferLedger>) -> Self {
        Self {
            sample_id,
            sample: None,
            violations: Vec::new(),
            raw: ImageSlot::new(Arc::clone(ledger)),
            result: ImageSlot::new(Arc::clone(ledger)),
            loading: false,
        }
    }

    /// The sample this context belongs to.
    pub fn sample_id(&self) -> i64 {
        self.sample_id
    }

    /// # Load All
    ///
    /// Fetches the raw image, the result image, the violation list, and the
    /// record concurrently. Each piece degrades independently: a failed
    /// image fetch clears its slot, failed lists come back empty.
    pub async fn load_all(&mut self, api: &DapurApi) {
        self.loading = true;

        let (raw, result, violations, sample) = tokio::join!(
            api.raw_image(self.sample_id),
            api.result_image(self.sample_id),
            api.violations_for_sample(self.sample_id),
            api.sample(self.sample_id),
        );

        match raw {
            Some(payload) => self.raw.publish(payload),
            None => self.raw.clear(),
        }
        match result {
            Some(payload) => self.result.publish(payload),
            None => self.result.clear(),
        }
        self.violations = violations;
        self.sample = sample;

        self.loading = false;
    }

    /// # Toggle Clean
    ///
    /// Flips the backend classification of this sample. On a successful
    /// acknowledgement the whole context is reloaded; nothing is mutated
    /// locally. Returns whether the toggle was acknowledged.
    pub async fn toggle_clean(&mut self, api: &DapurApi) -> bool {
        let Some(current) = &self.sample else {
            log::warn!("Toggle requested before sample {} was loaded", self.sample_id);
            return false;
        };

        if api.update_sample(self.sample_id, !current.is_clean).await {
            self.load_all(api).await;
            true
        } else {
            false
        }
    }

    /// # Delete
    ///
    /// Removes this sample on the backend. On success both image slots are
    /// released and the context emptied; the caller is expected to navigate
    /// away. Returns whether the delete was acknowledged.
    pub async fn delete(&mut self, api: &DapurApi) -> bool {
        if api.delete_sample(self.sample_id).await {
            self.raw.clear();
            self.result.clear();
            self.violations.clear();
            self.sample = None;
            true
        } else {
            false
        }
    }
}
