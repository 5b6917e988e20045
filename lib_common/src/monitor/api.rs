//! # Dapurate API Client
//!
//! This module provides a dedicated client for the Dapurate backend. It
//! encapsulates the paths and response envelopes of every endpoint the
//! dashboard uses and acts as the validation boundary for the rest of the
//! workspace.
//!
//! ## Core Features:
//! - **Dedicated Client**: wraps a pre-configured [`ApiClient`] with the
//!   backend's base URL, simplifying request paths.
//! - **Local Degradation**: every failure mode (transport error, non-2xx
//!   status, or a response that does not match the documented shape) is
//!   logged and coerced to an absent/empty result. Nothing here returns an
//!   error to the caller, and nothing is retried.
//! - **Date-based Queries**: the score endpoint is keyed by the viewer's
//!   local calendar day in `YYYY-MM-DD` form.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

use bytes::Bytes;
use chrono::NaiveDate;
use reqwest::Method;
use serde_json::json;

use crate::monitor::model::{date_query, Envelope, SampleRecord, ScoreSummary, ViolationRecord};
use crate::retrieve::api_client::{ApiClient, ApiResponse};

/// # Dapurate API Call Client
///
/// A specialized client for the Dapurate backend endpoints. One instance is
/// shared by the scoreboard, the detail view, and the capture trigger.
pub struct DapurApi {
    /// The underlying generic HTTP client, pre-configured for the backend base URL.
    client: ApiClient,
}

impl DapurApi {
    /// Initializes a new client for the backend at `base_url`
    /// (e.g., `http://localhost:8080`).
    ///
    /// # Panics
    /// Panics if `base_url` is not a valid absolute URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: ApiClient::new(base_url),
        }
    }

    /// # Score For Date
    ///
    /// `GET /score/?date=YYYY-MM-DD`. Returns the day's summary, or `None`
    /// when the day has no data, the call failed, or the payload did not
    /// match the documented shape.
    pub async fn score_for_date(&self, date: NaiveDate) -> Option<ScoreSummary> {
        let query = [("date", date_query(date))];
        let resp = self
            .client
            .request::<Envelope<ScoreSummary>, ()>(Method::GET, "score/", Some(&query), None)
            .await;
        unwrap_data(resp, "score/")
    }

    /// # Samples For Score
    ///
    /// `GET /sample/score/{scoreId}`. Returns the sample sequence in backend
    /// order, or an empty sequence on any failure. A `data` field that is
    /// not an array counts as a failure and coerces to empty.
    pub async fn samples_for_score(&self, score_id: i64) -> Vec<SampleRecord> {
        let path = format!("sample/score/{score_id}");
        let resp = self
            .client
            .request::<Envelope<Vec<SampleRecord>>, ()>(Method::GET, &path, None, None)
            .await;
        unwrap_data(resp, &path).unwrap_or_default()
    }

    /// # Sample Detail
    ///
    /// `GET /sample/{id}`. Returns the full record, or `None` on failure.
    pub async fn sample(&self, sample_id: i64) -> Option<SampleRecord> {
        let path = format!("sample/{sample_id}");
        let resp = self
            .client
            .request::<Envelope<SampleRecord>, ()>(Method::GET, &path, None, None)
            .await;
        unwrap_data(resp, &path)
    }

    /// # Update Sample
    ///
    /// `PUT /sample/{id}` with `{ "is_clean": ... }`. Returns `true` only on
    /// an explicit 2xx acknowledgement.
    pub async fn update_sample(&self, sample_id: i64, is_clean: bool) -> bool {
        let path = format!("sample/{sample_id}");
        let body = json!({ "is_clean": is_clean });
        match self
            .client
            .request::<Envelope<serde_json::Value>, _>(Method::PUT, &path, None, Some(body))
            .await
        {
            Ok(resp) if resp.success => true,
            Ok(resp) => {
                log::warn!("PUT {} rejected with status {}", path, resp.status);
                false
            }
            Err(e) => {
                log::warn!("PUT {} failed: {}", path, e);
                false
            }
        }
    }

    /// # Delete Sample
    ///
    /// `DELETE /sample/{id}`. Returns `true` only on a 2xx acknowledgement.
    pub async fn delete_sample(&self, sample_id: i64) -> bool {
        let path = format!("sample/{sample_id}");
        match self
            .client
            .request::<Envelope<serde_json::Value>, ()>(Method::DELETE, &path, None, None)
            .await
        {
            Ok(resp) if resp.success => true,
            Ok(resp) => {
                log::warn!("DELETE {} rejected with status {}", path, resp.status);
                false
            }
            Err(e) => {
                log::warn!("DELETE {} failed: {}", path, e);
                false
            }
        }
    }

    /// # Violations For Sample
    ///
    /// `GET /violation/sample/{id}`. Empty on any failure or shape mismatch.
    pub async fn violations_for_sample(&self, sample_id: i64) -> Vec<ViolationRecord> {
        let path = format!("violation/sample/{sample_id}");
        let resp = self
            .client
            .request::<Envelope<Vec<ViolationRecord>>, ()>(Method::GET, &path, None, None)
            .await;
        unwrap_data(resp, &path).unwrap_or_default()
    }

    /// # Raw Image
    ///
    /// `GET /image/raw/{id}`: the unprocessed capture as bytes.
    pub async fn raw_image(&self, sample_id: i64) -> Option<Bytes> {
        self.image(&format!("image/raw/{sample_id}")).await
    }

    /// # Result Image
    ///
    /// `GET /image/result/{id}`: the detection overlay as bytes.
    pub async fn result_image(&self, sample_id: i64) -> Option<Bytes> {
        self.image(&format!("image/result/{sample_id}")).await
    }

    /// # Trigger Capture
    ///
    /// `GET /image/shoot`. Returns `true` only when the backend explicitly
    /// acknowledges with `{ "success": true }`; anything else, including a
    /// 2xx without the flag, is treated as a failed capture.
    pub async fn trigger_capture(&self) -> bool {
        match self
            .client
            .request::<Envelope<serde_json::Value>, ()>(Method::GET, "image/shoot", None, None)
            .await
        {
            Ok(resp) if resp.success => {
                resp.data.and_then(|e| e.success).unwrap_or(false)
            }
            Ok(resp) => {
                log::warn!("GET image/shoot rejected with status {}", resp.status);
                false
            }
            Err(e) => {
                log::warn!("GET image/shoot failed: {}", e);
                false
            }
        }
    }

    async fn image(&self, path: &str) -> Option<Bytes> {
        match self.client.fetch_bytes(path).await {
            Ok(resp) if resp.success => resp.data,
            Ok(resp) => {
                log::warn!("GET {} rejected with status {}", path, resp.status);
                None
            }
            Err(e) => {
                log::warn!("GET {} failed: {}", path, e);
                None
            }
        }
    }
}

/// Collapses a transport result into the envelope's `data`, logging the
/// reason whenever the outcome is "nothing available".
fn unwrap_data<T>(resp: anyhow::Result<ApiResponse<Envelope<T>>>, path: &str) -> Option<T> {
    match resp {
        Ok(r) if r.success => r.data.and_then(|envelope| envelope.data),
        Ok(r) => {
            log::warn!("GET {} rejected with status {}", path, r.status);
            None
        }
        Err(e) => {
            log::warn!("GET {} failed: {}", path, e);
            None
        }
    }
}
