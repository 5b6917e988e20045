//! # Data Retrieval Module
//!
//! This module provides a centralized location for generic data retrieval
//! clients and utilities, primarily focused on HTTP-based interactions with
//! the Dapurate backend service.
//!
//! ## Purpose:
//! The goal of the `retrieve` module is to offer a consistent way to fetch
//! data from the backend, encapsulating common concerns such as HTTP request
//! building, URL joining, and non-throwing status handling. This prevents
//! duplication of networking logic across the typed API surface.
//!
//! ## Contained Modules:
//!
//! - **`api_client`**: A generic HTTP `ApiClient` built on `reqwest`. It
//!   reports failures through an `ApiResponse` instead of erroring on
//!   non-2xx statuses, and supports both JSON and raw binary payloads.
//!
//! Note that the client deliberately performs **no automatic retries and
//! sets no timeouts**: failed requests surface as non-success responses and
//! are handled by the caller's degradation policy.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Generic HTTP API client for JSON and binary payloads.
pub mod api_client;
