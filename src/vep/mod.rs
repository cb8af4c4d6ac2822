//! Ensembl Variant Effect Predictor (VEP) access
//!
//! This module provides the REST client used to annotate one variant at a
//! time, the payload types it decodes, and the retry policy and transport
//! seam it is built on.

pub mod client;
pub mod mock;
pub mod retry;
pub mod transport;
pub mod types;

pub use client::{AnnotationQuery, VepClient, DEFAULT_BASE_URL, VEP_HEADERS};
pub use mock::{MockTransport, RecordedRequest};
pub use retry::RetryPolicy;
pub use transport::{HttpMethod, HttpResponse, HttpTransport, Transport, DEFAULT_TIMEOUT};
pub use types::{TranscriptConsequence, VepPayload};
