//! Ensembl VEP REST client
//!
//! Queries the region endpoint one variant at a time:
//!
//! ```text
//! GET <base>/<chrom>:<start>-<end>/<allele>
//! ```
//!
//! Transport failures, non-200 statuses and undecodable bodies are retried
//! under the configured [`RetryPolicy`]; once the attempts run out the caller
//! gets [`VepError::RetriesExhausted`].

use std::fmt;
use std::thread;

use tracing::debug;

use crate::error::VepError;
use crate::vcf::VcfRecord;

use super::retry::RetryPolicy;
use super::transport::{HttpMethod, HttpTransport, Transport};
use super::types::VepPayload;

/// Human GRCh38 region endpoint
pub const DEFAULT_BASE_URL: &str = "https://rest.ensembl.org/vep/homo_sapiens/region/";

/// Headers sent with every request: JSON output, HGVS notation, CADD scores,
/// one picked consequence per variant, and LOFTEE loss-of-function calls.
pub const VEP_HEADERS: &[(&str, &str)] = &[
    ("Content-Type", "application/json"),
    ("hgvs", "true"),
    ("CADD", "true"),
    ("pick", "true"),
    ("LoF", "true"),
];

/// The region and allele to annotate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationQuery {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub allele: String,
}

impl AnnotationQuery {
    /// Create a query
    pub fn new(chrom: impl Into<String>, start: i64, end: i64, allele: impl Into<String>) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
            allele: allele.into(),
        }
    }

    /// Query for a record's calling window (WS/WE) and first alternate allele
    pub fn from_record(record: &VcfRecord) -> Result<Self, VepError> {
        let (start, end) = record.window()?;
        let allele = record
            .primary_alternate()
            .ok_or_else(|| VepError::MissingAllele {
                location: record.location(),
            })?;
        Ok(Self::new(record.chrom.clone(), start, end, allele))
    }

    /// `chrom:start-end/allele`
    pub fn path(&self) -> String {
        format!("{}:{}-{}/{}", self.chrom, self.start, self.end, self.allele)
    }
}

impl fmt::Display for AnnotationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Client for the VEP region endpoint
#[derive(Debug, Clone)]
pub struct VepClient<T> {
    transport: T,
    base_url: String,
    retry: RetryPolicy,
}

impl VepClient<HttpTransport> {
    /// Client backed by a real HTTP transport with default settings
    pub fn http() -> Result<Self, VepError> {
        Ok(Self::new(HttpTransport::new()?))
    }
}

impl<T: Transport> VepClient<T> {
    /// Create a client with the default endpoint and retry policy
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Use a different endpoint (e.g., the GRCh37 mirror)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = format!("{}/", base_url.trim_end_matches('/'));
        self
    }

    /// Use a different retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Endpoint prefix, always ending in '/'
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Active retry policy
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Full request URL for a query
    pub fn build_url(&self, query: &AnnotationQuery) -> String {
        format!("{}{}", self.base_url, query.path())
    }

    /// Annotate a query with GET, retrying transient failures
    pub fn fetch(&self, query: &AnnotationQuery) -> Result<Vec<VepPayload>, VepError> {
        self.fetch_with(HttpMethod::Get, query)
    }

    /// Annotate a query with the given method, retrying transient failures
    pub fn fetch_with(
        &self,
        method: HttpMethod,
        query: &AnnotationQuery,
    ) -> Result<Vec<VepPayload>, VepError> {
        let url = self.build_url(query);
        let attempts = self.retry.attempts();
        let mut attempt = 1;

        loop {
            let err = match self.attempt(method, &url) {
                Ok(payloads) => return Ok(payloads),
                Err(e) if e.is_transient() => e,
                Err(e) => return Err(e),
            };

            if attempt >= attempts {
                return Err(VepError::RetriesExhausted {
                    url,
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let wait = self.retry.delay(attempt);
            debug!(
                "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                attempt, attempts, url, err, wait
            );
            thread::sleep(wait);
            attempt += 1;
        }
    }

    /// One request, no retries
    fn attempt(&self, method: HttpMethod, url: &str) -> Result<Vec<VepPayload>, VepError> {
        debug!("{} request to {}", method, url);
        let response = self.transport.send(method, url, VEP_HEADERS)?;
        debug!("Received status {}", response.status);

        if response.status != 200 {
            return Err(VepError::UnexpectedStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| VepError::InvalidPayload {
            url: url.to_string(),
            msg: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vep::mock::MockTransport;
    use crate::vep::transport::HttpResponse;

    const PAYLOAD: &str = r#"[{"most_severe_consequence": "missense_variant",
        "transcript_consequences": [{"gene_symbol": "BRCA1"}]}]"#;

    fn query() -> AnnotationQuery {
        AnnotationQuery::new("1", 90, 110, "G")
    }

    fn client(mock: &MockTransport, attempts: u32) -> VepClient<&MockTransport> {
        VepClient::new(mock).with_retry(RetryPolicy::immediate(attempts))
    }

    #[test]
    fn test_build_url() {
        let mock = MockTransport::new();
        let client = VepClient::new(&mock);
        assert_eq!(
            client.build_url(&query()),
            "https://rest.ensembl.org/vep/homo_sapiens/region/1:90-110/G"
        );
    }

    #[test]
    fn test_base_url_normalized() {
        let mock = MockTransport::new();
        let client = VepClient::new(&mock).with_base_url("http://localhost:8080/vep/region");
        assert_eq!(client.base_url(), "http://localhost:8080/vep/region/");
        let client = client.with_base_url("http://localhost:8080/vep/region//");
        assert_eq!(client.base_url(), "http://localhost:8080/vep/region/");
    }

    #[test]
    fn test_query_from_record() {
        let record = VcfRecord::snv("7", 140753336, 'A', 'T').with_depths(30, vec![12]);
        let query = AnnotationQuery::from_record(&record).unwrap();
        assert_eq!(query.path(), "7:140753336-140753336/T");
    }

    #[test]
    fn test_query_from_record_without_window() {
        let record = VcfRecord::snv("7", 100, 'A', 'T');
        assert!(matches!(
            AnnotationQuery::from_record(&record),
            Err(VepError::MissingInfo { .. })
        ));
    }

    #[test]
    fn test_query_from_record_without_alternate() {
        let record = VcfRecord::new("7".into(), 100, "A".into(), vec![".".into()])
            .with_depths(30, vec![0]);
        assert!(matches!(
            AnnotationQuery::from_record(&record),
            Err(VepError::MissingAllele { .. })
        ));
    }

    #[test]
    fn test_fetch_sends_vep_headers() {
        let mock = MockTransport::new();
        mock.push_response(HttpResponse::ok(PAYLOAD));

        let payloads = client(&mock, 10).fetch(&query()).unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].first_gene_symbol(), Some("BRCA1"));

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Get);
        let headers: Vec<_> = requests[0]
            .headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(headers, VEP_HEADERS);
    }

    #[test]
    fn test_fetch_succeeds_on_last_attempt() {
        let mock = MockTransport::new();
        mock.push_statuses(503, 9);
        mock.push_response(HttpResponse::ok(PAYLOAD));

        let payloads = client(&mock, 10).fetch(&query()).unwrap();
        assert_eq!(payloads.len(), 1);
        assert_eq!(mock.request_count(), 10);
    }

    #[test]
    fn test_fetch_gives_up_after_max_attempts() {
        let mock = MockTransport::new();
        mock.push_statuses(500, 10);
        mock.push_response(HttpResponse::ok(PAYLOAD));

        let err = client(&mock, 10).fetch(&query()).unwrap_err();
        assert_eq!(mock.request_count(), 10);
        match err {
            VepError::RetriesExhausted { attempts, last, .. } => {
                assert_eq!(attempts, 10);
                assert!(matches!(
                    *last,
                    VepError::UnexpectedStatus { status: 500, .. }
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_transport_errors_are_retried() {
        let mock = MockTransport::new();
        mock.push_error(VepError::Transport {
            url: "u".into(),
            msg: "connection reset".into(),
        });
        mock.push_response(HttpResponse::ok(PAYLOAD));

        assert!(client(&mock, 3).fetch(&query()).is_ok());
        assert_eq!(mock.request_count(), 2);
    }

    #[test]
    fn test_undecodable_body_is_retried() {
        let mock = MockTransport::new();
        mock.push_response(HttpResponse::ok("<html>busy</html>"));
        mock.push_response(HttpResponse::ok(PAYLOAD));

        assert!(client(&mock, 3).fetch(&query()).is_ok());
        assert_eq!(mock.request_count(), 2);
    }

    #[test]
    fn test_non_transient_error_is_not_retried() {
        let mock = MockTransport::new();
        mock.push_error(VepError::Io {
            msg: "disk on fire".into(),
        });
        mock.push_response(HttpResponse::ok(PAYLOAD));

        let err = client(&mock, 10).fetch(&query()).unwrap_err();
        assert!(matches!(err, VepError::Io { .. }));
        assert_eq!(mock.request_count(), 1);
    }

    #[test]
    fn test_empty_array_is_a_success() {
        let mock = MockTransport::new();
        mock.push_response(HttpResponse::ok("[]"));
        assert!(client(&mock, 10).fetch(&query()).unwrap().is_empty());
    }

    #[test]
    fn test_fetch_with_post() {
        let mock = MockTransport::new();
        mock.push_response(HttpResponse::ok(PAYLOAD));
        client(&mock, 1)
            .fetch_with(HttpMethod::Post, &query())
            .unwrap();
        assert_eq!(mock.requests()[0].method, HttpMethod::Post);
    }
}
