//! Scripted transport for testing

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use crate::error::VepError;

use super::transport::{HttpMethod, HttpResponse, Transport};

/// A request as the mock saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// Transport that replays scripted outcomes and records every request
///
/// Outcomes queued for a specific URL are used first; otherwise the shared
/// queue is consulted. When both are empty the transport answers 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    queue: RefCell<VecDeque<Result<HttpResponse, VepError>>>,
    by_url: RefCell<HashMap<String, VecDeque<Result<HttpResponse, VepError>>>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// Create a mock with nothing scripted
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next request to any URL
    pub fn push_response(&self, response: HttpResponse) {
        self.queue.borrow_mut().push_back(Ok(response));
    }

    /// Queue a transport failure for the next request to any URL
    pub fn push_error(&self, error: VepError) {
        self.queue.borrow_mut().push_back(Err(error));
    }

    /// Queue `n` identical status responses
    pub fn push_statuses(&self, status: u16, n: usize) {
        for _ in 0..n {
            self.push_response(HttpResponse::new(status, ""));
        }
    }

    /// Queue a response for the next request to `url`
    pub fn push_response_for(&self, url: &str, response: HttpResponse) {
        self.by_url
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back(Ok(response));
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for MockTransport {
    fn send(
        &self,
        method: HttpMethod,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, VepError> {
        self.requests.borrow_mut().push(RecordedRequest {
            method,
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });

        let scripted = self
            .by_url
            .borrow_mut()
            .get_mut(url)
            .and_then(|q| q.pop_front());

        scripted
            .or_else(|| self.queue.borrow_mut().pop_front())
            .unwrap_or_else(|| Ok(HttpResponse::new(404, "")))
    }
}
