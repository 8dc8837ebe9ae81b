//! Scripted in-memory transport.
//!
//! Each route holds a queue of replies; the last reply of a queue repeats
//! for every further call. Unrouted requests get a 404.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::{HttpRequest, HttpResponse, Method, Transport};
use crate::error::TransportError;

type Reply = Result<HttpResponse, TransportError>;

#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    calls: Mutex<Vec<HttpRequest>>,
    latency: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every reply, which keeps concurrent calls overlapping.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queues a reply for `method url`.
    pub fn push(&self, method: Method, url: &str, reply: Reply) {
        lock(&self.routes)
            .entry((method, url.to_string()))
            .or_default()
            .push_back(reply);
    }

    pub fn respond(&self, method: Method, url: &str, status: u16, body: Value) {
        self.push(method, url, Ok(HttpResponse::new(status, body)));
    }

    pub fn fail(&self, method: Method, url: &str, error: TransportError) {
        self.push(method, url, Err(error));
    }

    /// Drops every queued reply for `method url`.
    pub fn reset(&self, method: Method, url: &str) {
        lock(&self.routes).remove(&(method, url.to_string()));
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, method: Method, url: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|req| req.method == method && req.url == url)
            .count()
    }

    fn next_reply(&self, method: Method, url: &str) -> Reply {
        let mut routes = lock(&self.routes);
        match routes.get_mut(&(method, url.to_string())) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(not_found),
            Some(queue) => queue.front().cloned().unwrap_or_else(not_found),
            None => not_found(),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        lock(&self.calls).push(request.clone());
        let reply = self.next_reply(request.method, &request.url);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        reply
    }
}

fn not_found() -> Reply {
    Ok(HttpResponse::new(404, json!({"message": "No mock route"})))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_last_reply_is_sticky() {
        let transport = MockTransport::new();
        transport.respond(Method::Get, "/x", 503, Value::Null);
        transport.respond(Method::Get, "/x", 200, json!(1));

        let statuses: Vec<u16> = [
            transport.send(HttpRequest::new(Method::Get, "/x")).await,
            transport.send(HttpRequest::new(Method::Get, "/x")).await,
            transport.send(HttpRequest::new(Method::Get, "/x")).await,
        ]
        .into_iter()
        .map(|r| r.unwrap().status)
        .collect();

        assert_eq!(statuses, vec![503, 200, 200]);
        assert_eq!(transport.call_count(Method::Get, "/x"), 3);
    }

    #[tokio::test]
    async fn test_unrouted_is_404() {
        let transport = MockTransport::new();
        let response = transport
            .send(HttpRequest::new(Method::Delete, "/nothing"))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_transport_failure_reply() {
        let transport = MockTransport::new();
        transport.fail(Method::Get, "/x", TransportError::Timeout);

        let err = transport.send(HttpRequest::new(Method::Get, "/x")).await.unwrap_err();
        assert_eq!(err, TransportError::Timeout);
    }
}
