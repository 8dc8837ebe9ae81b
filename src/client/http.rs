//! Per-attempt request glue: auth context, status mapping and decoding.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::{HttpRequest, Method, SessionProvider, Transport};
use crate::error::{FetchError, TransportError};

// == Http Client ==
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionProvider>,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<dyn SessionProvider>) -> Self {
        Self { transport, session }
    }

    // == Send ==
    /// Sends one attempt and returns the raw body of a 2xx response.
    ///
    /// A missing or failing session never blocks the call; the request
    /// just goes out without an `Authorization` header.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<Value, FetchError> {
        let mut request = HttpRequest::new(method, url);
        if let Some(body) = body {
            request = request.with_body(body);
        }

        match self.session.current_session_token().await {
            Ok(Some(token)) => {
                request = request.with_header("Authorization", format!("Bearer {}", token));
            }
            Ok(None) => {}
            Err(err) => debug!("No session token attached: {:#}", err),
        }

        debug!(method = %method, url, "Sending request");
        let response = self.transport.send(request).await?;

        if response.is_success() {
            Ok(response.body)
        } else {
            let body = match response.body {
                Value::Null => None,
                other => Some(other),
            };
            Err(FetchError::HttpStatus {
                status: response.status,
                body,
            })
        }
    }

    /// Sends one attempt and decodes the response body into `T`.
    pub async fn send_json<T, B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        let value = self.send(method, url, body).await?;
        serde_json::from_value(value).map_err(|e| FetchError::Decode(e.to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        self.send_json::<T, Value>(Method::Get, url, None).await
    }
}
