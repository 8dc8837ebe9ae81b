//! User-facing error categories.

use serde::Serialize;

use crate::error::{FetchError, RequestFailed, TransportError};

// == Error Category ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    Unprocessable,
    RateLimited,
    ServerError,
    ServiceUnavailable,
    Network,
    RequestSetup,
}

impl ErrorCategory {
    // == Classify ==
    /// Maps a terminal request failure onto a category.
    ///
    /// 408 counts as a network problem. Unlisted 4xx codes fall back to
    /// `BadRequest`, unlisted 5xx codes to `ServerError`. A body that fails
    /// to decode is the server's fault.
    pub fn classify(failed: &RequestFailed) -> Self {
        match &failed.source {
            FetchError::Transport(TransportError::Setup(_)) => ErrorCategory::RequestSetup,
            FetchError::Transport(_) => ErrorCategory::Network,
            FetchError::Decode(_) => ErrorCategory::ServerError,
            FetchError::Validation(_) => ErrorCategory::Unprocessable,
            FetchError::HttpStatus { status, .. } => Self::from_status(*status),
        }
    }

    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorCategory::BadRequest,
            401 => ErrorCategory::Unauthorized,
            403 => ErrorCategory::Forbidden,
            404 => ErrorCategory::NotFound,
            408 => ErrorCategory::Network,
            409 => ErrorCategory::Conflict,
            422 => ErrorCategory::Unprocessable,
            429 => ErrorCategory::RateLimited,
            503 => ErrorCategory::ServiceUnavailable,
            500..=599 => ErrorCategory::ServerError,
            _ => ErrorCategory::BadRequest,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ErrorCategory::BadRequest => "Bad Request",
            ErrorCategory::Unauthorized => "Unauthorized",
            ErrorCategory::Forbidden => "Access Denied",
            ErrorCategory::NotFound => "Not Found",
            ErrorCategory::Conflict => "Conflict",
            ErrorCategory::Unprocessable => "Validation Error",
            ErrorCategory::RateLimited => "Too Many Requests",
            ErrorCategory::ServerError => "Server Error",
            ErrorCategory::ServiceUnavailable => "Service Unavailable",
            ErrorCategory::Network => "Network Error",
            ErrorCategory::RequestSetup => "Request Error",
        }
    }

    /// Default message, used when the server did not supply one.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCategory::BadRequest => "The request was invalid. Please check your input.",
            ErrorCategory::Unauthorized => "Your session has expired. Please sign in again.",
            ErrorCategory::Forbidden => "You do not have permission to perform this action.",
            ErrorCategory::NotFound => "The requested resource could not be found.",
            ErrorCategory::Conflict => {
                "The resource was changed by someone else. Refresh and try again."
            }
            ErrorCategory::Unprocessable => "The submitted data could not be processed.",
            ErrorCategory::RateLimited => "Too many requests. Please wait a moment and try again.",
            ErrorCategory::ServerError => {
                "Something went wrong on the server. Please try again later."
            }
            ErrorCategory::ServiceUnavailable => {
                "The service is temporarily unavailable. Please try again later."
            }
            ErrorCategory::Network => "Unable to reach the server. Check your connection.",
            ErrorCategory::RequestSetup => "The request could not be sent.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(source: FetchError) -> RequestFailed {
        RequestFailed::from_attempt(source, 1)
    }

    #[test]
    fn test_status_table() {
        let table = [
            (400, ErrorCategory::BadRequest),
            (401, ErrorCategory::Unauthorized),
            (403, ErrorCategory::Forbidden),
            (404, ErrorCategory::NotFound),
            (409, ErrorCategory::Conflict),
            (422, ErrorCategory::Unprocessable),
            (429, ErrorCategory::RateLimited),
            (500, ErrorCategory::ServerError),
            (502, ErrorCategory::ServerError),
            (503, ErrorCategory::ServiceUnavailable),
            (418, ErrorCategory::BadRequest),
        ];
        for (status, expected) in table {
            assert_eq!(ErrorCategory::from_status(status), expected, "status {}", status);
        }
    }

    #[test]
    fn test_transport_failures() {
        assert_eq!(
            ErrorCategory::classify(&failed(TransportError::Timeout.into())),
            ErrorCategory::Network
        );
        assert_eq!(
            ErrorCategory::classify(&failed(TransportError::Setup("bad url".into()).into())),
            ErrorCategory::RequestSetup
        );
    }

    #[test]
    fn test_titles_are_distinct() {
        let all = [
            ErrorCategory::BadRequest,
            ErrorCategory::Unauthorized,
            ErrorCategory::Forbidden,
            ErrorCategory::NotFound,
            ErrorCategory::Conflict,
            ErrorCategory::Unprocessable,
            ErrorCategory::RateLimited,
            ErrorCategory::ServerError,
            ErrorCategory::ServiceUnavailable,
            ErrorCategory::Network,
            ErrorCategory::RequestSetup,
        ];
        let titles: std::collections::HashSet<_> = all.iter().map(|c| c.title()).collect();
        assert_eq!(titles.len(), all.len());
    }
}
