//! Client Module
//!
//! Outbound request plumbing: the transport and session contracts, the
//! retry executor, and the pipeline that classifies and reports failures.

mod category;
mod http;
#[cfg(any(feature = "test-util", test))]
mod mock;
mod notify;
mod pipeline;
mod retry;
mod session;
mod transport;

pub use category::ErrorCategory;
pub use http::HttpClient;
#[cfg(any(feature = "test-util", test))]
pub use mock::MockTransport;
pub use notify::{MemoryNotifier, Notification, NotificationSink, Severity, TracingNotifier};
pub use pipeline::Pipeline;
pub use retry::{execute_request, RetryPolicy, DEFAULT_RETRYABLE_STATUS_CODES};
pub use session::{NoSession, SessionProvider, StaticSession};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
