//! Resource models for the API service
//!
//! Request bodies for mutations, resource shapes for reads, and the typed
//! cache payload.

pub mod payload;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use payload::Payload;
pub use requests::{NewPost, NewUser, PostUpdate, UserUpdate};
pub use responses::{DashboardData, DataSource, Fetched, Post, User};
