//! API Module
//!
//! Domain service consumed by UI callers.
//!
//! # Operations
//! - Users: list, get, create, update, delete
//! - Posts: list, list by author, get, create, update, delete
//! - Dashboard: users and posts with stale-cache fallback

pub mod service;

pub use service::{ApiService, POSTS, USERS};
