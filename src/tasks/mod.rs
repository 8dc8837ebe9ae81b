//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the client is up.
//!
//! # Tasks
//! - Dashboard refresh: reloads the dashboard at configured intervals

mod refresh;

pub use refresh::spawn_refresh_task;
