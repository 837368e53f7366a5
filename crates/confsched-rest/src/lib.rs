//! confsched-rest: REST facade for the conference schedule service
//!
//! This crate turns the remote schedule API into typed domain values:
//!
//! - Fetching and parsing the full schedule, sorted by start time
//! - Tag search that shares instances with full-schedule results
//! - MySchedule activation, validation, favourites fetch and save
//!
//! Entities come back wrapped for lazy loading; reading a detail field
//! (summary, tags, speaker bio...) triggers a follow-up fetch on first
//! access. See `confsched-core` for the mechanism.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use confsched_rest::{ScheduleClient, ScheduleConfig};
//!
//! let config = ScheduleConfig::new("http://rest.example.com/api", "1");
//! let client = ScheduleClient::new(config)?;
//!
//! let schedule = client.get_full_schedule().await?;
//! for slot in &schedule {
//!     println!("{} {}", slot.from_time, slot.title);
//! }
//!
//! // First read of a lazy field fetches the detail resource.
//! if let Some(first) = schedule.first() {
//!     let summary = first.summary().await?;
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;

pub use client::ScheduleClient;
pub use config::ScheduleConfig;
pub use error::{Result, ScheduleError};
pub use http::ReqwestHttpClient;
