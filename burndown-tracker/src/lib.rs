//! burndown-tracker: tracker API client and the fetch → filter → compute pipeline.

pub mod client;
pub mod queries;
pub mod service;

pub use client::{GitHubTracker, Tracker};
pub use service::BurndownService;
