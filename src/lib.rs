//! Car resale price predictor: a small web service that wraps a trained
//! linear regression model behind a single-form page.
//!
//! The dataset and model artifact are loaded once at startup and shared
//! read-only; per-user state is one session-scoped result slot.

pub mod catalog;
pub mod config;
pub mod model;
pub mod predictor;
pub mod server;
pub mod session;
pub mod types;
