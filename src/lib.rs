//! Tài/Xỉu Round Prediction Bot
//!
//! A Rust-based prediction service for a binary-outcome dice feed.
//!
//! ## Architecture
//!
//! ```text
//! Upstream feed → Client (poll) → Engine (reconcile → cache → predict)
//!                                    ↑
//!                  Strategy chain (streak, alternation, runs, trend)
//!                                    ↑
//!                  Analysis (outcome normalization, pattern snapshot)
//! ```
//!
//! The engine keeps one pending prediction per upcoming session and a
//! per-day accuracy ledger, both reset at midnight Vietnam time.

pub mod analysis;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod server;
pub mod strategy;
pub mod types;
