//! PRICEWATCH: Flipkart/Amazon price tracker with Discord alerts
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod cli;
pub mod config;
pub mod engine;
pub mod notify;
pub mod sources;
pub mod types;
