//! Core engine: the fetch → compare → notify loop.

pub mod comparator;
pub mod scheduler;
pub mod tracker;
