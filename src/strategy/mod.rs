//! Parsing Strategy Module
//!
//! - Parallel: many independent documents at once (Rayon)

pub mod parallel;

pub use parallel::parse_batch;
