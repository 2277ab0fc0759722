//! Pageant tabulation: judges score entrants per weighted criterion, and
//! segment and overall leaderboards are derived from the stored scores.
//!
//! Solo candidates are ranked together. Pairs are ranked per lane, with the
//! male and female members never compared against each other.

pub mod config;
pub mod logging;
pub mod model;
pub mod output;
pub mod scoring;
pub mod store;
pub mod tabulator;

pub use tabulator::{Submission, Tabulator};
