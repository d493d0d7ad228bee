//! Integration tests for page-inspector
//!
//! These tests run every finder over realistic page snapshots and check
//! the combined report end-to-end.

mod edge_cases;
mod feature_combinations;
mod real_world_pages;
