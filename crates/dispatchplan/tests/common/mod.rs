//! Shared test utilities for dispatchplan integration tests.
//!
//! This module provides:
//! - Builders for jobs, employees, templates and profiles
//! - Fake collaborators with call counters and scripted failures

pub mod builders;
pub mod fakes;

pub use builders::*;
pub use fakes::*;
