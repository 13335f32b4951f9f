//! Shared test utilities for subsidy-analyzer integration tests.
//!
//! This module provides:
//! - `TestHarness` with a temp download directory and scripted collaborators
//! - Builders for registry records, model replies and PDF fixtures

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{ModelReply, ScriptedFetcher, ScriptedModel, TestHarness, REGISTRY_BASE};
