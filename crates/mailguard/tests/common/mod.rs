//! Shared test utilities for mailguard integration tests.
//!
//! This module provides:
//! - `MockSession`, an in-memory mailbox that records every command
//! - `ScriptedClassifier`, a classifier with canned answers
//! - Builders for raw messages and triage configurations

pub mod builders;
pub mod mock;

pub use builders::*;
pub use mock::{Call, MockSession};
