//! Core domain types and traits for issuesync.
//!
//! This crate contains:
//! - Run identifiers
//! - Builds, change-log entries and build history
//! - Issue keys and remote tracker records
//! - The tracker connection, session and `IssueTracker` trait
//! - The error taxonomy shared by every crate

pub mod build;
pub mod error;
pub mod id;
pub mod issue;
pub mod tracker;

pub use error::{Error, Result};
pub use id::RunId;
