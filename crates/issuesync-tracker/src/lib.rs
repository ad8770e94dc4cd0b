//! Remote issue tracker client for issuesync.
//!
//! Talks to the tracker's SOAP service (`rpc/soap/jirasoapservice-v2`) and
//! provides the reachability and credential checks used when configuring it.

pub mod check;
pub mod client;
pub mod envelope;
pub mod error;
pub mod response;

#[cfg(test)]
mod stub;

pub use check::{check_credentials, check_url};
pub use client::SoapTracker;
pub use error::TrackerError;
