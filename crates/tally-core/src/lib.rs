//! Core library for Tally.
//!
//! Records timing and identity metadata for AI coding-agent work sessions:
//! which project a prompt touched, when it started, when it ended, and the
//! git commit at each boundary. The interesting parts live in [`project`]
//! (deduplicating working directories into stable project identities) and
//! [`record`] (correlating start/end hook events into prompt rows).

pub mod config;
pub mod error;
pub mod gitx;
pub mod model;
pub mod project;
pub mod record;
pub mod report;
pub mod storage;

pub use error::{Result, TallyError};
