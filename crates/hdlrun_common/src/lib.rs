//! Shared foundational types for the hdlrun test runner.
//!
//! This crate provides content hashing for incremental compilation and the
//! common internal result types used across the workspace.

#![warn(missing_docs)]

pub mod hash;
pub mod result;

pub use hash::ContentHash;
pub use result::{HdlrunResult, InternalError};
