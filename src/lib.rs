//! Docgate - rate limited document submission
//!
//! This crate submits signed documents to a document API while guaranteeing
//! that no more than a configured number of submissions happen per time
//! window. The guarantee comes from a fixed-window admission gate that blocks
//! excess callers until the window rolls over.

pub mod api;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod ratelimit;
