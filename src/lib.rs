//! Core library for the `thor` CLI.
//!
//! `thor` fans out a fixed number of concurrent workers against one URL.
//! Each worker issues a fixed number of sequential GET requests, timing each
//! one, and the coordinator reduces the per-worker averages into an overall
//! average. A failed request is reported and counted but never aborts a run.
pub mod args;
pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod http;
mod logger;
pub mod report;
