//! Core domain types
//!
//! The fundamental business entities shared between the IO layer, the plugin
//! contract, and the pipeline runner.

pub mod config;
pub mod dataset;
pub mod metrics;
pub mod run;
