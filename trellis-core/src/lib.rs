//! Trellis Core
//!
//! Core types and abstractions for the Trellis ML pipeline engine.
//!
//! This crate contains:
//! - Domain types: runs, pipeline configs, datasets, metrics
//! - Error taxonomy shared across all services
//! - Config validation for incoming train/predict requests
//!
//! Note: IO (storage, bus, codecs) lives in `trellis-io`, plugin contracts in
//! `trellis-model`, and pipeline execution in `trellis-runner`.

pub mod domain;
pub mod error;
pub mod validator;

pub use error::{Error, Result};
