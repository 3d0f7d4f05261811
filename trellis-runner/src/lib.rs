//! Trellis Runner
//!
//! The pipeline state machine. A run moves SUBMITTED → RUNNING →
//! {SUCCESS, FAILED}; the runner owns every transition after submission,
//! sequencing validation, IO binding, plugin resolution, data movement and
//! status/metrics recording with one uniform failure path. There is no retry
//! state: a failure is terminal for its run and a retry is a new run under a
//! new run_id.

mod runner;

pub use runner::Runner;
