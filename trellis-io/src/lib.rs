//! Trellis IO
//!
//! Backend-agnostic IO for the pipeline engine:
//! - Storage clients: uniform load/save/exists over local disk, S3 and GCS
//! - Bus clients: uniform publish for asynchronous run triggering
//! - Codec registry: file extension → dataset encode/decode
//! - IO controller: canonical artifact layout for a `(project_id, run_id)`
//!
//! All mutable run state lives behind these clients; the engine itself holds
//! none.

pub mod bus;
pub mod codec;
pub mod controller;
pub mod platform;
pub mod storage;

pub use controller::{IoController, IoControllerFactory};
pub use platform::Platform;
