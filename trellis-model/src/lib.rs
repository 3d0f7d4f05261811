//! Trellis Model
//!
//! The plugin contract for user-defined model code:
//! - Capability traits: `DataPreparation` and `Model`
//! - Registry: version string → plugin module, filled at process start
//! - Built-in demo plugin: iris-style data prep + a k-NN classifier
//!
//! The orchestration core never inspects a plugin's internals; it resolves a
//! module by version, drives it through the fixed capability surface, and
//! treats model bytes and metrics as opaque payloads.

pub mod demo;
pub mod plugin;
pub mod registry;

pub use plugin::{DataPreparation, Model, PluginModule, PreparedData};
pub use registry::{register, register_builtins, resolve};
