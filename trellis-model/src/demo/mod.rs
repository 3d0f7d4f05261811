//! Built-in demo plugins

pub mod v1;
