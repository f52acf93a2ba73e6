//! Backend worker: owns the gallery controller and the tokio runtime.

pub mod commands;
pub mod runtime;
