//! Domain models

pub mod host;
pub mod task;
