//! Bring-up and teardown workflows

pub mod bringup;
pub mod fsm;
pub mod poll;
pub mod progress;
pub mod selector;
pub mod tasks;
pub mod teardown;
