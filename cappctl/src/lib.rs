//! Cluster API Plunder control library
//!
//! Drives the Plunder lease, deployment and parlay APIs to bring up a
//! management cluster host and to destroy provisioned hosts.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod storage;
pub mod utils;
