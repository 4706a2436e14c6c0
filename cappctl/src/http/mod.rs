//! Plunder API clients

pub mod client;
pub mod deployments;
pub mod leases;
pub mod tasks;
