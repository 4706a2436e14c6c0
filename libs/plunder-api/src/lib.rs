//! Plunder API wire models
//!
//! Shapes shared by the lease, deployment and parlay endpoints.

pub mod models;
