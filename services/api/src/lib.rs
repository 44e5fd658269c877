//! services/api/src/lib.rs
//!
//! Adapters, configuration and the HTTP layer of the Saily service.

pub mod adapters;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod web;
