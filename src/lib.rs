//! Odd Experiments - Staged Probabilistic Interaction Engine
//!
//! This crate runs small "experiments": a visitor makes discrete choices,
//! the engine resolves them into outcomes that may diverge from what was
//! asked, discloses results in timed stages, keeps per-client stats, and
//! shows what a single different choice would have produced.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
