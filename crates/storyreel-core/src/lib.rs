//! Storyreel Core — shared abstractions for the stories viewer engine.
//!
//! This crate defines the traits and value types that the viewer engine,
//! the seen-state stores and the host tooling all depend on. It contains no
//! infrastructure code.

pub mod clock;
pub mod config;
pub mod continuation;
pub mod error;
pub mod ids;
pub mod seen_store;
