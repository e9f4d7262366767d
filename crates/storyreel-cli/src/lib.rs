//! Storyreel CLI — replays a scripted input session against a timeline.
//!
//! The runner owns one `NavigationSession`, feeds it the scripted input at
//! the scripted times, ticks it at every deadline in between and writes each
//! render command as a JSON line.

pub mod app;
pub mod documents;
pub mod error;
pub mod runner;
pub mod script;
pub mod settings;
