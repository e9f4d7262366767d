//! Application layer: the navigation session that orchestrates the domain
//! components.

pub mod session;
