//! Storyreel — stories viewer navigation engine.
//!
//! Responsible for a single open viewing session: opening a story,
//! auto-advancing through its items, interpreting drag and tap gestures,
//! sequencing transitions between adjacent stories and persisting which
//! stories and items have been seen. The engine is headless; it emits
//! [`domain::render::RenderCommand`]s for the host's rendering layer.

pub mod application;
pub mod domain;
