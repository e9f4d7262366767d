//! Domain model for the stories viewer.

pub mod autoplay;
pub mod callbacks;
pub mod gesture;
pub mod render;
pub mod seen;
pub mod story;
pub mod time_label;
pub mod transition;
