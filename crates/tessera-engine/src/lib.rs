//! Tessera engine crate.
//!
//! GPU-instanced rendering of scene marks: every rectangle of a render group
//! is drawn with a single instanced call over a shared unit quad.

pub mod coords;
pub mod device;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
