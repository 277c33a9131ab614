//! Coordinate and geometry types shared by the scene and the renderers.
//!
//! Canonical CPU space:
//! - Pixels, origin top-left
//! - +X right, +Y down
//!
//! Renderers convert to NDC in shaders using a uniform holding the viewport
//! resolution and the group offset.

mod bounds;
mod viewport;

pub use bounds::Bounds;
pub use viewport::Viewport;
