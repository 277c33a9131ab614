//! GPU rendering subsystem.
//!
//! Renderers consume `scene` groups and issue GPU commands through a
//! [`GpuBackend`]. Each renderer owns its GPU resources (pipeline, buffers)
//! for exactly one render group.
//!
//! Convention:
//! - CPU geometry is in pixels (top-left origin, +Y down).
//! - Vertex shader converts to NDC using a resolution/offset uniform.

pub mod backend;
mod ctx;
mod error;
pub mod marks;
pub mod shapes;

pub use backend::{GpuBackend, WgpuBackend};
pub use ctx::{RenderCtx, RenderTarget};
pub use error::RenderError;
