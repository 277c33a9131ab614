//! GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a surface
//! - offscreen color + depth targets and pixel readback

mod gpu;
mod offscreen;

pub use gpu::{Gpu, GpuInit};
pub use offscreen::OffscreenTarget;
