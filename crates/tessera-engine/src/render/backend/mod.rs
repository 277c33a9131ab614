//! GPU seam used by the renderers.
//!
//! Renderers decide *what* to allocate, map and submit; a [`GpuBackend`]
//! decides *how*. [`WgpuBackend`] drives a real `wgpu` device; tests swap in a
//! recording double that checks the buffer-mapping protocol.

mod map;
mod scope;
mod wgpu_backend;

#[cfg(test)]
pub(crate) mod recording;

pub use map::{MapRequest, MapSender};
pub use wgpu_backend::WgpuBackend;

pub(crate) use scope::scoped;

use crate::render::shapes::rect::RectUniforms;
use crate::render::RenderError;

/// Role of a per-frame buffer; selects usage flags.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Device-local vertex buffer holding per-instance attributes (copy target).
    Instance,
    /// Host-mappable write buffer (copy source).
    Staging,
}

/// Everything needed to build the rect pipeline and its static resources.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RectPipelineDesc {
    pub format: wgpu::TextureFormat,
    pub depth_format: wgpu::TextureFormat,
    pub uniforms: RectUniforms,
}

/// One frame's worth of GPU work: copy staging → instance, then render.
pub struct FrameCommands<'a, B: GpuBackend + ?Sized> {
    pub pipeline: &'a B::Pipeline,
    /// Mapped staging buffer; the backend writes `payload`, unmaps, then copies.
    pub staging: &'a B::Buffer,
    pub instances: &'a B::Buffer,
    /// Serialized instance attributes; also the copy size.
    pub payload: &'a [u8],
    pub vertex_count: u32,
    pub instance_count: u32,
    pub target: &'a B::Target,
    pub clear_color: wgpu::Color,
}

/// GPU operations required by the rect renderer.
///
/// Protocol the renderer upholds (and the test double enforces):
/// - `request_map` is never called on a staging buffer that is already mapping
/// - `submit_frame` only receives a staging buffer whose map completed
pub trait GpuBackend {
    /// Pipeline plus its static resources (geometry buffer, uniforms, bind group).
    type Pipeline;
    type Buffer;
    type Target: Clone;

    /// Builds the pipeline and uploads the static geometry and uniforms.
    fn create_pipeline(&mut self, desc: &RectPipelineDesc) -> Result<Self::Pipeline, RenderError>;

    fn write_uniforms(&mut self, pipeline: &Self::Pipeline, uniforms: &RectUniforms);

    fn create_buffer(&mut self, kind: BufferKind, size: u64) -> Result<Self::Buffer, RenderError>;

    /// Starts an asynchronous write-map of the whole staging buffer.
    fn request_map(&mut self, staging: &Self::Buffer) -> MapRequest;

    /// Drives pending callbacks. `wait = true` blocks until queued work retires.
    fn poll(&mut self, wait: bool) -> Result<(), RenderError>;

    /// Writes the payload, releases the mapping and submits `[copy, render]`.
    fn submit_frame(&mut self, frame: FrameCommands<'_, Self>) -> Result<(), RenderError>;
}
