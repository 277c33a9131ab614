use crate::coords::Viewport;
use crate::paint::Color;

/// Renderer-facing target context (format + resolution + clear color).
///
/// Everything a renderer needs to know about the target without owning it.
/// Passed explicitly into every draw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderCtx {
    pub format: wgpu::TextureFormat,
    pub resolution: Viewport,
    pub clear_color: Color,
}

impl RenderCtx {
    #[inline]
    pub fn new(format: wgpu::TextureFormat, resolution: Viewport, clear_color: Color) -> Self {
        Self {
            format,
            resolution,
            clear_color,
        }
    }
}

/// Attachments for one frame (color view + depth view).
///
/// Views are reference-counted handles, so the target can be held by a
/// pending frame until its staging map completes.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    pub color_view: wgpu::TextureView,
    pub depth_view: wgpu::TextureView,
}

impl RenderTarget {
    #[inline]
    pub fn new(color_view: wgpu::TextureView, depth_view: wgpu::TextureView) -> Self {
        Self {
            color_view,
            depth_view,
        }
    }
}
