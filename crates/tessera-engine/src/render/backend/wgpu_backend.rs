use crate::render::shapes::rect::{RectPipeline, RectUniforms};
use crate::render::{RenderError, RenderTarget};

use super::{scoped, BufferKind, FrameCommands, GpuBackend, MapRequest, RectPipelineDesc};

/// [`GpuBackend`] over a `wgpu` device and queue.
///
/// Device and queue are reference-counted handles; cloning them here does not
/// duplicate GPU state.
#[derive(Debug, Clone)]
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl WgpuBackend {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

impl GpuBackend for WgpuBackend {
    type Pipeline = RectPipeline;
    type Buffer = wgpu::Buffer;
    type Target = RenderTarget;

    fn create_pipeline(&mut self, desc: &RectPipelineDesc) -> Result<RectPipeline, RenderError> {
        RectPipeline::new(&self.device, desc)
    }

    fn write_uniforms(&mut self, pipeline: &RectPipeline, uniforms: &RectUniforms) {
        self.queue
            .write_buffer(pipeline.uniform_buffer(), 0, bytemuck::bytes_of(uniforms));
    }

    fn create_buffer(&mut self, kind: BufferKind, size: u64) -> Result<wgpu::Buffer, RenderError> {
        let (what, usage) = match kind {
            BufferKind::Instance => (
                "rect instance buffer",
                wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            ),
            BufferKind::Staging => (
                "rect staging buffer",
                wgpu::BufferUsages::MAP_WRITE | wgpu::BufferUsages::COPY_SRC,
            ),
        };

        let max = self.device.limits().max_buffer_size;
        if size == 0 || size > max {
            return Err(RenderError::creation(
                what,
                format!("size {size} outside 1..={max} bytes"),
            ));
        }
        if size % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
            return Err(RenderError::creation(
                what,
                format!("size {size} is not a multiple of {}", wgpu::COPY_BUFFER_ALIGNMENT),
            ));
        }

        scoped(&self.device, what, || {
            self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(what),
                size,
                usage,
                mapped_at_creation: false,
            })
        })
    }

    fn request_map(&mut self, staging: &wgpu::Buffer) -> MapRequest {
        let (sender, request) = MapRequest::channel();
        staging.slice(..).map_async(wgpu::MapMode::Write, move |res| {
            // The receiver is gone if the renderer was dropped mid-frame.
            let _ = sender.send(res.map_err(|e| RenderError::Mapping(e.to_string())));
        });
        request
    }

    fn poll(&mut self, wait: bool) -> Result<(), RenderError> {
        let mode = if wait {
            wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            }
        } else {
            wgpu::PollType::Poll
        };
        self.device
            .poll(mode)
            .map(|_| ())
            .map_err(|e| RenderError::DeviceLost(e.to_string()))
    }

    fn submit_frame(&mut self, frame: FrameCommands<'_, Self>) -> Result<(), RenderError> {
        let size = frame.payload.len() as u64;

        frame
            .staging
            .slice(..size)
            .get_mapped_range_mut()
            .copy_from_slice(frame.payload);
        frame.staging.unmap();

        let mut copy_encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tessera rect copy encoder"),
            });
        copy_encoder.copy_buffer_to_buffer(frame.staging, 0, frame.instances, 0, size);

        let mut render_encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tessera rect render encoder"),
            });
        frame.pipeline.encode_pass(
            &mut render_encoder,
            frame.target,
            frame.clear_color,
            frame.instances,
            frame.vertex_count,
            frame.instance_count,
        );

        // Copy must land before the pass reads the instance buffer.
        self.queue
            .submit([copy_encoder.finish(), render_encoder.finish()]);
        Ok(())
    }
}
