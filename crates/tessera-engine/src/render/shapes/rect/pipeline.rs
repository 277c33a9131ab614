use wgpu::util::DeviceExt;

use crate::render::backend::{scoped, RectPipelineDesc};
use crate::render::{RenderError, RenderTarget};

use super::super::common::{check_formats, depth_test, straight_alpha_blend, QuadVertex, QUAD_VERTICES};
use super::instance::{RectInstance, RectUniforms};

/// Rect render pipeline plus the resources whose contents never change per frame.
///
/// Built once per render group; the color format is fixed at creation.
#[derive(Debug)]
pub struct RectPipeline {
    pipeline: wgpu::RenderPipeline,
    geometry_vbo: wgpu::Buffer,
    uniforms_ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl RectPipeline {
    /// Builds the pipeline and its static buffers.
    ///
    /// Any wgpu validation or out-of-memory error raised while creating them
    /// comes back as `RenderError::ResourceCreation`.
    pub fn new(device: &wgpu::Device, desc: &RectPipelineDesc) -> Result<Self, RenderError> {
        check_formats(desc.format, desc.depth_format)
            .map_err(|reason| RenderError::creation("rect pipeline", reason))?;

        scoped(device, "rect pipeline", || Self::create(device, desc))
    }

    fn create(device: &wgpu::Device, desc: &RectPipelineDesc) -> Self {
        let shader_src = include_str!("../shaders/rect.wgsl");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessera rect shader"),
            source: wgpu::ShaderSource::Wgsl(shader_src.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera rect bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<RectUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessera rect pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tessera rect pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), RectInstance::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: desc.format,
                    blend: Some(straight_alpha_blend()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(depth_test(desc.depth_format)),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let geometry_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tessera rect geometry vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let uniforms_ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("tessera rect uniforms ubo"),
            contents: bytemuck::bytes_of(&desc.uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera rect bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms_ubo.as_entire_binding(),
            }],
        });

        Self {
            pipeline,
            geometry_vbo,
            uniforms_ubo,
            bind_group,
        }
    }

    #[inline]
    pub(crate) fn uniform_buffer(&self) -> &wgpu::Buffer {
        &self.uniforms_ubo
    }

    /// Records the rect pass: clear color + depth, then one instanced draw.
    pub(crate) fn encode_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        target: &RenderTarget,
        clear_color: wgpu::Color,
        instances: &wgpu::Buffer,
        vertex_count: u32,
        instance_count: u32,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tessera rect pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&self.pipeline);
        rpass.set_vertex_buffer(0, self.geometry_vbo.slice(..));
        rpass.set_vertex_buffer(1, instances.slice(..));
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.draw(0..vertex_count, 0..instance_count);
    }
}
