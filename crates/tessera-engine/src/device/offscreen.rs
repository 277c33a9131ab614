use std::sync::mpsc;

use anyhow::{Context, Result, anyhow, ensure};

use crate::render::RenderTarget;
use crate::render::shapes::DEPTH_FORMAT;

/// Color + depth textures to render into without a window.
pub struct OffscreenTarget {
    color: wgpu::Texture,
    depth: wgpu::Texture,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32) -> Result<Self> {
        ensure!(width > 0 && height > 0, "offscreen target has zero size");
        ensure!(
            format.block_copy_size(None).is_some(),
            "offscreen format {format:?} cannot be read back"
        );

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tessera offscreen color"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tessera offscreen depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Ok(Self {
            color,
            depth,
            format,
            width,
            height,
        })
    }

    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Fresh views of both attachments.
    pub fn target(&self) -> RenderTarget {
        RenderTarget::new(
            self.color.create_view(&wgpu::TextureViewDescriptor::default()),
            self.depth.create_view(&wgpu::TextureViewDescriptor::default()),
        )
    }

    /// Copies the color texture back to the CPU, tightly packed row by row.
    ///
    /// Blocks on the device until the copy is mapped.
    pub fn read_pixels(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Vec<u8>> {
        let bytes_per_pixel = self
            .format
            .block_copy_size(None)
            .context("offscreen format has no copy size")?;
        let unpadded_bpr = self.width * bytes_per_pixel;
        let padded_bpr = unpadded_bpr.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessera readback"),
            size: u64::from(padded_bpr) * u64::from(self.height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("tessera readback encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bpr),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .context("device poll failed during readback")?;
        rx.recv()
            .map_err(|_| anyhow!("readback map callback dropped"))?
            .context("failed to map readback buffer")?;

        let mut pixels = Vec::with_capacity((unpadded_bpr * self.height) as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks(padded_bpr as usize) {
                pixels.extend_from_slice(&row[..unpadded_bpr as usize]);
            }
        }
        readback.unmap();

        Ok(pixels)
    }
}
