//! Instanced rectangle renderer.
//!
//! One [`RectRenderer`] serves one render group. Per frame it:
//! 1. serializes the group's items into 13-float instance records,
//! 2. requests a write-map of a free staging buffer (asynchronous),
//! 3. once mapped: writes the records, unmaps, copies staging → instance
//!    buffer and renders all rects with a single instanced draw.
//!
//! The pipeline and static buffers are built lazily on the first non-empty
//! draw and reused afterwards. Staging buffers form a small ring so that a
//! frame never maps a buffer that an earlier frame still owns.

mod instance;
mod pipeline;
mod staging;

pub use instance::{encode_instances, RectInstance, RectUniforms, RECT_FLOATS};
pub use pipeline::RectPipeline;

use crate::coords::{Bounds, Viewport};
use crate::paint::{ColorResolver, CssColorResolver};
use crate::render::backend::{BufferKind, FrameCommands, GpuBackend, RectPipelineDesc};
use crate::render::{RenderCtx, RenderError};
use crate::scene::RectGroup;

use super::common::{DEPTH_FORMAT, QUAD_VERTEX_COUNT};
use instance::instance_bytes;
use staging::{PendingFrame, SlotPoll, StagingRing};

/// Rect renderer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RectRendererConfig {
    /// Maximum number of staging buffers in flight (at least 1).
    pub staging_slots: usize,
    /// Lower bound for buffer capacity (in instances) when growing.
    pub min_growth_capacity: usize,
    /// Depth attachment format the pipeline is built against.
    pub depth_format: wgpu::TextureFormat,
}

impl Default for RectRendererConfig {
    fn default() -> Self {
        Self {
            staging_slots: 3,
            min_growth_capacity: 64,
            depth_format: DEPTH_FORMAT,
        }
    }
}

/// What a `draw` call did with the frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    /// Empty group; nothing allocated or submitted.
    Skipped,
    /// A staging slot was claimed and its map requested.
    Queued,
    /// Every slot was pending; the newest pending frame now carries this one.
    Coalesced,
    /// Every slot was pending and the newest could not hold this frame; it
    /// is mapped into the first slot a later `pump` frees.
    Deferred,
}

/// Observable renderer state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FramePhase {
    Unbuilt,
    Idle,
    Mapping { pending: usize },
}

/// GPU state of one render group. Built once; buffers only ever grow.
struct RenderContext<B: GpuBackend> {
    format: wgpu::TextureFormat,
    pipeline: B::Pipeline,
    instances: B::Buffer,
    instance_capacity: usize,
    ring: StagingRing<B>,
}

impl<B: GpuBackend> RenderContext<B> {
    fn build(
        backend: &mut B,
        desc: &RectPipelineDesc,
        item_count: usize,
        staging_slots: usize,
    ) -> Result<Self, RenderError> {
        let pipeline = backend.create_pipeline(desc)?;
        let bytes = instance_bytes(item_count);
        let instances = backend.create_buffer(BufferKind::Instance, bytes)?;
        let staging = backend.create_buffer(BufferKind::Staging, bytes)?;

        Ok(Self {
            format: desc.format,
            pipeline,
            instances,
            instance_capacity: item_count,
            ring: StagingRing::new(staging, item_count, staging_slots),
        })
    }

    fn ensure_instance_capacity(
        &mut self,
        backend: &mut B,
        required: usize,
        grown: usize,
    ) -> Result<(), RenderError> {
        if required <= self.instance_capacity {
            return Ok(());
        }

        self.instances = backend.create_buffer(BufferKind::Instance, instance_bytes(grown))?;
        log::debug!(
            "rect instance buffer grown from {} to {grown} instances",
            self.instance_capacity
        );
        self.instance_capacity = grown;
        Ok(())
    }

    /// Claims a slot for the deferred frame, growing the slot if needed.
    fn start_deferred(&mut self, backend: &mut B, min_growth: usize) -> Result<(), RenderError> {
        let Some(required) = self.ring.deferred_len() else {
            return Ok(());
        };
        let grown = grown_capacity(required, min_growth);
        let Some(slot) = self.ring.acquire(backend, required, grown)? else {
            return Ok(());
        };
        if let Some(frame) = self.ring.take_deferred() {
            let request = backend.request_map(self.ring.buffer(slot));
            self.ring.begin(slot, request, frame);
        }
        Ok(())
    }
}

#[inline]
fn grown_capacity(required: usize, min: usize) -> usize {
    required.next_power_of_two().max(min)
}

/// Rectangle renderer for a single render group.
///
/// Colors are resolved through a [`ColorResolver`] (CSS syntax by default).
/// Fills are straight alpha; the pipeline blends `src_alpha / one_minus_src_alpha`.
pub struct RectRenderer<B: GpuBackend> {
    config: RectRendererConfig,
    resolver: Box<dyn ColorResolver>,
    context: Option<RenderContext<B>>,
    warned_fill: bool,
}

impl<B: GpuBackend> Default for RectRenderer<B> {
    fn default() -> Self {
        Self::new(RectRendererConfig::default())
    }
}

impl<B: GpuBackend> RectRenderer<B> {
    pub fn new(config: RectRendererConfig) -> Self {
        Self::with_resolver(config, CssColorResolver)
    }

    pub fn with_resolver(config: RectRendererConfig, resolver: impl ColorResolver + 'static) -> Self {
        Self {
            config,
            resolver: Box::new(resolver),
            context: None,
            warned_fill: false,
        }
    }

    #[inline]
    pub fn config(&self) -> &RectRendererConfig {
        &self.config
    }

    #[inline]
    pub fn is_built(&self) -> bool {
        self.context.is_some()
    }

    /// Current instance buffer capacity, once built.
    pub fn instance_capacity(&self) -> Option<usize> {
        self.context.as_ref().map(|c| c.instance_capacity)
    }

    /// Frames waiting for their staging map.
    pub fn pending(&self) -> usize {
        self.context.as_ref().map_or(0, |c| c.ring.pending())
    }

    pub fn phase(&self) -> FramePhase {
        match &self.context {
            None => FramePhase::Unbuilt,
            Some(c) => match c.ring.pending() {
                0 => FramePhase::Idle,
                pending => FramePhase::Mapping { pending },
            },
        }
    }

    /// Queues one frame of `group` into `target`.
    ///
    /// Never blocks: the frame is submitted by this call's trailing [`pump`]
    /// if its map is already done, otherwise by a later `pump`/[`flush`].
    ///
    /// `bounds` and `ctx.resolution` only feed the uniforms when the pipeline
    /// is first built; use [`update_viewport`] to change them afterwards.
    ///
    /// [`pump`]: Self::pump
    /// [`flush`]: Self::flush
    /// [`update_viewport`]: Self::update_viewport
    pub fn draw(
        &mut self,
        backend: &mut B,
        ctx: &RenderCtx,
        target: &B::Target,
        group: &RectGroup,
        bounds: Bounds,
    ) -> Result<DrawOutcome, RenderError> {
        if group.items.is_empty() {
            return Ok(DrawOutcome::Skipped);
        }

        let required = group.items.len();
        let grown = grown_capacity(required, self.config.min_growth_capacity);

        let context = match self.context {
            Some(ref mut context) => context,
            None => {
                let desc = RectPipelineDesc {
                    format: ctx.format,
                    depth_format: self.config.depth_format,
                    uniforms: RectUniforms::new(ctx.resolution, bounds),
                };
                let context =
                    RenderContext::build(backend, &desc, required, self.config.staging_slots)?;
                log::debug!(
                    "rect pipeline built for {:?} with room for {required} instances",
                    ctx.format
                );
                self.context.insert(context)
            }
        };

        if context.format != ctx.format {
            return Err(RenderError::FormatMismatch {
                built: context.format,
                requested: ctx.format,
            });
        }

        let instances = encode_instances(&group.items, &*self.resolver, &mut self.warned_fill);
        context.ensure_instance_capacity(backend, required, grown)?;

        let frame = PendingFrame {
            instances,
            target: target.clone(),
            clear_color: ctx.clear_color.to_wgpu(),
        };

        // A deferred frame is newer than every mapping one; replace it in place.
        let outcome = if context.ring.deferred_len().is_some() {
            context.ring.defer(frame);
            log::debug!("rect frame replaced the deferred frame");
            DrawOutcome::Coalesced
        } else {
            match context.ring.acquire(backend, required, grown)? {
                Some(slot) => {
                    let request = backend.request_map(context.ring.buffer(slot));
                    context.ring.begin(slot, request, frame);
                    DrawOutcome::Queued
                }
                None => match context.ring.coalesce(frame) {
                    Ok(()) => {
                        log::debug!("all rect staging slots pending; frame coalesced");
                        DrawOutcome::Coalesced
                    }
                    Err(frame) => {
                        log::debug!("all rect staging slots pending; frame deferred");
                        context.ring.defer(frame);
                        DrawOutcome::Deferred
                    }
                },
            }
        };

        backend.poll(false)?;
        self.pump(backend)?;
        Ok(outcome)
    }

    /// Submits every frame whose map has completed, oldest first.
    ///
    /// Stops at the first frame still waiting so submissions keep request
    /// order. A deferred frame is mapped as soon as a slot frees up.
    /// Returns the number of frames submitted.
    pub fn pump(&mut self, backend: &mut B) -> Result<usize, RenderError> {
        let min_growth = self.config.min_growth_capacity;
        let Some(context) = self.context.as_mut() else {
            return Ok(0);
        };

        let mut submitted = 0;
        loop {
            context.start_deferred(backend, min_growth)?;
            match context.ring.poll_oldest() {
                SlotPoll::Nothing | SlotPoll::Waiting => return Ok(submitted),
                SlotPoll::Failed(e) => return Err(e),
                SlotPoll::Ready(slot, frame) => {
                    backend.submit_frame(FrameCommands {
                        pipeline: &context.pipeline,
                        staging: context.ring.buffer(slot),
                        instances: &context.instances,
                        payload: bytemuck::cast_slice(&frame.instances),
                        vertex_count: QUAD_VERTEX_COUNT,
                        instance_count: frame.instances.len() as u32,
                        target: &frame.target,
                        clear_color: frame.clear_color,
                    })?;
                    submitted += 1;
                }
            }
        }
    }

    /// Blocks until every pending frame is submitted.
    pub fn flush(&mut self, backend: &mut B) -> Result<usize, RenderError> {
        let mut submitted = self.pump(backend)?;
        while self.pending() > 0 {
            backend.poll(true)?;
            let n = self.pump(backend)?;
            if n == 0 {
                return Err(RenderError::DeviceLost(
                    "pending rect frames made no progress after a blocking poll".to_string(),
                ));
            }
            submitted += n;
        }
        Ok(submitted)
    }

    /// Rewrites the resolution/offset uniforms. No-op before the first build.
    pub fn update_viewport(&mut self, backend: &mut B, resolution: Viewport, bounds: Bounds) -> bool {
        let Some(context) = self.context.as_ref() else {
            return false;
        };
        backend.write_uniforms(&context.pipeline, &RectUniforms::new(resolution, bounds));
        true
    }
}
