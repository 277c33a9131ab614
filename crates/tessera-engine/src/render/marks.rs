//! Mark-type dispatch.
//!
//! A [`MarkLayer`] is the GPU state for one render group, chosen by the
//! group's [`MarkType`]. [`MarkLayers`] keeps one layer per [`GroupId`] and
//! creates it on the group's first draw.

use std::collections::HashMap;

use crate::coords::Bounds;
use crate::render::backend::GpuBackend;
use crate::render::shapes::rect::{DrawOutcome, RectRenderer, RectRendererConfig};
use crate::render::{RenderCtx, RenderError};
use crate::scene::{GroupId, MarkGroup, MarkType};

/// Renderer for one render group.
pub enum MarkLayer<B: GpuBackend> {
    Rect(RectRenderer<B>),
}

impl<B: GpuBackend> MarkLayer<B> {
    pub fn for_type(mark_type: MarkType, rect_config: &RectRendererConfig) -> Self {
        match mark_type {
            MarkType::Rect => MarkLayer::Rect(RectRenderer::new(rect_config.clone())),
        }
    }

    #[inline]
    pub fn mark_type(&self) -> MarkType {
        match self {
            MarkLayer::Rect(_) => MarkType::Rect,
        }
    }

    /// Draws `group` with this layer.
    ///
    /// The layer and the group must share a mark type; `MarkLayers::draw`
    /// rebuilds the layer when a group's mark type changes.
    pub fn draw(
        &mut self,
        backend: &mut B,
        ctx: &RenderCtx,
        target: &B::Target,
        group: &MarkGroup,
        bounds: Bounds,
    ) -> Result<DrawOutcome, RenderError> {
        match (self, group) {
            (MarkLayer::Rect(renderer), MarkGroup::Rect(rects)) => {
                renderer.draw(backend, ctx, target, rects, bounds)
            }
        }
    }

    pub fn pump(&mut self, backend: &mut B) -> Result<usize, RenderError> {
        match self {
            MarkLayer::Rect(renderer) => renderer.pump(backend),
        }
    }

    pub fn flush(&mut self, backend: &mut B) -> Result<usize, RenderError> {
        match self {
            MarkLayer::Rect(renderer) => renderer.flush(backend),
        }
    }

    /// Frames queued but not yet submitted.
    pub fn pending(&self) -> usize {
        match self {
            MarkLayer::Rect(renderer) => renderer.pending(),
        }
    }
}

/// Per-group layer registry.
pub struct MarkLayers<B: GpuBackend> {
    rect_config: RectRendererConfig,
    layers: HashMap<GroupId, MarkLayer<B>>,
}

impl<B: GpuBackend> Default for MarkLayers<B> {
    fn default() -> Self {
        Self::new(RectRendererConfig::default())
    }
}

impl<B: GpuBackend> MarkLayers<B> {
    pub fn new(rect_config: RectRendererConfig) -> Self {
        Self {
            rect_config,
            layers: HashMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: GroupId) -> Option<&MarkLayer<B>> {
        self.layers.get(&id)
    }

    /// Draws `group` into the layer registered for `id`, creating it first if needed.
    ///
    /// A group that changes mark type gets a fresh layer; the old layer's
    /// pending frames are flushed before it is dropped.
    pub fn draw(
        &mut self,
        backend: &mut B,
        id: GroupId,
        ctx: &RenderCtx,
        target: &B::Target,
        group: &MarkGroup,
        bounds: Bounds,
    ) -> Result<DrawOutcome, RenderError> {
        let mark_type = group.mark_type();
        if let Some(layer) = self.layers.get_mut(&id)
            && layer.mark_type() != mark_type
        {
            log::debug!(
                "group {id:?} changed mark type {} -> {mark_type}; rebuilding layer",
                layer.mark_type()
            );
            layer.flush(backend)?;
            self.layers.remove(&id);
        }

        let layer = self
            .layers
            .entry(id)
            .or_insert_with(|| MarkLayer::for_type(mark_type, &self.rect_config));
        layer.draw(backend, ctx, target, group, bounds)
    }

    /// Destroys the layer for `id`, dropping its GPU context.
    ///
    /// Frames still waiting for a staging map are discarded.
    pub fn remove(&mut self, id: GroupId) -> Option<MarkLayer<B>> {
        let layer = self.layers.remove(&id);
        if let Some(layer) = &layer
            && layer.pending() > 0
        {
            log::debug!("group {id:?} removed with {} pending frames", layer.pending());
        }
        layer
    }

    /// Submits every completed frame of every layer.
    pub fn pump_all(&mut self, backend: &mut B) -> Result<usize, RenderError> {
        let mut submitted = 0;
        for layer in self.layers.values_mut() {
            submitted += layer.pump(backend)?;
        }
        Ok(submitted)
    }

    /// Blocks until every layer has submitted its pending frames.
    pub fn flush_all(&mut self, backend: &mut B) -> Result<usize, RenderError> {
        let mut submitted = 0;
        for layer in self.layers.values_mut() {
            submitted += layer.flush(backend)?;
        }
        Ok(submitted)
    }
}
