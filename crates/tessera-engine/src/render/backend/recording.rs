//! Recording [`GpuBackend`] double for tests.
//!
//! Models wgpu's mapping rules closely enough to catch protocol errors:
//! maps complete only on `poll`, a pending or mapped buffer must not be
//! mapped again, and only mapped staging buffers may be submitted.

use std::collections::HashMap;

use crate::render::shapes::rect::RectUniforms;
use crate::render::RenderError;

use super::{BufferKind, FrameCommands, GpuBackend, MapRequest, MapSender, RectPipelineDesc};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedPipeline {
    pub id: u64,
    pub desc: RectPipelineDesc,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedBuffer {
    pub id: u64,
    pub kind: BufferKind,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SubmittedFrame {
    pub pipeline: u64,
    pub staging: u64,
    pub instances: u64,
    pub copy_bytes: u64,
    pub floats: Vec<f32>,
    /// `(vertex_count, instance_count)` of the single draw call.
    pub draw: (u32, u32),
    pub target: String,
    pub clear_color: wgpu::Color,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum MapState {
    Pending,
    Mapped,
}

#[derive(Default)]
pub(crate) struct RecordingBackend {
    pub pipelines_built: usize,
    pub allocations: Vec<(BufferKind, u64)>,
    pub uniform_writes: Vec<RectUniforms>,
    pub map_requests: usize,
    pub polls: usize,
    pub submissions: Vec<SubmittedFrame>,
    pub violations: Vec<String>,

    pub fail_pipeline: bool,
    pub fail_allocations: bool,
    /// Non-blocking polls leave maps pending; tests resolve them explicitly.
    pub manual_maps: bool,

    pending: Vec<(u64, MapSender)>,
    map_state: HashMap<u64, MapState>,
    next_id: u64,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manual() -> Self {
        Self { manual_maps: true, ..Self::default() }
    }

    /// Pipelines plus buffers created so far.
    pub fn allocation_count(&self) -> usize {
        self.pipelines_built + self.allocations.len()
    }

    pub fn draws(&self) -> Vec<(u32, u32)> {
        self.submissions.iter().map(|s| s.draw).collect()
    }

    /// Buffer ids with a map request that has not been answered yet.
    pub fn pending_maps(&self) -> Vec<u64> {
        self.pending.iter().map(|(id, _)| *id).collect()
    }

    pub fn complete_map(&mut self, buffer: u64) {
        self.answer(buffer, Ok(()));
    }

    pub fn fail_map(&mut self, buffer: u64) {
        self.answer(buffer, Err(RenderError::Mapping("simulated map failure".into())));
    }

    fn answer(&mut self, buffer: u64, res: Result<(), RenderError>) {
        let Some(pos) = self.pending.iter().position(|(id, _)| *id == buffer) else {
            self.violations.push(format!("no pending map for buffer {buffer}"));
            return;
        };
        let (id, sender) = self.pending.remove(pos);
        if res.is_ok() {
            self.map_state.insert(id, MapState::Mapped);
        } else {
            self.map_state.remove(&id);
        }
        let _ = sender.send(res);
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl GpuBackend for RecordingBackend {
    type Pipeline = RecordedPipeline;
    type Buffer = RecordedBuffer;
    type Target = String;

    fn create_pipeline(&mut self, desc: &RectPipelineDesc) -> Result<RecordedPipeline, RenderError> {
        if self.fail_pipeline {
            return Err(RenderError::creation("rect pipeline", "simulated failure"));
        }
        self.pipelines_built += 1;
        self.uniform_writes.push(desc.uniforms);
        Ok(RecordedPipeline { id: self.next_id(), desc: *desc })
    }

    fn write_uniforms(&mut self, _pipeline: &RecordedPipeline, uniforms: &RectUniforms) {
        self.uniform_writes.push(*uniforms);
    }

    fn create_buffer(&mut self, kind: BufferKind, size: u64) -> Result<RecordedBuffer, RenderError> {
        if self.fail_allocations {
            return Err(RenderError::creation("rect buffer", "simulated failure"));
        }
        self.allocations.push((kind, size));
        Ok(RecordedBuffer { id: self.next_id(), kind, size })
    }

    fn request_map(&mut self, staging: &RecordedBuffer) -> MapRequest {
        self.map_requests += 1;
        if staging.kind != BufferKind::Staging {
            self.violations.push(format!("mapped non-staging buffer {}", staging.id));
        }
        if let Some(state) = self.map_state.get(&staging.id) {
            self.violations
                .push(format!("buffer {} mapped again while {state:?}", staging.id));
        }
        self.map_state.insert(staging.id, MapState::Pending);

        let (sender, request) = MapRequest::channel();
        self.pending.push((staging.id, sender));
        request
    }

    fn poll(&mut self, wait: bool) -> Result<(), RenderError> {
        self.polls += 1;
        if self.manual_maps && !wait {
            return Ok(());
        }
        for id in self.pending_maps() {
            self.complete_map(id);
        }
        Ok(())
    }

    fn submit_frame(&mut self, frame: FrameCommands<'_, Self>) -> Result<(), RenderError> {
        let staging = frame.staging;
        if self.map_state.get(&staging.id) != Some(&MapState::Mapped) {
            self.violations
                .push(format!("submitted staging buffer {} without a completed map", staging.id));
        }
        let copy_bytes = frame.payload.len() as u64;
        if copy_bytes > staging.size || copy_bytes > frame.instances.size {
            self.violations.push(format!(
                "copy of {copy_bytes} bytes exceeds staging {} / instance {}",
                staging.size, frame.instances.size
            ));
        }
        // Unmapped before submission.
        self.map_state.remove(&staging.id);

        let floats = frame
            .payload
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        self.submissions.push(SubmittedFrame {
            pipeline: frame.pipeline.id,
            staging: staging.id,
            instances: frame.instances.id,
            copy_bytes,
            floats,
            draw: (frame.vertex_count, frame.instance_count),
            target: frame.target.clone(),
            clear_color: frame.clear_color,
        });
        Ok(())
    }
}
