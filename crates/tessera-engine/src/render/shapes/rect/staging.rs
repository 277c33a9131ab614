use crate::render::backend::{BufferKind, GpuBackend, MapRequest};
use crate::render::RenderError;

use super::instance::{instance_bytes, RectInstance};

/// Serialized frame waiting for its staging buffer to become writable.
pub(super) struct PendingFrame<T> {
    pub instances: Vec<RectInstance>,
    pub target: T,
    pub clear_color: wgpu::Color,
}

enum SlotState<T> {
    Idle,
    /// Map requested; the slot owns the frame until the map answers.
    Mapping {
        seq: u64,
        request: MapRequest,
        frame: PendingFrame<T>,
    },
}

struct StagingSlot<B: GpuBackend> {
    buffer: B::Buffer,
    /// In instances.
    capacity: usize,
    state: SlotState<B::Target>,
}

/// Ring of staging buffers, each owned by at most one in-flight frame.
///
/// Slots are allocated lazily up to `max_slots`. A slot is only mapped from
/// `Idle`, so no buffer ever sees two overlapping map requests.
///
/// A frame that finds every slot pending and cannot be coalesced waits in
/// `deferred` until a slot frees up. It is always newer than every mapping
/// frame, so it is started before any later draw claims a slot.
pub(super) struct StagingRing<B: GpuBackend> {
    slots: Vec<StagingSlot<B>>,
    max_slots: usize,
    next_seq: u64,
    deferred: Option<PendingFrame<B::Target>>,
}

/// Outcome of polling the oldest pending slot.
pub(super) enum SlotPoll<T> {
    Nothing,
    Waiting,
    Ready(usize, PendingFrame<T>),
    Failed(RenderError),
}

impl<B: GpuBackend> StagingRing<B> {
    pub fn new(first: B::Buffer, capacity: usize, max_slots: usize) -> Self {
        Self {
            slots: vec![StagingSlot {
                buffer: first,
                capacity,
                state: SlotState::Idle,
            }],
            max_slots: max_slots.max(1),
            next_seq: 0,
            deferred: None,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Frames not yet submitted: mapping slots plus the deferred frame.
    pub fn pending(&self) -> usize {
        let mapping = self
            .slots
            .iter()
            .filter(|s| matches!(s.state, SlotState::Mapping { .. }))
            .count();
        mapping + usize::from(self.deferred.is_some())
    }

    /// Instance count of the deferred frame, if any.
    pub fn deferred_len(&self) -> Option<usize> {
        self.deferred.as_ref().map(|f| f.instances.len())
    }

    /// Parks `frame` until a slot frees up. Returns `true` when it replaced
    /// an older deferred frame.
    pub fn defer(&mut self, frame: PendingFrame<B::Target>) -> bool {
        self.deferred.replace(frame).is_some()
    }

    pub fn take_deferred(&mut self) -> Option<PendingFrame<B::Target>> {
        self.deferred.take()
    }

    #[inline]
    pub fn buffer(&self, slot: usize) -> &B::Buffer {
        &self.slots[slot].buffer
    }

    /// Finds an idle slot able to hold `required` instances.
    ///
    /// Idle slots that are too small are reallocated at `grown` capacity; when
    /// every slot is busy and the ring is not full, a new slot is added.
    /// Returns `None` when all `max_slots` slots are pending.
    pub fn acquire(
        &mut self,
        backend: &mut B,
        required: usize,
        grown: usize,
    ) -> Result<Option<usize>, RenderError> {
        if let Some(idx) = self
            .slots
            .iter()
            .position(|s| matches!(s.state, SlotState::Idle))
        {
            let slot = &mut self.slots[idx];
            if slot.capacity < required {
                slot.buffer = backend.create_buffer(BufferKind::Staging, instance_bytes(grown))?;
                slot.capacity = grown;
                log::debug!("rect staging slot {idx} grown to {grown} instances");
            }
            return Ok(Some(idx));
        }

        if self.slots.len() < self.max_slots {
            let capacity = grown.max(required);
            let buffer = backend.create_buffer(BufferKind::Staging, instance_bytes(capacity))?;
            self.slots.push(StagingSlot {
                buffer,
                capacity,
                state: SlotState::Idle,
            });
            log::debug!("rect staging ring extended to {} slots", self.slots.len());
            return Ok(Some(self.slots.len() - 1));
        }

        Ok(None)
    }

    /// Moves an idle slot to `Mapping` with the given request and frame.
    pub fn begin(&mut self, slot: usize, request: MapRequest, frame: PendingFrame<B::Target>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots[slot].state = SlotState::Mapping {
            seq,
            request,
            frame,
        };
    }

    /// Replaces the newest pending frame with `frame` if its slot can hold it.
    ///
    /// Gives the frame back when it does not fit.
    pub fn coalesce(
        &mut self,
        frame: PendingFrame<B::Target>,
    ) -> Result<(), PendingFrame<B::Target>> {
        let newest = self
            .slots
            .iter_mut()
            .filter_map(|s| match &mut s.state {
                SlotState::Mapping { seq, frame: pending, .. } => Some((*seq, s.capacity, pending)),
                SlotState::Idle => None,
            })
            .max_by_key(|(seq, _, _)| *seq);

        match newest {
            Some((_, capacity, pending)) if capacity >= frame.instances.len() => {
                *pending = frame;
                Ok(())
            }
            _ => Err(frame),
        }
    }

    /// Checks the oldest pending slot only, so frames submit in request order.
    ///
    /// A ready or failed slot returns to `Idle`.
    pub fn poll_oldest(&mut self) -> SlotPoll<B::Target> {
        let oldest = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| match &s.state {
                SlotState::Mapping { seq, .. } => Some((*seq, i)),
                SlotState::Idle => None,
            })
            .min();

        let Some((_, idx)) = oldest else {
            return SlotPoll::Nothing;
        };

        let slot = &mut self.slots[idx];
        let SlotState::Mapping { request, .. } = &slot.state else {
            return SlotPoll::Nothing;
        };

        match request.try_complete() {
            None => SlotPoll::Waiting,
            Some(res) => match std::mem::replace(&mut slot.state, SlotState::Idle) {
                SlotState::Mapping { frame, .. } => match res {
                    Ok(()) => SlotPoll::Ready(idx, frame),
                    Err(e) => SlotPoll::Failed(e),
                },
                SlotState::Idle => SlotPoll::Nothing,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::recording::RecordingBackend;

    fn frame(n: usize, target: &str) -> PendingFrame<String> {
        PendingFrame {
            instances: vec![RectInstance::default(); n],
            target: target.to_string(),
            clear_color: wgpu::Color::TRANSPARENT,
        }
    }

    fn ring(backend: &mut RecordingBackend, capacity: usize, max: usize) -> StagingRing<RecordingBackend> {
        let first = backend
            .create_buffer(BufferKind::Staging, instance_bytes(capacity))
            .unwrap();
        StagingRing::new(first, capacity, max)
    }

    fn start(backend: &mut RecordingBackend, ring: &mut StagingRing<RecordingBackend>, n: usize, target: &str) -> usize {
        let idx = ring.acquire(backend, n, n).unwrap().unwrap();
        let req = backend.request_map(ring.buffer(idx));
        ring.begin(idx, req, frame(n, target));
        idx
    }

    #[test]
    fn idle_slot_is_reused() {
        let mut b = RecordingBackend::manual();
        let mut r = ring(&mut b, 4, 3);
        assert_eq!(r.acquire(&mut b, 4, 4).unwrap(), Some(0));
        assert_eq!(r.len(), 1);
        assert_eq!(b.allocations.len(), 1);
    }

    #[test]
    fn busy_ring_grows_up_to_max() {
        let mut b = RecordingBackend::manual();
        let mut r = ring(&mut b, 4, 2);
        assert_eq!(start(&mut b, &mut r, 4, "a"), 0);
        assert_eq!(start(&mut b, &mut r, 4, "b"), 1);
        assert_eq!(r.acquire(&mut b, 4, 4).unwrap(), None);
        assert_eq!(r.pending(), 2);
        assert!(b.violations.is_empty(), "{:?}", b.violations);
    }

    #[test]
    fn small_idle_slot_is_reallocated() {
        let mut b = RecordingBackend::manual();
        let mut r = ring(&mut b, 2, 1);
        assert_eq!(r.acquire(&mut b, 5, 8).unwrap(), Some(0));
        assert_eq!(r.buffer(0).size, instance_bytes(8));
        assert_eq!(b.allocations.len(), 2);
    }

    #[test]
    fn oldest_completes_first() {
        let mut b = RecordingBackend::manual();
        let mut r = ring(&mut b, 4, 2);
        start(&mut b, &mut r, 1, "first");
        start(&mut b, &mut r, 1, "second");
        let second = r.buffer(1).id;
        let first = r.buffer(0).id;

        // Newer slot answers first; the older one still blocks submission.
        b.complete_map(second);
        assert!(matches!(r.poll_oldest(), SlotPoll::Waiting));

        b.complete_map(first);
        match r.poll_oldest() {
            SlotPoll::Ready(idx, f) => {
                assert_eq!(idx, 0);
                assert_eq!(f.target, "first");
            }
            _ => panic!("oldest slot should be ready"),
        }
        match r.poll_oldest() {
            SlotPoll::Ready(idx, f) => {
                assert_eq!(idx, 1);
                assert_eq!(f.target, "second");
            }
            _ => panic!("second slot should be ready"),
        }
        assert!(matches!(r.poll_oldest(), SlotPoll::Nothing));
    }

    #[test]
    fn failed_map_frees_slot() {
        let mut b = RecordingBackend::manual();
        let mut r = ring(&mut b, 4, 1);
        start(&mut b, &mut r, 1, "a");
        b.fail_map(r.buffer(0).id);
        assert!(matches!(r.poll_oldest(), SlotPoll::Failed(RenderError::Mapping(_))));
        assert_eq!(r.pending(), 0);
    }

    #[test]
    fn deferred_frame_counts_as_pending_and_keeps_only_the_newest() {
        let mut b = RecordingBackend::manual();
        let mut r = ring(&mut b, 1, 1);
        start(&mut b, &mut r, 1, "a");
        assert_eq!(r.deferred_len(), None);

        assert!(!r.defer(frame(3, "b")));
        assert!(r.defer(frame(5, "c")));
        assert_eq!(r.pending(), 2);
        assert_eq!(r.deferred_len(), Some(5));

        let f = r.take_deferred().unwrap();
        assert_eq!(f.target, "c");
        assert_eq!(r.pending(), 1);
        assert!(r.take_deferred().is_none());
    }

    #[test]
    fn coalesce_replaces_newest_when_it_fits() {
        let mut b = RecordingBackend::manual();
        let mut r = ring(&mut b, 4, 1);
        start(&mut b, &mut r, 2, "old");
        assert!(r.coalesce(frame(3, "new")).is_ok());
        assert!(r.coalesce(frame(9, "too big")).is_err());

        b.complete_map(r.buffer(0).id);
        match r.poll_oldest() {
            SlotPoll::Ready(_, f) => {
                assert_eq!(f.target, "new");
                assert_eq!(f.instances.len(), 3);
            }
            _ => panic!("coalesced frame should be ready"),
        }
    }
}
