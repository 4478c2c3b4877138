//! CPU/GPU frame pacing over a small ring of frame slots.
//!
//! A [`FrameSynchronizer`] drives any [`FrameBackend`] through the
//! per-frame protocol:
//!
//! ```text
//! begin_frame()          reset the current slot's command recording
//!   ... record ...
//! submit_and_present()   execute, present, schedule a fence signal
//! advance_frame()        query the next slot, wait for its fence if needed
//! ```
//!
//! Each slot remembers the fence value scheduled by its most recent
//! submission. `advance_frame` only blocks when the slot it is about to hand
//! out has not reached that value, so the CPU can record frame K+1 while the
//! GPU still executes frame K.
//!
//! The synchronizer is backend agnostic; the Vulkan implementation lives in
//! [`crate::swapchain_frames`], and tests drive it with in-memory backends.

use tracing::{debug, trace};

use triframe_rhi::{RhiError, RhiResult};

/// Device operations the synchronizer needs.
///
/// A slot index is always in `0..buffer_count()`.
pub trait FrameBackend {
    /// Number of frame slots.
    fn buffer_count(&self) -> usize;

    /// Asks the presentation surface which slot is writable next.
    fn current_buffer_index(&mut self) -> RhiResult<usize>;

    /// Resets the slot's command allocator and reopens its command list.
    fn reset_commands(&mut self, slot: usize) -> RhiResult<()>;

    /// Closes the slot's command list and submits it.
    fn execute(&mut self, slot: usize) -> RhiResult<()>;

    /// Queues the slot's image for presentation.
    fn present(&mut self, slot: usize) -> RhiResult<()>;

    /// Schedules the fence to reach `value` after all submitted work.
    fn signal(&mut self, value: u64) -> RhiResult<()>;

    /// Fence value the GPU has reached.
    fn completed_value(&self) -> RhiResult<u64>;

    /// Blocks until the fence reaches `value`.
    fn wait_for_value(&mut self, value: u64) -> RhiResult<()>;

    /// Blocks until every queue the backend uses is idle, including work the
    /// fence does not track such as pending presents.
    fn wait_queues_idle(&mut self) -> RhiResult<()>;
}

/// Lifecycle of one frame slot as seen from the CPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// Free for recording; any earlier GPU work on it has completed.
    Idle,
    /// Between `begin_frame` and `submit_and_present`.
    Recording,
    /// Submitted; the GPU may still be executing it.
    Submitted,
}

/// Paces frames so CPU writes never race GPU reads of the same slot.
pub struct FrameSynchronizer<B: FrameBackend> {
    backend: B,
    frame_index: usize,
    fence_values: Vec<u64>,
    states: Vec<SlotState>,
    last_signaled: u64,
}

impl<B: FrameBackend> FrameSynchronizer<B> {
    /// Takes ownership of `backend` and picks the first writable slot.
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::InvalidFrameState`] if the backend reports no
    /// slots or an out-of-range index.
    pub fn new(mut backend: B) -> RhiResult<Self> {
        let count = backend.buffer_count();
        if count == 0 {
            return Err(RhiError::InvalidFrameState(
                "backend has no frame slots".to_string(),
            ));
        }

        let frame_index = backend.current_buffer_index()?;
        check_index(frame_index, count)?;

        let mut fence_values = vec![0; count];
        fence_values[frame_index] = 1;

        debug!(
            "Frame synchronizer ready: {} slot(s), starting at slot {}",
            count, frame_index
        );

        Ok(Self {
            backend,
            frame_index,
            fence_values,
            states: vec![SlotState::Idle; count],
            last_signaled: 0,
        })
    }

    /// Resets command recording for the current slot.
    ///
    /// The slot's fence was already confirmed by the previous
    /// [`advance_frame`](Self::advance_frame), so this never blocks.
    pub fn begin_frame(&mut self) -> RhiResult<()> {
        self.expect_state(SlotState::Idle, "begin_frame")?;

        self.backend.reset_commands(self.frame_index)?;
        self.states[self.frame_index] = SlotState::Recording;

        trace!("Recording slot {}", self.frame_index);
        Ok(())
    }

    /// Submits the recorded commands, presents, and schedules the slot's fence.
    pub fn submit_and_present(&mut self) -> RhiResult<()> {
        self.expect_state(SlotState::Recording, "submit_and_present")?;

        let slot = self.frame_index;
        self.backend.execute(slot)?;
        self.backend.present(slot)?;

        let value = self.fence_values[slot];
        self.backend.signal(value)?;
        self.last_signaled = value;
        self.states[slot] = SlotState::Submitted;

        trace!("Submitted slot {} with fence value {}", slot, value);
        Ok(())
    }

    /// Moves to the slot the presentation surface hands out next.
    ///
    /// Blocks only if that slot's previous submission is still executing.
    pub fn advance_frame(&mut self) -> RhiResult<()> {
        self.expect_state(SlotState::Submitted, "advance_frame")?;

        let next = self.backend.current_buffer_index()?;
        check_index(next, self.fence_values.len())?;

        let target = self.fence_values[next];
        if self.backend.completed_value()? < target {
            trace!("Waiting on slot {} (fence value {})", next, target);
            self.backend.wait_for_value(target)?;
        }

        self.frame_index = next;
        self.states[next] = SlotState::Idle;
        self.fence_values[next] = self.last_signaled + 1;

        Ok(())
    }

    /// Flushes the queue and blocks until the GPU has finished all work.
    ///
    /// Call before destroying anything the GPU may still reference. Frames
    /// may continue afterwards from the current slot state.
    pub fn wait_idle(&mut self) -> RhiResult<()> {
        let slot = self.frame_index;
        let value = self.fence_values[slot].max(self.last_signaled + 1);

        self.backend.signal(value)?;
        self.last_signaled = value;
        self.backend.wait_for_value(value)?;
        self.backend.wait_queues_idle()?;

        // A submitted slot keeps the value of its submission, which has now
        // completed. Only a slot that has yet to submit moves past `value`.
        if self.states[slot] != SlotState::Submitted {
            self.fence_values[slot] = value + 1;
        }

        debug!("GPU idle at fence value {}", value);
        Ok(())
    }

    /// Slot currently writable by the CPU.
    #[inline]
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    #[inline]
    pub fn buffer_count(&self) -> usize {
        self.fence_values.len()
    }

    /// Fence value the next submission of `slot` will signal, or the value
    /// its last submission signaled if it has not been handed out since.
    pub fn fence_value(&self, slot: usize) -> Option<u64> {
        self.fence_values.get(slot).copied()
    }

    /// Highest fence value scheduled so far.
    #[inline]
    pub fn last_signaled(&self) -> u64 {
        self.last_signaled
    }

    pub fn slot_state(&self, slot: usize) -> Option<SlotState> {
        self.states.get(slot).copied()
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    fn expect_state(&self, expected: SlotState, operation: &str) -> RhiResult<()> {
        let actual = self.states[self.frame_index];
        if actual == expected {
            Ok(())
        } else {
            Err(RhiError::InvalidFrameState(format!(
                "{} on slot {} requires {:?}, found {:?}",
                operation, self.frame_index, expected, actual
            )))
        }
    }
}

fn check_index(index: usize, count: usize) -> RhiResult<()> {
    if index < count {
        Ok(())
    } else {
        Err(RhiError::InvalidFrameState(format!(
            "backend returned slot {} of {}",
            index, count
        )))
    }
}
