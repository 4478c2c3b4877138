//! Vulkan implementation of [`FrameBackend`].
//!
//! Frame slots map one-to-one onto swapchain images, so the slot index is
//! whatever `vkAcquireNextImageKHR` returns. The per-slot fence is a single
//! timeline semaphore shared by all slots.
//!
//! ```text
//! acquire (acquire_semaphores[k])  ->  submit slot i  ->  present slot i
//!                                       waits acquire     waits render_finished[i]
//!                                       signals render_finished[i]
//! timeline.signal(value)  after the submit, on the graphics queue
//! ```

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use triframe_rhi::command::{CommandBuffer, CommandPool};
use triframe_rhi::device::Device;
use triframe_rhi::swapchain::Swapchain;
use triframe_rhi::sync::{Semaphore, TimelineSemaphore};
use triframe_rhi::{RhiError, RhiResult};

use crate::frame_sync::FrameBackend;

/// Resources owned by one swapchain image.
struct FrameSlot {
    command_buffer: CommandBuffer,
    command_pool: CommandPool,
    render_finished: Semaphore,
    /// Acquire semaphore the next submission of this slot must wait on.
    image_available: vk::Semaphore,
}

/// Swapchain-backed frame slots.
pub struct SwapchainFrames {
    slots: Vec<FrameSlot>,
    /// One more than the image count so a semaphore is never re-armed while
    /// its consumer might still be unsubmitted.
    acquire_semaphores: Vec<Semaphore>,
    next_acquire: usize,
    fence: TimelineSemaphore,
    swapchain: Swapchain,
    device: Arc<Device>,
}

impl SwapchainFrames {
    /// Creates per-image command pools and semaphores for `swapchain`.
    pub fn new(device: Arc<Device>, swapchain: Swapchain) -> RhiResult<Self> {
        let graphics_family = device.queue_families().graphics_family.ok_or_else(|| {
            RhiError::InvalidHandle("device has no graphics queue family".to_string())
        })?;

        let image_count = swapchain.image_count() as usize;

        let mut slots = Vec::with_capacity(image_count);
        for i in 0..image_count {
            let command_pool = CommandPool::new(device.clone(), graphics_family)?;
            let command_buffer = CommandBuffer::new(device.clone(), &command_pool)?;
            slots.push(FrameSlot {
                command_buffer,
                command_pool,
                render_finished: Semaphore::new(device.clone())?,
                image_available: vk::Semaphore::null(),
            });
            debug!("Created frame slot {}", i);
        }

        let acquire_semaphores = (0..=image_count)
            .map(|_| Semaphore::new(device.clone()))
            .collect::<RhiResult<Vec<_>>>()?;

        let fence = TimelineSemaphore::new(device.clone(), 0)?;

        Ok(Self {
            slots,
            acquire_semaphores,
            next_acquire: 0,
            fence,
            swapchain,
            device,
        })
    }

    /// Command buffer of `slot`, open for recording after `reset_commands`.
    pub fn command_buffer(&self, slot: usize) -> RhiResult<&CommandBuffer> {
        self.slot(slot).map(|s| &s.command_buffer)
    }

    #[inline]
    pub fn swapchain(&self) -> &Swapchain {
        &self.swapchain
    }

    fn slot(&self, slot: usize) -> RhiResult<&FrameSlot> {
        self.slots
            .get(slot)
            .ok_or_else(|| RhiError::InvalidFrameState(format!("no frame slot {}", slot)))
    }
}

impl FrameBackend for SwapchainFrames {
    fn buffer_count(&self) -> usize {
        self.slots.len()
    }

    fn current_buffer_index(&mut self) -> RhiResult<usize> {
        let semaphore = self.acquire_semaphores[self.next_acquire].handle();
        let index = self.swapchain.acquire_next_image(semaphore)? as usize;
        self.next_acquire = (self.next_acquire + 1) % self.acquire_semaphores.len();

        let slot = self
            .slots
            .get_mut(index)
            .ok_or_else(|| RhiError::SwapchainError(format!("acquired unknown image {}", index)))?;
        slot.image_available = semaphore;

        Ok(index)
    }

    fn reset_commands(&mut self, slot: usize) -> RhiResult<()> {
        let slot = self.slot(slot)?;
        slot.command_pool.reset()?;
        slot.command_buffer.begin()
    }

    fn execute(&mut self, slot: usize) -> RhiResult<()> {
        let slot = self.slot(slot)?;
        slot.command_buffer.end()?;

        let wait_semaphores = [slot.image_available];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let command_buffers = [slot.command_buffer.handle()];
        let signal_semaphores = [slot.render_finished.handle()];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe { self.device.submit_graphics(&[submit_info], vk::Fence::null()) }
    }

    fn present(&mut self, slot: usize) -> RhiResult<()> {
        let render_finished = self.slot(slot)?.render_finished.handle();
        self.swapchain
            .present(self.device.present_queue(), slot as u32, render_finished)
    }

    fn signal(&mut self, value: u64) -> RhiResult<()> {
        self.fence
            .signal_on_queue(self.device.graphics_queue(), value)
    }

    fn completed_value(&self) -> RhiResult<u64> {
        self.fence.completed_value()
    }

    fn wait_for_value(&mut self, value: u64) -> RhiResult<()> {
        self.fence.wait_for_value(value, u64::MAX)
    }

    /// The timeline fence only tracks the graphics queue. Presents waiting on
    /// `render_finished` and the last acquire are covered by a device wait.
    fn wait_queues_idle(&mut self) -> RhiResult<()> {
        self.device.wait_idle()
    }
}
