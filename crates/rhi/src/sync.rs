//! Synchronization primitives.
//!
//! - [`Semaphore`]: binary semaphore for GPU-to-GPU ordering (acquire, present)
//! - [`TimelineSemaphore`]: monotonic 64-bit GPU counter the host can query
//!   and wait on, used as the frame fence
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use triframe_rhi::device::Device;
//! use triframe_rhi::sync::TimelineSemaphore;
//!
//! # fn example(device: Arc<Device>) -> Result<(), triframe_rhi::RhiError> {
//! let fence = TimelineSemaphore::new(device.clone(), 0)?;
//!
//! // Ask the queue to bump the counter once prior work is done
//! fence.signal_on_queue(device.graphics_queue(), 1)?;
//! fence.wait_for_value(1, u64::MAX)?;
//! assert!(fence.completed_value()? >= 1);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use ash::vk;
use tracing::{debug, trace};

use crate::device::Device;
use crate::error::RhiResult;

/// Binary semaphore, created unsignaled.
pub struct Semaphore {
    device: Arc<Device>,
    semaphore: vk::Semaphore,
}

impl Semaphore {
    pub fn new(device: Arc<Device>) -> RhiResult<Self> {
        let create_info = vk::SemaphoreCreateInfo::default();
        let semaphore = unsafe { device.handle().create_semaphore(&create_info, None)? };

        Ok(Self { device, semaphore })
    }

    #[inline]
    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_semaphore(self.semaphore, None);
        }
    }
}

/// Timeline semaphore.
///
/// The payload only ever increases. The queue advances it when all work
/// submitted before the signal has finished executing.
pub struct TimelineSemaphore {
    device: Arc<Device>,
    semaphore: vk::Semaphore,
}

impl TimelineSemaphore {
    /// Creates a timeline semaphore with the given starting value.
    pub fn new(device: Arc<Device>, initial_value: u64) -> RhiResult<Self> {
        let mut type_info = vk::SemaphoreTypeCreateInfo::default()
            .semaphore_type(vk::SemaphoreType::TIMELINE)
            .initial_value(initial_value);
        let create_info = vk::SemaphoreCreateInfo::default().push_next(&mut type_info);

        let semaphore = unsafe { device.handle().create_semaphore(&create_info, None)? };

        debug!("Created timeline semaphore (initial value {})", initial_value);

        Ok(Self { device, semaphore })
    }

    #[inline]
    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }

    /// Value the GPU has reached so far.
    pub fn completed_value(&self) -> RhiResult<u64> {
        let value = unsafe { self.device.handle().get_semaphore_counter_value(self.semaphore)? };
        Ok(value)
    }

    /// Blocks the calling thread until the counter reaches `value`.
    ///
    /// A timeout surfaces as `VulkanError(TIMEOUT)`.
    pub fn wait_for_value(&self, value: u64, timeout_ns: u64) -> RhiResult<()> {
        let semaphores = [self.semaphore];
        let values = [value];
        let wait_info = vk::SemaphoreWaitInfo::default()
            .semaphores(&semaphores)
            .values(&values);

        trace!("Waiting for timeline value {}", value);

        unsafe { self.device.handle().wait_semaphores(&wait_info, timeout_ns)? };
        Ok(())
    }

    /// Submits an empty batch that sets the counter to `value` once all
    /// previously submitted work on `queue` has completed.
    pub fn signal_on_queue(&self, queue: vk::Queue, value: u64) -> RhiResult<()> {
        let signal_semaphores = [self.semaphore];
        let signal_values = [value];
        let mut timeline_info =
            vk::TimelineSemaphoreSubmitInfo::default().signal_semaphore_values(&signal_values);
        let submit_info = vk::SubmitInfo::default()
            .signal_semaphores(&signal_semaphores)
            .push_next(&mut timeline_info);

        unsafe {
            self.device
                .handle()
                .queue_submit(queue, &[submit_info], vk::Fence::null())?;
        }
        Ok(())
    }
}

impl Drop for TimelineSemaphore {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_semaphore(self.semaphore, None);
        }
        debug!("Destroyed timeline semaphore");
    }
}
