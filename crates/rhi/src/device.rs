//! Vulkan logical device and queue management.
//!
//! [`Device`] owns the logical device, its graphics and present queues and
//! the gpu-allocator used for every buffer in the renderer.

use std::ffi::{CStr, c_char};
use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex, MutexGuard};

use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use tracing::{debug, error, info};

use crate::error::{RhiError, RhiResult};
use crate::instance::Instance;
use crate::physical_device::{PhysicalDeviceInfo, QueueFamilyIndices};

/// Required device extensions.
const DEVICE_EXTENSIONS: &[&CStr] = &[ash::khr::swapchain::NAME];

/// Vulkan logical device wrapper, shared through `Arc`.
pub struct Device {
    device: ash::Device,
    physical_device: vk::PhysicalDevice,
    /// Dropped by hand before the device is destroyed.
    allocator: ManuallyDrop<Mutex<Allocator>>,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
    queue_families: QueueFamilyIndices,
    min_uniform_buffer_alignment: u64,
}

impl Device {
    /// Creates the logical device with timeline semaphores and dynamic
    /// rendering enabled, then initializes the memory allocator.
    ///
    /// # Errors
    ///
    /// Returns an error if device creation or allocator initialization fails.
    pub fn new(instance: &Instance, physical_device_info: &PhysicalDeviceInfo) -> RhiResult<Arc<Self>> {
        let queue_families = physical_device_info.queue_families;
        let (Some(graphics_family), Some(present_family)) =
            (queue_families.graphics_family, queue_families.present_family)
        else {
            return Err(RhiError::NoSuitableGpu);
        };

        let unique_families = queue_families.unique_families();
        let queue_priorities = [1.0f32];

        let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = unique_families
            .iter()
            .map(|&family| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(family)
                    .queue_priorities(&queue_priorities)
            })
            .collect();

        debug!(
            "Creating {} queue(s) for families: {:?}",
            queue_create_infos.len(),
            unique_families
        );

        let mut features_1_2 = vk::PhysicalDeviceVulkan12Features::default().timeline_semaphore(true);
        let mut features_1_3 = vk::PhysicalDeviceVulkan13Features::default().dynamic_rendering(true);

        let extension_names: Vec<*const c_char> =
            DEVICE_EXTENSIONS.iter().map(|ext| ext.as_ptr()).collect();

        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&extension_names)
            .push_next(&mut features_1_2)
            .push_next(&mut features_1_3);

        let device = unsafe {
            instance
                .handle()
                .create_device(physical_device_info.device, &create_info, None)?
        };

        info!(
            "Logical device created on '{}'",
            physical_device_info.device_name()
        );

        let graphics_queue = unsafe { device.get_device_queue(graphics_family, 0) };
        let present_queue = unsafe { device.get_device_queue(present_family, 0) };
        debug!(
            "Queues retrieved (graphics family {}, present family {})",
            graphics_family, present_family
        );

        let allocator = match Allocator::new(&AllocatorCreateDesc {
            instance: instance.handle().clone(),
            device: device.clone(),
            physical_device: physical_device_info.device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        }) {
            Ok(allocator) => allocator,
            Err(e) => {
                unsafe { device.destroy_device(None) };
                return Err(e.into());
            }
        };

        debug!("GPU memory allocator initialized");

        Ok(Arc::new(Self {
            device,
            physical_device: physical_device_info.device,
            allocator: ManuallyDrop::new(Mutex::new(allocator)),
            graphics_queue,
            present_queue,
            queue_families,
            min_uniform_buffer_alignment: physical_device_info.min_uniform_buffer_alignment(),
        }))
    }

    #[inline]
    pub fn handle(&self) -> &ash::Device {
        &self.device
    }

    #[inline]
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    #[inline]
    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    #[inline]
    pub fn present_queue(&self) -> vk::Queue {
        self.present_queue
    }

    #[inline]
    pub fn queue_families(&self) -> &QueueFamilyIndices {
        &self.queue_families
    }

    #[inline]
    pub fn min_uniform_buffer_alignment(&self) -> u64 {
        self.min_uniform_buffer_alignment
    }

    /// Locks the memory allocator.
    pub fn allocator(&self) -> RhiResult<MutexGuard<'_, Allocator>> {
        self.allocator
            .lock()
            .map_err(|_| RhiError::InvalidHandle("allocator mutex poisoned".to_string()))
    }

    /// Blocks until all queues are idle.
    pub fn wait_idle(&self) -> RhiResult<()> {
        unsafe { self.device.device_wait_idle()? };
        Ok(())
    }

    /// Submits work to the graphics queue.
    ///
    /// # Safety
    ///
    /// Command buffers and semaphores referenced by `submit_infos` must be
    /// valid, and `fence` must be null or unsignaled.
    pub unsafe fn submit_graphics(
        &self,
        submit_infos: &[vk::SubmitInfo<'_>],
        fence: vk::Fence,
    ) -> RhiResult<()> {
        unsafe {
            self.device
                .queue_submit(self.graphics_queue, submit_infos, fence)?;
        }
        Ok(())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = self.device.device_wait_idle() {
                error!("Failed to wait for device idle during drop: {:?}", e);
            }

            // Frees the allocator's memory blocks while the device is alive.
            ManuallyDrop::drop(&mut self.allocator);

            self.device.destroy_device(None);
        }
        debug!("Logical device destroyed");
    }
}

// ash::Device is Send + Sync, queues and the physical device are plain
// handles, and the allocator is behind a Mutex.
unsafe impl Send for Device {}
unsafe impl Sync for Device {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_extensions_defined() {
        assert_eq!(DEVICE_EXTENSIONS, &[ash::khr::swapchain::NAME]);
    }

    #[test]
    fn test_device_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Device>();
    }
}
