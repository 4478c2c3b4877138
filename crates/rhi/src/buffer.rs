//! Host-visible GPU buffers.
//!
//! Every [`Buffer`] lives in CPU-to-GPU memory and stays mapped for its
//! whole lifetime. The mapping is obtained when the buffer is created and
//! released with the allocation on drop.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use triframe_rhi::device::Device;
//! use triframe_rhi::buffer::{Buffer, BufferUsage};
//!
//! # fn example(device: Arc<Device>) -> Result<(), triframe_rhi::RhiError> {
//! let positions: [f32; 6] = [0.0, 0.5, -0.5, -0.5, 0.5, -0.5];
//! let vertex_buffer = Buffer::new_with_data(
//!     device,
//!     BufferUsage::Vertex,
//!     bytemuck::cast_slice(&positions),
//! )?;
//! # Ok(())
//! # }
//! ```

use std::ptr::NonNull;
use std::sync::Arc;

use ash::vk;
use gpu_allocator::MemoryLocation;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use tracing::{debug, error};

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferUsage {
    Vertex,
    Uniform,
}

impl BufferUsage {
    pub fn to_vk_usage(self) -> vk::BufferUsageFlags {
        match self {
            BufferUsage::Vertex => vk::BufferUsageFlags::VERTEX_BUFFER,
            BufferUsage::Uniform => vk::BufferUsageFlags::UNIFORM_BUFFER,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BufferUsage::Vertex => "vertex",
            BufferUsage::Uniform => "uniform",
        }
    }
}

/// Vulkan buffer with persistently mapped gpu-allocator memory.
pub struct Buffer {
    device: Arc<Device>,
    buffer: vk::Buffer,
    allocation: Option<Allocation>,
    mapped: NonNull<u8>,
    size: vk::DeviceSize,
    usage: BufferUsage,
}

impl Buffer {
    /// Creates a mapped buffer of `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::MapFailed`] if the memory cannot be mapped, or
    /// the underlying Vulkan or allocator error.
    pub fn new(device: Arc<Device>, usage: BufferUsage, size: vk::DeviceSize) -> RhiResult<Self> {
        if size == 0 {
            return Err(RhiError::InvalidHandle(
                "Buffer size must be greater than 0".to_string(),
            ));
        }

        let buffer_info = vk::BufferCreateInfo::default()
            .size(size)
            .usage(usage.to_vk_usage())
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe { device.handle().create_buffer(&buffer_info, None)? };
        let requirements = unsafe { device.handle().get_buffer_memory_requirements(buffer) };

        let allocation = device.allocator().and_then(|mut allocator| {
            allocator
                .allocate(&AllocationCreateDesc {
                    name: usage.name(),
                    requirements,
                    location: MemoryLocation::CpuToGpu,
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(RhiError::from)
        });

        let allocation = match allocation {
            Ok(allocation) => allocation,
            Err(e) => {
                unsafe { device.handle().destroy_buffer(buffer, None) };
                return Err(e);
            }
        };

        // Constructed before binding so every later failure frees through Drop.
        let mapped = allocation.mapped_ptr().map(|ptr| ptr.cast::<u8>());
        let mut this = Self {
            device,
            buffer,
            allocation: Some(allocation),
            mapped: NonNull::dangling(),
            size,
            usage,
        };

        this.mapped = mapped.ok_or_else(|| {
            RhiError::MapFailed(format!("{} buffer memory is not host visible", usage.name()))
        })?;

        if let Some(allocation) = &this.allocation {
            unsafe {
                this.device.handle().bind_buffer_memory(
                    this.buffer,
                    allocation.memory(),
                    allocation.offset(),
                )?;
            }
        }

        debug!("Created {} buffer: {} bytes", usage.name(), size);

        Ok(this)
    }

    pub fn new_with_data(device: Arc<Device>, usage: BufferUsage, data: &[u8]) -> RhiResult<Self> {
        let buffer = Self::new(device, usage, data.len() as vk::DeviceSize)?;
        buffer.write_bytes(0, data)?;
        Ok(buffer)
    }

    /// Copies `data` into the mapping at `offset`.
    ///
    /// The caller must ensure the GPU is not reading this range.
    pub fn write_bytes(&self, offset: vk::DeviceSize, data: &[u8]) -> RhiResult<()> {
        if data.is_empty() {
            return Ok(());
        }

        let end = offset + data.len() as vk::DeviceSize;
        if end > self.size {
            return Err(RhiError::InvalidHandle(format!(
                "Write exceeds buffer size: offset {} + data {} > buffer {}",
                offset,
                data.len(),
                self.size
            )));
        }

        // In bounds of a live mapping; CpuToGpu memory is host coherent.
        unsafe {
            let dst = self.mapped.as_ptr().add(offset as usize);
            std::ptr::copy_nonoverlapping(data.as_ptr(), dst, data.len());
        }

        Ok(())
    }

    #[inline]
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    #[inline]
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }

    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Some(allocation) = self.allocation.take() {
            match self.device.allocator() {
                Ok(mut allocator) => {
                    if let Err(e) = allocator.free(allocation) {
                        error!("Failed to free buffer allocation: {:?}", e);
                    }
                }
                Err(e) => error!("Leaking buffer allocation: {}", e),
            }
        }

        unsafe {
            self.device.handle().destroy_buffer(self.buffer, None);
        }

        debug!("Destroyed {} buffer", self.usage.name());
    }
}

// The mapped pointer is only written through `&self` methods the renderer
// calls from one thread at a time; Vulkan handles are plain values.
unsafe impl Send for Buffer {}
unsafe impl Sync for Buffer {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_usage_to_vk_usage() {
        assert!(
            BufferUsage::Vertex
                .to_vk_usage()
                .contains(vk::BufferUsageFlags::VERTEX_BUFFER)
        );
        assert!(
            BufferUsage::Uniform
                .to_vk_usage()
                .contains(vk::BufferUsageFlags::UNIFORM_BUFFER)
        );
    }

    #[test]
    fn test_buffer_usage_names() {
        assert_eq!(BufferUsage::Vertex.name(), "vertex");
        assert_eq!(BufferUsage::Uniform.name(), "uniform");
    }
}
