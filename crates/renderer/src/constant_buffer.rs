//! Typed, persistently mapped uniform buffers.
//!
//! A [`ConstantBuffer<T>`] holds exactly one `T`. Its allocation is rounded
//! up to [`CONSTANT_BUFFER_ALIGNMENT`] so the same payload layout also
//! satisfies hardware that requires 256-byte constant buffer views.
//! The memory is mapped on creation and unmapped when the buffer drops.

use std::marker::PhantomData;
use std::mem::size_of;
use std::sync::Arc;

use bytemuck::Pod;

use triframe_rhi::RhiResult;
use triframe_rhi::buffer::{Buffer, BufferUsage};
use triframe_rhi::device::Device;
use triframe_rhi::vk;

/// Size granularity of every constant buffer allocation.
pub const CONSTANT_BUFFER_ALIGNMENT: usize = 256;

/// Rounds `size` up to the next multiple of [`CONSTANT_BUFFER_ALIGNMENT`].
pub const fn padded_size(size: usize) -> usize {
    (size + CONSTANT_BUFFER_ALIGNMENT - 1) & !(CONSTANT_BUFFER_ALIGNMENT - 1)
}

/// Uniform buffer holding a single `T`.
pub struct ConstantBuffer<T: Pod> {
    buffer: Buffer,
    _payload: PhantomData<T>,
}

impl<T: Pod> ConstantBuffer<T> {
    /// Allocation size for `T`; fails to compile for zero-sized payloads.
    pub const SIZE: usize = {
        assert!(size_of::<T>() > 0, "constant buffer payload must not be empty");
        padded_size(size_of::<T>())
    };

    /// Allocates the buffer and writes `initial` into it.
    pub fn new(device: Arc<Device>, initial: &T) -> RhiResult<Self> {
        let buffer = Buffer::new(device, BufferUsage::Uniform, Self::SIZE as vk::DeviceSize)?;
        let this = Self {
            buffer,
            _payload: PhantomData,
        };
        this.write(initial)?;
        Ok(this)
    }

    /// Copies `value` into the mapped memory.
    ///
    /// The GPU must not be reading this buffer; with one buffer per frame
    /// slot that holds once the slot has been handed out by the frame
    /// synchronizer.
    pub fn write(&self, value: &T) -> RhiResult<()> {
        self.buffer.write_bytes(0, bytemuck::bytes_of(value))
    }

    #[inline]
    pub fn handle(&self) -> vk::Buffer {
        self.buffer.handle()
    }

    /// Padded size in bytes.
    #[inline]
    pub fn size(&self) -> vk::DeviceSize {
        self.buffer.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_size() {
        assert_eq!(padded_size(1), 256);
        assert_eq!(padded_size(64), 256);
        assert_eq!(padded_size(256), 256);
        assert_eq!(padded_size(257), 512);
        assert_eq!(padded_size(0), 0);
    }

    #[test]
    fn test_size_constant() {
        assert_eq!(ConstantBuffer::<[f32; 16]>::SIZE, 256);
        assert_eq!(ConstantBuffer::<[f32; 80]>::SIZE, 512);
    }
}
