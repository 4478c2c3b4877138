//! Descriptor set management for the per-frame constant buffers.
//!
//! - [`DescriptorSetLayout`] describes a single uniform buffer at binding 0
//! - [`DescriptorPool`] owns the sets allocated from it
//! - [`write_uniform_buffer`] points a set at a buffer range

use std::sync::Arc;

use ash::vk;
use tracing::debug;

use crate::device::Device;
use crate::error::{RhiError, RhiResult};

/// Binding slot of the transform constant buffer in the vertex shader.
pub const UNIFORM_BINDING: u32 = 0;

/// Builds the layout binding for one uniform buffer.
pub fn uniform_buffer_binding(
    binding: u32,
    stages: vk::ShaderStageFlags,
) -> vk::DescriptorSetLayoutBinding<'static> {
    vk::DescriptorSetLayoutBinding::default()
        .binding(binding)
        .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
        .descriptor_count(1)
        .stage_flags(stages)
}

/// Descriptor set layout wrapper.
///
/// Immutable after creation; share it through `Arc` if several pipelines
/// need it.
pub struct DescriptorSetLayout {
    device: Arc<Device>,
    layout: vk::DescriptorSetLayout,
}

impl DescriptorSetLayout {
    /// Creates a layout from the given bindings.
    pub fn new(
        device: Arc<Device>,
        bindings: &[vk::DescriptorSetLayoutBinding],
    ) -> RhiResult<Self> {
        let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(bindings);

        let layout = unsafe {
            device
                .handle()
                .create_descriptor_set_layout(&create_info, None)?
        };

        debug!(
            "Created descriptor set layout with {} binding(s)",
            bindings.len()
        );

        Ok(Self { device, layout })
    }

    /// Layout with one vertex-stage uniform buffer at [`UNIFORM_BINDING`].
    pub fn vertex_uniform(device: Arc<Device>) -> RhiResult<Self> {
        Self::new(
            device,
            &[uniform_buffer_binding(
                UNIFORM_BINDING,
                vk::ShaderStageFlags::VERTEX,
            )],
        )
    }

    #[inline]
    pub fn handle(&self) -> vk::DescriptorSetLayout {
        self.layout
    }
}

impl Drop for DescriptorSetLayout {
    fn drop(&mut self) {
        unsafe {
            self.device
                .handle()
                .destroy_descriptor_set_layout(self.layout, None);
        }
        debug!("Descriptor set layout destroyed");
    }
}

/// Descriptor pool sized for a fixed number of uniform-buffer sets.
///
/// Sets allocated from the pool are released together when the pool drops.
pub struct DescriptorPool {
    device: Arc<Device>,
    pool: vk::DescriptorPool,
    max_sets: u32,
}

impl DescriptorPool {
    /// Creates a pool able to hold `max_sets` sets of one uniform buffer each.
    pub fn for_uniform_buffers(device: Arc<Device>, max_sets: u32) -> RhiResult<Self> {
        let pool_sizes = [vk::DescriptorPoolSize::default()
            .ty(vk::DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(max_sets)];

        let create_info = vk::DescriptorPoolCreateInfo::default()
            .max_sets(max_sets)
            .pool_sizes(&pool_sizes);

        let pool = unsafe { device.handle().create_descriptor_pool(&create_info, None)? };

        debug!("Created descriptor pool for {} uniform set(s)", max_sets);

        Ok(Self {
            device,
            pool,
            max_sets,
        })
    }

    /// Allocates `count` sets sharing the same layout.
    pub fn allocate(
        &self,
        layout: &DescriptorSetLayout,
        count: u32,
    ) -> RhiResult<Vec<vk::DescriptorSet>> {
        if count > self.max_sets {
            return Err(RhiError::InvalidHandle(format!(
                "requested {} descriptor sets from a pool of {}",
                count, self.max_sets
            )));
        }

        let layouts = vec![layout.handle(); count as usize];
        let allocate_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.pool)
            .set_layouts(&layouts);

        let sets = unsafe { self.device.handle().allocate_descriptor_sets(&allocate_info)? };
        Ok(sets)
    }

    #[inline]
    pub fn handle(&self) -> vk::DescriptorPool {
        self.pool
    }

    #[inline]
    pub fn max_sets(&self) -> u32 {
        self.max_sets
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        unsafe {
            self.device
                .handle()
                .destroy_descriptor_pool(self.pool, None);
        }
        debug!("Descriptor pool destroyed");
    }
}

/// Points `binding` of `set` at `range` bytes of `buffer`.
pub fn write_uniform_buffer(
    device: &Device,
    set: vk::DescriptorSet,
    binding: u32,
    buffer: vk::Buffer,
    range: vk::DeviceSize,
) {
    let buffer_infos = [vk::DescriptorBufferInfo::default()
        .buffer(buffer)
        .offset(0)
        .range(range)];

    let write = vk::WriteDescriptorSet::default()
        .dst_set(set)
        .dst_binding(binding)
        .dst_array_element(0)
        .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
        .buffer_info(&buffer_infos);

    unsafe {
        device.handle().update_descriptor_sets(&[write], &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_buffer_binding() {
        let binding = uniform_buffer_binding(UNIFORM_BINDING, vk::ShaderStageFlags::VERTEX);
        assert_eq!(binding.binding, 0);
        assert_eq!(binding.descriptor_type, vk::DescriptorType::UNIFORM_BUFFER);
        assert_eq!(binding.descriptor_count, 1);
        assert_eq!(binding.stage_flags, vk::ShaderStageFlags::VERTEX);
    }

    #[test]
    fn test_binding_stage_flags_combine() {
        let stages = vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT;
        let binding = uniform_buffer_binding(3, stages);
        assert_eq!(binding.binding, 3);
        assert!(binding.stage_flags.contains(vk::ShaderStageFlags::FRAGMENT));
    }
}
