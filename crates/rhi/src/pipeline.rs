//! Graphics pipeline management.
//!
//! - [`PipelineLayout`] wraps VkPipelineLayout
//! - [`Pipeline`] wraps a graphics VkPipeline built for dynamic rendering
//! - [`GraphicsPipelineBuilder`] collects the fixed-function state
//!
//! Viewport and scissor are always dynamic; there is no depth attachment.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::path::Path;
//! use triframe_rhi::device::Device;
//! use triframe_rhi::shader::{Shader, ShaderStage};
//! use triframe_rhi::pipeline::{GraphicsPipelineBuilder, PipelineLayout};
//! use triframe_rhi::vertex::TriangleVertex;
//! use ash::vk;
//!
//! # fn example(device: Arc<Device>) -> Result<(), triframe_rhi::RhiError> {
//! let vs = Shader::from_spirv_file(
//!     device.clone(),
//!     Path::new("shaders/spirv/triangle.vert.spv"),
//!     ShaderStage::Vertex,
//!     "VSMain",
//! )?;
//! let fs = Shader::from_spirv_file(
//!     device.clone(),
//!     Path::new("shaders/spirv/triangle.frag.spv"),
//!     ShaderStage::Fragment,
//!     "PSMain",
//! )?;
//!
//! let layout = PipelineLayout::new(device.clone(), &[])?;
//! let pipeline = GraphicsPipelineBuilder::new()
//!     .vertex_shader(&vs)
//!     .fragment_shader(&fs)
//!     .vertex_binding(TriangleVertex::binding_description())
//!     .vertex_attributes(&TriangleVertex::attribute_descriptions())
//!     .color_attachment_format(vk::Format::B8G8R8A8_UNORM)
//!     .build(device, &layout)?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use ash::vk;
use tracing::{debug, info};

use crate::device::Device;
use crate::error::{RhiError, RhiResult};
use crate::shader::Shader;

/// Pipeline layout wrapper.
pub struct PipelineLayout {
    device: Arc<Device>,
    layout: vk::PipelineLayout,
}

impl PipelineLayout {
    /// Creates a layout over the given descriptor set layouts.
    pub fn new(
        device: Arc<Device>,
        descriptor_set_layouts: &[vk::DescriptorSetLayout],
    ) -> RhiResult<Self> {
        let create_info =
            vk::PipelineLayoutCreateInfo::default().set_layouts(descriptor_set_layouts);

        let layout = unsafe { device.handle().create_pipeline_layout(&create_info, None)? };

        debug!(
            "Created pipeline layout with {} descriptor set layout(s)",
            descriptor_set_layouts.len()
        );

        Ok(Self { device, layout })
    }

    #[inline]
    pub fn handle(&self) -> vk::PipelineLayout {
        self.layout
    }
}

impl Drop for PipelineLayout {
    fn drop(&mut self) {
        unsafe {
            self.device
                .handle()
                .destroy_pipeline_layout(self.layout, None);
        }
        debug!("Pipeline layout destroyed");
    }
}

/// Graphics pipeline wrapper.
pub struct Pipeline {
    device: Arc<Device>,
    pipeline: vk::Pipeline,
}

impl Pipeline {
    #[inline]
    pub fn handle(&self) -> vk::Pipeline {
        self.pipeline
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.handle().destroy_pipeline(self.pipeline, None);
        }
        info!("Graphics pipeline destroyed");
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PrimitiveTopology {
    #[default]
    TriangleList,
    TriangleStrip,
    LineList,
}

impl PrimitiveTopology {
    pub fn to_vk(self) -> vk::PrimitiveTopology {
        match self {
            PrimitiveTopology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
            PrimitiveTopology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
            PrimitiveTopology::LineList => vk::PrimitiveTopology::LINE_LIST,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CullMode {
    /// The camera can orbit behind the triangle, so nothing is culled by default.
    #[default]
    None,
    Front,
    Back,
}

impl CullMode {
    pub fn to_vk(self) -> vk::CullModeFlags {
        match self {
            CullMode::None => vk::CullModeFlags::NONE,
            CullMode::Front => vk::CullModeFlags::FRONT,
            CullMode::Back => vk::CullModeFlags::BACK,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrontFace {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl FrontFace {
    pub fn to_vk(self) -> vk::FrontFace {
        match self {
            FrontFace::Clockwise => vk::FrontFace::CLOCKWISE,
            FrontFace::CounterClockwise => vk::FrontFace::COUNTER_CLOCKWISE,
        }
    }
}

/// Builder for graphics pipelines targeting a single color attachment.
#[derive(Default)]
pub struct GraphicsPipelineBuilder<'a> {
    vertex_shader: Option<&'a Shader>,
    fragment_shader: Option<&'a Shader>,

    vertex_bindings: Vec<vk::VertexInputBindingDescription>,
    vertex_attributes: Vec<vk::VertexInputAttributeDescription>,

    topology: PrimitiveTopology,
    cull_mode: CullMode,
    front_face: FrontFace,

    color_attachment_format: Option<vk::Format>,
}

impl<'a> GraphicsPipelineBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_shader(mut self, shader: &'a Shader) -> Self {
        self.vertex_shader = Some(shader);
        self
    }

    pub fn fragment_shader(mut self, shader: &'a Shader) -> Self {
        self.fragment_shader = Some(shader);
        self
    }

    pub fn vertex_binding(mut self, binding: vk::VertexInputBindingDescription) -> Self {
        self.vertex_bindings.push(binding);
        self
    }

    pub fn vertex_attributes(mut self, attributes: &[vk::VertexInputAttributeDescription]) -> Self {
        self.vertex_attributes.extend_from_slice(attributes);
        self
    }

    pub fn topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn cull_mode(mut self, cull_mode: CullMode) -> Self {
        self.cull_mode = cull_mode;
        self
    }

    pub fn front_face(mut self, front_face: FrontFace) -> Self {
        self.front_face = front_face;
        self
    }

    pub fn color_attachment_format(mut self, format: vk::Format) -> Self {
        self.color_attachment_format = Some(format);
        self
    }

    /// Checks that every required piece of state was supplied.
    fn validate(&self) -> RhiResult<(&'a Shader, &'a Shader, vk::Format)> {
        let vertex_shader = self
            .vertex_shader
            .ok_or_else(|| RhiError::PipelineError("Vertex shader is required".to_string()))?;
        let fragment_shader = self
            .fragment_shader
            .ok_or_else(|| RhiError::PipelineError("Fragment shader is required".to_string()))?;
        let format = self.color_attachment_format.ok_or_else(|| {
            RhiError::PipelineError("Color attachment format is required".to_string())
        })?;
        Ok((vertex_shader, fragment_shader, format))
    }

    pub fn build(self, device: Arc<Device>, layout: &PipelineLayout) -> RhiResult<Pipeline> {
        let (vertex_shader, fragment_shader, color_format) = self.validate()?;

        let shader_stages = [
            vertex_shader.stage_create_info(),
            fragment_shader.stage_create_info(),
        ];

        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&self.vertex_bindings)
            .vertex_attribute_descriptions(&self.vertex_attributes);

        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(self.topology.to_vk())
            .primitive_restart_enable(false);

        // Viewport and scissor are set per frame
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(1)
            .scissor_count(1);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(self.cull_mode.to_vk())
            .front_face(self.front_face.to_vk());

        let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(false)
            .depth_write_enable(false);

        let color_blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
            .blend_enable(false)
            .color_write_mask(vk::ColorComponentFlags::RGBA)];

        let color_blend_state =
            vk::PipelineColorBlendStateCreateInfo::default().attachments(&color_blend_attachments);

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let color_formats = [color_format];
        let mut rendering_info =
            vk::PipelineRenderingCreateInfo::default().color_attachment_formats(&color_formats);

        let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .multisample_state(&multisample_state)
            .depth_stencil_state(&depth_stencil_state)
            .color_blend_state(&color_blend_state)
            .dynamic_state(&dynamic_state)
            .layout(layout.handle())
            .push_next(&mut rendering_info);

        let pipeline = unsafe {
            device
                .handle()
                .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
                .map_err(|(_, result)| result)?[0]
        };

        info!("Graphics pipeline created (format {:?})", color_format);

        Ok(Pipeline { device, pipeline })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_topology_to_vk() {
        assert_eq!(
            PrimitiveTopology::TriangleList.to_vk(),
            vk::PrimitiveTopology::TRIANGLE_LIST
        );
        assert_eq!(
            PrimitiveTopology::TriangleStrip.to_vk(),
            vk::PrimitiveTopology::TRIANGLE_STRIP
        );
        assert_eq!(
            PrimitiveTopology::LineList.to_vk(),
            vk::PrimitiveTopology::LINE_LIST
        );
    }

    #[test]
    fn test_cull_mode_to_vk() {
        assert_eq!(CullMode::None.to_vk(), vk::CullModeFlags::NONE);
        assert_eq!(CullMode::Front.to_vk(), vk::CullModeFlags::FRONT);
        assert_eq!(CullMode::Back.to_vk(), vk::CullModeFlags::BACK);
    }

    #[test]
    fn test_front_face_to_vk() {
        assert_eq!(FrontFace::Clockwise.to_vk(), vk::FrontFace::CLOCKWISE);
        assert_eq!(
            FrontFace::CounterClockwise.to_vk(),
            vk::FrontFace::COUNTER_CLOCKWISE
        );
    }

    #[test]
    fn test_builder_defaults() {
        let builder = GraphicsPipelineBuilder::new();
        assert_eq!(builder.topology, PrimitiveTopology::TriangleList);
        assert_eq!(builder.cull_mode, CullMode::None);
        assert!(builder.color_attachment_format.is_none());
    }

    #[test]
    fn test_builder_requires_shaders() {
        let builder =
            GraphicsPipelineBuilder::new().color_attachment_format(vk::Format::B8G8R8A8_UNORM);
        match builder.validate() {
            Err(RhiError::PipelineError(msg)) => assert!(msg.contains("Vertex shader")),
            _ => panic!("expected a pipeline error"),
        }
    }

    #[test]
    fn test_builder_collects_vertex_layout() {
        use crate::vertex::TriangleVertex;

        let builder = GraphicsPipelineBuilder::new()
            .vertex_binding(TriangleVertex::binding_description())
            .vertex_attributes(&TriangleVertex::attribute_descriptions())
            .cull_mode(CullMode::Back);
        assert_eq!(builder.vertex_bindings.len(), 1);
        assert_eq!(builder.vertex_attributes.len(), 2);
        assert_eq!(builder.cull_mode, CullMode::Back);
    }
}
