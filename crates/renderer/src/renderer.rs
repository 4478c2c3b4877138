//! Triangle renderer orchestration.
//!
//! [`Renderer`] owns every Vulkan object and runs one frame per
//! [`Renderer::render`] call through the [`FrameSynchronizer`].

use std::path::Path;
use std::sync::Arc;

use ash::vk;
use tracing::{debug, error, info};

use triframe_core::AppConfig;
use triframe_math::{Vec3, Vec4};
use triframe_platform::{Surface, Window};
use triframe_rhi::buffer::{Buffer, BufferUsage};
use triframe_rhi::command::CommandBuffer;
use triframe_rhi::descriptor::{
    DescriptorPool, DescriptorSetLayout, UNIFORM_BINDING, write_uniform_buffer,
};
use triframe_rhi::device::Device;
use triframe_rhi::instance::Instance;
use triframe_rhi::physical_device::select_physical_device;
use triframe_rhi::pipeline::{CullMode, GraphicsPipelineBuilder, Pipeline, PipelineLayout};
use triframe_rhi::shader::{Shader, ShaderStage};
use triframe_rhi::swapchain::{BUFFER_COUNT, Swapchain, SwapchainDesc};
use triframe_rhi::vertex::TriangleVertex;
use triframe_rhi::{RhiError, RhiResult};
use triframe_scene::Scene;

use crate::constant_buffer::ConstantBuffer;
use crate::frame_sync::FrameSynchronizer;
use crate::swapchain_frames::SwapchainFrames;
use crate::ubo::TransformConstants;

/// Background color of every frame.
pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.2, 0.4, 1.0];

/// The three colored corners of the triangle, in world space.
pub const TRIANGLE_VERTICES: [TriangleVertex; 3] = [
    TriangleVertex::new(Vec3::new(0.0, 0.5, 0.0), Vec4::new(1.0, 0.0, 0.0, 1.0)),
    TriangleVertex::new(Vec3::new(0.5, -0.5, 0.0), Vec4::new(0.0, 1.0, 0.0, 1.0)),
    TriangleVertex::new(Vec3::new(-0.5, -0.5, 0.0), Vec4::new(0.0, 0.0, 1.0, 1.0)),
];

pub const VERTEX_SHADER_FILE: &str = "triangle.vert.spv";
pub const FRAGMENT_SHADER_FILE: &str = "triangle.frag.spv";
pub const VERTEX_ENTRY_POINT: &str = "VSMain";
pub const FRAGMENT_ENTRY_POINT: &str = "PSMain";

/// Constant buffer and descriptor set owned by one frame slot.
struct SlotResources {
    constants: ConstantBuffer<TransformConstants>,
    descriptor_set: vk::DescriptorSet,
}

/// Vulkan renderer for the colored triangle.
///
/// # Resource Destruction Order
///
/// `Drop` first waits for the GPU to go idle. Fields are then dropped in
/// declaration order:
/// 1. Frame slots, swapchain and fence
/// 2. Per-slot constant buffers
/// 3. Vertex buffer, pipeline, pipeline layout
/// 4. Descriptor pool, then its layout
/// 5. Surface
/// 6. Device (last `Arc`)
/// 7. Instance
pub struct Renderer {
    frames: FrameSynchronizer<SwapchainFrames>,
    slots: Vec<SlotResources>,
    vertex_buffer: Buffer,
    pipeline: Pipeline,
    pipeline_layout: PipelineLayout,
    // Held only to control destruction order.
    _descriptor_pool: DescriptorPool,
    _descriptor_set_layout: DescriptorSetLayout,
    _surface: Surface,
    device: Arc<Device>,
    _instance: Instance,
    viewport: vk::Viewport,
    scissor: vk::Rect2D,
}

impl Renderer {
    /// Builds the whole Vulkan stack for `window`.
    ///
    /// # Errors
    ///
    /// Returns an error if any Vulkan object cannot be created or the
    /// SPIR-V shaders cannot be loaded from `config.shader_dir`.
    pub fn new(window: &Window, config: &AppConfig) -> RhiResult<Self> {
        let width = window.width();
        let height = window.height();

        info!("Initializing Vulkan renderer ({}x{})", width, height);

        let display = window
            .raw_display_handle()
            .map_err(|e| RhiError::SurfaceError(e.to_string()))?;
        let instance = Instance::new(Some(display), config.validation)?;

        let surface = window
            .create_surface(instance.entry(), instance.handle())
            .map_err(|e| RhiError::SurfaceError(e.to_string()))?;

        let physical_device_info =
            select_physical_device(instance.handle(), surface.handle(), surface.loader())?;

        let device = Device::new(&instance, &physical_device_info)?;

        let swapchain = Swapchain::new(
            &instance,
            device.clone(),
            surface.handle(),
            surface.loader(),
            SwapchainDesc {
                width,
                height,
                image_count: BUFFER_COUNT,
                vsync: config.vsync,
            },
        )?;

        let extent = swapchain.extent();
        let color_format = swapchain.format();

        let frames = FrameSynchronizer::new(SwapchainFrames::new(device.clone(), swapchain)?)?;
        let slot_count = frames.buffer_count() as u32;

        let descriptor_set_layout = DescriptorSetLayout::vertex_uniform(device.clone())?;
        let descriptor_pool = DescriptorPool::for_uniform_buffers(device.clone(), slot_count)?;
        let slots = Self::create_slot_resources(
            &device,
            &descriptor_pool,
            &descriptor_set_layout,
            slot_count,
        )?;

        let (pipeline, pipeline_layout) = Self::create_triangle_pipeline(
            device.clone(),
            &descriptor_set_layout,
            color_format,
            &config.shader_dir,
        )?;

        let vertex_buffer = Buffer::new_with_data(
            device.clone(),
            BufferUsage::Vertex,
            bytemuck::cast_slice(&TRIANGLE_VERTICES),
        )?;

        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent,
        };

        info!(
            "Renderer initialized: {} frame slot(s), {}x{}, {:?}",
            slot_count,
            extent.width,
            extent.height,
            frames.backend().swapchain().present_mode()
        );

        Ok(Self {
            frames,
            slots,
            vertex_buffer,
            pipeline,
            pipeline_layout,
            _descriptor_pool: descriptor_pool,
            _descriptor_set_layout: descriptor_set_layout,
            _surface: surface,
            device,
            _instance: instance,
            viewport,
            scissor,
        })
    }

    /// Creates one constant buffer and descriptor set per frame slot.
    fn create_slot_resources(
        device: &Arc<Device>,
        descriptor_pool: &DescriptorPool,
        descriptor_set_layout: &DescriptorSetLayout,
        count: u32,
    ) -> RhiResult<Vec<SlotResources>> {
        let sets = descriptor_pool.allocate(descriptor_set_layout, count)?;

        let mut slots = Vec::with_capacity(sets.len());
        for (i, descriptor_set) in sets.into_iter().enumerate() {
            let constants = ConstantBuffer::new(device.clone(), &TransformConstants::default())?;
            write_uniform_buffer(
                device,
                descriptor_set,
                UNIFORM_BINDING,
                constants.handle(),
                constants.size(),
            );
            slots.push(SlotResources {
                constants,
                descriptor_set,
            });
            debug!("Created constant buffer for slot {}", i);
        }

        Ok(slots)
    }

    fn create_triangle_pipeline(
        device: Arc<Device>,
        descriptor_set_layout: &DescriptorSetLayout,
        color_format: vk::Format,
        shader_dir: &Path,
    ) -> RhiResult<(Pipeline, PipelineLayout)> {
        let vertex_shader = Shader::from_spirv_file(
            device.clone(),
            &shader_dir.join(VERTEX_SHADER_FILE),
            ShaderStage::Vertex,
            VERTEX_ENTRY_POINT,
        )?;
        let fragment_shader = Shader::from_spirv_file(
            device.clone(),
            &shader_dir.join(FRAGMENT_SHADER_FILE),
            ShaderStage::Fragment,
            FRAGMENT_ENTRY_POINT,
        )?;

        let pipeline_layout = PipelineLayout::new(device.clone(), &[descriptor_set_layout.handle()])?;

        let pipeline = GraphicsPipelineBuilder::new()
            .vertex_shader(&vertex_shader)
            .fragment_shader(&fragment_shader)
            .vertex_binding(TriangleVertex::binding_description())
            .vertex_attributes(&TriangleVertex::attribute_descriptions())
            .cull_mode(CullMode::None)
            .color_attachment_format(color_format)
            .build(device, &pipeline_layout)?;

        Ok((pipeline, pipeline_layout))
    }

    /// Renders and presents one frame of `scene`.
    ///
    /// # Errors
    ///
    /// Any device, queue or swapchain failure is returned; none is recovered.
    pub fn render(&mut self, scene: &Scene) -> RhiResult<()> {
        self.frames.begin_frame()?;

        let slot = self.frames.frame_index();
        let resources = self
            .slots
            .get(slot)
            .ok_or_else(|| RhiError::InvalidFrameState(format!("no resources for slot {}", slot)))?;

        // The slot's previous reader finished before advance_frame handed it out.
        resources
            .constants
            .write(&TransformConstants::new(scene.view_projection()))?;

        let backend = self.frames.backend();
        let cmd = backend.command_buffer(slot)?;
        let image = backend.swapchain().image(slot);
        let image_view = backend.swapchain().image_view(slot);
        self.record_commands(cmd, image, image_view, resources.descriptor_set);

        self.frames.submit_and_present()?;
        self.frames.advance_frame()
    }

    /// Records the triangle draw into an already open command buffer.
    fn record_commands(
        &self,
        cmd: &CommandBuffer,
        image: vk::Image,
        image_view: vk::ImageView,
        descriptor_set: vk::DescriptorSet,
    ) {
        cmd.transition_color_image(
            image,
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        );

        let color_attachment = vk::RenderingAttachmentInfo::default()
            .image_view(image_view)
            .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .clear_value(vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: CLEAR_COLOR,
                },
            });

        let rendering_info = vk::RenderingInfo::default()
            .render_area(self.scissor)
            .layer_count(1)
            .color_attachments(std::slice::from_ref(&color_attachment));

        cmd.begin_rendering(&rendering_info);
        cmd.set_viewport(self.viewport);
        cmd.set_scissor(self.scissor);
        cmd.bind_graphics_pipeline(self.pipeline.handle());
        cmd.bind_descriptor_set(self.pipeline_layout.handle(), descriptor_set);
        cmd.bind_vertex_buffer(self.vertex_buffer.handle());
        cmd.draw(TRIANGLE_VERTICES.len() as u32, 1);
        cmd.end_rendering();

        cmd.transition_color_image(
            image,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            vk::ImageLayout::PRESENT_SRC_KHR,
        );
    }

    /// Blocks until the GPU has finished every submitted frame.
    pub fn wait_idle(&mut self) -> RhiResult<()> {
        self.frames.wait_idle()
    }

    #[inline]
    pub fn extent(&self) -> vk::Extent2D {
        self.scissor.extent
    }

    #[inline]
    pub fn frame_index(&self) -> usize {
        self.frames.frame_index()
    }

    #[inline]
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Err(e) = self.frames.wait_idle() {
            error!("Failed to drain the GPU during renderer drop: {}", e);
        }
        info!("Renderer destroyed");
    }
}
