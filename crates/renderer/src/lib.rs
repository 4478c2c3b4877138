//! Frame pacing and the triangle renderer.
//!
//! This crate orchestrates the rendering process:
//! - [`FrameSynchronizer`]: CPU/GPU pacing over the swapchain's frame slots
//! - [`ConstantBuffer`]: typed per-slot uniform buffers
//! - [`Renderer`]: builds the Vulkan stack and draws the scene each frame

pub mod constant_buffer;
pub mod frame_sync;
pub mod renderer;
pub mod swapchain_frames;
pub mod ubo;

pub use constant_buffer::{CONSTANT_BUFFER_ALIGNMENT, ConstantBuffer, padded_size};
pub use frame_sync::{FrameBackend, FrameSynchronizer, SlotState};
pub use renderer::Renderer;
pub use swapchain_frames::SwapchainFrames;
pub use ubo::TransformConstants;
