//! Vulkan abstraction layer (Render Hardware Interface).
//!
//! Safe wrappers over `ash` for everything the triangle renderer touches:
//! - Instance, physical device and logical device creation
//! - Swapchain management
//! - Command pools and command buffer recording
//! - Host-visible buffers and uniform descriptor sets
//! - Pipeline creation for dynamic rendering
//! - Binary and timeline semaphores

mod error;

pub mod buffer;
pub mod command;
pub mod descriptor;
pub mod device;
pub mod instance;
pub mod physical_device;
pub mod pipeline;
pub mod shader;
pub mod swapchain;
pub mod sync;
pub mod vertex;

pub use error::{RhiError, RhiResult};
pub use swapchain::BUFFER_COUNT;

// Re-export ash types that users might need
pub use ash::vk;
