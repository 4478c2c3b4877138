//! Platform layer: the window, its Vulkan surface, and keyboard mapping.

mod input;
mod window;

pub use input::{KeyCode, map_key};
pub use window::{Surface, Window};

// Re-export winit types that users might need
pub use winit::event::{ElementState, KeyEvent, WindowEvent};
pub use winit::event_loop::{ActiveEventLoop, EventLoop};
pub use winit::keyboard::PhysicalKey;
