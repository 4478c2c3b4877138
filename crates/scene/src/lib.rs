//! Scene state for the triangle sample.
//!
//! This crate provides:
//! - A yaw/pitch camera driven by logical key inputs
//! - The scene context that owns the camera and projection

pub mod camera;
pub mod scene;

pub use camera::{Camera, CameraKey};
pub use scene::Scene;
