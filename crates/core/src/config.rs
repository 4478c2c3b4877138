use std::path::PathBuf;

use crate::error::{Error, Result};

/// Runtime configuration for the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Directory holding `triangle.vert.spv` and `triangle.frag.spv`.
    pub shader_dir: PathBuf,
    /// FIFO presentation when set, otherwise MAILBOX or IMMEDIATE if offered.
    pub vsync: bool,
    /// Enable the Khronos validation layer when it is installed.
    pub validation: bool,
    /// Camera translation speed (units/s) and turn rate (rad/s).
    pub camera_speed: f32,
    pub fixed_time_step: bool,
    pub target_fps: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "triframe".to_string(),
            shader_dir: PathBuf::from("shaders/spirv"),
            vsync: true,
            validation: cfg!(debug_assertions),
            camera_speed: 5.0,
            fixed_time_step: true,
            target_fps: 60,
        }
    }
}

impl AppConfig {
    /// Checks values that would otherwise fail deep inside the renderer.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config(format!(
                "window size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.camera_speed.is_finite() || self.camera_speed <= 0.0 {
            return Err(Error::Config(format!(
                "camera speed must be positive, got {}",
                self.camera_speed
            )));
        }
        if self.target_fps == 0 {
            return Err(Error::Config("target fps must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 600);
        assert_eq!(config.camera_speed, 5.0);
    }

    #[test]
    fn test_zero_size_rejected() {
        let config = AppConfig {
            height: 0,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_bad_camera_speed_rejected() {
        for speed in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let config = AppConfig {
                camera_speed: speed,
                ..AppConfig::default()
            };
            assert!(config.validate().is_err(), "speed {speed} accepted");
        }
    }

    #[test]
    fn test_zero_target_fps_rejected() {
        let config = AppConfig {
            target_fps: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_aspect_ratio() {
        let config = AppConfig::default();
        assert!((config.aspect_ratio() - 4.0 / 3.0).abs() < 1e-6);
    }
}
