//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use triframe_core::AppConfig;

/// Camera-driven triangle on Vulkan.
#[derive(Debug, Parser)]
#[command(name = "triframe", version, about)]
pub struct Cli {
    /// Window width in pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Window title
    #[arg(long, default_value = "triframe")]
    pub title: String,

    /// Directory holding triangle.vert.spv and triangle.frag.spv
    #[arg(long, default_value = "shaders/spirv")]
    pub shader_dir: PathBuf,

    /// Present without waiting for vertical blank
    #[arg(long)]
    pub no_vsync: bool,

    /// Force the Vulkan validation layer on or off
    #[arg(long)]
    pub validation: Option<bool>,

    /// Camera speed in units (and radians) per second
    #[arg(long, default_value_t = 5.0)]
    pub speed: f32,

    /// Update once per rendered frame instead of at a fixed rate
    #[arg(long)]
    pub variable_step: bool,

    /// Fixed update rate in steps per second
    #[arg(long, default_value_t = 60)]
    pub target_fps: u32,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn into_config(self) -> AppConfig {
        let defaults = AppConfig::default();
        AppConfig {
            width: self.width,
            height: self.height,
            title: self.title,
            shader_dir: self.shader_dir,
            vsync: !self.no_vsync,
            validation: self.validation.unwrap_or(defaults.validation),
            camera_speed: self.speed,
            fixed_time_step: !self.variable_step,
            target_fps: self.target_fps,
        }
    }
}
