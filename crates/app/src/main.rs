//! triframe - a camera-driven triangle rendered with Vulkan.

mod app;
mod cli;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use winit::event_loop::{ControlFlow, EventLoop};

use crate::app::App;
use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    triframe_core::init_logging(cli.verbose);

    let config = cli.into_config();
    config.validate()?;
    info!(
        "Starting triframe ({}x{}, vsync {}, validation {})",
        config.width, config.height, config.vsync, config.validation
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    if let Some(err) = app.take_error() {
        error!("Exiting after fatal error");
        return Err(err);
    }

    info!("Shut down cleanly");
    Ok(())
}
