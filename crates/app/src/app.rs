//! winit application handler wiring window, scene and renderer together.

use anyhow::{Context, Result};
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::event::{KeyEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::PhysicalKey;
use winit::window::WindowId;

use triframe_core::{AppConfig, StepTimer, Timer};
use triframe_platform::{Window, map_key};
use triframe_renderer::Renderer;
use triframe_scene::Scene;

pub struct App {
    config: AppConfig,
    // Dropped before the window so the surface never outlives it.
    renderer: Option<Renderer>,
    window: Option<Window>,
    scene: Scene,
    step_timer: StepTimer,
    last_title_second: u64,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let scene = Scene::new(config.aspect_ratio(), config.camera_speed);
        let step_timer = StepTimer::new(config.target_fps, config.fixed_time_step);
        Self {
            config,
            renderer: None,
            window: None,
            scene,
            step_timer,
            last_title_second: 0,
            error: None,
        }
    }

    /// Error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let startup = Timer::new();

        let window = Window::new(
            event_loop,
            self.config.width,
            self.config.height,
            &self.config.title,
        )
        .context("failed to create window")?;

        let renderer =
            Renderer::new(&window, &self.config).context("failed to initialize renderer")?;

        info!(
            "Initialization complete in {:.1} ms, entering main loop ({} update step)",
            startup.elapsed_secs() * 1000.0,
            if self.step_timer.is_fixed_time_step() {
                "fixed"
            } else {
                "variable"
            }
        );

        self.renderer = Some(renderer);
        self.window = Some(window);
        // Time spent creating the device should not count as a frame.
        self.step_timer.reset_elapsed_time();
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let scene = &mut self.scene;
        self.step_timer
            .tick(|timer| scene.update(timer.elapsed_seconds()));

        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&self.scene).context("failed to render frame")?;
        }

        self.update_title();
        Ok(())
    }

    /// Shows the frame rate in the title once per second.
    fn update_title(&mut self) {
        let second = self.step_timer.total_seconds() as u64;
        if second == self.last_title_second {
            return;
        }
        self.last_title_second = second;

        if let Some(window) = &self.window {
            window.set_title(&format!(
                "{} - {} fps",
                self.config.title,
                self.step_timer.frames_per_second()
            ));
        }
    }

    fn on_key(&mut self, event: &KeyEvent) {
        if event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(key) = map_key(code) else {
            return;
        };

        if event.state.is_pressed() {
            self.scene.on_key_down(key);
        } else {
            self.scene.on_key_up(key);
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{:#}", err);
        self.error = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.initialize(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.on_key(&event),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut renderer) = self.renderer.take() {
            if let Err(e) = renderer.wait_idle() {
                error!("Failed to drain the GPU on exit: {}", e);
            }
        }
        self.window = None;
        info!(
            "Rendered {} frame(s) in {:.1} s",
            self.step_timer.frame_count(),
            self.step_timer.total_seconds()
        );
    }
}
