//! Viewer application: window, render loop, and input dispatch.

use std::path::PathBuf;
use thiserror::Error;

use crate::render::vulkan::VulkanError;
use crate::render::{Camera, FrameStatus, OrbitController, Renderer};
use crate::scene::{Model, ModelError};
use crate::window::{Window, WindowError};

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Window system failure
    #[error(transparent)]
    Window(#[from] WindowError),

    /// Vulkan failure
    #[error(transparent)]
    Vulkan(#[from] VulkanError),

    /// Model failed to load
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Startup configuration for the viewer.
pub struct ViewerConfig {
    /// Window title
    pub title: String,
    /// Initial window width in screen coordinates
    pub width: u32,
    /// Initial window height in screen coordinates
    pub height: u32,
    /// OBJ file to display
    pub model_path: PathBuf,
    /// Directory holding the compiled SPIR-V shaders
    pub shader_dir: PathBuf,
    /// Orbit rotation in degrees per pixel of drag
    pub orbit_sensitivity: f32,
}

impl ViewerConfig {
    /// Default viewer settings for the given model file.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            title: "3D Model Viewer".to_string(),
            width: 1920,
            height: 1080,
            model_path: model_path.into(),
            shader_dir: PathBuf::from("target/shaders"),
            orbit_sensitivity: 0.15,
        }
    }
}

/// The viewer: owns the window, the renderer, and the loaded model.
pub struct ViewerApp {
    // Drop order: model releases its GPU buffers, then the renderer tears
    // down the device, then the window goes away.
    model: Model,
    renderer: Renderer,
    orbit: OrbitController,
    camera: Camera,
    config: ViewerConfig,
    window: Window,
}

impl ViewerApp {
    /// Create the window, initialize Vulkan, and load the model.
    pub fn new(config: ViewerConfig) -> Result<Self, AppError> {
        let window = Window::new(&config.title, config.width, config.height)?;

        let mut renderer = Renderer::new(&window, &config.title)?;

        let model = Model::load(
            renderer.context(),
            renderer.command_pool(),
            &config.model_path,
        )?;
        renderer.setup_model_resources(&model, &config.shader_dir)?;

        let (fb_width, fb_height) = window.get_framebuffer_size();
        let camera = Camera::default_for_aspect(fb_width as f32 / fb_height as f32);
        let orbit = OrbitController::new(config.orbit_sensitivity);

        // Seed the uniform so the first frame has a valid MVP.
        renderer.update_mvp(&(camera.view_projection() * orbit.model_matrix()))?;

        Ok(Self {
            model,
            renderer,
            orbit,
            camera,
            config,
            window,
        })
    }

    /// Run until the window closes or Escape is pressed.
    pub fn run(&mut self) -> Result<(), AppError> {
        log::info!("Viewer started: {}", self.config.model_path.display());

        while !self.window.should_close() {
            self.window.poll_events();

            let events: Vec<glfw::WindowEvent> = self
                .window
                .flush_events()
                .map(|(_, event)| event)
                .collect();

            let mut transform_changed = false;
            let mut resized = false;

            for event in events {
                match event {
                    glfw::WindowEvent::Key(glfw::Key::Escape, _, glfw::Action::Press, _) => {
                        self.window.set_should_close(true);
                    }
                    glfw::WindowEvent::MouseButton(
                        glfw::MouseButton::Button1,
                        action,
                        _,
                    ) => {
                        self.orbit.set_dragging(action == glfw::Action::Press);
                    }
                    glfw::WindowEvent::CursorPos(x, y) => {
                        transform_changed |= self.orbit.on_cursor_move(x, y);
                    }
                    glfw::WindowEvent::Scroll(_, delta_y) => {
                        transform_changed |= self.orbit.on_scroll(delta_y);
                    }
                    glfw::WindowEvent::FramebufferSize(..) => {
                        resized = true;
                    }
                    _ => {}
                }
            }

            if resized {
                self.handle_resize()?;
                transform_changed = false; // handle_resize already re-uploads
            }

            if transform_changed {
                self.push_mvp()?;
            }

            if self.renderer.render_frame(&self.model)? == FrameStatus::SwapchainStale {
                self.handle_resize()?;
            }
        }

        log::info!("Viewer shutting down");
        Ok(())
    }

    fn handle_resize(&mut self) -> Result<(), AppError> {
        self.renderer.recreate_swapchain(&mut self.window)?;
        let extent = self.renderer.extent();
        self.camera.set_aspect(extent.width, extent.height);
        self.push_mvp()
    }

    fn push_mvp(&self) -> Result<(), AppError> {
        let mvp = self.camera.view_projection() * self.orbit.model_matrix();
        self.renderer.update_mvp(&mvp)?;
        Ok(())
    }
}
