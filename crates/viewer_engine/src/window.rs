//! GLFW window wrapper with Vulkan surface support.

use thiserror::Error;

/// Window management errors.
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW library failed to initialize
    #[error("GLFW initialization failed")]
    InitializationFailed,

    /// Window or surface creation failed
    #[error("window creation failed")]
    CreationFailed,

    /// Other GLFW-level failure
    #[error("GLFW error: {0}")]
    GlfwError(String),
}

/// Result type for window operations.
pub type WindowResult<T> = Result<T, WindowError>;

/// GLFW window configured for Vulkan rendering, with the event polling the
/// viewer needs: keys, mouse buttons, cursor motion, scroll, and resizes.
pub struct Window {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

impl Window {
    /// Create a resizable window with no OpenGL context.
    pub fn new(title: &str, width: u32, height: u32) -> WindowResult<Self> {
        let mut glfw =
            glfw::init(glfw::fail_on_errors).map_err(|_| WindowError::InitializationFailed)?;

        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(true));

        let (mut window, events) = glfw
            .create_window(width, height, title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        window.set_key_polling(true);
        window.set_mouse_button_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_scroll_polling(true);
        window.set_framebuffer_size_polling(true);
        window.set_close_polling(true);

        Ok(Self {
            glfw,
            window,
            events,
        })
    }

    /// True once the user has requested the window to close.
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Request the window to close.
    pub fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    /// Process pending events without blocking.
    pub fn poll_events(&mut self) {
        self.glfw.poll_events();
    }

    /// Block until an event arrives. Used while the window is minimized.
    pub fn wait_events(&mut self) {
        self.glfw.wait_events();
    }

    /// Drain events queued since the last poll.
    pub fn flush_events(&self) -> glfw::FlushedMessages<(f64, glfw::WindowEvent)> {
        glfw::flush_messages(&self.events)
    }

    /// Framebuffer size in pixels. May differ from the window size on
    /// high-DPI displays, and is what the swapchain must match.
    pub fn get_framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width as u32, height as u32)
    }

    /// Instance extensions GLFW needs for surface creation.
    pub fn required_instance_extensions(&self) -> Option<Vec<String>> {
        self.glfw.get_required_instance_extensions()
    }

    /// Create a Vulkan surface for this window.
    pub fn create_vulkan_surface(
        &self,
        instance: ash::vk::Instance,
    ) -> WindowResult<ash::vk::SurfaceKHR> {
        let mut surface = ash::vk::SurfaceKHR::null();
        let result = self
            .window
            .create_window_surface(instance, std::ptr::null(), &mut surface);

        if result == ash::vk::Result::SUCCESS {
            Ok(surface)
        } else {
            Err(WindowError::GlfwError(format!(
                "failed to create Vulkan surface: {result:?}"
            )))
        }
    }
}
