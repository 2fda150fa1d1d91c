//! Rendering: camera math, the frame loop, and the Vulkan backend.

pub mod camera;
pub mod renderer;
pub mod vulkan;

pub use camera::{Camera, OrbitController};
pub use renderer::{FrameStatus, Renderer};
