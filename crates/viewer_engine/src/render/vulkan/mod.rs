//! Vulkan backend: RAII wrappers over the raw API.
//!
//! Each wrapper owns exactly the handles it creates and releases them in
//! its `Drop`. Higher layers compose these without touching raw `vk`
//! destruction calls.

pub mod buffer;
pub mod commands;
pub mod context;
pub mod descriptor;
pub mod framebuffer;
pub mod image;
pub mod render_pass;
pub mod shader;
pub mod swapchain;
pub mod sync;
pub mod vertex_layout;

pub use buffer::Buffer;
pub use commands::{CommandPool, SingleCommand};
pub use context::{GpuContext, VulkanError, VulkanResult};
pub use descriptor::{ViewerDescriptors, MAX_BOUND_TEXTURES};
pub use framebuffer::{DepthBuffer, Framebuffers};
pub use image::{Texture, VulkanImage};
pub use render_pass::RenderPass;
pub use shader::{GraphicsPipeline, ShaderModule};
pub use swapchain::Swapchain;
pub use sync::FrameSync;
