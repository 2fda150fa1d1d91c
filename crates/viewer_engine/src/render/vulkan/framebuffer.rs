//! Framebuffers and the depth attachment backing them.

use ash::{vk, Device};

use super::context::{GpuContext, VulkanError, VulkanResult};
use super::image::VulkanImage;
use super::render_pass::{RenderPass, DEPTH_FORMAT};

/// Depth attachment shared by every swapchain framebuffer.
pub struct DepthBuffer {
    image: VulkanImage,
}

impl DepthBuffer {
    /// Create a depth image matching the swapchain extent.
    pub fn new(context: &GpuContext, extent: vk::Extent2D) -> VulkanResult<Self> {
        let image = VulkanImage::new(
            context,
            extent.width,
            extent.height,
            1,
            DEPTH_FORMAT,
            vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
            vk::ImageAspectFlags::DEPTH,
        )?;
        Ok(Self { image })
    }

    /// View for framebuffer attachment.
    pub fn view(&self) -> vk::ImageView {
        self.image.view()
    }
}

/// One framebuffer per swapchain image view.
pub struct Framebuffers {
    device: Device,
    framebuffers: Vec<vk::Framebuffer>,
    extent: vk::Extent2D,
}

impl Framebuffers {
    /// Create framebuffers binding each swapchain view with the shared
    /// depth view.
    pub fn new(
        context: &GpuContext,
        render_pass: &RenderPass,
        image_views: &[vk::ImageView],
        depth_view: vk::ImageView,
        extent: vk::Extent2D,
    ) -> VulkanResult<Self> {
        let device = context.raw_device();

        let framebuffers: Result<Vec<_>, _> = image_views
            .iter()
            .map(|&view| {
                let attachments = [view, depth_view];
                let create_info = vk::FramebufferCreateInfo::builder()
                    .render_pass(render_pass.handle())
                    .attachments(&attachments)
                    .width(extent.width)
                    .height(extent.height)
                    .layers(1);

                unsafe { device.create_framebuffer(&create_info, None) }
            })
            .collect();

        let framebuffers = framebuffers.map_err(VulkanError::Api)?;

        Ok(Self {
            device,
            framebuffers,
            extent,
        })
    }

    /// Framebuffer for the given swapchain image index.
    pub fn get(&self, image_index: u32) -> vk::Framebuffer {
        self.framebuffers[image_index as usize]
    }

    /// Extent the framebuffers were built for.
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }
}

impl Drop for Framebuffers {
    fn drop(&mut self) {
        unsafe {
            for &framebuffer in &self.framebuffers {
                self.device.destroy_framebuffer(framebuffer, None);
            }
        }
    }
}
