//! Synchronization primitives for the frame loop.

use ash::{vk, Device};

use super::context::{GpuContext, VulkanError, VulkanResult};

/// Binary semaphore with RAII cleanup.
pub struct Semaphore {
    device: Device,
    semaphore: vk::Semaphore,
}

impl Semaphore {
    /// Create an unsignaled semaphore.
    pub fn new(context: &GpuContext) -> VulkanResult<Self> {
        let device = context.raw_device();
        let create_info = vk::SemaphoreCreateInfo::builder();

        let semaphore = unsafe {
            device
                .create_semaphore(&create_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self { device, semaphore })
    }

    /// Raw semaphore handle.
    pub fn handle(&self) -> vk::Semaphore {
        self.semaphore
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_semaphore(self.semaphore, None);
        }
    }
}

/// The two semaphores the render loop needs.
///
/// The frame loop waits for the device to go idle after every present, so a
/// single pair is enough; there are never two frames in flight.
pub struct FrameSync {
    /// Signaled when the acquired swapchain image is ready to render into
    pub image_ready: Semaphore,
    /// Signaled when rendering finishes, waited on by present
    pub render_finished: Semaphore,
}

impl FrameSync {
    /// Create both semaphores.
    pub fn new(context: &GpuContext) -> VulkanResult<Self> {
        Ok(Self {
            image_ready: Semaphore::new(context)?,
            render_finished: Semaphore::new(context)?,
        })
    }
}
