//! Command pool and command buffer helpers.

use ash::{vk, Device};

use super::context::{GpuContext, VulkanError, VulkanResult};

/// Command pool for the graphics queue family.
pub struct CommandPool {
    device: Device,
    pool: vk::CommandPool,
}

impl CommandPool {
    /// Create a resettable command pool on the graphics family.
    pub fn new(context: &GpuContext) -> VulkanResult<Self> {
        let device = context.raw_device();

        let pool_info = vk::CommandPoolCreateInfo::builder()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(context.device.graphics_family);

        let pool = unsafe {
            device
                .create_command_pool(&pool_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self { device, pool })
    }

    /// Allocate a primary command buffer from this pool.
    pub fn allocate_primary(&self) -> VulkanResult<vk::CommandBuffer> {
        let alloc_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(self.pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        let buffers = unsafe {
            self.device
                .allocate_command_buffers(&alloc_info)
                .map_err(VulkanError::Api)?
        };
        Ok(buffers[0])
    }

    /// Raw pool handle.
    pub fn handle(&self) -> vk::CommandPool {
        self.pool
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        unsafe {
            // Frees any command buffers still allocated from the pool.
            self.device.destroy_command_pool(self.pool, None);
        }
    }
}

/// One-shot command buffer for uploads and layout transitions.
///
/// `begin` records into a fresh buffer; `finish` submits it, waits for the
/// graphics queue to drain, and frees the buffer.
pub struct SingleCommand {
    device: Device,
    pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
}

impl SingleCommand {
    /// Allocate and begin recording a one-time-submit command buffer.
    pub fn begin(context: &GpuContext, pool: &CommandPool) -> VulkanResult<Self> {
        let device = context.raw_device();
        let command_buffer = pool.allocate_primary()?;

        let begin_info = vk::CommandBufferBeginInfo::builder()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        unsafe {
            device
                .begin_command_buffer(command_buffer, &begin_info)
                .map_err(VulkanError::Api)?;
        }

        Ok(Self {
            device,
            pool: pool.handle(),
            command_buffer,
        })
    }

    /// The command buffer being recorded.
    pub fn handle(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    /// Device to record commands with.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// End recording, submit, and block until the queue is idle.
    pub fn finish(self, context: &GpuContext) -> VulkanResult<()> {
        unsafe {
            self.device
                .end_command_buffer(self.command_buffer)
                .map_err(VulkanError::Api)?;

            let command_buffers = [self.command_buffer];
            let submit_info = vk::SubmitInfo::builder().command_buffers(&command_buffers);

            self.device
                .queue_submit(context.graphics_queue(), &[submit_info.build()], vk::Fence::null())
                .map_err(VulkanError::Api)?;
            self.device
                .queue_wait_idle(context.graphics_queue())
                .map_err(VulkanError::Api)?;

            self.device
                .free_command_buffers(self.pool, &command_buffers);
        }
        Ok(())
    }
}
