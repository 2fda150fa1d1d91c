//! Frame rendering and presentation.

use ash::vk;
use std::path::Path;

use crate::foundation::math::Mat4;
use crate::scene::Model;
use crate::window::Window;

use super::vulkan::{
    Buffer, CommandPool, DepthBuffer, FrameSync, Framebuffers, GpuContext, GraphicsPipeline,
    RenderPass, SingleCommand, Swapchain, ViewerDescriptors, VulkanError, VulkanResult,
};

/// Outcome of a frame submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Frame was rendered and presented
    Rendered,
    /// Swapchain no longer matches the surface and must be recreated
    SwapchainStale,
}

const CLEAR_COLOR: [f32; 4] = [0.2, 0.2, 0.2, 1.0];

/// Owns the whole rendering chain for one window.
///
/// The renderer draws one frame at a time and waits for the device to go
/// idle after each present. That keeps resource lifetimes trivial: nothing
/// the frame used can still be in flight when the next one starts.
pub struct Renderer {
    // Field order is drop order. Pipeline and descriptors go first, the
    // context that created everything goes last.
    pipeline: Option<GraphicsPipeline>,
    descriptors: Option<ViewerDescriptors>,
    framebuffers: Framebuffers,
    depth: DepthBuffer,
    render_pass: RenderPass,
    mvp_buffer: Buffer,
    sync: FrameSync,
    swapchain: Swapchain,
    command_buffer: vk::CommandBuffer,
    command_pool: CommandPool,
    context: GpuContext,
}

impl Renderer {
    /// Build the rendering chain for the window. Model-dependent pieces
    /// (descriptors, pipeline) are attached later via
    /// [`Renderer::setup_model_resources`].
    pub fn new(window: &Window, app_name: &str) -> VulkanResult<Self> {
        let context = GpuContext::new(window, app_name)?;

        let (width, height) = window.get_framebuffer_size();
        let swapchain = Swapchain::new(&context, vk::Extent2D { width, height })?;

        let render_pass = RenderPass::new(&context, swapchain.format().format)?;
        let depth = DepthBuffer::new(&context, swapchain.extent())?;
        let framebuffers = Framebuffers::new(
            &context,
            &render_pass,
            swapchain.image_views(),
            depth.view(),
            swapchain.extent(),
        )?;

        let command_pool = CommandPool::new(&context)?;
        let command_buffer = command_pool.allocate_primary()?;
        let sync = FrameSync::new(&context)?;

        // Device-local and written with cmd_update_buffer, so the vertex
        // stage never reads host memory.
        let mvp_buffer = Buffer::new(
            &context,
            std::mem::size_of::<[f32; 16]>() as vk::DeviceSize,
            vk::BufferUsageFlags::UNIFORM_BUFFER | vk::BufferUsageFlags::TRANSFER_DST,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )?;

        Ok(Self {
            pipeline: None,
            descriptors: None,
            framebuffers,
            depth,
            render_pass,
            mvp_buffer,
            sync,
            swapchain,
            command_buffer,
            command_pool,
            context,
        })
    }

    /// GPU context for loading models.
    pub fn context(&self) -> &GpuContext {
        &self.context
    }

    /// Command pool for upload commands.
    pub fn command_pool(&self) -> &CommandPool {
        &self.command_pool
    }

    /// Current swapchain extent.
    pub fn extent(&self) -> vk::Extent2D {
        self.swapchain.extent()
    }

    /// Create the descriptor sets and pipeline for a loaded model. The
    /// compiled shaders are read from `shader_dir`.
    pub fn setup_model_resources(&mut self, model: &Model, shader_dir: &Path) -> VulkanResult<()> {
        let descriptors = ViewerDescriptors::new(
            &self.context,
            &self.mvp_buffer,
            model.material_buffer(),
            model.textures(),
        )?;
        let pipeline = GraphicsPipeline::new(
            &self.context,
            &self.render_pass,
            &descriptors,
            &shader_dir.join("model_vert.spv"),
            &shader_dir.join("model_frag.spv"),
        )?;

        self.descriptors = Some(descriptors);
        self.pipeline = Some(pipeline);
        Ok(())
    }

    /// Upload a new MVP matrix. Submitted as a one-shot transfer so the
    /// next rendered frame sees it.
    pub fn update_mvp(&self, mvp: &Mat4) -> VulkanResult<()> {
        let cmd = SingleCommand::begin(&self.context, &self.command_pool)?;
        unsafe {
            cmd.device().cmd_update_buffer(
                cmd.handle(),
                self.mvp_buffer.handle(),
                0,
                bytemuck::cast_slice(mvp.as_slice()),
            );
        }
        cmd.finish(&self.context)
    }

    /// Render and present one frame of the model.
    pub fn render_frame(&mut self, model: &Model) -> VulkanResult<FrameStatus> {
        let (Some(pipeline), Some(descriptors)) = (&self.pipeline, &self.descriptors) else {
            return Err(VulkanError::InvalidOperation {
                reason: "render_frame called before setup_model_resources".to_string(),
            });
        };

        let device = &self.context.device.device;

        let acquire_result = unsafe {
            self.swapchain.loader().acquire_next_image(
                self.swapchain.handle(),
                u64::MAX,
                self.sync.image_ready.handle(),
                vk::Fence::null(),
            )
        };
        let (image_index, mut stale) = match acquire_result {
            Ok((index, suboptimal)) => (index, suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => return Ok(FrameStatus::SwapchainStale),
            Err(e) => return Err(VulkanError::Api(e)),
        };

        unsafe {
            device
                .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(VulkanError::Api)?;

            let begin_info = vk::CommandBufferBeginInfo::builder();
            device
                .begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(VulkanError::Api)?;

            let clear_values = [
                vk::ClearValue {
                    color: vk::ClearColorValue {
                        float32: CLEAR_COLOR,
                    },
                },
                vk::ClearValue {
                    depth_stencil: vk::ClearDepthStencilValue {
                        depth: 1.0,
                        stencil: 0,
                    },
                },
            ];
            let extent = self.swapchain.extent();
            let render_pass_begin = vk::RenderPassBeginInfo::builder()
                .render_pass(self.render_pass.handle())
                .framebuffer(self.framebuffers.get(image_index))
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D { x: 0, y: 0 },
                    extent,
                })
                .clear_values(&clear_values);

            device.cmd_begin_render_pass(
                self.command_buffer,
                &render_pass_begin,
                vk::SubpassContents::INLINE,
            );

            let viewport = vk::Viewport {
                x: 0.0,
                y: 0.0,
                width: extent.width as f32,
                height: extent.height as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            };
            device.cmd_set_viewport(self.command_buffer, 0, &[viewport]);
            let scissor = vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            };
            device.cmd_set_scissor(self.command_buffer, 0, &[scissor]);

            device.cmd_bind_pipeline(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                pipeline.handle(),
            );
            device.cmd_bind_descriptor_sets(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                pipeline.layout(),
                0,
                &descriptors.sets(),
                &[],
            );

            model.record_draws(device, self.command_buffer, pipeline.layout());

            device.cmd_end_render_pass(self.command_buffer);
            device
                .end_command_buffer(self.command_buffer)
                .map_err(VulkanError::Api)?;
        }

        // The depth attachment is touched in early fragment tests before
        // any color output, so the wait covers both stages.
        let wait_semaphores = [self.sync.image_ready.handle()];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
            | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS];
        let command_buffers = [self.command_buffer];
        let signal_semaphores = [self.sync.render_finished.handle()];

        let submit_info = vk::SubmitInfo::builder()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        unsafe {
            device
                .queue_submit(
                    self.context.graphics_queue(),
                    &[submit_info.build()],
                    vk::Fence::null(),
                )
                .map_err(VulkanError::Api)?;
        }

        let swapchains = [self.swapchain.handle()];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::builder()
            .wait_semaphores(&signal_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let present_result = unsafe {
            self.swapchain
                .loader()
                .queue_present(self.context.present_queue(), &present_info)
        };
        match present_result {
            Ok(suboptimal) => stale |= suboptimal,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => stale = true,
            Err(e) => return Err(VulkanError::Api(e)),
        }

        // One frame in flight by design.
        self.context.wait_idle()?;

        if stale {
            Ok(FrameStatus::SwapchainStale)
        } else {
            Ok(FrameStatus::Rendered)
        }
    }

    /// Rebuild the swapchain and everything sized to it. Blocks while the
    /// window is minimized to zero size.
    pub fn recreate_swapchain(&mut self, window: &mut Window) -> VulkanResult<()> {
        let (mut width, mut height) = window.get_framebuffer_size();
        while width == 0 || height == 0 {
            window.wait_events();
            (width, height) = window.get_framebuffer_size();
        }

        self.context.wait_idle()?;

        let new_swapchain = Swapchain::recreate(
            &self.context,
            vk::Extent2D { width, height },
            self.swapchain.handle(),
        )?;
        // The old swapchain must stay alive until the new one is created
        // from it, then drops here.
        let _old = std::mem::replace(&mut self.swapchain, new_swapchain);
        drop(_old);

        self.depth = DepthBuffer::new(&self.context, self.swapchain.extent())?;
        self.framebuffers = Framebuffers::new(
            &self.context,
            &self.render_pass,
            self.swapchain.image_views(),
            self.depth.view(),
            self.swapchain.extent(),
        )?;

        log::debug!("Swapchain recreated at {}x{}", width, height);
        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        // Make sure nothing is in flight before the fields tear down.
        let _ = self.context.wait_idle();
    }
}
