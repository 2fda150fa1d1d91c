//! Images, layout transitions, mipmap generation, and sampled textures.

use ash::{vk, Device};

use super::buffer::{find_memory_type, Buffer};
use super::commands::{CommandPool, SingleCommand};
use super::context::{GpuContext, VulkanError, VulkanResult};

/// Number of mip levels for a full chain down to 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    (width.max(height) as f32).log2().floor() as u32 + 1
}

/// Image with backing memory and a view, released on drop.
pub struct VulkanImage {
    device: Device,
    image: vk::Image,
    memory: vk::DeviceMemory,
    view: vk::ImageView,
    format: vk::Format,
    extent: vk::Extent2D,
    mip_levels: u32,
}

impl VulkanImage {
    /// Create a 2D image, allocate device-local memory, and build a view
    /// over the given aspect.
    pub fn new(
        context: &GpuContext,
        width: u32,
        height: u32,
        mip_levels: u32,
        format: vk::Format,
        usage: vk::ImageUsageFlags,
        aspect: vk::ImageAspectFlags,
    ) -> VulkanResult<Self> {
        let device = context.raw_device();

        let image_info = vk::ImageCreateInfo::builder()
            .image_type(vk::ImageType::TYPE_2D)
            .extent(vk::Extent3D {
                width,
                height,
                depth: 1,
            })
            .mip_levels(mip_levels)
            .array_layers(1)
            .format(format)
            .tiling(vk::ImageTiling::OPTIMAL)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .samples(vk::SampleCountFlags::TYPE_1);

        let image = unsafe {
            device
                .create_image(&image_info, None)
                .map_err(VulkanError::Api)?
        };

        let mem_requirements = unsafe { device.get_image_memory_requirements(image) };
        let memory_type_index = find_memory_type(
            context,
            mem_requirements.memory_type_bits,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )?;

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(mem_requirements.size)
            .memory_type_index(memory_type_index);

        let memory = unsafe {
            device
                .allocate_memory(&alloc_info, None)
                .map_err(VulkanError::Api)?
        };

        unsafe {
            device
                .bind_image_memory(image, memory, 0)
                .map_err(VulkanError::Api)?;
        }

        let view_info = vk::ImageViewCreateInfo::builder()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: aspect,
                base_mip_level: 0,
                level_count: mip_levels,
                base_array_layer: 0,
                layer_count: 1,
            });

        let view = unsafe {
            device
                .create_image_view(&view_info, None)
                .map_err(VulkanError::Api)?
        };

        Ok(Self {
            device,
            image,
            memory,
            view,
            format,
            extent: vk::Extent2D { width, height },
            mip_levels,
        })
    }

    /// Raw image handle.
    pub fn handle(&self) -> vk::Image {
        self.image
    }

    /// Image view over all mip levels.
    pub fn view(&self) -> vk::ImageView {
        self.view
    }

    /// Image format.
    pub fn format(&self) -> vk::Format {
        self.format
    }

    /// Image extent in pixels.
    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Number of mip levels.
    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }
}

impl Drop for VulkanImage {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_image_view(self.view, None);
            self.device.destroy_image(self.image, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

/// Record a layout transition barrier covering all mip levels.
///
/// Only the two transitions texture upload needs are supported; anything
/// else is an error rather than a guessed barrier.
pub fn transition_image_layout(
    cmd: &SingleCommand,
    image: vk::Image,
    mip_levels: u32,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
) -> VulkanResult<()> {
    let (src_access, dst_access, src_stage, dst_stage) = match (old_layout, new_layout) {
        (vk::ImageLayout::UNDEFINED, vk::ImageLayout::TRANSFER_DST_OPTIMAL) => (
            vk::AccessFlags::empty(),
            vk::AccessFlags::TRANSFER_WRITE,
            vk::PipelineStageFlags::TOP_OF_PIPE,
            vk::PipelineStageFlags::TRANSFER,
        ),
        (vk::ImageLayout::TRANSFER_DST_OPTIMAL, vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL) => (
            vk::AccessFlags::TRANSFER_WRITE,
            vk::AccessFlags::SHADER_READ,
            vk::PipelineStageFlags::TRANSFER,
            vk::PipelineStageFlags::FRAGMENT_SHADER,
        ),
        _ => {
            return Err(VulkanError::InvalidOperation {
                reason: format!("unsupported layout transition {old_layout:?} -> {new_layout:?}"),
            })
        }
    };

    let barrier = vk::ImageMemoryBarrier::builder()
        .old_layout(old_layout)
        .new_layout(new_layout)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: 0,
            level_count: mip_levels,
            base_array_layer: 0,
            layer_count: 1,
        })
        .src_access_mask(src_access)
        .dst_access_mask(dst_access);

    unsafe {
        cmd.device().cmd_pipeline_barrier(
            cmd.handle(),
            src_stage,
            dst_stage,
            vk::DependencyFlags::empty(),
            &[],
            &[],
            &[barrier.build()],
        );
    }

    Ok(())
}

/// Blit each mip level from the previous one, leaving every level in
/// `SHADER_READ_ONLY_OPTIMAL`. The image must be in `TRANSFER_DST_OPTIMAL`
/// across all levels on entry.
pub fn generate_mipmaps(
    context: &GpuContext,
    cmd: &SingleCommand,
    image: vk::Image,
    format: vk::Format,
    width: u32,
    height: u32,
    mip_levels: u32,
) -> VulkanResult<()> {
    let format_props = unsafe {
        context
            .instance
            .instance
            .get_physical_device_format_properties(context.physical_device.device, format)
    };
    if !format_props
        .optimal_tiling_features
        .contains(vk::FormatFeatureFlags::SAMPLED_IMAGE_FILTER_LINEAR)
    {
        return Err(VulkanError::InvalidOperation {
            reason: format!("format {format:?} does not support linear blit"),
        });
    }

    let mut barrier = vk::ImageMemoryBarrier::builder()
        .image(image)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        })
        .build();

    let mut mip_width = width as i32;
    let mut mip_height = height as i32;

    for level in 1..mip_levels {
        // Source level: TRANSFER_DST -> TRANSFER_SRC once its data is final.
        barrier.subresource_range.base_mip_level = level - 1;
        barrier.old_layout = vk::ImageLayout::TRANSFER_DST_OPTIMAL;
        barrier.new_layout = vk::ImageLayout::TRANSFER_SRC_OPTIMAL;
        barrier.src_access_mask = vk::AccessFlags::TRANSFER_WRITE;
        barrier.dst_access_mask = vk::AccessFlags::TRANSFER_READ;

        unsafe {
            cmd.device().cmd_pipeline_barrier(
                cmd.handle(),
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::TRANSFER,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[barrier],
            );
        }

        let next_width = (mip_width / 2).max(1);
        let next_height = (mip_height / 2).max(1);

        let blit = vk::ImageBlit::builder()
            .src_offsets([
                vk::Offset3D { x: 0, y: 0, z: 0 },
                vk::Offset3D {
                    x: mip_width,
                    y: mip_height,
                    z: 1,
                },
            ])
            .src_subresource(vk::ImageSubresourceLayers {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                mip_level: level - 1,
                base_array_layer: 0,
                layer_count: 1,
            })
            .dst_offsets([
                vk::Offset3D { x: 0, y: 0, z: 0 },
                vk::Offset3D {
                    x: next_width,
                    y: next_height,
                    z: 1,
                },
            ])
            .dst_subresource(vk::ImageSubresourceLayers {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                mip_level: level,
                base_array_layer: 0,
                layer_count: 1,
            });

        unsafe {
            cmd.device().cmd_blit_image(
                cmd.handle(),
                image,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[blit.build()],
                vk::Filter::LINEAR,
            );
        }

        // Source level is done, hand it to the fragment shader.
        barrier.old_layout = vk::ImageLayout::TRANSFER_SRC_OPTIMAL;
        barrier.new_layout = vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL;
        barrier.src_access_mask = vk::AccessFlags::TRANSFER_READ;
        barrier.dst_access_mask = vk::AccessFlags::SHADER_READ;

        unsafe {
            cmd.device().cmd_pipeline_barrier(
                cmd.handle(),
                vk::PipelineStageFlags::TRANSFER,
                vk::PipelineStageFlags::FRAGMENT_SHADER,
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[barrier],
            );
        }

        mip_width = next_width;
        mip_height = next_height;
    }

    // Last level was only written, never blitted from.
    barrier.subresource_range.base_mip_level = mip_levels - 1;
    barrier.old_layout = vk::ImageLayout::TRANSFER_DST_OPTIMAL;
    barrier.new_layout = vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL;
    barrier.src_access_mask = vk::AccessFlags::TRANSFER_WRITE;
    barrier.dst_access_mask = vk::AccessFlags::SHADER_READ;

    unsafe {
        cmd.device().cmd_pipeline_barrier(
            cmd.handle(),
            vk::PipelineStageFlags::TRANSFER,
            vk::PipelineStageFlags::FRAGMENT_SHADER,
            vk::DependencyFlags::empty(),
            &[],
            &[],
            &[barrier],
        );
    }

    Ok(())
}

/// Sampled texture: mipmapped image plus its sampler.
pub struct Texture {
    sampler: vk::Sampler,
    image: VulkanImage,
    device: Device,
}

impl Texture {
    /// Upload RGBA8 pixels into a mipmapped, sampled texture.
    pub fn from_pixels(
        context: &GpuContext,
        pool: &CommandPool,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> VulkanResult<Self> {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);

        let mip_levels = mip_level_count(width, height);

        let staging = Buffer::new_with_data(context, pixels, vk::BufferUsageFlags::TRANSFER_SRC)?;

        let image = VulkanImage::new(
            context,
            width,
            height,
            mip_levels,
            vk::Format::R8G8B8A8_SRGB,
            vk::ImageUsageFlags::TRANSFER_SRC
                | vk::ImageUsageFlags::TRANSFER_DST
                | vk::ImageUsageFlags::SAMPLED,
            vk::ImageAspectFlags::COLOR,
        )?;

        let cmd = SingleCommand::begin(context, pool)?;

        transition_image_layout(
            &cmd,
            image.handle(),
            mip_levels,
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        )?;

        let region = vk::BufferImageCopy::builder()
            .image_subresource(vk::ImageSubresourceLayers {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                mip_level: 0,
                base_array_layer: 0,
                layer_count: 1,
            })
            .image_extent(vk::Extent3D {
                width,
                height,
                depth: 1,
            });

        unsafe {
            cmd.device().cmd_copy_buffer_to_image(
                cmd.handle(),
                staging.handle(),
                image.handle(),
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region.build()],
            );
        }

        if mip_levels > 1 {
            generate_mipmaps(
                context,
                &cmd,
                image.handle(),
                image.format(),
                width,
                height,
                mip_levels,
            )?;
        } else {
            transition_image_layout(
                &cmd,
                image.handle(),
                mip_levels,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            )?;
        }

        cmd.finish(context)?;

        let sampler = Self::create_sampler(context, mip_levels)?;

        Ok(Self {
            sampler,
            image,
            device: context.raw_device(),
        })
    }

    /// 1x1 texture of a single color, used as the fallback when a material
    /// has no image on disk.
    pub fn solid_color(
        context: &GpuContext,
        pool: &CommandPool,
        rgba: [u8; 4],
    ) -> VulkanResult<Self> {
        Self::from_pixels(context, pool, 1, 1, &rgba)
    }

    fn create_sampler(context: &GpuContext, mip_levels: u32) -> VulkanResult<vk::Sampler> {
        let max_anisotropy = context
            .physical_device
            .properties
            .limits
            .max_sampler_anisotropy;

        let sampler_info = vk::SamplerCreateInfo::builder()
            .mag_filter(vk::Filter::LINEAR)
            .min_filter(vk::Filter::LINEAR)
            .address_mode_u(vk::SamplerAddressMode::REPEAT)
            .address_mode_v(vk::SamplerAddressMode::REPEAT)
            .address_mode_w(vk::SamplerAddressMode::REPEAT)
            // Anisotropy only pays off when there are mips to filter
            // between; the 1x1 fallback skips it.
            .anisotropy_enable(mip_levels > 1)
            .max_anisotropy(max_anisotropy)
            .border_color(vk::BorderColor::INT_OPAQUE_BLACK)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
            .min_lod(0.0)
            .max_lod(mip_levels as f32);

        unsafe {
            context
                .device
                .device
                .create_sampler(&sampler_info, None)
                .map_err(VulkanError::Api)
        }
    }

    /// Image view for descriptor writes.
    pub fn view(&self) -> vk::ImageView {
        self.image.view()
    }

    /// Sampler for descriptor writes.
    pub fn sampler(&self) -> vk::Sampler {
        self.sampler
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_sampler(self.sampler, None);
        }
        // image drops after the sampler.
    }
}

#[cfg(test)]
mod tests {
    use super::mip_level_count;

    #[test]
    fn mip_chain_counts() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(1024, 1024), 11);
        assert_eq!(mip_level_count(1024, 512), 11);
        assert_eq!(mip_level_count(1000, 600), 10);
    }
}
