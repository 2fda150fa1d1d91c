//! Descriptor set layouts, pool, and writes for the model pipeline.
//!
//! Set 0 holds the per-frame MVP uniform for the vertex stage. Set 1 holds
//! the material table and the texture array for the fragment stage.

use ash::{vk, Device};

use super::buffer::Buffer;
use super::context::{GpuContext, VulkanError, VulkanResult};
use super::image::Texture;

/// Fixed size of the shader's sampler array. Models with more distinct
/// textures than this are rejected at load time.
pub const MAX_BOUND_TEXTURES: usize = 64;

/// Descriptor layouts and the two sets the renderer binds every frame.
pub struct ViewerDescriptors {
    device: Device,
    pool: vk::DescriptorPool,
    frame_layout: vk::DescriptorSetLayout,
    material_layout: vk::DescriptorSetLayout,
    frame_set: vk::DescriptorSet,
    material_set: vk::DescriptorSet,
}

impl ViewerDescriptors {
    /// Create layouts, allocate both sets, and point them at the given
    /// buffers and textures. Unused sampler slots are padded with the first
    /// texture so every array element stays valid.
    pub fn new(
        context: &GpuContext,
        mvp_buffer: &Buffer,
        material_buffer: &Buffer,
        textures: &[Texture],
    ) -> VulkanResult<Self> {
        if textures.is_empty() {
            return Err(VulkanError::InvalidOperation {
                reason: "descriptor set requires at least one texture".to_string(),
            });
        }
        if textures.len() > MAX_BOUND_TEXTURES {
            return Err(VulkanError::InvalidOperation {
                reason: format!(
                    "model uses {} textures, limit is {MAX_BOUND_TEXTURES}",
                    textures.len()
                ),
            });
        }

        let device = context.raw_device();

        // Set 0: MVP uniform, vertex stage.
        let frame_bindings = [vk::DescriptorSetLayoutBinding::builder()
            .binding(0)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::VERTEX)
            .build()];
        let frame_layout_info =
            vk::DescriptorSetLayoutCreateInfo::builder().bindings(&frame_bindings);
        let frame_layout = unsafe {
            device
                .create_descriptor_set_layout(&frame_layout_info, None)
                .map_err(VulkanError::Api)?
        };

        // Set 1: material table plus sampler array, fragment stage.
        let material_bindings = [
            vk::DescriptorSetLayoutBinding::builder()
                .binding(0)
                .descriptor_type(vk::DescriptorType::STORAGE_BUFFER)
                .descriptor_count(1)
                .stage_flags(vk::ShaderStageFlags::FRAGMENT)
                .build(),
            vk::DescriptorSetLayoutBinding::builder()
                .binding(1)
                .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                .descriptor_count(MAX_BOUND_TEXTURES as u32)
                .stage_flags(vk::ShaderStageFlags::FRAGMENT)
                .build(),
        ];
        let material_layout_info =
            vk::DescriptorSetLayoutCreateInfo::builder().bindings(&material_bindings);
        let material_layout = unsafe {
            device
                .create_descriptor_set_layout(&material_layout_info, None)
                .map_err(VulkanError::Api)?
        };

        let pool_sizes = [
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::UNIFORM_BUFFER,
                descriptor_count: 1,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::STORAGE_BUFFER,
                descriptor_count: 1,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
                descriptor_count: MAX_BOUND_TEXTURES as u32,
            },
        ];
        let pool_info = vk::DescriptorPoolCreateInfo::builder()
            .pool_sizes(&pool_sizes)
            .max_sets(2);
        let pool = unsafe {
            device
                .create_descriptor_pool(&pool_info, None)
                .map_err(VulkanError::Api)?
        };

        let layouts = [frame_layout, material_layout];
        let alloc_info = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(pool)
            .set_layouts(&layouts);
        let sets = unsafe {
            device
                .allocate_descriptor_sets(&alloc_info)
                .map_err(VulkanError::Api)?
        };
        let (frame_set, material_set) = (sets[0], sets[1]);

        let mvp_info = [vk::DescriptorBufferInfo {
            buffer: mvp_buffer.handle(),
            offset: 0,
            range: mvp_buffer.size(),
        }];
        let material_info = [vk::DescriptorBufferInfo {
            buffer: material_buffer.handle(),
            offset: 0,
            range: material_buffer.size(),
        }];

        let image_infos: Vec<vk::DescriptorImageInfo> = (0..MAX_BOUND_TEXTURES)
            .map(|i| {
                let texture = textures.get(i).unwrap_or(&textures[0]);
                vk::DescriptorImageInfo {
                    sampler: texture.sampler(),
                    image_view: texture.view(),
                    image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                }
            })
            .collect();

        let writes = [
            vk::WriteDescriptorSet::builder()
                .dst_set(frame_set)
                .dst_binding(0)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                .buffer_info(&mvp_info)
                .build(),
            vk::WriteDescriptorSet::builder()
                .dst_set(material_set)
                .dst_binding(0)
                .descriptor_type(vk::DescriptorType::STORAGE_BUFFER)
                .buffer_info(&material_info)
                .build(),
            vk::WriteDescriptorSet::builder()
                .dst_set(material_set)
                .dst_binding(1)
                .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                .image_info(&image_infos)
                .build(),
        ];

        unsafe {
            device.update_descriptor_sets(&writes, &[]);
        }

        Ok(Self {
            device,
            pool,
            frame_layout,
            material_layout,
            frame_set,
            material_set,
        })
    }

    /// Layouts in set-number order, for pipeline layout creation.
    pub fn set_layouts(&self) -> [vk::DescriptorSetLayout; 2] {
        [self.frame_layout, self.material_layout]
    }

    /// Sets in set-number order, bound once per frame.
    pub fn sets(&self) -> [vk::DescriptorSet; 2] {
        [self.frame_set, self.material_set]
    }
}

impl Drop for ViewerDescriptors {
    fn drop(&mut self) {
        unsafe {
            // Destroying the pool frees both sets.
            self.device.destroy_descriptor_pool(self.pool, None);
            self.device
                .destroy_descriptor_set_layout(self.material_layout, None);
            self.device
                .destroy_descriptor_set_layout(self.frame_layout, None);
        }
    }
}
