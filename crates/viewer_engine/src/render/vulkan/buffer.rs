//! Buffer allocation and upload helpers.
//!
//! Mesh data goes into device-local buffers via a staging copy; small
//! frequently-updated data (the MVP uniform) stays host-visible.

use ash::{vk, Device};
use bytemuck::Pod;
use std::mem;

use super::commands::{CommandPool, SingleCommand};
use super::context::{GpuContext, VulkanError, VulkanResult};

/// Buffer with its backing memory, freed on drop.
pub struct Buffer {
    device: Device,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    size: vk::DeviceSize,
}

impl Buffer {
    /// Allocate a buffer with the requested usage and memory properties.
    pub fn new(
        context: &GpuContext,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        properties: vk::MemoryPropertyFlags,
    ) -> VulkanResult<Self> {
        let device = context.raw_device();

        let buffer_info = vk::BufferCreateInfo::builder()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe {
            device
                .create_buffer(&buffer_info, None)
                .map_err(VulkanError::Api)?
        };

        let mem_requirements = unsafe { device.get_buffer_memory_requirements(buffer) };

        let memory_type_index = find_memory_type(
            context,
            mem_requirements.memory_type_bits,
            properties,
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
                .bind_buffer_memory(buffer, memory, 0)
                .map_err(VulkanError::Api)?;
        }

        Ok(Self {
            device,
            buffer,
            memory,
            size,
        })
    }

    /// Allocate a host-visible buffer and fill it with `data`.
    pub fn new_with_data<T: Pod>(
        context: &GpuContext,
        data: &[T],
        usage: vk::BufferUsageFlags,
    ) -> VulkanResult<Self> {
        let size = mem::size_of_val(data) as vk::DeviceSize;
        let buffer = Self::new(
            context,
            size,
            usage,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )?;
        buffer.write_data(data)?;
        Ok(buffer)
    }

    /// Allocate a device-local buffer and upload `data` through a staging
    /// buffer. The copy is submitted and waited on before returning.
    pub fn device_local_with_staging<T: Pod>(
        context: &GpuContext,
        pool: &CommandPool,
        data: &[T],
        usage: vk::BufferUsageFlags,
    ) -> VulkanResult<Self> {
        let size = mem::size_of_val(data) as vk::DeviceSize;

        let staging = Self::new_with_data(context, data, vk::BufferUsageFlags::TRANSFER_SRC)?;

        let buffer = Self::new(
            context,
            size,
            usage | vk::BufferUsageFlags::TRANSFER_DST,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )?;

        let cmd = SingleCommand::begin(context, pool)?;
        let region = vk::BufferCopy::builder().size(size).build();
        unsafe {
            cmd.device()
                .cmd_copy_buffer(cmd.handle(), staging.handle(), buffer.handle(), &[region]);
        }
        cmd.finish(context)?;

        Ok(buffer)
    }

    /// Map, copy `data` into the buffer, unmap.
    pub fn write_data<T: Pod>(&self, data: &[T]) -> VulkanResult<()> {
        let size = mem::size_of_val(data);
        unsafe {
            let mapped = self
                .device
                .map_memory(self.memory, 0, self.size, vk::MemoryMapFlags::empty())
                .map_err(VulkanError::Api)?;
            std::ptr::copy_nonoverlapping(data.as_ptr() as *const u8, mapped as *mut u8, size);
            self.device.unmap_memory(self.memory);
        }
        Ok(())
    }

    /// Raw buffer handle.
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    /// Allocated size in bytes.
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_buffer(self.buffer, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

/// Find a memory type satisfying the requested property flags.
pub fn find_memory_type(
    context: &GpuContext,
    type_filter: u32,
    properties: vk::MemoryPropertyFlags,
) -> VulkanResult<u32> {
    let mem_properties = unsafe {
        context
            .instance
            .instance
            .get_physical_device_memory_properties(context.physical_device.device)
    };

    for i in 0..mem_properties.memory_type_count {
        if (type_filter & (1 << i)) != 0
            && (mem_properties.memory_types[i as usize].property_flags & properties) == properties
        {
            return Ok(i);
        }
    }

    Err(VulkanError::NoSuitableMemoryType)
}
