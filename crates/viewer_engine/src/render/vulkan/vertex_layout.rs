//! Vertex input layout for the model pipeline.

use ash::vk;
use std::mem;

use crate::scene::Vertex;

/// Binding description for interleaved vertex data.
pub fn binding_description() -> vk::VertexInputBindingDescription {
    vk::VertexInputBindingDescription::builder()
        .binding(0)
        .stride(mem::size_of::<Vertex>() as u32)
        .input_rate(vk::VertexInputRate::VERTEX)
        .build()
}

/// Attribute descriptions matching the vertex shader inputs.
pub fn attribute_descriptions() -> [vk::VertexInputAttributeDescription; 5] {
    [
        vk::VertexInputAttributeDescription {
            location: 0,
            binding: 0,
            format: vk::Format::R32G32B32_SFLOAT,
            offset: 0,
        },
        vk::VertexInputAttributeDescription {
            location: 1,
            binding: 0,
            format: vk::Format::R32G32_SFLOAT,
            offset: 12,
        },
        vk::VertexInputAttributeDescription {
            location: 2,
            binding: 0,
            format: vk::Format::R32G32B32_SFLOAT,
            offset: 20,
        },
        vk::VertexInputAttributeDescription {
            location: 3,
            binding: 0,
            format: vk::Format::R32G32B32_SFLOAT,
            offset: 32,
        },
        vk::VertexInputAttributeDescription {
            location: 4,
            binding: 0,
            format: vk::Format::R32G32B32_SFLOAT,
            offset: 44,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn attribute_offsets_match_vertex_fields() {
        let attrs = attribute_descriptions();
        assert_eq!(attrs[0].offset as usize, offset_of!(Vertex, position));
        assert_eq!(attrs[1].offset as usize, offset_of!(Vertex, tex_coord));
        assert_eq!(attrs[2].offset as usize, offset_of!(Vertex, normal));
        assert_eq!(attrs[3].offset as usize, offset_of!(Vertex, tangent));
        assert_eq!(attrs[4].offset as usize, offset_of!(Vertex, bitangent));
    }

    #[test]
    fn stride_covers_all_attributes() {
        assert_eq!(binding_description().stride, 56);
        assert_eq!(mem::size_of::<Vertex>(), 56);
    }
}
