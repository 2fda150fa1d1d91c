//! GPU-resident model: uploaded meshes, materials, and textures.

use ash::vk;
use bytemuck::{Pod, Zeroable};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::assets::{self, AssetError, SceneData};
use crate::render::vulkan::{
    Buffer, CommandPool, GpuContext, Texture, VulkanError, MAX_BOUND_TEXTURES,
};

/// Model loading errors.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Importing the file from disk failed
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Uploading to the GPU failed
    #[error(transparent)]
    Vulkan(#[from] VulkanError),
}

/// Interleaved vertex as the vertex shader consumes it.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Texture coordinates, top-left origin
    pub tex_coord: [f32; 2],
    /// Unit normal
    pub normal: [f32; 3],
    /// Tangent, zero when the mesh has no UVs
    pub tangent: [f32; 3],
    /// Bitangent, zero when the mesh has no UVs
    pub bitangent: [f32; 3],
}

#[cfg(test)]
impl Vertex {
    /// Vertex with only a position, everything else zeroed.
    pub(crate) fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Self::zeroed()
        }
    }
}

/// Material entry as laid out in the shader storage buffer.
///
/// Indices select into the bound texture array; the `has_*` flags tell the
/// shader whether the index points at real data or the fallback slot.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct Material {
    /// Texture array index of the diffuse map
    pub diffuse_index: u32,
    /// Texture array index of the specular map
    pub specular_index: u32,
    /// Texture array index of the normal map
    pub normal_index: u32,
    /// Nonzero when a diffuse map is present
    pub has_diffuse: u32,
    /// Nonzero when a specular map is present
    pub has_specular: u32,
    /// Nonzero when a normal map is present
    pub has_normal: u32,
}

/// One uploaded mesh.
pub struct Mesh {
    /// Device-local vertex buffer
    pub vertex_buffer: Buffer,
    /// Device-local index buffer
    pub index_buffer: Buffer,
    /// Number of indices to draw
    pub index_count: u32,
    /// Index into the model's material table
    pub material_index: u32,
}

/// Deduplicates texture loads by canonical file path.
#[derive(Default)]
pub struct TextureCache {
    entries: HashMap<PathBuf, u32>,
}

impl TextureCache {
    /// Return the cached texture index for `path`, or run `insert` to load
    /// it and remember the result.
    pub fn get_or_insert_with<E>(
        &mut self,
        path: &Path,
        insert: impl FnOnce() -> Result<u32, E>,
    ) -> Result<u32, E> {
        // Canonicalize so "./tex.png" and "tex.png" share an entry.
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if let Some(&index) = self.entries.get(&key) {
            return Ok(index);
        }
        let index = insert()?;
        self.entries.insert(key, index);
        Ok(index)
    }

    /// Number of distinct textures loaded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A fully uploaded model ready to draw.
///
/// Texture slot 0 is always a 1x1 white fallback so material entries
/// without a map still index valid array elements.
pub struct Model {
    meshes: Vec<Mesh>,
    material_buffer: Buffer,
    textures: Vec<Texture>,
    material_count: usize,
}

impl Model {
    /// Import an OBJ file and upload everything to the GPU.
    pub fn load(context: &GpuContext, pool: &CommandPool, path: &Path) -> Result<Self, ModelError> {
        let scene = assets::load_obj(path)?;
        Self::from_scene(context, pool, &scene)
    }

    /// Upload already-imported scene data.
    pub fn from_scene(
        context: &GpuContext,
        pool: &CommandPool,
        scene: &SceneData,
    ) -> Result<Self, ModelError> {
        let mut textures = vec![Texture::solid_color(context, pool, [255, 255, 255, 255])?];
        let mut cache = TextureCache::default();

        let mut load_map = |path: &Option<PathBuf>| -> Result<(u32, u32), ModelError> {
            let Some(path) = path else {
                return Ok((0, 0));
            };
            let index = cache.get_or_insert_with(path, || -> Result<u32, ModelError> {
                let decoded = assets::load_rgba8(path)?;
                let texture = Texture::from_pixels(
                    context,
                    pool,
                    decoded.width,
                    decoded.height,
                    &decoded.pixels,
                )?;
                textures.push(texture);
                Ok((textures.len() - 1) as u32)
            })?;
            Ok((index, 1))
        };

        let materials: Vec<Material> = scene
            .materials
            .iter()
            .map(|m| -> Result<Material, ModelError> {
                let (diffuse_index, has_diffuse) = load_map(&m.diffuse_texture)?;
                let (specular_index, has_specular) = load_map(&m.specular_texture)?;
                let (normal_index, has_normal) = load_map(&m.normal_texture)?;
                Ok(Material {
                    diffuse_index,
                    specular_index,
                    normal_index,
                    has_diffuse,
                    has_specular,
                    has_normal,
                })
            })
            .collect::<Result<_, _>>()?;

        if textures.len() > MAX_BOUND_TEXTURES {
            return Err(ModelError::Vulkan(VulkanError::InvalidOperation {
                reason: format!(
                    "model uses {} textures, limit is {MAX_BOUND_TEXTURES}",
                    textures.len()
                ),
            }));
        }

        let material_buffer = Buffer::device_local_with_staging(
            context,
            pool,
            &materials,
            vk::BufferUsageFlags::STORAGE_BUFFER,
        )?;

        let meshes: Vec<Mesh> = scene
            .meshes
            .iter()
            .map(|mesh| -> Result<Mesh, ModelError> {
                let vertex_buffer = Buffer::device_local_with_staging(
                    context,
                    pool,
                    &mesh.vertices,
                    vk::BufferUsageFlags::VERTEX_BUFFER,
                )?;
                let index_buffer = Buffer::device_local_with_staging(
                    context,
                    pool,
                    &mesh.indices,
                    vk::BufferUsageFlags::INDEX_BUFFER,
                )?;
                Ok(Mesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                    material_index: mesh.material_index,
                })
            })
            .collect::<Result<_, _>>()?;

        log::info!(
            "Model uploaded: {} meshes, {} materials, {} textures",
            meshes.len(),
            materials.len(),
            textures.len()
        );

        Ok(Self {
            meshes,
            material_buffer,
            textures,
            material_count: materials.len(),
        })
    }

    /// Record one draw per mesh, pushing its material index first.
    ///
    /// Pipeline, descriptor sets, viewport, and scissor must already be
    /// bound on `cmd`.
    pub fn record_draws(
        &self,
        device: &ash::Device,
        cmd: vk::CommandBuffer,
        pipeline_layout: vk::PipelineLayout,
    ) {
        for mesh in &self.meshes {
            unsafe {
                device.cmd_bind_vertex_buffers(cmd, 0, &[mesh.vertex_buffer.handle()], &[0]);
                device.cmd_bind_index_buffer(
                    cmd,
                    mesh.index_buffer.handle(),
                    0,
                    vk::IndexType::UINT32,
                );
                device.cmd_push_constants(
                    cmd,
                    pipeline_layout,
                    vk::ShaderStageFlags::FRAGMENT,
                    0,
                    &mesh.material_index.to_ne_bytes(),
                );
                device.cmd_draw_indexed(cmd, mesh.index_count, 1, 0, 0, 0);
            }
        }
    }

    /// Storage buffer holding the material table.
    pub fn material_buffer(&self) -> &Buffer {
        &self.material_buffer
    }

    /// All uploaded textures, fallback first.
    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    /// Number of meshes.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Number of material entries.
    pub fn material_count(&self) -> usize {
        self.material_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_runs_loader_once_per_path() {
        let dir = std::env::temp_dir().join("viewer_engine_cache_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dup.png");
        std::fs::write(&path, b"not a real png").unwrap();

        let mut cache = TextureCache::default();
        let mut calls = 0;

        for _ in 0..3 {
            let index = cache
                .get_or_insert_with(&path, || -> Result<u32, std::convert::Infallible> {
                    calls += 1;
                    Ok(7)
                })
                .unwrap();
            assert_eq!(index, 7);
        }

        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn cache_failure_is_not_cached() {
        let mut cache = TextureCache::default();
        let path = Path::new("missing.png");

        let err = cache.get_or_insert_with(path, || Err::<u32, &str>("boom"));
        assert!(err.is_err());
        assert!(cache.is_empty());

        let ok = cache.get_or_insert_with(path, || Ok::<u32, &str>(3)).unwrap();
        assert_eq!(ok, 3);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn material_layout_matches_shader_stride() {
        assert_eq!(std::mem::size_of::<Material>(), 24);
    }
}
