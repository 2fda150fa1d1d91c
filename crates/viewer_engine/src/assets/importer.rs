//! OBJ/MTL scene import.
//!
//! Produces CPU-side mesh and material data ready for GPU upload. Geometry
//! is normalized into a unit cube around the origin so the default camera
//! frames any model, normals are generated when the file has none, and
//! tangent frames are accumulated per triangle wherever UVs exist.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::foundation::math::Vec3;
use crate::scene::Vertex;

/// Asset import errors.
#[derive(Error, Debug)]
pub enum AssetError {
    /// File could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// OBJ or MTL file failed to parse
    #[error("OBJ load error: {0}")]
    Obj(#[from] tobj::LoadError),

    /// Texture image failed to decode
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),

    /// Geometry that cannot be uploaded
    #[error("invalid mesh data: {0}")]
    InvalidData(String),
}

/// One drawable mesh: interleaved vertices, triangle indices, and the
/// material it uses.
pub struct MeshData {
    /// Interleaved vertex data
    pub vertices: Vec<Vertex>,
    /// Triangle list indices
    pub indices: Vec<u32>,
    /// Index into [`SceneData::materials`]
    pub material_index: u32,
}

/// Material description with texture paths resolved against the OBJ's
/// directory. `None` means the map is absent or the file does not exist.
#[derive(Default)]
pub struct MaterialData {
    /// Diffuse (albedo) texture path
    pub diffuse_texture: Option<PathBuf>,
    /// Specular map path
    pub specular_texture: Option<PathBuf>,
    /// Normal map path
    pub normal_texture: Option<PathBuf>,
}

/// Everything imported from one OBJ file.
pub struct SceneData {
    /// All meshes in the file
    pub meshes: Vec<MeshData>,
    /// Materials referenced by the meshes. Never empty; a default entry is
    /// appended when the file defines no materials.
    pub materials: Vec<MaterialData>,
}

/// Import an OBJ file and its MTL materials.
pub fn load_obj(path: &Path) -> Result<SceneData, AssetError> {
    log::info!("Loading model: {}", path.display());

    let (models, materials) = tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS)?;
    let materials = materials?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut material_data: Vec<MaterialData> = materials
        .iter()
        .map(|m| MaterialData {
            diffuse_texture: resolve_texture(base_dir, m.diffuse_texture.as_deref()),
            specular_texture: resolve_texture(base_dir, m.specular_texture.as_deref()),
            normal_texture: resolve_texture(base_dir, m.normal_texture.as_deref()),
        })
        .collect();

    // Meshes without a material fall back to a shared untextured entry.
    let mut default_material = None;
    let mut meshes = Vec::with_capacity(models.len());

    for model in &models {
        let mesh = &model.mesh;
        if mesh.positions.is_empty() {
            continue;
        }
        if mesh.indices.len() % 3 != 0 {
            return Err(AssetError::InvalidData(format!(
                "mesh '{}' has {} indices, not a triangle list",
                model.name,
                mesh.indices.len()
            )));
        }

        let material_index = match mesh.material_id {
            Some(id) => id as u32,
            None => *default_material.get_or_insert_with(|| {
                material_data.push(MaterialData::default());
                (material_data.len() - 1) as u32
            }),
        };

        let vertex_count = mesh.positions.len() / 3;
        let has_uvs = mesh.texcoords.len() == vertex_count * 2;
        let has_normals = mesh.normals.len() == vertex_count * 3;

        let mut vertices: Vec<Vertex> = (0..vertex_count)
            .map(|i| Vertex {
                position: [
                    mesh.positions[i * 3],
                    mesh.positions[i * 3 + 1],
                    mesh.positions[i * 3 + 2],
                ],
                tex_coord: if has_uvs {
                    // OBJ uses a bottom-left UV origin, Vulkan samples from
                    // the top left.
                    [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
                } else {
                    [0.0, 0.0]
                },
                normal: if has_normals {
                    [
                        mesh.normals[i * 3],
                        mesh.normals[i * 3 + 1],
                        mesh.normals[i * 3 + 2],
                    ]
                } else {
                    [0.0, 0.0, 0.0]
                },
                tangent: [0.0, 0.0, 0.0],
                bitangent: [0.0, 0.0, 0.0],
            })
            .collect();

        if !has_normals {
            generate_normals(&mut vertices, &mesh.indices);
        }
        if has_uvs {
            generate_tangents(&mut vertices, &mesh.indices);
        }

        meshes.push(MeshData {
            vertices,
            indices: mesh.indices.clone(),
            material_index,
        });
    }

    if meshes.is_empty() {
        return Err(AssetError::InvalidData(
            "file contains no drawable geometry".to_string(),
        ));
    }
    if material_data.is_empty() {
        material_data.push(MaterialData::default());
    }

    normalize_to_unit_cube(&mut meshes);

    log::info!(
        "Imported {} meshes, {} materials",
        meshes.len(),
        material_data.len()
    );

    Ok(SceneData {
        meshes,
        materials: material_data,
    })
}

fn resolve_texture(base_dir: &Path, name: Option<&str>) -> Option<PathBuf> {
    let name = name?;
    if name.is_empty() {
        return None;
    }
    // MTL files frequently use backslashes regardless of platform.
    let name = name.replace('\\', "/");
    let path = base_dir.join(name);
    if path.exists() {
        Some(path)
    } else {
        log::warn!("Texture not found on disk: {}", path.display());
        None
    }
}

/// Area-weighted smooth normals from triangle cross products.
fn generate_normals(vertices: &mut [Vertex], indices: &[u32]) {
    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let p0 = Vec3::from(vertices[i0].position);
        let p1 = Vec3::from(vertices[i1].position);
        let p2 = Vec3::from(vertices[i2].position);

        let face_normal = (p1 - p0).cross(&(p2 - p0));
        for &i in &[i0, i1, i2] {
            let n = Vec3::from(vertices[i].normal) + face_normal;
            vertices[i].normal = n.into();
        }
    }

    for vertex in vertices.iter_mut() {
        let n = Vec3::from(vertex.normal);
        if n.norm() > 1e-8 {
            vertex.normal = n.normalize().into();
        } else {
            vertex.normal = [0.0, 1.0, 0.0];
        }
    }
}

/// Per-triangle tangent and bitangent accumulation from UV derivatives.
fn generate_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let p0 = Vec3::from(vertices[i0].position);
        let p1 = Vec3::from(vertices[i1].position);
        let p2 = Vec3::from(vertices[i2].position);

        let uv0 = vertices[i0].tex_coord;
        let uv1 = vertices[i1].tex_coord;
        let uv2 = vertices[i2].tex_coord;

        let edge1 = p1 - p0;
        let edge2 = p2 - p0;
        let duv1 = [uv1[0] - uv0[0], uv1[1] - uv0[1]];
        let duv2 = [uv2[0] - uv0[0], uv2[1] - uv0[1]];

        let det = duv1[0] * duv2[1] - duv2[0] * duv1[1];
        if det.abs() < 1e-8 {
            continue;
        }
        let r = 1.0 / det;

        let tangent = (edge1 * duv2[1] - edge2 * duv1[1]) * r;
        let bitangent = (edge2 * duv1[0] - edge1 * duv2[0]) * r;

        for &i in &[i0, i1, i2] {
            let t = Vec3::from(vertices[i].tangent) + tangent;
            let b = Vec3::from(vertices[i].bitangent) + bitangent;
            vertices[i].tangent = t.into();
            vertices[i].bitangent = b.into();
        }
    }

    for vertex in vertices.iter_mut() {
        let t = Vec3::from(vertex.tangent);
        if t.norm() > 1e-8 {
            vertex.tangent = t.normalize().into();
        }
        let b = Vec3::from(vertex.bitangent);
        if b.norm() > 1e-8 {
            vertex.bitangent = b.normalize().into();
        }
    }
}

/// Center the whole scene at the origin and scale it so the largest extent
/// spans [-1, 1].
fn normalize_to_unit_cube(meshes: &mut [MeshData]) {
    let mut min = Vec3::from_element(f32::MAX);
    let mut max = Vec3::from_element(f32::MIN);

    for mesh in meshes.iter() {
        for vertex in &mesh.vertices {
            let p = Vec3::from(vertex.position);
            min = min.inf(&p);
            max = max.sup(&p);
        }
    }

    let center = (min + max) * 0.5;
    let extent = (max - min).max();
    if extent < 1e-8 {
        return;
    }
    let scale = 2.0 / extent;

    for mesh in meshes.iter_mut() {
        for vertex in &mut mesh.vertices {
            let p = (Vec3::from(vertex.position) - center) * scale;
            vertex.position = p.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_normals_are_unit_length() {
        let mut vertices = vec![
            Vertex::at([0.0, 0.0, 0.0]),
            Vertex::at([1.0, 0.0, 0.0]),
            Vertex::at([0.0, 1.0, 0.0]),
        ];
        generate_normals(&mut vertices, &[0, 1, 2]);

        for v in &vertices {
            let n = Vec3::from(v.normal);
            assert!((n.norm() - 1.0).abs() < 1e-5);
            // CCW triangle in the XY plane faces +Z.
            assert!(n.z > 0.99);
        }
    }

    #[test]
    fn degenerate_uv_triangles_are_skipped() {
        let mut vertices = vec![
            Vertex::at([0.0, 0.0, 0.0]),
            Vertex::at([1.0, 0.0, 0.0]),
            Vertex::at([0.0, 1.0, 0.0]),
        ];
        // All UVs identical, determinant zero.
        generate_tangents(&mut vertices, &[0, 1, 2]);
        for v in &vertices {
            assert_eq!(v.tangent, [0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn normalization_fits_unit_cube() {
        let mut meshes = vec![MeshData {
            vertices: vec![
                Vertex::at([10.0, 0.0, 0.0]),
                Vertex::at([30.0, 4.0, -2.0]),
            ],
            indices: vec![],
            material_index: 0,
        }];
        normalize_to_unit_cube(&mut meshes);

        let a = Vec3::from(meshes[0].vertices[0].position);
        let b = Vec3::from(meshes[0].vertices[1].position);
        assert!((a.x - -1.0).abs() < 1e-5);
        assert!((b.x - 1.0).abs() < 1e-5);
        // Center moved to the origin.
        assert!(((a + b) * 0.5).norm() < 1e-5);
    }
}
