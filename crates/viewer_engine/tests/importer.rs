//! End-to-end import tests against real OBJ/MTL files on disk.

use std::fs;
use std::path::PathBuf;

use viewer_engine::assets;

fn write_fixture(dir_name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = std::env::temp_dir().join(dir_name);
    fs::create_dir_all(&dir).unwrap();
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
    dir
}

const QUAD_OBJ: &str = "\
mtllib quad.mtl
o quad
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
usemtl gray
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

const QUAD_MTL: &str = "\
newmtl gray
Kd 0.5 0.5 0.5
";

#[test]
fn quad_imports_as_one_mesh() {
    let dir = write_fixture(
        "viewer_engine_quad_test",
        &[("quad.obj", QUAD_OBJ), ("quad.mtl", QUAD_MTL)],
    );

    let scene = assets::load_obj(&dir.join("quad.obj")).unwrap();

    assert_eq!(scene.meshes.len(), 1);
    assert_eq!(scene.materials.len(), 1);

    let mesh = &scene.meshes[0];
    assert_eq!(mesh.vertices.len(), 4);
    assert_eq!(mesh.indices.len(), 6);
    assert_eq!(mesh.indices.len() % 3, 0);
    assert_eq!(mesh.material_index, 0);

    // No texture file on disk, so the material has no maps.
    assert!(scene.materials[0].diffuse_texture.is_none());
}

#[test]
fn uv_origin_is_flipped_to_top_left() {
    let dir = write_fixture(
        "viewer_engine_uv_test",
        &[("quad.obj", QUAD_OBJ), ("quad.mtl", QUAD_MTL)],
    );

    let scene = assets::load_obj(&dir.join("quad.obj")).unwrap();
    let mesh = &scene.meshes[0];

    // OBJ vt 0,0 (bottom left) becomes 0,1 in Vulkan's top-left space.
    let bottom_left = mesh
        .vertices
        .iter()
        .find(|v| v.position[0] < 0.0 && v.position[1] < 0.0)
        .expect("bottom-left vertex not found");
    assert_eq!(bottom_left.tex_coord, [0.0, 1.0]);
}

#[test]
fn two_objects_share_one_material() {
    let obj = "\
mtllib quad.mtl
o left
v -2.0 0.0 0.0
v -1.0 0.0 0.0
v -1.0 1.0 0.0
usemtl gray
f 1 2 3
o right
v 1.0 0.0 0.0
v 2.0 0.0 0.0
v 2.0 1.0 0.0
usemtl gray
f 4 5 6
";
    let dir = write_fixture(
        "viewer_engine_shared_material_test",
        &[("quad.obj", obj), ("quad.mtl", QUAD_MTL)],
    );

    let scene = assets::load_obj(&dir.join("quad.obj")).unwrap();

    assert_eq!(scene.meshes.len(), 2);
    assert_eq!(scene.materials.len(), 1);
    assert_eq!(scene.meshes[0].material_index, 0);
    assert_eq!(scene.meshes[1].material_index, 0);
}

#[test]
fn missing_normals_are_generated() {
    let obj = "\
o tri
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";
    let dir = write_fixture("viewer_engine_normals_test", &[("tri.obj", obj)]);

    let scene = assets::load_obj(&dir.join("tri.obj")).unwrap();
    let mesh = &scene.meshes[0];

    for v in &mesh.vertices {
        let n = v.normal;
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        assert!((len - 1.0).abs() < 1e-5, "normal not unit length: {n:?}");
        // CCW triangle in the XY plane faces +Z.
        assert!(n[2] > 0.99);
    }
    // A file with no MTL still produces a usable material entry.
    assert_eq!(scene.materials.len(), 1);
    assert_eq!(mesh.material_index, 0);
}

#[test]
fn geometry_is_normalized_into_unit_cube() {
    let obj = "\
o big
v -100.0 0.0 0.0
v 100.0 0.0 0.0
v 0.0 50.0 0.0
f 1 2 3
";
    let dir = write_fixture("viewer_engine_normalize_test", &[("big.obj", obj)]);

    let scene = assets::load_obj(&dir.join("big.obj")).unwrap();

    for mesh in &scene.meshes {
        for v in &mesh.vertices {
            for c in v.position {
                assert!(c.abs() <= 1.0 + 1e-5, "position outside unit cube: {c}");
            }
        }
    }
    // The largest extent spans exactly [-1, 1].
    let xs: Vec<f32> = scene.meshes[0].vertices.iter().map(|v| v.position[0]).collect();
    let min = xs.iter().cloned().fold(f32::MAX, f32::min);
    let max = xs.iter().cloned().fold(f32::MIN, f32::max);
    assert!((min + 1.0).abs() < 1e-5);
    assert!((max - 1.0).abs() < 1e-5);
}

#[test]
fn empty_file_is_rejected() {
    let dir = write_fixture("viewer_engine_empty_test", &[("empty.obj", "# nothing\n")]);

    let result = assets::load_obj(&dir.join("empty.obj"));
    assert!(result.is_err());
}
