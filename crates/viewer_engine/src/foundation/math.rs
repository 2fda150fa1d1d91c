//! Math types and helpers built on nalgebra.
//!
//! All matrices are column-major `Mat4`, matching what the shaders expect.
//! Projection matrices target Vulkan clip space (depth 0..1, Y down).

pub use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

/// 2-component f32 vector.
pub type Vec2 = Vector2<f32>;
/// 3-component f32 vector.
pub type Vec3 = Vector3<f32>;
/// 4-component f32 vector.
pub type Vec4 = Vector4<f32>;
/// 4x4 f32 matrix, column-major.
pub type Mat4 = Matrix4<f32>;

/// Perspective projection for Vulkan clip space.
///
/// Maps depth to [0, 1] and flips Y so that +Y is up in world space while
/// Vulkan's framebuffer Y points down. `fovy_radians` is the full vertical
/// field of view.
pub fn perspective_vk(fovy_radians: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fovy_radians / 2.0).tan();
    let mut m = Mat4::zeros();
    m[(0, 0)] = f / aspect;
    m[(1, 1)] = -f;
    m[(2, 2)] = far / (near - far);
    m[(2, 3)] = (near * far) / (near - far);
    m[(3, 2)] = -1.0;
    m
}

/// Rotation about the X axis.
pub fn rotate_x(radians: f32) -> Mat4 {
    Mat4::from_axis_angle(&Vec3::x_axis(), radians)
}

/// Rotation about the Y axis.
pub fn rotate_y(radians: f32) -> Mat4 {
    Mat4::from_axis_angle(&Vec3::y_axis(), radians)
}

/// Rotation about the Z axis.
pub fn rotate_z(radians: f32) -> Mat4 {
    Mat4::from_axis_angle(&Vec3::z_axis(), radians)
}

/// Uniform scaling matrix.
pub fn scaling(factor: f32) -> Mat4 {
    Mat4::new_scaling(factor)
}

/// Translation matrix.
pub fn translation(offset: Vec3) -> Mat4 {
    Mat4::new_translation(&offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perspective_maps_near_plane_to_zero_depth() {
        let proj = perspective_vk(45f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
        let p = proj * Vec4::new(0.0, 0.0, -0.1, 1.0);
        assert_relative_eq!(p.z / p.w, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn perspective_maps_far_plane_to_unit_depth() {
        let proj = perspective_vk(45f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
        let p = proj * Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert_relative_eq!(p.z / p.w, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn perspective_flips_y() {
        let proj = perspective_vk(45f32.to_radians(), 1.0, 0.1, 100.0);
        let p = proj * Vec4::new(0.0, 1.0, -1.0, 1.0);
        assert!(p.y / p.w < 0.0);
    }

    #[test]
    fn rotations_preserve_axis() {
        let m = rotate_y(90f32.to_radians());
        let v = m.transform_vector(&Vec3::y());
        assert_relative_eq!(v, Vec3::y(), epsilon = 1e-6);
    }
}
