//! Camera and mouse-driven orbit control.

use crate::foundation::math::{self, Mat4, Vec3};

/// Perspective camera with a cached view-projection matrix.
///
/// The matrix is recomputed on every mutation, so reading it is free and
/// two cameras with the same parameters produce bit-identical results.
pub struct Camera {
    position: Vec3,
    angle_x: f32,
    angle_z: f32,
    fovy: f32,
    aspect: f32,
    near: f32,
    far: f32,
    view_projection: Mat4,
}

impl Camera {
    /// Create a camera at `position` looking down -Z.
    pub fn new(position: Vec3, fovy_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position,
            angle_x: 0.0,
            angle_z: 0.0,
            fovy: fovy_degrees.to_radians(),
            aspect,
            near,
            far,
            view_projection: Mat4::identity(),
        };
        camera.recompute();
        camera
    }

    /// Camera for the viewer's default framing: 5 units back from the
    /// origin, 45 degree vertical field of view.
    pub fn default_for_aspect(aspect: f32) -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), 45.0, aspect, 0.1, 100.0)
    }

    /// Update the aspect ratio after a window resize.
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        self.recompute();
    }

    /// Move the camera.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.recompute();
    }

    /// Combined projection * view matrix.
    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection
    }

    fn recompute(&mut self) {
        let world = math::translation(self.position)
            * math::rotate_x(self.angle_x)
            * math::rotate_z(self.angle_z);
        let view = world.try_inverse().unwrap_or_else(Mat4::identity);
        let projection = math::perspective_vk(self.fovy, self.aspect, self.near, self.far);
        self.view_projection = projection * view;
    }
}

/// Turns raw mouse input into a model rotation and scale.
///
/// Dragging with the left button orbits the model (yaw unbounded, pitch
/// clamped to straight up/down); the scroll wheel scales it
/// proportionally so zoom speed feels constant at any size.
pub struct OrbitController {
    sensitivity: f32,
    yaw_degrees: f32,
    pitch_degrees: f32,
    scale: f32,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

/// Pitch is clamped so the model never flips over the top.
const PITCH_LIMIT_DEGREES: f32 = 90.0;
const MIN_SCALE: f32 = 0.1;
const MAX_SCALE: f32 = 10.0;

impl OrbitController {
    /// Create a controller with the given drag sensitivity in degrees per
    /// pixel of cursor movement.
    pub fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity,
            yaw_degrees: 0.0,
            pitch_degrees: 0.0,
            scale: 1.0,
            dragging: false,
            last_cursor: None,
        }
    }

    /// Start or stop dragging. Releasing forgets the cursor anchor so the
    /// next drag does not jump.
    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
        if !dragging {
            self.last_cursor = None;
        }
    }

    /// Feed a cursor position. Returns true when the rotation changed.
    pub fn on_cursor_move(&mut self, x: f64, y: f64) -> bool {
        if !self.dragging {
            return false;
        }

        let Some((last_x, last_y)) = self.last_cursor.replace((x, y)) else {
            // First sample of a drag only anchors the cursor.
            return false;
        };

        let dx = (x - last_x) as f32;
        let dy = (y - last_y) as f32;
        if dx == 0.0 && dy == 0.0 {
            return false;
        }

        self.yaw_degrees += dx * self.sensitivity;
        self.pitch_degrees = (self.pitch_degrees + dy * self.sensitivity)
            .clamp(-PITCH_LIMIT_DEGREES, PITCH_LIMIT_DEGREES);
        true
    }

    /// Feed a scroll delta. Returns true when the scale changed.
    pub fn on_scroll(&mut self, delta_y: f64) -> bool {
        if delta_y == 0.0 {
            return false;
        }

        let new_scale =
            (self.scale + delta_y as f32 * self.scale / 10.0).clamp(MIN_SCALE, MAX_SCALE);
        if new_scale == self.scale {
            return false;
        }
        self.scale = new_scale;
        true
    }

    /// Model matrix for the current orbit state.
    pub fn model_matrix(&self) -> Mat4 {
        math::rotate_x(self.pitch_degrees.to_radians())
            * math::rotate_y(self.yaw_degrees.to_radians())
            * math::scaling(self.scale)
    }

    /// Current uniform scale factor.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Current yaw in degrees.
    pub fn yaw_degrees(&self) -> f32 {
        self.yaw_degrees
    }

    /// Current pitch in degrees.
    pub fn pitch_degrees(&self) -> f32 {
        self.pitch_degrees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dragged(controller: &mut OrbitController, from: (f64, f64), to: (f64, f64)) -> bool {
        controller.set_dragging(true);
        controller.on_cursor_move(from.0, from.1);
        controller.on_cursor_move(to.0, to.1)
    }

    #[test]
    fn pitch_clamps_at_vertical() {
        let mut orbit = OrbitController::new(0.15);
        dragged(&mut orbit, (0.0, 0.0), (0.0, 10_000.0));
        assert_relative_eq!(orbit.pitch_degrees(), 90.0);

        orbit.on_cursor_move(0.0, -50_000.0);
        assert_relative_eq!(orbit.pitch_degrees(), -90.0);
    }

    #[test]
    fn yaw_is_unbounded() {
        let mut orbit = OrbitController::new(0.15);
        dragged(&mut orbit, (0.0, 0.0), (10_000.0, 0.0));
        assert!(orbit.yaw_degrees() > 360.0);
    }

    #[test]
    fn cursor_motion_without_drag_is_ignored() {
        let mut orbit = OrbitController::new(0.15);
        assert!(!orbit.on_cursor_move(100.0, 100.0));
        assert_relative_eq!(orbit.yaw_degrees(), 0.0);
    }

    #[test]
    fn drag_release_resets_anchor() {
        let mut orbit = OrbitController::new(0.15);
        dragged(&mut orbit, (0.0, 0.0), (10.0, 0.0));
        let yaw = orbit.yaw_degrees();

        orbit.set_dragging(false);
        orbit.set_dragging(true);
        // Large jump while not dragging must not rotate on re-anchor.
        assert!(!orbit.on_cursor_move(500.0, 500.0));
        assert_relative_eq!(orbit.yaw_degrees(), yaw);
    }

    #[test]
    fn zero_scroll_is_a_no_op() {
        let mut orbit = OrbitController::new(0.15);
        assert!(!orbit.on_scroll(0.0));
        assert_relative_eq!(orbit.scale(), 1.0);
    }

    #[test]
    fn scale_clamps_to_range() {
        let mut orbit = OrbitController::new(0.15);
        for _ in 0..200 {
            orbit.on_scroll(1.0);
        }
        assert_relative_eq!(orbit.scale(), 10.0);
        // Fully clamped, further scroll reports no change.
        assert!(!orbit.on_scroll(1.0));

        for _ in 0..400 {
            orbit.on_scroll(-1.0);
        }
        assert_relative_eq!(orbit.scale(), 0.1);
        assert!(!orbit.on_scroll(-1.0));
    }

    #[test]
    fn scroll_step_is_proportional_to_scale() {
        let mut orbit = OrbitController::new(0.15);
        orbit.on_scroll(1.0);
        assert_relative_eq!(orbit.scale(), 1.1);
        orbit.on_scroll(1.0);
        assert_relative_eq!(orbit.scale(), 1.1 + 1.1 / 10.0);
    }

    #[test]
    fn same_state_gives_identical_matrices() {
        let a = Camera::default_for_aspect(16.0 / 9.0);
        let b = Camera::default_for_aspect(16.0 / 9.0);
        assert_eq!(
            a.view_projection().as_slice(),
            b.view_projection().as_slice()
        );
    }

    #[test]
    fn resize_changes_projection() {
        let mut camera = Camera::default_for_aspect(1.0);
        let before = *camera.view_projection();
        camera.set_aspect(1920, 1080);
        assert_ne!(before.as_slice(), camera.view_projection().as_slice());

        // Zero-height resize is ignored rather than producing NaNs.
        let kept = *camera.view_projection();
        camera.set_aspect(1920, 0);
        assert_eq!(kept.as_slice(), camera.view_projection().as_slice());
    }
}
