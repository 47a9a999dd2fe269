//! Cameras consumed and produced by the reflector.
//!
//! All projections use the OpenGL clip-space convention (right-handed view
//! space looking down -Z, clip depth in [-1, 1]). Backends with a different
//! depth range remap at draw time.

use glam::{Mat3, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A viewport rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Creates a viewport anchored at the origin.
    #[must_use]
    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }
}

/// Returns the rotation that orients a camera at `eye` to look at `target`.
///
/// The camera looks down its local -Z axis with local +Y as close to `up` as
/// possible. When `up` is parallel to the view direction the view direction is
/// nudged slightly so the basis stays well defined.
#[must_use]
pub fn look_rotation(eye: Vec3, target: Vec3, up: Vec3) -> Quat {
    let back = (eye - target).try_normalize().unwrap_or(Vec3::Z);

    let mut right = up.cross(back);
    if right.length_squared() < 1e-12 {
        let nudged = if (up.z.abs() - 1.0).abs() < f32::EPSILON {
            back + Vec3::new(1e-4, 0.0, 0.0)
        } else {
            back + Vec3::new(0.0, 0.0, 1e-4)
        };
        right = up.cross(nudged.normalize());
    }
    let right = right.try_normalize().unwrap_or(Vec3::X);
    let true_up = back.cross(right);

    Quat::from_mat3(&Mat3::from_cols(right, true_up, back)).normalize()
}

/// A perspective camera.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Camera orientation in world space.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Optional per-frame viewport override.
    pub viewport: Option<Viewport>,
}

impl Camera {
    /// Creates a new camera with default settings.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            rotation: Quat::IDENTITY,
            fov: std::f32::consts::FRAC_PI_4, // 45 degrees
            aspect_ratio,
            near: 0.1,
            far: 1000.0,
            viewport: None,
        }
    }

    /// Sets the position and returns the camera.
    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the field of view from degrees and returns the camera.
    #[must_use]
    pub fn with_fov_degrees(mut self, degrees: f32) -> Self {
        self.set_fov_degrees(degrees);
        self
    }

    /// Turns the camera to look at `target`, keeping +Y up.
    pub fn look_at(&mut self, target: Vec3) {
        self.look_at_with_up(target, Vec3::Y);
    }

    /// Turns the camera to look at `target` with the given up vector.
    pub fn look_at_with_up(&mut self, target: Vec3, up: Vec3) {
        self.rotation = look_rotation(self.position, target, up);
    }

    /// Returns the local-to-world matrix.
    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Returns the world-to-view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Returns the camera's forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Returns the camera's up direction.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Sets the vertical field of view from degrees, clamped to a usable range.
    pub fn set_fov_degrees(&mut self, degrees: f32) {
        self.fov = degrees
            .to_radians()
            .clamp(0.1, std::f32::consts::PI - 0.1);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

/// Snapshot of the camera a reflector is viewed from this frame.
///
/// This is either the application's camera or, for nested reflections, the
/// virtual camera of an enclosing reflector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerCamera {
    /// Local-to-world matrix (rotation and translation).
    pub world_matrix: Mat4,
    /// Projection matrix.
    pub projection_matrix: Mat4,
    /// Far clipping distance.
    pub far: f32,
    /// Viewport to restore after rendering the reflection.
    pub viewport: Option<Viewport>,
}

impl ViewerCamera {
    /// World-space position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.world_matrix.w_axis.truncate()
    }

    /// World-space rotation with any scale removed.
    #[must_use]
    pub fn rotation(&self) -> Quat {
        let (_, rotation, _) = self.world_matrix.to_scale_rotation_translation();
        rotation
    }
}

impl From<&Camera> for ViewerCamera {
    fn from(camera: &Camera) -> Self {
        Self {
            world_matrix: camera.world_matrix(),
            projection_matrix: camera.projection_matrix(),
            far: camera.far,
            viewport: camera.viewport,
        }
    }
}

/// The mirrored camera a reflection is rendered from.
///
/// Recomputed from scratch every frame; nothing here carries over between
/// frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualCamera {
    /// Mirrored position.
    pub position: Vec3,
    /// Mirrored up vector.
    pub up: Vec3,
    /// Mirrored look-at point.
    pub target: Vec3,
    /// Orientation derived from `position`, `target` and `up`.
    pub rotation: Quat,
    /// Far clipping distance, copied from the viewer.
    pub far: f32,
    /// Projection with the oblique near plane applied.
    pub projection_matrix: Mat4,
}

impl Default for VirtualCamera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            up: Vec3::Y,
            target: Vec3::NEG_Z,
            rotation: Quat::IDENTITY,
            far: 1000.0,
            projection_matrix: Mat4::IDENTITY,
        }
    }
}

impl VirtualCamera {
    /// Returns the local-to-world matrix.
    #[must_use]
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Returns the world-to-view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        self.world_matrix().inverse()
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix()
    }

    /// Snapshot for rendering nested reflectors from this camera.
    #[must_use]
    pub fn as_viewer(&self, viewport: Option<Viewport>) -> ViewerCamera {
        ViewerCamera {
            world_matrix: self.world_matrix(),
            projection_matrix: self.projection_matrix,
            far: self.far,
            viewport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_defaults() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(camera.rotation, Quat::IDENTITY);
        assert!(camera.viewport.is_none());
    }

    #[test]
    fn test_look_at_points_forward_at_target() {
        let mut camera = Camera::new(1.0).with_position(Vec3::new(2.0, 1.0, 4.0));
        let target = Vec3::new(-1.0, 0.0, 0.5);
        camera.look_at(target);

        let expected = (target - camera.position).normalize();
        assert!((camera.forward() - expected).length() < 1e-5);
        // Up stays on the +Y side.
        assert!(camera.up().y > 0.0);
    }

    #[test]
    fn test_look_at_matches_glam_view() {
        let mut camera = Camera::new(1.0).with_position(Vec3::new(0.0, 1.0, 3.0));
        camera.look_at(Vec3::ZERO);
        let glam_view = Mat4::look_at_rh(camera.position, Vec3::ZERO, Vec3::Y);
        assert!(camera.view_matrix().abs_diff_eq(glam_view, 1e-5));
    }

    #[test]
    fn test_look_rotation_parallel_up_is_finite() {
        let rotation = look_rotation(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::Y);
        assert!(rotation.is_finite());
        assert!((rotation * Vec3::NEG_Z - Vec3::NEG_Y).length() < 1e-3);
    }

    #[test]
    fn test_projection_is_gl_convention() {
        let camera = Camera::new(1.0);
        let proj = camera.projection_matrix();
        // A point on the near plane maps to clip depth -1.
        let near = proj.project_point3(Vec3::new(0.0, 0.0, -camera.near));
        assert!((near.z + 1.0).abs() < 1e-4);
        // The fourth row is (0, 0, -1, 0).
        assert_eq!(proj.row(3), glam::Vec4::new(0.0, 0.0, -1.0, 0.0));
    }

    #[test]
    fn test_viewer_snapshot() {
        let mut camera = Camera::new(1.5).with_position(Vec3::new(1.0, 2.0, 3.0));
        camera.look_at(Vec3::ZERO);
        let viewer = ViewerCamera::from(&camera);
        assert!((viewer.position() - camera.position).length() < 1e-6);
        assert!(viewer.rotation().abs_diff_eq(camera.rotation, 1e-5));
        assert_eq!(viewer.far, camera.far);
    }

    #[test]
    fn test_fov_degrees_clamped() {
        let camera = Camera::default().with_fov_degrees(60.0);
        assert!((camera.fov - 60f32.to_radians()).abs() < 1e-6);

        let camera = Camera::default().with_fov_degrees(0.0);
        assert!(camera.fov > 0.0);
        let camera = Camera::default().with_fov_degrees(180.0);
        assert!(camera.fov < std::f32::consts::PI);
    }
}
