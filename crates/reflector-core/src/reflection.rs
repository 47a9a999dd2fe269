//! Planar reflection math.
//!
//! Everything here is a pure function of its inputs. The reflector composes
//! these into the per-frame update; backends can use them directly.

use glam::{Mat4, Quat, Vec3, Vec4};

use crate::camera::{look_rotation, VirtualCamera};
use crate::plane::Plane;

/// Maps clip space [-1, 1] to texture space [0, 1] on x, y and z.
pub const TEXTURE_BIAS: Mat4 = Mat4::from_cols(
    Vec4::new(0.5, 0.0, 0.0, 0.0),
    Vec4::new(0.0, 0.5, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 0.0),
    Vec4::new(0.5, 0.5, 0.5, 1.0),
);

/// Reflects `v` across the plane with unit normal `normal` through the origin.
#[must_use]
pub fn reflect(v: Vec3, normal: Vec3) -> Vec3 {
    v - 2.0 * v.dot(normal) * normal
}

/// Mirrors `point` through the plane containing `plane_point` with unit
/// normal `normal`.
#[must_use]
pub fn mirror_point(point: Vec3, plane_point: Vec3, normal: Vec3) -> Vec3 {
    -reflect(plane_point - point, normal) + plane_point
}

/// World-space pose of a reflector's plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorFrame {
    /// World position of the reflector's origin.
    pub position: Vec3,
    /// World-space plane normal (local +Z rotated into world).
    pub normal: Vec3,
}

impl MirrorFrame {
    /// Derives the mirror frame from a reflector's world matrix.
    ///
    /// Only the rotation affects the normal; translation and scale are ignored.
    #[must_use]
    pub fn from_world_matrix(world_matrix: &Mat4) -> Self {
        let (_, rotation, position) = world_matrix.to_scale_rotation_translation();
        Self {
            position,
            normal: (rotation * Vec3::Z).normalize(),
        }
    }

    /// The reflecting plane.
    #[must_use]
    pub fn plane(&self) -> Plane {
        Plane::from_normal_and_coplanar_point(self.normal, self.position)
    }
}

/// Derives the mirrored camera for a viewer at `viewer_position` with
/// orientation `viewer_rotation`.
///
/// The projection is copied as-is; the oblique clip is applied separately
/// by [`oblique_clip_projection`].
#[must_use]
pub fn mirror_camera(
    frame: &MirrorFrame,
    viewer_position: Vec3,
    viewer_rotation: Quat,
    viewer_far: f32,
    viewer_projection: Mat4,
) -> VirtualCamera {
    let reflection = frame.plane().reflection_matrix();
    let position = reflection.transform_point3(viewer_position);

    let look_at = viewer_position + viewer_rotation * Vec3::NEG_Z;
    let target = reflection.transform_point3(look_at);

    let up = reflection.transform_vector3(viewer_rotation * Vec3::Y);

    VirtualCamera {
        position,
        up,
        target,
        rotation: look_rotation(position, target, up),
        far: viewer_far,
        projection_matrix: viewer_projection,
    }
}

/// Computes the matrix mapping a reflector's local positions to projective
/// texture coordinates of the reflection target.
#[must_use]
pub fn texture_matrix(projection: &Mat4, view: &Mat4, model: &Mat4) -> Mat4 {
    TEXTURE_BIAS * *projection * *view * *model
}

// Lengyel's sign: zero maps to zero.
fn sgn(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Replaces the near plane of an OpenGL-convention projection with
/// `clip_plane`, given in view space as `(nx, ny, nz, constant)`.
///
/// Returns a modified copy; `projection` is untouched. Points on the clip
/// plane land on clip depth `z / w = -1` (for `clip_bias == 0`). If the camera
/// lies on the plane the projection is returned unchanged.
///
/// See Eric Lengyel, "Oblique View Frustum Depth Projection and Clipping".
#[must_use]
pub fn oblique_clip_projection(projection: &Mat4, clip_plane: Vec4, clip_bias: f32) -> Mat4 {
    let mut m = *projection;

    // Corner point of the frustum opposite the clip plane, in view space.
    let q = Vec4::new(
        (sgn(clip_plane.x) + m.z_axis.x) / m.x_axis.x,
        (sgn(clip_plane.y) + m.z_axis.y) / m.y_axis.y,
        -1.0,
        (1.0 + m.z_axis.z) / m.w_axis.z,
    );

    let denom = clip_plane.dot(q);
    if !denom.is_finite() || denom.abs() < f32::EPSILON {
        return m;
    }
    let c = clip_plane * (2.0 / denom);

    // Third row.
    m.x_axis.z = c.x;
    m.y_axis.z = c.y;
    m.z_axis.z = c.z + 1.0 - clip_bias;
    m.w_axis.z = c.w;
    m
}
