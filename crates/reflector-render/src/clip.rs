//! Clip-space conventions.
//!
//! Reflector math produces OpenGL-style projections with clip depth in
//! `[-1, 1]`. wgpu expects `[0, 1]`, so every projection is remapped before
//! it reaches a shader.

use glam::Mat4;
use reflector_core::VirtualCamera;

/// Remaps OpenGL clip depth to wgpu's: `z' = 0.5 * z + 0.5 * w`.
pub const GL_TO_WGPU_CLIP: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 0.5, 0.0, //
    0.0, 0.0, 0.5, 1.0,
]);

/// Returns `projection` with its depth range remapped for wgpu.
#[must_use]
pub fn to_wgpu_projection(projection: Mat4) -> Mat4 {
    GL_TO_WGPU_CLIP * projection
}

/// View-projection matrix of a reflection camera, ready for wgpu.
///
/// The oblique near plane ends up at depth 0.
#[must_use]
pub fn virtual_view_projection(camera: &VirtualCamera) -> Mat4 {
    GL_TO_WGPU_CLIP * camera.view_projection_matrix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};
    use proptest::prelude::*;

    #[test]
    fn test_near_and_far_map_to_unit_range() {
        let projection = Mat4::perspective_rh_gl(1.0, 1.0, 0.5, 50.0);
        let remapped = to_wgpu_projection(projection);

        let near = remapped.project_point3(Vec3::new(0.0, 0.0, -0.5));
        let far = remapped.project_point3(Vec3::new(0.0, 0.0, -50.0));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_xy_and_w_are_untouched() {
        let clip = Vec4::new(0.3, -0.7, 0.25, 2.0);
        let remapped = GL_TO_WGPU_CLIP * clip;
        assert_eq!(remapped.x, clip.x);
        assert_eq!(remapped.y, clip.y);
        assert_eq!(remapped.w, clip.w);
        assert!((remapped.z - 1.125).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn remapped_perspective_spans_unit_depth(
            fov in 0.3f32..2.5,
            aspect in 0.5f32..3.0,
            near in 0.01f32..1.0,
            depth_ratio in 10.0f32..1000.0,
            xy in (-1.0f32..1.0, -1.0f32..1.0),
        ) {
            let far = near * depth_ratio;
            let projection = Mat4::perspective_rh_gl(fov, aspect, near, far);
            let remapped = to_wgpu_projection(projection);

            let near_depth = remapped.project_point3(Vec3::new(0.0, 0.0, -near));
            let far_depth = remapped.project_point3(Vec3::new(0.0, 0.0, -far));
            prop_assert!(near_depth.z.abs() < 1e-4, "near z = {}", near_depth.z);
            prop_assert!((far_depth.z - 1.0).abs() < 1e-3, "far z = {}", far_depth.z);

            let point = Vec4::new(xy.0 * near, xy.1 * near, -near * 2.0, 1.0);
            let gl = projection * point;
            let wgpu = remapped * point;
            prop_assert_eq!(wgpu.x, gl.x);
            prop_assert_eq!(wgpu.y, gl.y);
            prop_assert_eq!(wgpu.w, gl.w);
        }
    }
}
