//! Infinite planes in Hessian normal form.

use glam::{Mat3, Mat4, Vec3, Vec4};

/// A plane defined by a unit normal and a constant.
///
/// Points `p` on the plane satisfy `normal.dot(p) + constant == 0`.
/// The side the normal points toward is the positive side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal of the plane.
    pub normal: Vec3,
    /// Negated distance from the origin along the normal.
    pub constant: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self {
            normal: Vec3::Z,
            constant: 0.0,
        }
    }
}

impl Plane {
    /// Creates a plane from a normal and a constant. The normal is normalized.
    #[must_use]
    pub fn new(normal: Vec3, constant: f32) -> Self {
        let length = normal.length();
        Self {
            normal: normal / length,
            constant: constant / length,
        }
    }

    /// Creates the plane through `point` with the given normal.
    #[must_use]
    pub fn from_normal_and_coplanar_point(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            constant: -point.dot(normal),
        }
    }

    /// Signed distance from the plane to `point`. Positive on the normal side.
    #[must_use]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }

    /// The point on the plane closest to the origin.
    #[must_use]
    pub fn coplanar_point(&self) -> Vec3 {
        self.normal * -self.constant
    }

    /// Mirrors `point` through the plane.
    #[must_use]
    pub fn reflect_point(&self, point: Vec3) -> Vec3 {
        point - 2.0 * self.distance_to_point(point) * self.normal
    }

    /// Affine matrix that mirrors points and directions through the plane.
    ///
    /// The linear part is the Householder reflection `I - 2nn^T`; the
    /// translation moves the origin to its mirror image.
    #[must_use]
    pub fn reflection_matrix(&self) -> Mat4 {
        let n = self.normal;
        let householder = Mat3::IDENTITY - Mat3::from_cols(n * n.x, n * n.y, n * n.z) * 2.0;
        let translation = n * (-2.0 * self.constant);
        Mat4::from_translation(translation) * Mat4::from_mat3(householder)
    }

    /// Transforms the plane by an affine matrix.
    ///
    /// The normal is transformed by the inverse transpose of the upper 3x3 and
    /// the constant is recomputed from the transformed coplanar point.
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let normal_matrix = Mat3::from_mat4(*matrix).inverse().transpose();
        let point = matrix.transform_point3(self.coplanar_point());
        Self::from_normal_and_coplanar_point(normal_matrix * self.normal, point)
    }

    /// The plane as a homogeneous vector `(nx, ny, nz, constant)`.
    #[must_use]
    pub fn to_vec4(&self) -> Vec4 {
        self.normal.extend(self.constant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_from_normal_and_coplanar_point() {
        let plane = Plane::from_normal_and_coplanar_point(Vec3::Y, Vec3::new(3.0, 2.0, -1.0));
        assert_eq!(plane.normal, Vec3::Y);
        assert!((plane.constant + 2.0).abs() < 1e-6);
        assert!((plane.distance_to_point(Vec3::new(0.0, 5.0, 0.0)) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_new_normalizes() {
        let plane = Plane::new(Vec3::new(0.0, 0.0, 2.0), -4.0);
        assert!((plane.normal.length() - 1.0).abs() < 1e-6);
        assert!((plane.constant + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_reflect_point() {
        let plane = Plane::default();
        let reflected = plane.reflect_point(Vec3::new(1.0, 2.0, 5.0));
        assert!((reflected - Vec3::new(1.0, 2.0, -5.0)).length() < 1e-6);
    }

    #[test]
    fn test_reflection_matrix() {
        let through_origin = Plane::from_normal_and_coplanar_point(Vec3::Y, Vec3::ZERO);
        let mat = through_origin.reflection_matrix();
        let reflected = mat.transform_point3(Vec3::new(1.0, 2.0, 3.0));
        assert!((reflected - Vec3::new(1.0, -2.0, 3.0)).length() < 1e-6);

        let raised = Plane::from_normal_and_coplanar_point(Vec3::Y, Vec3::new(0.0, 1.0, 0.0));
        let mat = raised.reflection_matrix();
        let reflected = mat.transform_point3(Vec3::new(4.0, 3.0, -2.0));
        assert!((reflected - Vec3::new(4.0, -1.0, -2.0)).length() < 1e-6);
        // Directions ignore the offset.
        let direction = mat.transform_vector3(Vec3::new(0.0, 1.0, 1.0));
        assert!((direction - Vec3::new(0.0, -1.0, 1.0)).length() < 1e-6);
        assert!((mat.determinant() + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_transformed_keeps_points_on_plane() {
        let plane = Plane::from_normal_and_coplanar_point(Vec3::new(1.0, 1.0, 0.0), Vec3::X);
        let matrix = Mat4::from_rotation_translation(
            Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.3),
            Vec3::new(4.0, -2.0, 1.5),
        );
        let moved = plane.transformed(&matrix);

        let on_plane = [Vec3::X, Vec3::Y, Vec3::new(0.5, 0.5, 3.0)];
        for point in on_plane {
            assert!(plane.distance_to_point(point).abs() < 1e-5);
            let transformed = matrix.transform_point3(point);
            assert!(moved.distance_to_point(transformed).abs() < 1e-4);
        }
        assert!((moved.normal.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_to_vec4() {
        let plane = Plane::new(Vec3::X, 2.0);
        assert_eq!(plane.to_vec4(), Vec4::new(1.0, 0.0, 0.0, 2.0));
    }
}
