//! 4x4 matrix.

use std::ops::{Mul, MulAssign};

use bytemuck::{Pod, Zeroable};

use crate::scalar::cot;
use crate::vector::{Vec2, Vec3, Vec4};

/// Row-major 4x4 matrix, `m[row][col]`, acting on column vectors.
///
/// Uploaded as-is, so shaders must declare the matrix `row_major`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat4 {
    pub const fn from_rows(m: [[f32; 4]; 4]) -> Self {
        Self { m }
    }

    pub const fn zero() -> Self {
        Self { m: [[0.0; 4]; 4] }
    }

    pub const fn identity() -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// `self * rhs`, i.e. `rhs` is applied first.
    pub fn multiply(&self, rhs: &Mat4) -> Mat4 {
        let mut out = Mat4::zero();
        for i in 0..4 {
            for j in 0..4 {
                out.m[i][j] = (0..4).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }
        out
    }

    pub fn multiply_vec4(&self, v: Vec4) -> Vec4 {
        let v: [f32; 4] = v.into();
        let row = |i: usize| (0..4).map(|k| self.m[i][k] * v[k]).sum::<f32>();
        Vec4::new(row(0), row(1), row(2), row(3))
    }

    pub fn transpose(&self) -> Mat4 {
        let mut out = Mat4::zero();
        for (i, row) in self.m.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                out.m[j][i] = *value;
            }
        }
        out
    }

    /// Column-major view, `[col][row]`, for interop with column-major libraries.
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        self.transpose().m
    }

    pub fn row(&self, i: usize) -> Vec4 {
        self.m[i].into()
    }

    /// View matrix looking from `eye` towards `target`.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Self::look_to(eye, target - eye, up)
    }

    /// View matrix looking from `eye` along `direction`.
    ///
    /// The rows are the camera's right, up and forward axes. Undefined when
    /// `up` is parallel to `direction`.
    pub fn look_to(eye: Vec3, direction: Vec3, up: Vec3) -> Mat4 {
        let forward = direction.normalize();
        let right = up.cross(forward).normalize();
        let true_up = forward.cross(right);

        Mat4::from_rows([
            [right.x, right.y, right.z, -right.dot(eye)],
            [true_up.x, true_up.y, true_up.z, -true_up.dot(eye)],
            [forward.x, forward.y, forward.z, -forward.dot(eye)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Perspective projection mapping view depth `near..far` to `0..1`.
    pub fn proj(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let ys = cot(fov_y * 0.5);
        let xs = ys / aspect;
        let range = far / (far - near);

        Mat4::from_rows([
            [xs, 0.0, 0.0, 0.0],
            [0.0, ys, 0.0, 0.0],
            [0.0, 0.0, range, -range * near],
            [0.0, 0.0, 1.0, 0.0],
        ])
    }

    /// Orthographic projection of a `width` x `height` volume centered on the view axis.
    pub fn ortho(width: f32, height: f32, near: f32, far: f32) -> Mat4 {
        let range = 1.0 / (far - near);

        Mat4::from_rows([
            [2.0 / width, 0.0, 0.0, 0.0],
            [0.0, 2.0 / height, 0.0, 0.0],
            [0.0, 0.0, range, near / (near - far)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// [`ortho`](Self::ortho) taking `(width, height)` and `(near, far)` pairs.
    pub fn ortho_from(dimension: Vec2, near_far: Vec2) -> Mat4 {
        Self::ortho(dimension.x, dimension.y, near_far.x, near_far.y)
    }

    /// Counter-clockwise rotation in the XY plane.
    pub fn rotate_z(angle: f32) -> Mat4 {
        let (sin, cos) = angle.sin_cos();

        Mat4::from_rows([
            [cos, -sin, 0.0, 0.0],
            [sin, cos, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Non-uniform scale.
    pub fn scale(s: Vec3) -> Mat4 {
        Mat4::from_rows([
            [s.x, 0.0, 0.0, 0.0],
            [0.0, s.y, 0.0, 0.0],
            [0.0, 0.0, s.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        self.multiply(&rhs)
    }
}

impl MulAssign for Mat4 {
    fn mul_assign(&mut self, rhs: Mat4) {
        *self = self.multiply(&rhs);
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, rhs: Vec4) -> Vec4 {
        self.multiply_vec4(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{pi_2, pi_4};

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_multiply_not_commutative() {
        let a = Mat4::rotate_z(pi_4());
        let b = Mat4::scale(Vec3::new(2.0, 1.0, 1.0));
        assert_ne!(a * b, b * a);
    }

    #[test]
    fn test_multiply_vec4_translation_column() {
        let mut t = Mat4::identity();
        t.m[0][3] = 3.0;
        t.m[1][3] = -1.0;
        let p = t * Vec4::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(p, Vec4::new(4.0, 0.0, 1.0, 1.0));
        // directions ignore translation
        let d = t * Vec4::new(1.0, 1.0, 1.0, 0.0);
        assert_eq!(d, Vec4::new(1.0, 1.0, 1.0, 0.0));
    }

    #[test]
    fn test_rotate_z_quarter_turn() {
        let p = Mat4::rotate_z(pi_2()) * Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert!(approx(p.x, 0.0));
        assert!(approx(p.y, 1.0));
    }

    #[test]
    fn test_look_to_moves_eye_to_origin() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        let view = Mat4::look_to(eye, Vec3::new(0.0, 0.0, 1.0), Vec3::Y);
        let p = view * eye.extend(1.0);
        assert!(approx(p.x, 0.0) && approx(p.y, 0.0) && approx(p.z, 0.0));
    }

    #[test]
    fn test_look_at_target_on_positive_z() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let view = Mat4::look_at(eye, Vec3::ZERO, Vec3::Y);
        let p = view * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(approx(p.z, 5.0));
    }

    #[test]
    fn test_ortho_depth_range() {
        let o = Mat4::ortho_from(Vec2::new(4.0, 2.0), Vec2::new(1.0, 11.0));
        let near = o * Vec4::new(2.0, 1.0, 1.0, 1.0);
        let far = o * Vec4::new(-2.0, -1.0, 11.0, 1.0);
        assert!(approx(near.x, 1.0) && approx(near.y, 1.0) && approx(near.z, 0.0));
        assert!(approx(far.x, -1.0) && approx(far.y, -1.0) && approx(far.z, 1.0));
    }

    #[test]
    fn test_transpose_twice_is_identity_op() {
        let m = Mat4::look_to(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.3, -0.2, 1.0), Vec3::Y);
        assert_eq!(m.transpose().transpose(), m);
        assert_eq!(m.to_cols_array_2d()[3][0], m.m[0][3]);
    }

    #[test]
    fn test_gpu_layout_is_row_major() {
        let mut m = Mat4::zero();
        m.m[0][1] = 7.0;
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&m));
        assert_eq!(floats.len(), 16);
        assert_eq!(floats[1], 7.0);
    }
}
