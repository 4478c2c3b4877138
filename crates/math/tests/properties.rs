//! Algebraic properties of the transform math, cross-checked against glam.

use triframe_math::{Mat4, Vec3, Vec4, pi_4};

/// Small deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        // [-2, 2)
        ((self.0 >> 40) as f32 / (1u64 << 24) as f32) * 4.0 - 2.0
    }

    fn mat4(&mut self) -> Mat4 {
        let mut m = Mat4::zero();
        for row in m.m.iter_mut() {
            for v in row.iter_mut() {
                *v = self.next_f32();
            }
        }
        m
    }

    fn vec3(&mut self) -> Vec3 {
        Vec3::new(self.next_f32(), self.next_f32(), self.next_f32())
    }
}

fn assert_mat_close(a: &Mat4, b: &Mat4, rel: f32) {
    for i in 0..4 {
        for j in 0..4 {
            let (x, y) = (a.m[i][j], b.m[i][j]);
            let tol = rel * x.abs().max(y.abs()).max(1.0);
            assert!((x - y).abs() <= tol, "m[{i}][{j}]: {x} vs {y}");
        }
    }
}

fn to_glam(m: &Mat4) -> glam::Mat4 {
    glam::Mat4::from_cols_array_2d(&m.to_cols_array_2d())
}

fn glam_vec3(v: Vec3) -> glam::Vec3 {
    glam::Vec3::new(v.x, v.y, v.z)
}

fn from_glam(m: glam::Mat4) -> Mat4 {
    Mat4::from_rows(m.to_cols_array_2d()).transpose()
}

#[test]
fn multiply_is_associative() {
    let mut rng = Lcg(7);
    for _ in 0..64 {
        let (a, b, c) = (rng.mat4(), rng.mat4(), rng.mat4());
        assert_mat_close(&((a * b) * c), &(a * (b * c)), 1e-4);
    }
}

#[test]
fn identity_is_neutral() {
    let mut rng = Lcg(11);
    for _ in 0..32 {
        let m = rng.mat4();
        assert_eq!(m * Mat4::identity(), m);
        assert_eq!(Mat4::identity() * m, m);
    }
}

#[test]
fn multiply_matches_glam() {
    let mut rng = Lcg(3);
    for _ in 0..32 {
        let (a, b) = (rng.mat4(), rng.mat4());
        let expected = from_glam(to_glam(&a) * to_glam(&b));
        assert_mat_close(&(a * b), &expected, 1e-5);

        let v = Vec4::new(rng.next_f32(), rng.next_f32(), rng.next_f32(), 1.0);
        let gv = to_glam(&a) * glam::Vec4::new(v.x, v.y, v.z, v.w);
        let ours = a * v;
        assert!((ours.x - gv.x).abs() < 1e-4);
        assert!((ours.y - gv.y).abs() < 1e-4);
        assert!((ours.z - gv.z).abs() < 1e-4);
        assert!((ours.w - gv.w).abs() < 1e-4);
    }
}

#[test]
fn look_at_basis_is_orthonormal() {
    let mut rng = Lcg(19);
    for _ in 0..64 {
        let eye = rng.vec3();
        let target = eye + rng.vec3() + Vec3::new(0.0, 0.0, 3.0);
        let view = Mat4::look_at(eye, target, Vec3::Y);

        let basis: Vec<Vec3> = (0..3).map(|i| view.row(i).truncate()).collect();
        for (i, a) in basis.iter().enumerate() {
            assert!((a.length() - 1.0).abs() < 1e-4, "row {i} length {}", a.length());
            for b in &basis[i + 1..] {
                assert!(a.dot(*b).abs() < 1e-4);
            }
        }
    }
}

#[test]
fn look_to_matches_glam_left_handed() {
    let mut rng = Lcg(23);
    for _ in 0..32 {
        let eye = rng.vec3();
        let dir = rng.vec3() + Vec3::new(0.0, 0.0, 3.0);
        let ours = Mat4::look_to(eye, dir, Vec3::Y);
        let theirs = glam::Mat4::look_to_lh(glam_vec3(eye), glam_vec3(dir), glam::Vec3::Y);
        assert_mat_close(&ours, &from_glam(theirs), 1e-5);
    }
}

#[test]
fn proj_maps_near_to_zero_and_far_to_one() {
    for (near, far) in [(0.1, 100.0), (1.0, 10.0), (0.01, 1000.0)] {
        let p = Mat4::proj(pi_4(), 16.0 / 9.0, near, far);

        let at_near = p * Vec4::new(0.0, 0.0, near, 1.0);
        let at_far = p * Vec4::new(0.0, 0.0, far, 1.0);

        assert!((at_near.z / at_near.w).abs() < 1e-4);
        assert!((at_far.z / at_far.w - 1.0).abs() < 1e-4);
    }
}

#[test]
fn proj_matches_glam_left_handed() {
    let ours = Mat4::proj(pi_4(), 4.0 / 3.0, 0.1, 100.0);
    let theirs = glam::Mat4::perspective_lh(pi_4(), 4.0 / 3.0, 0.1, 100.0);
    assert_mat_close(&ours, &from_glam(theirs), 1e-5);
}

#[test]
fn ortho_matches_glam_left_handed() {
    let ours = Mat4::ortho(8.0, 6.0, 0.5, 50.0);
    let theirs = glam::Mat4::orthographic_lh(-4.0, 4.0, -3.0, 3.0, 0.5, 50.0);
    assert_mat_close(&ours, &from_glam(theirs), 1e-5);
}

#[test]
fn rotate_z_matches_glam() {
    for angle in [0.0, 0.3, pi_4(), 2.5, -1.0] {
        let ours = Mat4::rotate_z(angle);
        assert_mat_close(&ours, &from_glam(glam::Mat4::from_rotation_z(angle)), 1e-6);
    }
}
