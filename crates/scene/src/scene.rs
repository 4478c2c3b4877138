//! Per-frame scene context.

use triframe_math::{Mat4, Vec3};

use crate::camera::{Camera, CameraKey};

/// Owns the camera and the fixed projection used to build the per-frame
/// transform.
#[derive(Clone, Debug)]
pub struct Scene {
    pub camera: Camera,
    projection: Mat4,
}

impl Scene {
    pub const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 100.0;

    /// Where the camera starts, two units in front of the triangle.
    pub const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, 2.0);

    /// Create a scene for a viewport of the given aspect ratio.
    pub fn new(aspect: f32, camera_speed: f32) -> Self {
        Self::with_camera(Camera::new(Self::CAMERA_START).with_speed(camera_speed), aspect)
    }

    pub fn with_camera(camera: Camera, aspect: f32) -> Self {
        Self {
            camera,
            projection: vulkan_projection(Self::FOV_Y, aspect, Self::NEAR, Self::FAR),
        }
    }

    pub fn on_key_down(&mut self, key: CameraKey) {
        self.camera.on_key_down(key);
    }

    pub fn on_key_up(&mut self, key: CameraKey) {
        self.camera.on_key_up(key);
    }

    pub fn update(&mut self, delta_time: f32) {
        self.camera.update(delta_time);
    }

    /// Projection with the clip-space flips applied.
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// `projection * view`, ready for upload.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.camera.view()
    }
}

/// Perspective projection with clip-space Y pointing down.
///
/// X is flipped as well: the camera moves in a right-handed world while the
/// view matrix is left-handed, and without the flip the image is mirrored.
fn vulkan_projection(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let flip = Mat4::scale(Vec3::new(-1.0, -1.0, 1.0));
    flip * Mat4::proj(fov_y, aspect, near, far)
}

#[cfg(test)]
mod tests {
    use super::*;
    use triframe_math::{Vec4, pi_4};

    #[test]
    fn test_fov_matches_math_constant() {
        assert_eq!(Scene::FOV_Y, pi_4());
    }

    fn screen_x(scene: &Scene, point: Vec4) -> f32 {
        let clip = scene.view_projection() * point;
        clip.x / clip.w
    }

    #[test]
    fn test_clip_space_flips() {
        let scene = Scene::new(4.0 / 3.0, 5.0);
        let unflipped = Mat4::proj(Scene::FOV_Y, 4.0 / 3.0, Scene::NEAR, Scene::FAR);
        assert_eq!(scene.projection().m[1][1], -unflipped.m[1][1]);
        assert_eq!(scene.projection().m[0][0], -unflipped.m[0][0]);
        assert_eq!(scene.projection().m[2], unflipped.m[2]);
    }

    #[test]
    fn test_positive_x_is_on_the_right() {
        let scene = Scene::new(4.0 / 3.0, 5.0);
        assert!(screen_x(&scene, Vec4::new(0.5, -0.5, 0.0, 1.0)) > 0.0);
        assert!(screen_x(&scene, Vec4::new(-0.5, -0.5, 0.0, 1.0)) < 0.0);
    }

    #[test]
    fn test_strafe_right_moves_the_scene_left() {
        let origin = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let mut scene = Scene::new(4.0 / 3.0, 5.0);
        scene.on_key_down(CameraKey::StrafeRight);
        scene.update(0.1);
        assert!(screen_x(&scene, origin) < 0.0);

        let mut scene = Scene::new(4.0 / 3.0, 5.0);
        scene.on_key_down(CameraKey::StrafeLeft);
        scene.update(0.1);
        assert!(screen_x(&scene, origin) > 0.0);
    }

    #[test]
    fn test_turn_left_moves_the_scene_right() {
        let origin = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let mut scene = Scene::new(4.0 / 3.0, 1.0);
        scene.on_key_down(CameraKey::TurnLeft);
        scene.update(0.1);
        assert!(screen_x(&scene, origin) > 0.0);

        let mut scene = Scene::new(4.0 / 3.0, 1.0);
        scene.on_key_down(CameraKey::TurnRight);
        scene.update(0.1);
        assert!(screen_x(&scene, origin) < 0.0);
    }

    #[test]
    fn test_triangle_is_in_view() {
        let scene = Scene::new(4.0 / 3.0, 5.0);
        let vp = scene.view_projection();
        for p in [
            Vec4::new(0.0, 0.5, 0.0, 1.0),
            Vec4::new(0.5, -0.5, 0.0, 1.0),
            Vec4::new(-0.5, -0.5, 0.0, 1.0),
        ] {
            let clip = vp * p;
            assert!(clip.w > 0.0);
            let ndc = clip.truncate() * (1.0 / clip.w);
            assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
            assert!(ndc.z > 0.0 && ndc.z < 1.0);
        }
    }

    #[test]
    fn test_top_vertex_maps_to_top_of_screen() {
        let scene = Scene::new(1.0, 5.0);
        let clip = scene.view_projection() * Vec4::new(0.0, 0.5, 0.0, 1.0);
        // Vulkan framebuffer Y grows downwards
        assert!(clip.y < 0.0);
    }

    #[test]
    fn test_view_projection_composition_order() {
        let mut scene = Scene::new(16.0 / 9.0, 5.0);
        scene.on_key_down(CameraKey::TurnLeft);
        scene.update(0.2);
        let expected = scene.projection() * scene.camera.view();
        assert_eq!(scene.view_projection(), expected);
        assert_ne!(scene.view_projection(), scene.camera.view() * scene.projection());
    }
}
