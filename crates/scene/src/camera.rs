//! Interactive first-person camera.

use triframe_math::{Mat4, Vec3, pi, pi_4};

/// Logical camera inputs, decoupled from any windowing key codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CameraKey {
    Forward,
    Back,
    StrafeLeft,
    StrafeRight,
    LookUp,
    LookDown,
    TurnLeft,
    TurnRight,
    /// Restores the default orientation on key down.
    Reset,
}

#[derive(Clone, Copy, Debug, Default)]
struct PressedKeys {
    forward: bool,
    back: bool,
    strafe_left: bool,
    strafe_right: bool,
    look_up: bool,
    look_down: bool,
    turn_left: bool,
    turn_right: bool,
}

impl PressedKeys {
    fn set(&mut self, key: CameraKey, pressed: bool) {
        let flag = match key {
            CameraKey::Forward => &mut self.forward,
            CameraKey::Back => &mut self.back,
            CameraKey::StrafeLeft => &mut self.strafe_left,
            CameraKey::StrafeRight => &mut self.strafe_right,
            CameraKey::LookUp => &mut self.look_up,
            CameraKey::LookDown => &mut self.look_down,
            CameraKey::TurnLeft => &mut self.turn_left,
            CameraKey::TurnRight => &mut self.turn_right,
            CameraKey::Reset => return,
        };
        *flag = pressed;
    }
}

/// A yaw/pitch camera moving in the XZ plane.
#[derive(Clone, Debug)]
pub struct Camera {
    initial_position: Vec3,
    position: Vec3,
    yaw: f32,
    pitch: f32,
    look_direction: Vec3,
    up_direction: Vec3,
    /// Units per second when moving and radians per second when turning.
    pub speed: f32,
    keys: PressedKeys,
}

impl Camera {
    pub const DEFAULT_SPEED: f32 = 5.0;

    /// Create a camera at `position` facing -Z.
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            initial_position: position,
            position,
            yaw: 0.0,
            pitch: 0.0,
            look_direction: Vec3::ZERO,
            up_direction: Vec3::Y,
            speed: Self::DEFAULT_SPEED,
            keys: PressedKeys::default(),
        };
        camera.reset();
        camera
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Restore the default orientation. The position is left where it is.
    pub fn reset(&mut self) {
        self.yaw = pi();
        self.pitch = 0.0;
        self.look_direction = Vec3::new(0.0, 0.0, -1.0);
    }

    pub fn on_key_down(&mut self, key: CameraKey) {
        if key == CameraKey::Reset {
            tracing::debug!("Camera reset");
            self.reset();
        } else {
            self.keys.set(key, true);
        }
    }

    pub fn on_key_up(&mut self, key: CameraKey) {
        self.keys.set(key, false);
    }

    /// Advance the camera by `delta_time` seconds using the held keys.
    pub fn update(&mut self, delta_time: f32) {
        let keys = self.keys;

        let mut movement = Vec3::ZERO;
        if keys.strafe_left {
            movement.x -= 1.0;
        }
        if keys.strafe_right {
            movement.x += 1.0;
        }
        if keys.forward {
            movement.z -= 1.0;
        }
        if keys.back {
            movement.z += 1.0;
        }

        // Diagonal movement is no faster than axial movement.
        if movement.x.abs() > 0.1 && movement.z.abs() > 0.1 {
            movement = movement.normalize();
        }

        let move_interval = self.speed * delta_time;
        let rotate_interval = self.speed * delta_time;

        if keys.turn_left {
            self.yaw += rotate_interval;
        }
        if keys.turn_right {
            self.yaw -= rotate_interval;
        }
        if keys.look_up {
            self.pitch += rotate_interval;
        }
        if keys.look_down {
            self.pitch -= rotate_interval;
        }

        self.pitch = self.pitch.clamp(-pi_4(), pi_4());

        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let x = movement.x * -cos_yaw - movement.z * sin_yaw;
        let z = movement.x * sin_yaw - movement.z * cos_yaw;
        self.position.x += x * move_interval;
        self.position.z += z * move_interval;

        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.look_direction = Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw);
    }

    /// View matrix for the current position and look direction.
    pub fn view(&self) -> Mat4 {
        Mat4::look_to(self.position, self.look_direction, self.up_direction)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn initial_position(&self) -> Vec3 {
        self.initial_position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn look_direction(&self) -> Vec3 {
        self.look_direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    fn hold(camera: &mut Camera, keys: &[CameraKey], seconds: f32) {
        for key in keys {
            camera.on_key_down(*key);
        }
        let steps = (seconds / DT).round() as usize;
        for _ in 0..steps {
            camera.update(DT);
        }
        for key in keys {
            camera.on_key_up(*key);
        }
    }

    #[test]
    fn test_new_faces_negative_z() {
        let camera = Camera::new(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(camera.yaw(), pi());
        assert_eq!(camera.pitch(), 0.0);
        assert_eq!(camera.look_direction(), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(camera.position(), camera.initial_position());
    }

    #[test]
    fn test_forward_for_one_second() {
        let mut camera = Camera::new(Vec3::ZERO);
        hold(&mut camera, &[CameraKey::Forward], 1.0);
        assert!(
            approx(camera.position(), Vec3::new(0.0, 0.0, -5.0)),
            "{:?}",
            camera.position()
        );
    }

    #[test]
    fn test_single_update_matches_stepped() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.on_key_down(CameraKey::Forward);
        camera.update(1.0);
        assert!(approx(camera.position(), Vec3::new(0.0, 0.0, -5.0)));
    }

    #[test]
    fn test_diagonal_not_faster() {
        let mut camera = Camera::new(Vec3::ZERO);
        hold(&mut camera, &[CameraKey::Forward, CameraKey::StrafeRight], 1.0);
        assert!((camera.position().length() - 5.0).abs() < 1e-3);
        assert!(camera.position().x.abs() > 1.0);
        assert!(camera.position().z < -1.0);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut camera = Camera::new(Vec3::ZERO);
        hold(&mut camera, &[CameraKey::Forward, CameraKey::Back], 1.0);
        assert!(approx(camera.position(), Vec3::ZERO));
    }

    #[test]
    fn test_movement_stays_in_xz_plane() {
        let mut camera = Camera::new(Vec3::new(0.0, 1.5, 0.0));
        hold(&mut camera, &[CameraKey::LookUp, CameraKey::Forward], 2.0);
        assert_eq!(camera.position().y, 1.5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.on_key_down(CameraKey::LookUp);
        for _ in 0..600 {
            camera.update(DT);
            assert!(camera.pitch() <= pi_4() && camera.pitch() >= -pi_4());
        }
        assert_eq!(camera.pitch(), pi_4());
        camera.on_key_up(CameraKey::LookUp);

        camera.on_key_down(CameraKey::LookDown);
        for _ in 0..600 {
            camera.update(DT);
            assert!(camera.pitch() <= pi_4() && camera.pitch() >= -pi_4());
        }
        assert_eq!(camera.pitch(), -pi_4());
    }

    #[test]
    fn test_turning_changes_look_direction() {
        let mut camera = Camera::new(Vec3::ZERO);
        hold(&mut camera, &[CameraKey::TurnLeft], 0.1);
        assert!(camera.yaw() > pi());
        let look = camera.look_direction();
        assert!((look.length() - 1.0).abs() < 1e-5);
        assert!(look.x < 0.0);
    }

    #[test]
    fn test_reset_keeps_current_position() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 2.0));
        hold(
            &mut camera,
            &[CameraKey::Forward, CameraKey::TurnRight, CameraKey::LookDown],
            0.5,
        );
        let moved_to = camera.position();
        assert!(!approx(moved_to, camera.initial_position()));

        camera.on_key_down(CameraKey::Reset);
        assert_eq!(camera.yaw(), pi());
        assert_eq!(camera.pitch(), 0.0);
        assert_eq!(camera.look_direction(), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(camera.position(), moved_to);
        assert_eq!(camera.initial_position(), Vec3::new(0.0, 0.0, 2.0));
    }

    #[test]
    fn test_reset_is_not_a_held_key() {
        let mut camera = Camera::new(Vec3::ZERO);
        camera.on_key_down(CameraKey::Reset);
        camera.on_key_up(CameraKey::Reset);
        camera.update(1.0);
        assert_eq!(camera.position(), Vec3::ZERO);
    }

    #[test]
    fn test_view_places_camera_at_origin() {
        let mut camera = Camera::new(Vec3::new(3.0, 1.0, -2.0));
        hold(&mut camera, &[CameraKey::TurnLeft, CameraKey::LookUp], 0.3);
        let p = camera.view() * camera.position().extend(1.0);
        assert!(p.truncate().length() < 1e-4);
    }
}
