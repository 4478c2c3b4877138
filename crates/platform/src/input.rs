//! Keyboard mapping for the camera.

pub use winit::keyboard::KeyCode;

use triframe_scene::CameraKey;

/// Maps a physical key to the camera input it drives.
///
/// W/S move forward and back, A/D strafe, the arrow keys turn and pitch,
/// and Escape resets the view. Every other key is ignored.
pub fn map_key(key: KeyCode) -> Option<CameraKey> {
    let mapped = match key {
        KeyCode::KeyW => CameraKey::Forward,
        KeyCode::KeyS => CameraKey::Back,
        KeyCode::KeyA => CameraKey::StrafeLeft,
        KeyCode::KeyD => CameraKey::StrafeRight,
        KeyCode::ArrowUp => CameraKey::LookUp,
        KeyCode::ArrowDown => CameraKey::LookDown,
        KeyCode::ArrowLeft => CameraKey::TurnLeft,
        KeyCode::ArrowRight => CameraKey::TurnRight,
        KeyCode::Escape => CameraKey::Reset,
        _ => return None,
    };
    Some(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys() {
        assert_eq!(map_key(KeyCode::KeyW), Some(CameraKey::Forward));
        assert_eq!(map_key(KeyCode::KeyS), Some(CameraKey::Back));
        assert_eq!(map_key(KeyCode::KeyA), Some(CameraKey::StrafeLeft));
        assert_eq!(map_key(KeyCode::KeyD), Some(CameraKey::StrafeRight));
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(map_key(KeyCode::ArrowUp), Some(CameraKey::LookUp));
        assert_eq!(map_key(KeyCode::ArrowDown), Some(CameraKey::LookDown));
        assert_eq!(map_key(KeyCode::ArrowLeft), Some(CameraKey::TurnLeft));
        assert_eq!(map_key(KeyCode::ArrowRight), Some(CameraKey::TurnRight));
    }

    #[test]
    fn test_escape_resets() {
        assert_eq!(map_key(KeyCode::Escape), Some(CameraKey::Reset));
    }

    #[test]
    fn test_unmapped_keys() {
        assert_eq!(map_key(KeyCode::KeyQ), None);
        assert_eq!(map_key(KeyCode::Space), None);
    }
}
