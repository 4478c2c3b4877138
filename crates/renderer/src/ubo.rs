//! Constant buffer payloads shared with the HLSL shaders.
//!
//! Layouts must match `shaders/triangle.hlsl` exactly. Matrices are stored
//! row-major and the shader declares them `row_major`, so no transpose
//! happens on upload.

use bytemuck::{Pod, Zeroable};

use triframe_math::Mat4;

use crate::constant_buffer::{CONSTANT_BUFFER_ALIGNMENT, padded_size};

/// Per-frame transform (HLSL `cbuffer SceneConstants : register(b0)`).
///
/// # Memory Layout
///
/// - Offset 0: view-projection matrix (64 bytes)
/// - Total size: 64 bytes, padded to 256 in the buffer
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TransformConstants {
    /// World to clip space.
    pub view_projection: Mat4,
}

impl TransformConstants {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new(view_projection: Mat4) -> Self {
        Self { view_projection }
    }
}

const _: () = assert!(TransformConstants::SIZE == 64);
const _: () = assert!(padded_size(TransformConstants::SIZE) == CONSTANT_BUFFER_ALIGNMENT);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let constants = TransformConstants::default();
        assert_eq!(constants.view_projection, Mat4::identity());
    }

    #[test]
    fn test_bytes_are_row_major() {
        let mut m = Mat4::identity();
        m.m[0][3] = 7.0;
        let constants = TransformConstants::new(m);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&constants));
        assert_eq!(floats.len(), 16);
        assert_eq!(floats[3], 7.0);
        assert_eq!(floats[12], 0.0);
    }
}
