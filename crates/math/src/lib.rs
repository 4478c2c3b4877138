//! Transform math for the triangle sample.
//!
//! Matrices are row-major (`m[row][col]`) and transform column vectors,
//! so a point goes through `proj * view * point`. The coordinate system is
//! left-handed with view space looking down +Z and depth mapped to `[0, 1]`.
//!
//! Nothing here guards against degenerate input. Normalizing a zero vector
//! or building a view with `up` parallel to the view direction yields NaNs.

pub mod matrix;
pub mod scalar;
pub mod vector;

pub use matrix::Mat4;
pub use scalar::{cot, pi, pi_2, pi_4};
pub use vector::{Vec2, Vec3, Vec4};
