//! CPU software rasterizer
//!
//! Features:
//! - Homogeneous clipping (Cohen–Sutherland lines, Sutherland–Hodgman triangles)
//! - Perspective-correct texture coordinates
//! - 16-bit depth buffer and source-alpha blending
//! - Nearest, bilinear and mip-nearest texture filtering
//! - Double-buffered framebuffer

mod clip;
mod math;
mod mesh;
mod render;
mod texture;
mod types;

pub use clip::*;
pub use math::*;
pub use mesh::*;
pub use render::*;
pub use texture::*;
pub use types::*;

/// Default framebuffer dimensions
pub const WIDTH: usize = 320;
pub const HEIGHT: usize = 240;
