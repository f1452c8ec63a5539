//! softraster: a CPU-only software rasterizer
//!
//! Points, lines and triangles are transformed to clip space, clipped
//! against the view frustum, perspective-divided and filled into a
//! double-buffered RGBA framebuffer with depth testing, alpha blending and
//! mipmapped texture sampling.

pub mod config;
pub mod error;
pub mod logging;
pub mod rasterizer;

pub use config::RasterConfig;
pub use error::{RasterError, RasterResult};
pub use rasterizer::*;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
