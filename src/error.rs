//! Error type for the fallible edges of the crate (loading and construction).
//! Drawing itself never fails; bad primitives are skipped.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    #[error("mesh parse error: {0}")]
    MeshParse(String),

    #[error("mesh attribute arrays differ in length (positions {positions}, colors {colors}, tex coords {tex_coords})")]
    MeshAttributeMismatch {
        positions: usize,
        colors: usize,
        tex_coords: usize,
    },

    #[error("texture is {width}x{height} but {texels} texels were supplied")]
    TextureSize {
        width: usize,
        height: usize,
        texels: usize,
    },

    #[error("texture {width}x{height} cannot be halved into a mip level")]
    TextureTooSmall { width: usize, height: usize },
}

pub type RasterResult<T> = Result<T, RasterError>;
