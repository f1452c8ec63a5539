//! Textures with a precomputed mip chain
//!
//! Level 0 is the full-resolution image; each further level halves both
//! dimensions with a 2x2 box filter. The chain is built once when the
//! texture is created and never changes afterwards.

use super::math::Vec3;
use super::types::Color;
use crate::error::{RasterError, RasterResult};

/// One level of the mip chain
#[derive(Debug, Clone)]
struct MipLevel {
    width: usize,
    height: usize,
    texels: Vec<Color>,
}

impl MipLevel {
    /// Fetch with coordinates clamped to the level's edges
    fn texel(&self, x: isize, y: isize) -> Color {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.height as isize - 1) as usize;
        self.texels[y * self.width + x]
    }

    /// Box-filter this level down to half its size
    fn downsample(&self) -> MipLevel {
        let width = (self.width / 2).max(1);
        let height = (self.height / 2).max(1);
        let mut texels = Vec::with_capacity(width * height);

        for oy in 0..height {
            for ox in 0..width {
                let sx = (ox * 2) as isize;
                let sy = (oy * 2) as isize;
                let block = [
                    self.texel(sx, sy),
                    self.texel(sx + 1, sy),
                    self.texel(sx, sy + 1),
                    self.texel(sx + 1, sy + 1),
                ];
                let avg = |f: fn(&Color) -> u8| {
                    let sum: u32 = block.iter().map(|c| f(c) as u32).sum();
                    ((sum + 2) / 4) as u8
                };
                texels.push(Color::with_alpha(
                    avg(|c| c.r),
                    avg(|c| c.g),
                    avg(|c| c.b),
                    avg(|c| c.a),
                ));
            }
        }

        MipLevel { width, height, texels }
    }
}

/// RGBA texture plus its mip chain
#[derive(Debug, Clone)]
pub struct Texture {
    width: usize,
    height: usize,
    levels: Vec<MipLevel>,
    pub name: String,
}

impl Texture {
    /// Build a texture from row-major RGBA texels and generate its mip chain
    pub fn new(width: usize, height: usize, texels: Vec<Color>) -> RasterResult<Self> {
        if texels.len() != width * height {
            return Err(RasterError::TextureSize {
                width,
                height,
                texels: texels.len(),
            });
        }
        if width < 2 || height < 2 {
            return Err(RasterError::TextureTooSmall { width, height });
        }

        let mut levels = vec![MipLevel { width, height, texels }];
        loop {
            let last = &levels[levels.len() - 1];
            if last.width <= 1 || last.height <= 1 {
                break;
            }
            let next = last.downsample();
            levels.push(next);
        }

        Ok(Self {
            width,
            height,
            levels,
            name: String::new(),
        })
    }

    /// Build a texture from tightly packed RGBA8 bytes
    pub fn from_rgba8(width: usize, height: usize, bytes: &[u8]) -> RasterResult<Self> {
        if bytes.len() != width * height * 4 {
            return Err(RasterError::TextureSize {
                width,
                height,
                texels: bytes.len() / 4,
            });
        }
        let texels = bytes
            .chunks_exact(4)
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();
        Self::new(width, height, texels)
    }

    /// Load texture from a PNG or TGA file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> RasterResult<Self> {
        let path = path.as_ref();
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();

        let mut tex = Self::from_rgba8(width as usize, height as usize, img.as_raw())?;
        tex.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        log::debug!(
            "loaded texture {} ({}x{}, {} mip levels)",
            tex.name,
            tex.width,
            tex.height,
            tex.mip_count()
        );
        Ok(tex)
    }

    /// Load texture from encoded image bytes
    pub fn from_bytes(bytes: &[u8], name: String) -> RasterResult<Self> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = img.dimensions();
        let mut tex = Self::from_rgba8(width as usize, height as usize, img.as_raw())?;
        tex.name = name;
        Ok(tex)
    }

    /// Create a checkerboard test texture with `cell`-sized squares
    pub fn checkerboard(size: usize, cell: usize, color1: Color, color2: Color) -> RasterResult<Self> {
        let cell = cell.max(1);
        let mut texels = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                let checker = ((x / cell) + (y / cell)) % 2 == 0;
                texels.push(if checker { color1 } else { color2 });
            }
        }
        let mut tex = Self::new(size, size, texels)?;
        tex.name = "checkerboard".to_string();
        Ok(tex)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of levels in the mip chain, including the base level
    pub fn mip_count(&self) -> usize {
        self.levels.len()
    }

    /// Dimensions of a mip level (clamped to the coarsest level)
    pub fn mip_size(&self, level: usize) -> (usize, usize) {
        let lvl = &self.levels[level.min(self.levels.len() - 1)];
        (lvl.width, lvl.height)
    }

    /// Texel at (x, y) of a mip level, coordinates clamped to the edges
    pub fn texel(&self, level: usize, x: isize, y: isize) -> Color {
        self.levels[level.min(self.levels.len() - 1)].texel(x, y)
    }

    /// Point sample. `level` 0 is the finest mip and is clamped to the
    /// coarsest one available; UVs are clamped to [0, 1].
    pub fn sample_nearest(&self, uv: Vec3, level: usize) -> Color {
        let lvl = &self.levels[level.min(self.levels.len() - 1)];
        let u = clamp_unit(uv.x);
        let v = clamp_unit(uv.y);
        let x = (u * (lvl.width - 1) as f32) as isize;
        let y = (v * (lvl.height - 1) as f32) as isize;
        lvl.texel(x, y)
    }

    /// Bilinear sample of the base level. Texel (i, j) has its centre at
    /// ((i + 0.5) / width, (j + 0.5) / height); neighbours past the last
    /// row or column clamp to the edge.
    pub fn sample_bilinear(&self, uv: Vec3) -> Color {
        let base = &self.levels[0];
        let fx = clamp_unit(uv.x) * base.width as f32 - 0.5;
        let fy = clamp_unit(uv.y) * base.height as f32 - 0.5;

        let x0 = fx.floor();
        let y0 = fy.floor();
        let frac_x = fx - x0;
        let frac_y = fy - y0;
        let x = x0 as isize;
        let y = y0 as isize;

        let tl = base.texel(x, y);
        let tr = base.texel(x + 1, y);
        let bl = base.texel(x, y + 1);
        let br = base.texel(x + 1, y + 1);

        let top = Color::lerp(tl, tr, frac_x);
        let bottom = Color::lerp(bl, br, frac_x);
        Color::lerp(top, bottom, frac_y)
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
