//! Core types for the rasterizer

use serde::{Deserialize, Serialize};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Per-channel linear interpolation, `t = 0` gives `a`, `t = 1` gives `b`
    pub fn lerp(a: Color, b: Color, t: f32) -> Color {
        let ch = |x: u8, y: u8| {
            let v = x as f32 + (y as f32 - x as f32) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Color {
            r: ch(a.r, b.r),
            g: ch(a.g, b.g),
            b: ch(a.b, b.b),
            a: ch(a.a, b.a),
        }
    }

    /// Barycentric combination of three colors
    pub fn weighted(c: [Color; 3], w: [f32; 3]) -> Color {
        let ch = |f: fn(&Color) -> u8| {
            let v = f(&c[0]) as f32 * w[0] + f(&c[1]) as f32 * w[1] + f(&c[2]) as f32 * w[2];
            v.round().clamp(0.0, 255.0) as u8
        };
        Color {
            r: ch(|c| c.r),
            g: ch(|c| c.g),
            b: ch(|c| c.b),
            a: ch(|c| c.a),
        }
    }

    /// Source-alpha blend of `self` over `dest`, applied to all four channels
    pub fn blend_over(self, dest: Color) -> Color {
        let s = self.a as u32;
        let d = 255 - s;
        let ch = |src: u8, dst: u8| ((src as u32 * s + dst as u32 * d) / 255) as u8;
        Color {
            r: ch(self.r, dest.r),
            g: ch(self.g, dest.g),
            b: ch(self.b, dest.b),
            a: ch(self.a, dest.a),
        }
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::with_alpha(bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

/// Texture filtering used by the triangle and line fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    /// Point sample the base level
    #[default]
    Nearest,
    /// 2x2 filtered sample of the base level
    Bilinear,
    /// Point sample the mip level picked from screen-space UV derivatives
    MipNearest,
}

impl FilterMode {
    /// Next mode in the cycle Nearest -> Bilinear -> MipNearest -> Nearest
    pub fn next(self) -> Self {
        match self {
            FilterMode::Nearest => FilterMode::Bilinear,
            FilterMode::Bilinear => FilterMode::MipNearest,
            FilterMode::MipNearest => FilterMode::Nearest,
        }
    }
}
