//! Vector and matrix math for the rasterizer
//!
//! Row-major 4x4 matrices acting on column vectors (`m * v`), OpenGL-style
//! clip space where a point is visible iff |x|, |y|, |z| <= w.

use std::ops::{Add, Mul, Sub};
use serde::{Serialize, Deserialize};

/// Guard used wherever a homogeneous w or an area ends up in a divisor
pub const EPSILON: f32 = 1.0e-6;

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Vec3 = Vec3 { x: 1.0, y: 1.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    pub fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
        a + (b - a) * t
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

/// 2D Vector (for texture coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Homogeneous position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// A point (w = 1)
    pub fn point(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z, w: 1.0 }
    }

    pub fn lerp(a: Vec4, b: Vec4, t: f32) -> Vec4 {
        Vec4 {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            z: a.z + (b.z - a.z) * t,
            w: a.w + (b.w - a.w) * t,
        }
    }

    /// Perspective divide in place. Returns false (leaving the vector
    /// untouched) when w is too close to zero to divide by.
    pub fn divide_by_w(&mut self) -> bool {
        if !self.w.is_finite() || self.w.abs() < EPSILON {
            return false;
        }
        let inv = 1.0 / self.w;
        self.x *= inv;
        self.y *= inv;
        self.z *= inv;
        self.w = 1.0;
        true
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

impl Add for Vec4 {
    type Output = Vec4;
    fn add(self, other: Vec4) -> Vec4 {
        Vec4::new(self.x + other.x, self.y + other.y, self.z + other.z, self.w + other.w)
    }
}

/// 4x4 matrix, `m[row][col]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    pub fn translation(t: Vec3) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0][3] = t.x;
        out.m[1][3] = t.y;
        out.m[2][3] = t.z;
        out
    }

    pub fn scale(s: Vec3) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0][0] = s.x;
        out.m[1][1] = s.y;
        out.m[2][2] = s.z;
        out
    }

    /// Rotation of `degrees` around `axis` (right-handed)
    pub fn rotation(degrees: f32, axis: Vec3) -> Self {
        let a = axis.normalize();
        let (s, c) = degrees.to_radians().sin_cos();
        let t = 1.0 - c;

        let mut out = Self::IDENTITY;
        out.m[0][0] = t * a.x * a.x + c;
        out.m[0][1] = t * a.x * a.y - s * a.z;
        out.m[0][2] = t * a.x * a.z + s * a.y;

        out.m[1][0] = t * a.x * a.y + s * a.z;
        out.m[1][1] = t * a.y * a.y + c;
        out.m[1][2] = t * a.y * a.z - s * a.x;

        out.m[2][0] = t * a.x * a.z - s * a.y;
        out.m[2][1] = t * a.y * a.z + s * a.x;
        out.m[2][2] = t * a.z * a.z + c;
        out
    }

    /// Perspective projection, `fov` is the vertical field of view in degrees
    pub fn perspective(znear: f32, zfar: f32, aspect: f32, fov: f32) -> Self {
        let f = 1.0 / (fov.to_radians() * 0.5).tan();
        let mut out = Mat4 { m: [[0.0; 4]; 4] };
        out.m[0][0] = f / aspect;
        out.m[1][1] = f;
        out.m[2][2] = (zfar + znear) / (znear - zfar);
        out.m[2][3] = (2.0 * zfar * znear) / (znear - zfar);
        out.m[3][2] = -1.0;
        out
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, other: Mat4) -> Mat4 {
        let mut out = Mat4 { m: [[0.0; 4]; 4] };
        for row in 0..4 {
            for col in 0..4 {
                out.m[row][col] = (0..4).map(|k| self.m[row][k] * other.m[k][col]).sum();
            }
        }
        out
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    fn mul(self, v: Vec4) -> Vec4 {
        let r = |row: usize| {
            self.m[row][0] * v.x + self.m[row][1] * v.y + self.m[row][2] * v.z + self.m[row][3] * v.w
        };
        Vec4::new(r(0), r(1), r(2), r(3))
    }
}

/// Signed area of a screen-space triangle (shoelace formula).
/// Positive for counter-clockwise winding with y up. The viewport does not
/// flip y, so positive area is the front face in screen space too.
pub fn triangle_area(a: Vec4, b: Vec4, c: Vec4) -> f32 {
    let area = (a.x * b.y + b.x * c.y + c.x * a.y) - (b.x * a.y + c.x * b.y + a.x * c.y);
    area * 0.5
}

/// Barycentric weights of `p` in triangle (a, b, c) from sub-triangle areas.
/// The area opposite a vertex weights that vertex. Returns None for
/// degenerate triangles.
pub fn barycentric_weights(a: Vec4, b: Vec4, c: Vec4, p: Vec4) -> Option<[f32; 3]> {
    let area = triangle_area(a, b, c);
    if !area.is_finite() || area.abs() < EPSILON {
        return None;
    }
    let recip = 1.0 / area.abs();
    let alpha = triangle_area(b, p, c).abs() * recip;
    let beta = triangle_area(c, p, a).abs() * recip;
    let gamma = triangle_area(a, p, b).abs() * recip;
    Some([alpha, beta, gamma])
}
