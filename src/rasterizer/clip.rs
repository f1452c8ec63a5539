//! Homogeneous clip-space clipping
//!
//! Vertices arrive after the model-view-projection transform and before the
//! perspective divide. Lines are clipped Cohen–Sutherland style, one plane
//! at a time; triangles go through Sutherland–Hodgman against all six planes
//! and come out as a convex polygon ready to be fanned into triangles.

use super::math::{Vec3, Vec4};
use super::types::Color;

pub const INSIDE: u8 = 0;
pub const LEFT: u8 = 1;
pub const RIGHT: u8 = 2;
pub const BOTTOM: u8 = 4;
pub const TOP: u8 = 8;
pub const NEAR: u8 = 16;
pub const FAR: u8 = 32;

/// The six frustum planes in the order they are clipped against
pub const PLANES: [u8; 6] = [LEFT, RIGHT, BOTTOM, TOP, NEAR, FAR];

/// Upper bound on the working polygon. Clipping a triangle against six
/// planes adds at most one vertex per plane, so 9 is the real maximum.
pub const MAX_CLIP_VERTS: usize = 15;

/// Attributes carried through clipping.
///
/// `tex` holds (u, v, 1) while in clip space and (u/w, v/w, 1/w) after
/// [`ClipPolygon::divide_by_w`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClipVertex {
    pub pos: Vec4,
    pub color: Color,
    pub tex: Vec3,
}

impl ClipVertex {
    pub fn new(pos: Vec4, color: Color, tex: Vec3) -> Self {
        Self { pos, color, tex }
    }

    pub fn lerp(a: &ClipVertex, b: &ClipVertex, t: f32) -> ClipVertex {
        ClipVertex {
            pos: Vec4::lerp(a.pos, b.pos, t),
            color: Color::lerp(a.color, b.color, t),
            tex: Vec3::lerp(a.tex, b.tex, t),
        }
    }

    /// Perspective divide of position and texture coordinate
    pub fn divide_by_w(&mut self) -> bool {
        let w = self.pos.w;
        if !self.pos.divide_by_w() {
            return false;
        }
        self.tex = Vec3::new(self.tex.x, self.tex.y, 1.0).scale(1.0 / w);
        true
    }
}

/// Which planes `v` lies outside of
pub fn outcode(v: Vec4) -> u8 {
    let mut code = INSIDE;

    if v.x < -v.w {
        code |= LEFT;
    } else if v.x > v.w {
        code |= RIGHT;
    }
    if v.y < -v.w {
        code |= BOTTOM;
    } else if v.y > v.w {
        code |= TOP;
    }
    if v.z < -v.w {
        code |= NEAR;
    } else if v.z > v.w {
        code |= FAR;
    }
    code
}

/// Distance along a→b at which the segment meets `plane`, at most 1.0
pub fn clip_ratio(a: Vec4, b: Vec4, plane: u8) -> f32 {
    // negative planes: x = -w, positive planes: x = w
    let ratio = match plane {
        LEFT => (-a.w - a.x) / ((b.x - a.x) + b.w - a.w),
        RIGHT => (a.w - a.x) / ((b.x - a.x) - b.w + a.w),
        BOTTOM => (-a.w - a.y) / ((b.y - a.y) + b.w - a.w),
        TOP => (a.w - a.y) / ((b.y - a.y) - b.w + a.w),
        NEAR => (-a.w - a.z) / ((b.z - a.z) + b.w - a.w),
        FAR => (a.w - a.z) / ((b.z - a.z) - b.w + a.w),
        _ => 0.0,
    };
    ratio.min(1.0)
}

/// Cohen–Sutherland line clip. Endpoints outside a plane are moved onto it
/// in place; returns false if the segment is entirely outside.
pub fn clip_line(a: &mut ClipVertex, b: &mut ClipVertex) -> bool {
    for &plane in PLANES.iter() {
        let outside_a = outcode(a.pos) & plane != 0;
        let outside_b = outcode(b.pos) & plane != 0;

        if outside_a && outside_b {
            return false;
        }
        if !outside_a && !outside_b {
            continue;
        }

        let t = clip_ratio(a.pos, b.pos, plane);
        if outside_a {
            *a = ClipVertex::lerp(a, b, t);
        } else {
            *b = ClipVertex::lerp(a, b, t);
        }
    }
    true
}

/// Fixed-capacity convex polygon produced by [`clip_triangle`]
#[derive(Debug, Clone, Copy)]
pub struct ClipPolygon {
    verts: [ClipVertex; MAX_CLIP_VERTS],
    len: usize,
}

impl Default for ClipPolygon {
    fn default() -> Self {
        Self {
            verts: [ClipVertex::default(); MAX_CLIP_VERTS],
            len: 0,
        }
    }
}

impl ClipPolygon {
    pub fn from_triangle(v0: ClipVertex, v1: ClipVertex, v2: ClipVertex) -> Self {
        let mut poly = Self::default();
        poly.push(v0);
        poly.push(v1);
        poly.push(v2);
        poly
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn vertices(&self) -> &[ClipVertex] {
        &self.verts[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    fn push(&mut self, v: ClipVertex) {
        if self.len == MAX_CLIP_VERTS {
            log::warn!("clip polygon exceeded {} vertices, dropping vertex", MAX_CLIP_VERTS);
            return;
        }
        self.verts[self.len] = v;
        self.len += 1;
    }

    /// Perspective divide of every vertex. False if any w is unusable, in
    /// which case the polygon should be skipped.
    pub fn divide_by_w(&mut self) -> bool {
        self.verts[..self.len].iter_mut().all(|v| v.divide_by_w())
    }

    /// Fan triangulation from vertex 0
    pub fn triangles(&self) -> impl Iterator<Item = [ClipVertex; 3]> + '_ {
        let v = self.vertices();
        (2..v.len()).map(move |i| [v[0], v[i - 1], v[i]])
    }
}

/// Sutherland–Hodgman clip of a clip-space triangle against all six planes
pub fn clip_triangle(v0: ClipVertex, v1: ClipVertex, v2: ClipVertex) -> ClipPolygon {
    let mut polys = [ClipPolygon::from_triangle(v0, v1, v2), ClipPolygon::default()];
    let mut src = 0;

    for &plane in PLANES.iter() {
        let dst = 1 - src;
        let (head, tail) = polys.split_at_mut(1);
        let (input, output) = if src == 0 {
            (&head[0], &mut tail[0])
        } else {
            (&tail[0], &mut head[0])
        };
        output.clear();

        let verts = input.vertices();
        let Some(&last) = verts.last() else {
            break;
        };

        let mut prev = last;
        for &current in verts {
            let outside_cur = outcode(current.pos) & plane != 0;
            let outside_prev = outcode(prev.pos) & plane != 0;

            if outside_cur != outside_prev {
                let t = clip_ratio(current.pos, prev.pos, plane);
                output.push(ClipVertex::lerp(&current, &prev, t));
            }
            if !outside_cur {
                output.push(current);
            }
            prev = current;
        }

        src = dst;
    }

    polys[src]
}
