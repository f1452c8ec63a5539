//! Core rendering functions
//! Framebuffer management, primitive dispatch and point/line/triangle fill

use super::clip::{clip_line, clip_triangle, ClipVertex};
use super::math::{barycentric_weights, triangle_area, Mat4, Vec3, Vec4, EPSILON};
use super::mesh::{RenderObject, Topology};
use super::texture::Texture;
use super::types::{Color, FilterMode};
use crate::config::RasterConfig;

/// Depth value of a cleared depth buffer (farthest)
pub const DEPTH_CLEAR: u16 = u16::MAX;

/// Smallest UV change per pixel fed to the mip selector's log2
pub const MIN_UV_CHANGE: f32 = 1.0e-6;

/// Double-buffered RGBA framebuffer with a shared 16-bit depth buffer
pub struct Framebuffer {
    buffers: [Vec<u8>; 2], // RGBA, 4 bytes per pixel
    depth: Vec<u16>,
    current: usize,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let mut fb = Self {
            buffers: [Vec::new(), Vec::new()],
            depth: Vec::new(),
            current: 0,
            width: 0,
            height: 0,
        };
        fb.resize(width, height);
        fb
    }

    /// Reallocate both color buffers and the depth buffer. New storage is
    /// built first and swapped in as a whole.
    pub fn resize(&mut self, width: usize, height: usize) {
        let area = width * height;
        let buffers = [
            Color::BLACK.to_bytes().repeat(area),
            Color::BLACK.to_bytes().repeat(area),
        ];
        let depth = vec![DEPTH_CLEAR; area];

        *self = Self {
            buffers,
            depth,
            current: self.current,
            width,
            height,
        };
    }

    /// Clear the draw buffer to opaque black and the depth buffer to far
    pub fn clear(&mut self) {
        let bytes = Color::BLACK.to_bytes();
        for px in self.buffers[self.current].chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
        self.depth.fill(DEPTH_CLEAR);
    }

    /// Present the draw buffer and start drawing into the other one
    pub fn swap(&mut self) {
        self.current ^= 1;
    }

    /// Buffer currently being drawn into
    pub fn current_buffer(&self) -> &[u8] {
        &self.buffers[self.current]
    }

    /// Buffer presented by the last swap
    pub fn presented_buffer(&self) -> &[u8] {
        &self.buffers[self.current ^ 1]
    }

    /// Index (0 or 1) of the draw buffer
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn depth_buffer(&self) -> &[u16] {
        &self.depth
    }

    /// Pixel of the draw buffer
    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            let px = &self.buffers[self.current][idx..idx + 4];
            Some(Color::from_bytes([px[0], px[1], px[2], px[3]]))
        } else {
            None
        }
    }

    pub fn depth(&self, x: usize, y: usize) -> Option<u16> {
        if x < self.width && y < self.height {
            Some(self.depth[y * self.width + x])
        } else {
            None
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }

    /// Less-or-equal depth test. The incoming depth is truncated to an
    /// integer; on pass the stored value is replaced. Out-of-bounds pixels
    /// and non-finite depths fail.
    pub fn depth_test(&mut self, x: i32, y: i32, depth: f32) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        if !depth.is_finite() {
            return false;
        }
        let value = depth as u32;
        if value > self.depth[idx] as u32 {
            return false;
        }
        self.depth[idx] = value as u16;
        true
    }

    /// Alpha-blend `color` over the draw buffer; out-of-bounds writes are dropped
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let buf = &mut self.buffers[self.current][idx * 4..idx * 4 + 4];
        let dest = Color::from_bytes([buf[0], buf[1], buf[2], buf[3]]);
        buf.copy_from_slice(&color.blend_over(dest).to_bytes());
    }
}

/// Per-draw state: what the fill routines need besides the framebuffer
#[derive(Clone, Copy)]
struct DrawState<'a> {
    texture: Option<&'a Texture>,
    filter: FilterMode,
}

impl DrawState<'_> {
    /// Base-level sample using the active filter
    fn sample(&self, tex: &Texture, uv: Vec3) -> Color {
        match self.filter {
            FilterMode::Bilinear => tex.sample_bilinear(uv),
            FilterMode::Nearest | FilterMode::MipNearest => tex.sample_nearest(uv, 0),
        }
    }
}

/// Software rasterizer: owns the framebuffer, the cached transforms and the
/// filter mode. Meshes and textures are borrowed per draw call.
pub struct Rasterizer {
    fb: Framebuffer,
    view: Mat4,
    projection: Mat4,
    view_proj: Mat4,
    port: Mat4,
    filter: FilterMode,
}

impl Rasterizer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            fb: Framebuffer::new(width, height),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            view_proj: Mat4::IDENTITY,
            port: port_matrix(width, height),
            filter: FilterMode::default(),
        }
    }

    pub fn from_config(config: &RasterConfig) -> Self {
        let mut r = Self::new(config.width, config.height);
        r.filter = config.filter;
        r
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    pub fn width(&self) -> usize {
        self.fb.width
    }

    pub fn height(&self) -> usize {
        self.fb.height
    }

    pub fn clear_buffers(&mut self) {
        self.fb.clear();
    }

    pub fn swap_buffers(&mut self) {
        self.fb.swap();
        log::trace!("presented buffer {}", self.fb.current_index() ^ 1);
    }

    pub fn set_view_matrix(&mut self, m: Mat4) {
        self.view = m;
        self.view_proj = self.projection * self.view;
    }

    pub fn set_projection_matrix(&mut self, m: Mat4) {
        self.projection = m;
        self.view_proj = self.projection * self.view;
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn view_proj_matrix(&self) -> Mat4 {
        self.view_proj
    }

    /// Resize the framebuffer and recompute the viewport transform together
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.fb.width && height == self.fb.height {
            return;
        }
        self.fb.resize(width, height);
        self.port = port_matrix(width, height);
        log::debug!("rasterizer resized to {}x{}", width, height);
    }

    pub fn texture_filter(&self) -> FilterMode {
        self.filter
    }

    pub fn set_texture_filter(&mut self, filter: FilterMode) {
        self.filter = filter;
    }

    /// Cycle Nearest -> Bilinear -> MipNearest -> Nearest
    pub fn switch_texture_filter(&mut self) -> FilterMode {
        self.filter = self.filter.next();
        log::debug!("texture filter: {:?}", self.filter);
        self.filter
    }

    /// Rasterize one render object according to its mesh topology
    pub fn draw_object(&mut self, obj: &RenderObject) {
        let mesh = obj.mesh;
        let n = mesh.len();
        if n == 0 {
            return;
        }

        let state = DrawState {
            texture: obj.texture,
            filter: self.filter,
        };
        let mvp = self.view_proj * obj.model;
        let vertex = |i: usize| {
            let t = mesh.tex_coords()[i];
            ClipVertex::new(
                mvp * mesh.positions()[i],
                mesh.colors()[i],
                Vec3::new(t.x, t.y, 1.0),
            )
        };

        match mesh.topology() {
            Topology::Points => {
                for &p in mesh.positions() {
                    self.plot_point(mvp * p);
                }
            }
            Topology::Lines => {
                for i in (0..n.saturating_sub(1)).step_by(2) {
                    self.draw_line(vertex(i), vertex(i + 1), &state);
                }
            }
            Topology::LineStrip => {
                for i in 0..n.saturating_sub(1) {
                    self.draw_line(vertex(i), vertex(i + 1), &state);
                }
            }
            Topology::LineLoop => {
                if n >= 3 {
                    for i in 0..n {
                        self.draw_line(vertex(i), vertex((i + 1) % n), &state);
                    }
                }
            }
            Topology::Triangles => {
                for i in (0..n / 3).map(|t| t * 3) {
                    self.draw_triangle(vertex(i), vertex(i + 1), vertex(i + 2), &state);
                }
            }
            Topology::TriangleFan => {
                if n >= 3 {
                    let hub = vertex(0);
                    for i in 1..n - 1 {
                        self.draw_triangle(hub, vertex(i), vertex(i + 1), &state);
                    }
                }
            }
            Topology::TriangleStrip => {
                if n >= 3 {
                    for i in 0..n - 2 {
                        if i % 2 == 0 {
                            self.draw_triangle(vertex(i), vertex(i + 1), vertex(i + 2), &state);
                        } else {
                            self.draw_triangle(vertex(i + 2), vertex(i + 1), vertex(i), &state);
                        }
                    }
                }
            }
        }
        log::trace!("drew {:?} mesh with {} vertices", mesh.topology(), n);
    }

    /// Plot a white pixel for a clip-space point. No clipping or depth test.
    fn plot_point(&mut self, clip: Vec4) {
        let mut ndc = clip;
        if !ndc.divide_by_w() {
            return;
        }
        let screen = self.port * ndc;
        if !screen.is_finite() {
            return;
        }
        self.fb.blend_pixel(screen.x.floor() as i32, screen.y.floor() as i32, Color::WHITE);
    }

    /// Clip, divide and rasterize a clip-space line
    fn draw_line(&mut self, mut a: ClipVertex, mut b: ClipVertex, state: &DrawState) {
        if !clip_line(&mut a, &mut b) {
            return;
        }
        if !a.divide_by_w() || !b.divide_by_w() {
            return;
        }
        let sa = self.port * a.pos;
        let sb = self.port * b.pos;
        self.scan_line(sa, sb, (a.color, b.color), (a.tex, b.tex), state);
    }

    /// Step along the major axis of a screen-space line, accumulating error
    /// on the minor axis. The end pixel is not drawn.
    fn scan_line(
        &mut self,
        v0: Vec4,
        v1: Vec4,
        colors: (Color, Color),
        texs: (Vec3, Vec3),
        state: &DrawState,
    ) {
        if !v0.is_finite() || !v1.is_finite() {
            return;
        }
        let dx = v1.x - v0.x;
        let dy = v1.y - v0.y;
        let x_dir = if dx < 0.0 { -1 } else { 1 };
        let y_dir = if dy < 0.0 { -1 } else { 1 };

        let steep = dy.abs() > dx.abs();
        let (slope, range, major_dir, minor_dir) = if steep {
            (dx / dy, dy.abs() as i32, y_dir, x_dir)
        } else {
            (dy / dx, dx.abs() as i32, x_dir, y_dir)
        };
        if range <= 0 {
            return;
        }

        let mut x = v0.x as i32;
        let mut y = v0.y as i32;
        let abs_slope = slope.abs();
        let recip_range = 1.0 / range as f32;
        let mut error = 0.0f32;

        for i in 0..range {
            let t = i as f32 * recip_range;
            let depth = v0.z + (v1.z - v0.z) * t;

            if self.fb.depth_test(x, y, depth) {
                let color = match state.texture {
                    Some(tex) => {
                        let sub = Vec3::lerp(texs.0, texs.1, t);
                        perspective_uv(sub).map(|uv| state.sample(tex, uv))
                    }
                    None => Some(Color::lerp(colors.0, colors.1, t)),
                };
                if let Some(color) = color {
                    self.fb.blend_pixel(x, y, color);
                }
            }

            error += abs_slope;
            let (major, minor) = if steep { (&mut y, &mut x) } else { (&mut x, &mut y) };
            if error > 0.5 {
                error -= 1.0;
                *minor += minor_dir;
            }
            *major += major_dir;
        }
    }

    /// Clip a clip-space triangle, divide, and fill the resulting fan
    fn draw_triangle(&mut self, a: ClipVertex, b: ClipVertex, c: ClipVertex, state: &DrawState) {
        let mut poly = clip_triangle(a, b, c);
        if poly.len() < 3 || !poly.divide_by_w() {
            return;
        }
        for [v0, v1, v2] in poly.triangles() {
            self.fill_triangle(&v0, &v1, &v2, state);
        }
    }

    /// Fill an NDC triangle: bounding box scan with area-based weights,
    /// back faces culled
    fn fill_triangle(&mut self, a: &ClipVertex, b: &ClipVertex, c: &ClipVertex, state: &DrawState) {
        let v0 = self.port * a.pos;
        let v1 = self.port * b.pos;
        let v2 = self.port * c.pos;

        let area = triangle_area(v0, v1, v2);
        if !area.is_finite() || area < EPSILON {
            return;
        }
        let area_recip = 1.0 / area;

        let Some((min_x, min_y, max_x, max_y)) = self.bounding_box(v0, v1, v2) else {
            return;
        };

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Vec4::new(x as f32, y as f32, 0.0, 1.0);

                let sub = [
                    triangle_area(v0, p, v1).abs(),
                    triangle_area(v1, p, v2).abs(),
                    triangle_area(v2, p, v0).abs(),
                ];
                let sum = sub[0] + sub[1] + sub[2];
                if sum > area + 1.0 || sum < 1.0 {
                    continue;
                }

                let w = [sub[1] * area_recip, sub[2] * area_recip, sub[0] * area_recip];
                let depth = v0.z * w[0] + v1.z * w[1] + v2.z * w[2];
                if !self.fb.depth_test(x, y, depth) {
                    continue;
                }

                let color = match state.texture {
                    Some(tex) => {
                        let sub_tex = weighted_tex([a.tex, b.tex, c.tex], w);
                        let Some(uv) = perspective_uv(sub_tex) else {
                            continue;
                        };
                        match state.filter {
                            FilterMode::MipNearest => {
                                let level = mip_level(tex, [v0, v1, v2], [a.tex, b.tex, c.tex], p, uv);
                                tex.sample_nearest(uv, level)
                            }
                            _ => state.sample(tex, uv),
                        }
                    }
                    None => Color::weighted([a.color, b.color, c.color], w),
                };
                self.fb.blend_pixel(x, y, color);
            }
        }
    }

    /// Screen-space bounding box clamped to the viewport, None if empty
    fn bounding_box(&self, v0: Vec4, v1: Vec4, v2: Vec4) -> Option<(i32, i32, i32, i32)> {
        let max_x = self.fb.width as f32 - 1.0;
        let max_y = self.fb.height as f32 - 1.0;

        let lo_x = v0.x.min(v1.x).min(v2.x).max(0.0);
        let lo_y = v0.y.min(v1.y).min(v2.y).max(0.0);
        let hi_x = v0.x.max(v1.x).max(v2.x).ceil().min(max_x);
        let hi_y = v0.y.max(v1.y).max(v2.y).ceil().min(max_y);

        if hi_x < lo_x || hi_y < lo_y {
            return None;
        }
        Some((lo_x as i32, lo_y as i32, hi_x as i32, hi_y as i32))
    }
}

/// Viewport transform from NDC to pixels, depth mapped onto 0..=65535
fn port_matrix(width: usize, height: usize) -> Mat4 {
    let z_scale = (u16::MAX as f32) * 0.5;
    let half = Vec3::new(
        (width as f32 - 1.0) * 0.5,
        (height as f32 - 1.0) * 0.5,
        z_scale,
    );
    Mat4::translation(half) * Mat4::scale(half)
}

fn weighted_tex(t: [Vec3; 3], w: [f32; 3]) -> Vec3 {
    t[0].scale(w[0]) + t[1].scale(w[1]) + t[2].scale(w[2])
}

/// Recover (u, v) from an interpolated (u/w, v/w, 1/w)
fn perspective_uv(t: Vec3) -> Option<Vec3> {
    if !t.z.is_finite() || t.z.abs() < EPSILON {
        return None;
    }
    let uv = Vec3::new(t.x / t.z, t.y / t.z, 1.0);
    if uv.x.is_finite() && uv.y.is_finite() {
        Some(uv)
    } else {
        None
    }
}

/// Pick a mip level from the UV change one pixel right and one pixel down.
///
/// `detail = floor(|log2(max change)|)` counts halvings from one whole
/// texture per pixel; level 0 (finest) is chosen once that reaches the
/// length of the chain.
fn mip_level(tex: &Texture, screen: [Vec4; 3], texs: [Vec3; 3], p: Vec4, uv: Vec3) -> usize {
    let uv_at = |q: Vec4| {
        barycentric_weights(screen[0], screen[1], screen[2], q)
            .and_then(|w| perspective_uv(weighted_tex(texs, w)))
    };

    let dx = uv_at(p + Vec4::new(1.0, 0.0, 0.0, 0.0));
    let dy = uv_at(p + Vec4::new(0.0, 1.0, 0.0, 0.0));

    let mut max_change = 0.0f32;
    for d in [dx, dy].into_iter().flatten() {
        max_change = max_change.max((d.x - uv.x).abs()).max((d.y - uv.y).abs());
    }
    let max_change = max_change.max(MIN_UV_CHANGE);

    let detail = max_change.log2().abs().floor() as usize;
    (tex.mip_count() - 1).saturating_sub(detail)
}
