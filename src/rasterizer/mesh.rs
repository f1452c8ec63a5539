//! Meshes and render objects
//!
//! A mesh is an immutable bag of parallel attribute arrays tagged with a
//! topology. Render objects borrow a mesh (and optionally a texture) and
//! place it in the world with their own model matrix.

use std::fs;
use std::path::Path;

use super::math::{Mat4, Vec2, Vec3, Vec4};
use super::texture::Texture;
use super::types::Color;
use crate::error::{RasterError, RasterResult};

/// How a mesh's vertex array groups into primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// One pixel per vertex
    Points,
    /// Independent segments (0,1), (2,3), ...
    Lines,
    /// Connected segments (0,1), (1,2), ...
    LineStrip,
    /// Line strip closed from the last vertex back to the first
    LineLoop,
    /// Independent triangles (0,1,2), (3,4,5), ...
    Triangles,
    /// Triangles sharing vertex 0: (0,1,2), (0,2,3), ...
    TriangleFan,
    /// Sliding triples with alternating winding
    TriangleStrip,
}

/// Geometry to rasterize
#[derive(Debug, Clone)]
pub struct Mesh {
    topology: Topology,
    positions: Vec<Vec4>,
    colors: Vec<Color>,
    tex_coords: Vec<Vec2>,
}

impl Mesh {
    /// Build a mesh; all attribute arrays must have the same length
    pub fn new(
        topology: Topology,
        positions: Vec<Vec4>,
        colors: Vec<Color>,
        tex_coords: Vec<Vec2>,
    ) -> RasterResult<Self> {
        if positions.len() != colors.len() || positions.len() != tex_coords.len() {
            return Err(RasterError::MeshAttributeMismatch {
                positions: positions.len(),
                colors: colors.len(),
                tex_coords: tex_coords.len(),
            });
        }
        Ok(Self {
            topology,
            positions,
            colors,
            tex_coords,
        })
    }

    /// Mesh with a single color and zeroed texture coordinates
    fn uniform(topology: Topology, points: &[Vec3], color: Color) -> Self {
        Self {
            topology,
            positions: points.iter().map(|&p| Vec4::point(p)).collect(),
            colors: vec![color; points.len()],
            tex_coords: vec![Vec2::default(); points.len()],
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec4] {
        &self.positions
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn tex_coords(&self) -> &[Vec2] {
        &self.tex_coords
    }

    /// A single segment fading from red to blue
    pub fn line(from: Vec3, to: Vec3) -> Self {
        Self {
            topology: Topology::Lines,
            positions: vec![Vec4::point(from), Vec4::point(to)],
            colors: vec![Color::RED, Color::BLUE],
            tex_coords: vec![Vec2::default(); 2],
        }
    }

    pub fn points(points: &[Vec3]) -> Self {
        Self::uniform(Topology::Points, points, Color::WHITE)
    }

    pub fn line_strip(points: &[Vec3]) -> Self {
        Self::uniform(Topology::LineStrip, points, Color::WHITE)
    }

    pub fn line_loop(points: &[Vec3]) -> Self {
        Self::uniform(Topology::LineLoop, points, Color::WHITE)
    }

    /// Red/green/blue triangle with texture coordinates
    pub fn triangle() -> Self {
        Self {
            topology: Topology::Triangles,
            positions: vec![
                Vec4::new(0.5, -0.5, 0.0, 1.0),
                Vec4::new(0.0, 0.5, 0.0, 1.0),
                Vec4::new(-0.5, -0.5, 0.0, 1.0),
            ],
            colors: vec![Color::RED, Color::GREEN, Color::BLUE],
            tex_coords: vec![Vec2::new(0.0, 0.0), Vec2::new(0.5, 1.0), Vec2::new(1.0, 0.0)],
        }
    }

    /// Triangle fan around `points[0]`. Colors repeat if fewer are given;
    /// texture coordinates map the fan's xy bounds onto [0, 1].
    pub fn fan(points: &[Vec3], colors: &[Color]) -> Self {
        let (mut min, mut max) = (Vec2::new(f32::MAX, f32::MAX), Vec2::new(f32::MIN, f32::MIN));
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        let span = Vec2::new((max.x - min.x).max(f32::EPSILON), (max.y - min.y).max(f32::EPSILON));

        Self {
            topology: Topology::TriangleFan,
            positions: points.iter().map(|&p| Vec4::point(p)).collect(),
            colors: (0..points.len())
                .map(|i| {
                    if colors.is_empty() {
                        Color::WHITE
                    } else {
                        colors[i % colors.len()]
                    }
                })
                .collect(),
            tex_coords: points
                .iter()
                .map(|p| Vec2::new((p.x - min.x) / span.x, (p.y - min.y) / span.y))
                .collect(),
        }
    }

    /// Load a mesh in the plain-text format described in [`Mesh::from_mesh_str`]
    pub fn load<P: AsRef<Path>>(path: P) -> RasterResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_mesh_str(&contents)
    }

    /// Parse a whitespace-separated triangle list:
    ///
    /// ```text
    /// count has_tex has_color
    /// x y z        (count times)
    /// r g b a      (count times, if has_color)
    /// u v          (count times, if has_tex)
    /// ```
    pub fn from_mesh_str(s: &str) -> RasterResult<Self> {
        let mut tokens = s.split_whitespace();
        let mut next = |what: &str| {
            tokens
                .next()
                .ok_or_else(|| RasterError::MeshParse(format!("unexpected end of input reading {}", what)))
        };

        let count: usize = parse(next("vertex count")?)?;
        let has_tex = parse::<u32>(next("texture flag")?)? != 0;
        let has_color = parse::<u32>(next("color flag")?)? != 0;

        let mut positions = Vec::with_capacity(count);
        for _ in 0..count {
            let x = parse(next("position")?)?;
            let y = parse(next("position")?)?;
            let z = parse(next("position")?)?;
            positions.push(Vec4::new(x, y, z, 1.0));
        }

        let mut colors = vec![Color::WHITE; count];
        if has_color {
            for c in colors.iter_mut() {
                let mut ch = || -> RasterResult<u8> { parse(next("color")?) };
                *c = Color::with_alpha(ch()?, ch()?, ch()?, ch()?);
            }
        }

        let mut tex_coords = vec![Vec2::default(); count];
        if has_tex {
            for t in tex_coords.iter_mut() {
                let u = parse(next("tex coord")?)?;
                let v = parse(next("tex coord")?)?;
                *t = Vec2::new(u, v);
            }
        }

        Self::new(Topology::Triangles, positions, colors, tex_coords)
    }
}

fn parse<T: std::str::FromStr>(token: &str) -> RasterResult<T> {
    token
        .parse()
        .map_err(|_| RasterError::MeshParse(format!("invalid token '{}'", token)))
}

/// A mesh placed in the world, optionally textured
#[derive(Debug, Clone, Copy)]
pub struct RenderObject<'a> {
    pub mesh: &'a Mesh,
    pub model: Mat4,
    pub texture: Option<&'a Texture>,
}

impl<'a> RenderObject<'a> {
    pub fn new(mesh: &'a Mesh) -> Self {
        Self {
            mesh,
            model: Mat4::IDENTITY,
            texture: None,
        }
    }

    pub fn with_model(mut self, model: Mat4) -> Self {
        self.model = model;
        self
    }

    pub fn with_texture(mut self, texture: &'a Texture) -> Self {
        self.texture = Some(texture);
        self
    }
}
