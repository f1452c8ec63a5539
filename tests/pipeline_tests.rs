//! End-to-end tests through the public rasterizer API

use softraster::{
    Color, FilterMode, Mat4, Mesh, RasterConfig, Rasterizer, RenderObject, Texture, Topology,
    Vec2, Vec3, Vec4,
};

fn mesh(topology: Topology, points: &[(f32, f32, f32)], color: Color) -> Mesh {
    let positions: Vec<Vec4> = points.iter().map(|&(x, y, z)| Vec4::new(x, y, z, 1.0)).collect();
    let n = positions.len();
    Mesh::new(topology, positions, vec![color; n], vec![Vec2::default(); n]).unwrap()
}

/// Counter-clockwise triangle around the centre of NDC
fn center_triangle(z: f32, color: Color) -> Mesh {
    mesh(
        Topology::Triangles,
        &[(-0.5, -0.5, z), (0.5, -0.5, z), (0.0, 0.5, z)],
        color,
    )
}

fn lit_count(r: &Rasterizer) -> usize {
    let fb = r.framebuffer();
    let mut n = 0;
    for y in 0..fb.height {
        for x in 0..fb.width {
            if fb.pixel(x, y) != Some(Color::BLACK) {
                n += 1;
            }
        }
    }
    n
}

#[test]
fn test_red_triangle_inside_and_outside() {
    let mut r = Rasterizer::new(32, 32);
    r.clear_buffers();
    let tri = center_triangle(0.0, Color::RED);
    r.draw_object(&RenderObject::new(&tri));

    let fb = r.framebuffer();
    assert_eq!(fb.pixel(15, 15), Some(Color::RED));
    for (x, y) in [(0, 0), (31, 0), (0, 31), (31, 31), (2, 20)] {
        assert_eq!(fb.pixel(x, y), Some(Color::BLACK), "pixel ({}, {})", x, y);
    }
    assert!(fb.depth(15, 15).unwrap() < 0xFFFF);
    assert_eq!(fb.depth(0, 0), Some(0xFFFF));
}

#[test]
fn test_clear_resets_color_and_depth() {
    let mut r = Rasterizer::new(16, 8);
    let tri = center_triangle(0.0, Color::GREEN);
    r.draw_object(&RenderObject::new(&tri));
    assert!(lit_count(&r) > 0);

    r.clear_buffers();
    let fb = r.framebuffer();
    assert!(fb.current_buffer().chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
    assert!(fb.depth_buffer().iter().all(|&d| d == 0xFFFF));
}

#[test]
fn test_resize_then_clear_matches_new_size() {
    let mut r = Rasterizer::new(32, 32);
    r.resize(17, 9);
    r.clear_buffers();

    assert_eq!(r.width(), 17);
    assert_eq!(r.height(), 9);
    let fb = r.framebuffer();
    assert_eq!(fb.current_buffer().len(), 17 * 9 * 4);
    assert_eq!(fb.presented_buffer().len(), 17 * 9 * 4);
    assert_eq!(fb.depth_buffer().len(), 17 * 9);

    // the viewport follows the new size
    let point = Mesh::points(&[Vec3::new(1.0, 1.0, 0.0)]);
    r.draw_object(&RenderObject::new(&point));
    assert_eq!(r.framebuffer().pixel(16, 8), Some(Color::WHITE));
}

#[test]
fn test_short_meshes_draw_nothing() {
    let mut r = Rasterizer::new(16, 16);
    r.clear_buffers();
    let two = [(-0.5, -0.5, 0.0), (0.5, -0.5, 0.0)];

    for topology in [Topology::TriangleStrip, Topology::TriangleFan, Topology::LineLoop, Topology::Triangles] {
        r.draw_object(&RenderObject::new(&mesh(topology, &two, Color::WHITE)));
    }
    r.draw_object(&RenderObject::new(&mesh(Topology::LineStrip, &two[..1], Color::WHITE)));
    r.draw_object(&RenderObject::new(&Mesh::points(&[])));

    assert_eq!(lit_count(&r), 0);
}

#[test]
fn test_line_loop_closes() {
    let pts = [
        Vec3::new(-0.5, -0.5, 0.0),
        Vec3::new(0.5, -0.5, 0.0),
        Vec3::new(0.5, 0.5, 0.0),
    ];

    let mut r = Rasterizer::new(33, 33);
    r.clear_buffers();
    r.draw_object(&RenderObject::new(&Mesh::line_strip(&pts)));
    // (16, 16) lies on the closing diagonal only
    assert_eq!(r.framebuffer().pixel(16, 16), Some(Color::BLACK));
    assert_eq!(r.framebuffer().pixel(16, 8), Some(Color::WHITE));

    r.clear_buffers();
    r.draw_object(&RenderObject::new(&Mesh::line_loop(&pts)));
    assert_eq!(r.framebuffer().pixel(16, 16), Some(Color::WHITE));
    assert_eq!(r.framebuffer().pixel(24, 16), Some(Color::WHITE));
}

#[test]
fn test_lines_pair_vertices() {
    let mut r = Rasterizer::new(33, 33);
    r.clear_buffers();
    // trailing odd vertex ignored
    let m = mesh(
        Topology::Lines,
        &[(-0.5, 0.0, 0.0), (0.5, 0.0, 0.0), (0.0, -0.9, 0.0)],
        Color::BLUE,
    );
    r.draw_object(&RenderObject::new(&m));
    assert_eq!(lit_count(&r), 16);
    assert_eq!(r.framebuffer().pixel(8, 16), Some(Color::BLUE));
}

#[test]
fn test_two_vertex_line_strip_draws_one_segment() {
    let mut r = Rasterizer::new(33, 33);
    r.clear_buffers();
    let m = mesh(Topology::LineStrip, &[(-0.5, 0.0, 0.0), (0.5, 0.0, 0.0)], Color::WHITE);
    r.draw_object(&RenderObject::new(&m));
    assert_eq!(lit_count(&r), 16);
}

#[test]
fn test_texture_replaces_vertex_color() {
    let green = Texture::new(2, 2, vec![Color::GREEN; 4]).unwrap();
    let tri = Mesh::triangle();

    for filter in [FilterMode::Nearest, FilterMode::Bilinear, FilterMode::MipNearest] {
        let mut r = Rasterizer::new(32, 32);
        r.set_texture_filter(filter);
        r.clear_buffers();
        r.draw_object(&RenderObject::new(&tri).with_texture(&green));
        assert_eq!(r.framebuffer().pixel(15, 12), Some(Color::GREEN), "{:?}", filter);
    }
}

/// White mesh with explicit clip-space positions and texture coordinates
fn textured(topology: Topology, verts: &[(Vec4, Vec2)]) -> Mesh {
    let n = verts.len();
    Mesh::new(
        topology,
        verts.iter().map(|v| v.0).collect(),
        vec![Color::WHITE; n],
        verts.iter().map(|v| v.1).collect(),
    )
    .unwrap()
}

/// Columns red, green, blue, white; nearest sampling picks column trunc(u * 3)
fn column_texture() -> Texture {
    let row = [Color::RED, Color::GREEN, Color::BLUE, Color::WHITE];
    Texture::new(4, 2, row.iter().chain(row.iter()).copied().collect()).unwrap()
}

#[test]
fn test_uvs_are_perspective_correct() {
    // v1 sits three times further away than the other two corners
    let tri = textured(
        Topology::Triangles,
        &[
            (Vec4::new(-1.0, -1.0, 0.0, 1.0), Vec2::new(0.0, 0.0)),
            (Vec4::new(3.0, -3.0, 0.0, 3.0), Vec2::new(1.0, 0.0)),
            (Vec4::new(-1.0, 1.0, 0.0, 1.0), Vec2::new(0.0, 1.0)),
        ],
    );
    let tex = column_texture();

    let mut r = Rasterizer::new(33, 33);
    r.clear_buffers();
    r.draw_object(&RenderObject::new(&tri).with_texture(&tex));

    // halfway across the screen is only a quarter of the way across the
    // texture; screen-linear UVs would land in the green column
    assert_eq!(r.framebuffer().pixel(16, 1), Some(Color::RED));
    assert_eq!(r.framebuffer().pixel(31, 1), Some(Color::BLUE));
}

#[test]
fn test_mip_nearest_uses_coarser_level_when_minified() {
    // one-texel checker: every 2x2 block averages to mid grey
    let tex = Texture::checkerboard(64, 1, Color::WHITE, Color::BLACK).unwrap();
    // 64 texels squeezed into 32 pixels
    let tri = textured(
        Topology::Triangles,
        &[
            (Vec4::new(-1.0, -1.0, 0.0, 1.0), Vec2::new(0.0, 0.0)),
            (Vec4::new(1.0, -1.0, 0.0, 1.0), Vec2::new(1.0, 0.0)),
            (Vec4::new(-1.0, 1.0, 0.0, 1.0), Vec2::new(0.0, 1.0)),
        ],
    );

    let mut r = Rasterizer::new(33, 33);
    r.clear_buffers();
    r.draw_object(&RenderObject::new(&tri).with_texture(&tex));
    let base = r.framebuffer().pixel(4, 4);
    assert!(base == Some(Color::WHITE) || base == Some(Color::BLACK), "{:?}", base);

    r.set_texture_filter(FilterMode::MipNearest);
    r.clear_buffers();
    r.draw_object(&RenderObject::new(&tri).with_texture(&tex));
    assert_eq!(r.framebuffer().pixel(4, 4), Some(Color::new(128, 128, 128)));
}

#[test]
fn test_textured_line_samples_along_its_length() {
    let line = textured(
        Topology::Lines,
        &[
            (Vec4::new(-0.5, 0.0, 0.0, 1.0), Vec2::new(0.0, 0.0)),
            (Vec4::new(0.5, 0.0, 0.0, 1.0), Vec2::new(1.0, 0.0)),
        ],
    );
    let tex = column_texture();

    // mip-nearest falls back to the base level on lines
    for filter in [FilterMode::Nearest, FilterMode::MipNearest] {
        let mut r = Rasterizer::new(33, 33);
        r.set_texture_filter(filter);
        r.clear_buffers();
        r.draw_object(&RenderObject::new(&line).with_texture(&tex));

        let fb = r.framebuffer();
        assert_eq!(fb.pixel(8, 16), Some(Color::RED), "{:?}", filter);
        assert_eq!(fb.pixel(16, 16), Some(Color::GREEN), "{:?}", filter);
        assert_eq!(fb.pixel(23, 16), Some(Color::BLUE), "{:?}", filter);
        assert_eq!(fb.pixel(24, 16), Some(Color::BLACK), "{:?}", filter);
    }
}

#[test]
fn test_line_mesh_fades_red_to_blue() {
    let line = Mesh::line(Vec3::new(-0.5, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0));
    let mut r = Rasterizer::new(33, 33);
    r.clear_buffers();
    r.draw_object(&RenderObject::new(&line));

    let fb = r.framebuffer();
    assert_eq!(fb.pixel(8, 16), Some(Color::RED));
    let end = fb.pixel(23, 16).unwrap();
    assert!(end.b > 200 && end.r < 40, "{:?}", end);
}

#[test]
fn test_nearer_triangle_wins() {
    let near = center_triangle(-0.5, Color::BLUE);
    let far = center_triangle(0.5, Color::RED);

    let mut r = Rasterizer::new(32, 32);
    r.clear_buffers();
    r.draw_object(&RenderObject::new(&near));
    r.draw_object(&RenderObject::new(&far));
    assert_eq!(r.framebuffer().pixel(15, 15), Some(Color::BLUE));

    r.clear_buffers();
    r.draw_object(&RenderObject::new(&far));
    r.draw_object(&RenderObject::new(&near));
    assert_eq!(r.framebuffer().pixel(15, 15), Some(Color::BLUE));
}

#[test]
fn test_translucent_triangle_blends() {
    let half = center_triangle(0.0, Color::with_alpha(255, 255, 255, 128));
    let mut r = Rasterizer::new(32, 32);
    r.clear_buffers();
    r.draw_object(&RenderObject::new(&half));
    // (255 * 128 + 0 * 127) / 255 = 128, alpha (128 * 128 + 255 * 127) / 255 = 191
    assert_eq!(
        r.framebuffer().pixel(15, 15),
        Some(Color::with_alpha(128, 128, 128, 191))
    );
}

#[test]
fn test_model_matrix_moves_object_out_of_view() {
    let tri = center_triangle(0.0, Color::RED);
    let mut r = Rasterizer::new(32, 32);
    r.clear_buffers();
    r.draw_object(&RenderObject::new(&tri).with_model(Mat4::translation(Vec3::new(5.0, 0.0, 0.0))));
    assert_eq!(lit_count(&r), 0);
}

#[test]
fn test_clipped_triangle_still_fills_inside() {
    // pokes through the right edge of the view
    let tri = mesh(
        Topology::Triangles,
        &[(0.0, -0.5, 0.0), (3.0, -0.5, 0.0), (0.0, 0.5, 0.0)],
        Color::RED,
    );
    let mut r = Rasterizer::new(32, 32);
    r.clear_buffers();
    r.draw_object(&RenderObject::new(&tri));
    assert_eq!(r.framebuffer().pixel(30, 12), Some(Color::RED));
    assert_eq!(r.framebuffer().pixel(10, 15), Some(Color::BLACK));
}

#[test]
fn test_points_plot_white() {
    let mut r = Rasterizer::new(33, 33);
    r.clear_buffers();
    let pts = Mesh::points(&[Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)]);
    r.draw_object(&RenderObject::new(&pts));
    assert_eq!(r.framebuffer().pixel(16, 16), Some(Color::WHITE));
    assert_eq!(lit_count(&r), 1);
}

#[test]
fn test_swap_presents_drawn_frame() {
    let mut r = Rasterizer::new(32, 32);
    r.clear_buffers();
    let tri = center_triangle(0.0, Color::RED);
    r.draw_object(&RenderObject::new(&tri));
    r.swap_buffers();

    let fb = r.framebuffer();
    let idx = (15 * 32 + 15) * 4;
    assert_eq!(&fb.presented_buffer()[idx..idx + 4], &[255, 0, 0, 255]);
    assert_eq!(fb.pixel(15, 15), Some(Color::BLACK));
}

#[test]
fn test_view_projection_cached() {
    let mut r = Rasterizer::new(8, 8);
    let view = Mat4::translation(Vec3::new(1.0, 2.0, 3.0));
    let proj = Mat4::scale(Vec3::new(2.0, 2.0, 2.0));

    r.set_view_matrix(view);
    assert_eq!(r.view_proj_matrix(), view);
    r.set_projection_matrix(proj);
    assert_eq!(r.view_matrix(), view);
    assert_eq!(r.view_proj_matrix(), proj * view);
}

#[test]
fn test_filter_cycle_and_config() {
    let config = RasterConfig::from_ron("(width: 64, filter: Bilinear)").unwrap();
    let mut r = Rasterizer::from_config(&config);
    assert_eq!((r.width(), r.height()), (64, 240));
    assert_eq!(r.texture_filter(), FilterMode::Bilinear);

    assert_eq!(r.switch_texture_filter(), FilterMode::MipNearest);
    assert_eq!(r.switch_texture_filter(), FilterMode::Nearest);
    assert_eq!(r.switch_texture_filter(), FilterMode::Bilinear);
}
