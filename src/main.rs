//! softraster demo: a small space scene drawn entirely on the CPU
//!
//! Controls:
//! - W/A/S/D or arrow keys: move the view up/left/down/right
//! - Q/E: move the view forward/back
//! - F: cycle texture filtering (nearest, bilinear, mip-nearest)
//!
//! Reads `softraster.ron` from the working directory if present.

use macroquad::prelude::{
    clear_background, draw_text, draw_texture_ex, get_time, is_key_down, is_key_pressed,
    next_frame, screen_height, screen_width, vec2, Conf, DrawTextureParams, KeyCode, Texture2D,
    WHITE,
};
use macroquad::rand::{gen_range, srand};

use softraster::logging::{init_logging, LoggingConfig};
use softraster::{
    Color, Mat4, Mesh, RasterConfig, Rasterizer, RenderObject, Texture, Topology, Vec2, Vec3,
    Vec4, VERSION,
};

const CONFIG_PATH: &str = "softraster.ron";
const WINDOW_SCALE: f32 = 3.0;
const MOVE_SCALE: f32 = 1.5;

const STARS: usize = 1500;
const STAR_DISTANCE: f32 = -300.0;
const ASTEROIDS: usize = 10;
const AST_SIZE: f32 = 4.0;
const DEBRIS_AMT: usize = 10;
const COMET_SPEED: f32 = -5.0;
const COMET_ROTATION: f32 = 10.0;

fn window_conf() -> Conf {
    let config = RasterConfig::load(CONFIG_PATH).unwrap_or_default();
    Conf {
        window_title: format!("{} v{}", config.title, VERSION),
        window_width: (config.width as f32 * WINDOW_SCALE) as i32,
        window_height: (config.height as f32 * WINDOW_SCALE) as i32,
        window_resizable: true,
        ..Default::default()
    }
}

/// Outline of the sun and comet fans, centre first
fn fan_outline() -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 3.0, 0.0),
        Vec3::new(-1.0, 3.0, 0.0),
        Vec3::new(-3.0, 1.0, 0.0),
        Vec3::new(-3.0, -1.0, 0.0),
        Vec3::new(-1.0, -3.0, 0.0),
        Vec3::new(1.0, -3.0, 0.0),
        Vec3::new(3.0, -1.0, 0.0),
        Vec3::new(3.0, 1.0, 0.0),
        Vec3::new(1.0, 3.0, 0.0),
    ]
}

/// Yellow core fading into translucent red
fn sun_colors() -> Vec<Color> {
    let mut colors = vec![Color::with_alpha(255, 255, 0, 255)];
    colors.extend((1..10).map(|i| Color::with_alpha(255, 0, 0, if i % 2 == 1 { 10 } else { 0 })));
    colors
}

fn debris_mesh() -> Mesh {
    let grey = Color::with_alpha(192, 192, 192, 255);
    let dark = Color::with_alpha(0, 0, 0, 125);
    let positions = [
        (0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, -1.5), (2.0, 0.5),
        (2.0, -1.0), (3.5, 0.5), (4.0, -0.5), (5.0, 2.0),
    ]
    .iter()
    .map(|&(x, y)| Vec4::new(x, y, 0.0, 1.0))
    .collect::<Vec<_>>();
    let colors = vec![grey, grey, dark, grey, grey, dark, grey, dark, grey];
    let count = positions.len();

    Mesh::new(Topology::TriangleStrip, positions, colors, vec![Vec2::default(); count])
        .unwrap_or_else(|e| {
            log::error!("debris mesh: {}", e);
            Mesh::points(&[])
        })
}

fn asteroid_mesh() -> Mesh {
    let ox = gen_range(-100.0, 100.0);
    let oy = gen_range(-100.0, 100.0);
    let oz = gen_range(-220.0, -200.0);
    let jitter = || gen_range(1.0, AST_SIZE);

    // eight points around the origin, 45 degrees apart
    let points: Vec<Vec3> = (0..8)
        .map(|i| {
            let angle = (i as f32 * 45.0).to_radians();
            let r = jitter();
            Vec3::new(ox + angle.cos() * r, oy + angle.sin() * r, oz)
        })
        .collect();
    Mesh::line_loop(&points)
}

fn load_comet_texture() -> Option<Texture> {
    match Texture::from_file("snow_2_m_gold.tga") {
        Ok(tex) => Some(tex),
        Err(e) => {
            log::info!("comet texture not loaded ({}), using a checkerboard", e);
            Texture::checkerboard(64, 8, Color::new(230, 190, 60), Color::new(90, 70, 20))
                .map_err(|e| log::error!("checkerboard texture: {}", e))
                .ok()
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    init_logging(LoggingConfig::default());

    let config = match RasterConfig::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            log::info!("using default config ({}: {})", CONFIG_PATH, e);
            RasterConfig::default()
        }
    };
    let mut r = Rasterizer::from_config(&config);
    srand(get_time().to_bits());

    // Scene meshes
    let star_points: Vec<Vec3> = (0..STARS)
        .map(|_| {
            Vec3::new(
                gen_range(-200.0, 200.0),
                gen_range(-200.0, 200.0),
                gen_range(-300.0, 200.0),
            )
        })
        .collect();
    let stars = Mesh::points(&star_points);
    let sun = Mesh::fan(&fan_outline(), &sun_colors());
    let rock = Mesh::fan(&fan_outline(), &[Color::WHITE]);
    let asteroids: Vec<Mesh> = (0..ASTEROIDS).map(|_| asteroid_mesh()).collect();
    let debris = debris_mesh();
    let ship = match Mesh::load("spaceship.mesh") {
        Ok(mesh) => Some(mesh),
        Err(e) => {
            log::info!("no ship mesh ({})", e);
            None
        }
    };
    let comet_texture = load_comet_texture();

    // Placement
    let star_model = Mat4::translation(Vec3::new(0.0, 0.0, STAR_DISTANCE));
    let sun_model = Mat4::translation(Vec3::new(30.0, -10.0, -100.0)) * Mat4::scale(Vec3::new(20.0, 20.0, 20.0));
    let comet_models = [
        Mat4::translation(Vec3::new(10.0, 20.0, -60.0)),
        Mat4::translation(Vec3::new(-10.0, -12.0, -40.0)),
    ];
    let mut fast_comet = Mat4::translation(Vec3::new(2.0, 2.0, 25.0));
    let mut ship_model = Mat4::translation(Vec3::new(-2.0, 0.0, -15.0))
        * Mat4::rotation(90.0, Vec3::new(1.0, 0.0, 0.0))
        * Mat4::rotation(180.0, Vec3::new(0.0, 1.0, 0.0));
    let mut debris_models: Vec<Mat4> = (0..DEBRIS_AMT)
        .map(|_| {
            Mat4::translation(Vec3::new(
                gen_range(-20.0, 20.0),
                gen_range(-20.0, 20.0),
                gen_range(-200.0, -50.0),
            ))
        })
        .collect();
    let mut view = Mat4::IDENTITY;

    log::info!("softraster v{} ({}x{})", VERSION, r.width(), r.height());

    loop {
        // Follow the window size at a fixed pixel scale
        let fb_w = ((screen_width() / WINDOW_SCALE) as usize).max(1);
        let fb_h = ((screen_height() / WINDOW_SCALE) as usize).max(1);
        r.resize(fb_w, fb_h);

        // Animation
        fast_comet = fast_comet
            * Mat4::translation(Vec3::new(0.0, 0.0, COMET_SPEED))
            * Mat4::rotation(COMET_ROTATION, Vec3::new(0.0, 0.0, 1.0));
        ship_model = ship_model
            * Mat4::translation(Vec3::new(0.0, -0.2, 0.0))
            * Mat4::rotation(-5.0, Vec3::new(1.0, 0.0, 0.0));
        for m in debris_models.iter_mut() {
            *m = *m * Mat4::rotation(5.0, Vec3::new(1.0, 0.0, 0.0));
        }
        // slow drift forward
        view = view * Mat4::translation(Vec3::new(0.0, 0.0, 0.01));

        // Input
        let moves = [
            ([KeyCode::A, KeyCode::Left], Vec3::new(MOVE_SCALE, 0.0, 0.0)),
            ([KeyCode::D, KeyCode::Right], Vec3::new(-MOVE_SCALE, 0.0, 0.0)),
            ([KeyCode::W, KeyCode::Up], Vec3::new(0.0, -MOVE_SCALE, 0.0)),
            ([KeyCode::S, KeyCode::Down], Vec3::new(0.0, MOVE_SCALE, 0.0)),
            ([KeyCode::Q, KeyCode::Q], Vec3::new(0.0, 0.0, MOVE_SCALE)),
            ([KeyCode::E, KeyCode::E], Vec3::new(0.0, 0.0, -MOVE_SCALE)),
        ];
        for (keys, delta) in moves {
            // the view matrix moves the world, so it shifts opposite to the camera
            if keys.iter().any(|&k| is_key_down(k)) {
                view = view * Mat4::translation(delta);
            }
        }
        if is_key_pressed(KeyCode::F) {
            r.switch_texture_filter();
        }

        let aspect = r.width() as f32 / r.height() as f32;
        r.set_view_matrix(view);
        r.set_projection_matrix(Mat4::perspective(1.0, 500.0, aspect, 45.0));

        // Draw
        r.clear_buffers();
        for a in &asteroids {
            r.draw_object(&RenderObject::new(a));
        }
        for m in &debris_models {
            r.draw_object(&RenderObject::new(&debris).with_model(*m));
        }
        r.draw_object(&RenderObject::new(&stars).with_model(star_model));
        r.draw_object(&RenderObject::new(&sun).with_model(sun_model));
        if let Some(ship) = &ship {
            r.draw_object(&RenderObject::new(ship).with_model(ship_model));
        }
        for model in comet_models.iter().copied().chain(std::iter::once(fast_comet)) {
            let mut obj = RenderObject::new(&rock).with_model(model);
            obj.texture = comet_texture.as_ref();
            r.draw_object(&obj);
        }
        r.swap_buffers();

        // Present
        clear_background(macroquad::prelude::Color::from_rgba(0, 0, 0, 255));
        let fb = r.framebuffer();
        let texture = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, fb.presented_buffer());
        texture.set_filter(macroquad::prelude::FilterMode::Nearest);
        draw_texture_ex(
            &texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                ..Default::default()
            },
        );
        draw_text(
            &format!("filter: {:?}", r.texture_filter()),
            5.0,
            screen_height() - 5.0,
            16.0,
            macroquad::prelude::Color::from_rgba(200, 200, 200, 255),
        );

        next_frame().await
    }
}
