use falling_leaf_2d::env_logger;
use falling_leaf_2d::prelude::*;
use std::error::Error;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

/// sprites per grid row and column, large enough to overflow the default batch twice
const GRID_SIZE: usize = 150;
const SPRITE_SIZE: f32 = 0.1;
const CAM_ZOOM: f32 = 8.0;

/// stress test for the 2D renderer
struct SpriteStress {
    video_system: VideoSystem,
    renderer: Option<Renderer2D<GlBackend>>,
    checkerboard: Option<Texture2D>,
    camera: OrthoCamera,
    exit_state: Result<(), Box<dyn Error>>,
    start_time: Instant,
    last_report: Instant,
}

impl SpriteStress {
    fn new() -> Self {
        let config = WindowConfig {
            title: String::from("Sprite Stress"),
            use_vsync: false,
            ..Default::default()
        };
        let aspect = config.width as f32 / config.height as f32;

        Self {
            video_system: VideoSystem::new(config),
            renderer: None,
            checkerboard: None,
            camera: ortho_camera(aspect),
            exit_state: Ok(()),
            start_time: Instant::now(),
            last_report: Instant::now(),
        }
    }

    /// creates the renderer and the checkerboard texture once the gl context exists
    fn init_rendering(&mut self) -> Result<(), Box<dyn Error>> {
        let mut renderer = Renderer2D::new(GlBackend::new(), Renderer2DConfig::default())?;
        self.checkerboard = Some(renderer.create_texture(8, 8, &checkerboard_pixels(8))?);
        self.renderer = Some(renderer);
        Ok(())
    }

    /// draws one frame
    fn on_frame_redraw(&mut self) -> Result<(), Box<dyn Error>> {
        let (Some(renderer), Some(texture)) = (self.renderer.as_mut(), self.checkerboard.as_ref())
        else {
            return Ok(());
        };
        let time = self.start_time.elapsed().as_secs_f32();
        let offset = GRID_SIZE as f32 * SPRITE_SIZE * 0.5;

        renderer.reset_stats();
        renderer.clear()?;
        self.camera.set_rotation((time * 0.5).sin() * 0.1);
        renderer.begin_scene_ortho(&self.camera);

        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                let position = vec3(
                    x as f32 * SPRITE_SIZE - offset,
                    y as f32 * SPRITE_SIZE - offset,
                    0.0,
                );
                let size = vec2(SPRITE_SIZE * 0.9, SPRITE_SIZE * 0.9);
                let color = vec4(
                    x as f32 / GRID_SIZE as f32,
                    0.4,
                    y as f32 / GRID_SIZE as f32,
                    0.8,
                );
                match (x + y) % 3 {
                    0 => renderer.draw_quad(&position, &size, &color),
                    1 => renderer.draw_textured_quad(&position, &size, texture, 1.0, &color),
                    _ => renderer.draw_rotated_quad(&position, &size, time + x as f32, &color),
                }
            }
        }

        renderer.draw_rect(
            &vec3(0.0, 0.0, 0.1),
            &vec2(offset * 2.0, offset * 2.0),
            &colors::WHITE,
            NO_ENTITY,
        );
        renderer.draw_rotated_textured_quad(
            &vec3(0.0, 0.0, 0.2),
            &vec2(3.0, 3.0),
            -time,
            texture,
            4.0,
            &colors::WHITE,
        );
        renderer.draw_line(
            &vec3(-offset, -offset, 0.1),
            &vec3(offset, offset, 0.1),
            &colors::RED,
            NO_ENTITY,
        );
        renderer.end_scene();

        self.video_system.swap_window()?;
        self.video_system.update_draw_timer();

        if self.last_report.elapsed() >= Duration::from_secs(1) {
            let stats = renderer.stats();
            log::info!(
                "{:.0} fps | {} draw calls | {} quads | {} lines | {} vertices | {} indices",
                self.video_system.current_fps(),
                stats.draw_calls,
                stats.quad_count,
                stats.line_count,
                stats.total_vertex_count(),
                stats.total_index_count()
            );
            self.video_system.set_window_title(&format!(
                "Sprite Stress | {:.0} fps",
                self.video_system.current_fps()
            ));
            self.last_report = Instant::now();
        }
        Ok(())
    }

    /// stores the error and stops the event loop
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Box<dyn Error>) {
        log::error!("{error}");
        self.exit_state = Err(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for SpriteStress {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.video_system.on_resumed(event_loop) {
            self.fail(event_loop, e);
            return;
        }
        if self.renderer.is_none() {
            if let Err(e) = self.init_rendering() {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                self.video_system.on_resize(size.width, size.height);
                if size.height > 0 {
                    let aspect = size.width as f32 / size.height as f32;
                    self.camera
                        .set_projection(-aspect * CAM_ZOOM, aspect * CAM_ZOOM, -CAM_ZOOM, CAM_ZOOM);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.on_frame_redraw() {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.video_system.should_redraw() {
            self.video_system.request_redraw();
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if let Err(e) = self.video_system.on_suspended() {
            log::error!("{e}");
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // gl resources have to go while the context is still alive
        if let Some(mut renderer) = self.renderer.take() {
            if let Some(texture) = self.checkerboard.take() {
                texture.delete(renderer.backend_mut());
            }
        }
    }
}

/// a camera showing ``CAM_ZOOM`` units in every direction for the window aspect ratio
fn ortho_camera(aspect: f32) -> OrthoCamera {
    OrthoCamera::new(-aspect * CAM_ZOOM, aspect * CAM_ZOOM, -CAM_ZOOM, CAM_ZOOM)
}

/// black and white RGBA8 pixels
fn checkerboard_pixels(size: usize) -> Vec<u8> {
    (0..size * size)
        .flat_map(|i| {
            let value = if (i / size + i % size) % 2 == 0 { 255 } else { 40 };
            [value, value, value, 255]
        })
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = SpriteStress::new();
    event_loop.run_app(&mut app)?;
    app.exit_state
}
