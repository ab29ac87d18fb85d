use crate::utils::constants::{DEFAULT_WIN_HEIGHT, DEFAULT_WIN_WIDTH, WIN_TITLE};
use gl::types::GLsizei;
use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use std::error::Error;
use std::ffi::{CStr, CString};
use std::num::NonZeroU32;
use std::ptr;
use std::time::{Duration, Instant};
use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

/// window settings for the video system
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub use_vsync: bool,
    pub fps_cap: Option<f64>,
}

impl WindowConfig {
    /// generates the winit window attributes
    fn win_attrs(&self) -> WindowAttributes {
        Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(self.width, self.height))
            .with_transparent(false)
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: WIN_TITLE.to_string(),
            width: DEFAULT_WIN_WIDTH,
            height: DEFAULT_WIN_HEIGHT,
            use_vsync: true,
            fps_cap: None,
        }
    }
}

/// holds the window and the OpenGL context the ``GlBackend`` draws with
pub struct VideoSystem {
    config_template: ConfigTemplateBuilder,
    display_builder: DisplayBuilder,
    not_current_gl_context: Option<NotCurrentContext>,
    gl_context: Option<PossiblyCurrentContext>,
    gl_surface: Option<Surface<WindowSurface>>,
    window: Option<Window>,
    current_fps: f64,
    last_draw_time: Instant,
    config: WindowConfig,
}

impl VideoSystem {
    /// creates a new video system, the window is created on ``on_resumed``
    pub fn new(config: WindowConfig) -> Self {
        #[allow(unexpected_cfgs)]
        let config_template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_transparency(cfg!(cgl_backend));

        let display_builder =
            DisplayBuilder::new().with_window_attributes(Some(config.win_attrs()));

        Self {
            config_template,
            display_builder,
            not_current_gl_context: None,
            gl_context: None,
            gl_surface: None,
            window: None,
            current_fps: 0.0,
            last_draw_time: Instant::now(),
            config,
        }
    }

    /// Creates the window and a current gl context and loads the gl function pointers.
    /// Has to be called from ``ApplicationHandler::resumed`` before any ``GlBackend`` is created.
    pub fn on_resumed(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let (mut window, gl_config) = match self.display_builder.clone().build(
            event_loop,
            self.config_template.clone(),
            gl_config_picker,
        ) {
            Ok(ok) => ok,
            Err(e) => {
                event_loop.exit();
                return Err(e);
            }
        };

        log::info!("Picked a config with {} samples", gl_config.num_samples());

        let raw_window_handle = window
            .as_ref()
            .and_then(|window| window.window_handle().ok())
            .map(|handle| handle.as_raw());

        let gl_display = gl_config.display();

        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(4, 5))))
            .build(raw_window_handle);

        let fallback_context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(None))
            .build(raw_window_handle);

        let not_current_gl_context = match self.not_current_gl_context.take() {
            Some(context) => context,
            None => unsafe {
                gl_display
                    .create_context(&gl_config, &context_attributes)
                    .or_else(|_| {
                        gl_display.create_context(&gl_config, &fallback_context_attributes)
                    })?
            },
        };

        let window = match window.take() {
            Some(window) => window,
            None => {
                glutin_winit::finalize_window(event_loop, self.config.win_attrs(), &gl_config)?
            }
        };

        let attrs = window.build_surface_attributes(Default::default())?;
        let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &attrs)? };

        // the context has to be current for function loading and resource creation
        let gl_context = not_current_gl_context.make_current(&gl_surface)?;

        gl::load_with(|symbol| match CString::new(symbol) {
            Ok(symbol) => gl_display.get_proc_address(symbol.as_c_str()).cast(),
            Err(_) => ptr::null(),
        });
        log_gl_config();

        self.gl_context = Some(gl_context);
        self.gl_surface = Some(gl_surface);
        self.window = Some(window);

        let vsync = if self.config.use_vsync {
            self.enable_vsync()
        } else {
            self.disable_vsync()
        };
        if let Err(e) = vsync {
            log::warn!("Error setting vsync: {e}");
        }

        Ok(())
    }

    /// releases the window and makes the context not current
    pub fn on_suspended(&mut self) -> Result<(), Box<dyn Error>> {
        log::info!("window removed");
        self.gl_surface = None;
        self.window = None;
        if let Some(gl_context) = self.gl_context.take() {
            self.not_current_gl_context = Some(gl_context.make_not_current()?);
        }
        Ok(())
    }

    /// enables vsync for opengl
    pub fn enable_vsync(&mut self) -> Result<(), String> {
        log::debug!("enabled vsync");
        self.set_swap_interval(SwapInterval::Wait(NonZeroU32::MIN))
    }

    /// disables vsync for opengl
    pub fn disable_vsync(&mut self) -> Result<(), String> {
        log::debug!("disabled vsync");
        self.set_swap_interval(SwapInterval::DontWait)
    }

    fn set_swap_interval(&self, interval: SwapInterval) -> Result<(), String> {
        match (self.gl_surface.as_ref(), self.gl_context.as_ref()) {
            (Some(gl_surface), Some(gl_context)) => gl_surface
                .set_swap_interval(gl_context, interval)
                .map_err(|err| err.to_string()),
            _ => Err(String::from("no gl surface available")),
        }
    }

    /// call the opengl window swap
    pub fn swap_window(&self) -> Result<(), Box<dyn Error>> {
        if let (Some(gl_surface), Some(gl_context)) =
            (self.gl_surface.as_ref(), self.gl_context.as_ref())
        {
            gl_surface.swap_buffers(gl_context)?;
        }
        Ok(())
    }

    /// requests a redraw of the winit window
    pub fn request_redraw(&self) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    /// resizes the gl surface and the viewport, zero sizes (minimized windows) are ignored
    pub fn on_resize(&mut self, width: u32, height: u32) {
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            return;
        };
        if let (Some(gl_surface), Some(gl_context)) =
            (self.gl_surface.as_ref(), self.gl_context.as_ref())
        {
            gl_surface.resize(gl_context, w, h);
            unsafe {
                gl::Viewport(0, 0, width as GLsizei, height as GLsizei);
            }
        }
    }

    /// resets the internal frame timer
    pub fn update_draw_timer(&mut self) {
        let elapsed_draw_time = self.last_draw_time.elapsed();
        self.last_draw_time = Instant::now();
        self.current_fps = 1.0 / elapsed_draw_time.as_secs_f64();
    }

    /// checks wether or not the next frame should be drawn
    pub fn should_redraw(&self) -> bool {
        self.config.fps_cap.map_or(true, |fps| {
            self.last_draw_time.elapsed() >= Duration::from_secs_f64(1.0 / fps)
        })
    }

    /// gets the current fps in seconds
    #[inline]
    pub fn current_fps(&self) -> f64 {
        self.current_fps
    }

    /// changes the title bar text in the window
    pub fn set_window_title(&self, title: &str) {
        if let Some(window) = self.window.as_ref() {
            window.set_title(title);
        }
    }
}

/// prints info about the used gl renderer
fn log_gl_config() {
    if let Some(renderer) = get_gl_string(gl::RENDERER) {
        log::info!("Running on {}", renderer.to_string_lossy());
    }
    if let Some(version) = get_gl_string(gl::VERSION) {
        log::info!("OpenGL Version {}", version.to_string_lossy());
    }
    if let Some(shaders_version) = get_gl_string(gl::SHADING_LANGUAGE_VERSION) {
        log::info!("Shaders version on {}", shaders_version.to_string_lossy());
    }
}

/// find the config with the maximum number of samples
fn gl_config_picker(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|accum, config| {
            if config.num_samples() > accum.num_samples() {
                config
            } else {
                accum
            }
        })
        .expect("the display offers no gl config")
}

/// retrieves a string value from gl
fn get_gl_string(variant: gl::types::GLenum) -> Option<&'static CStr> {
    unsafe {
        let s = gl::GetString(variant);
        (!s.is_null()).then(|| CStr::from_ptr(s.cast()))
    }
}
