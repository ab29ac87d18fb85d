//! A batched 2D renderer for colored, textured and rotated quads and line primitives.
//!
//! Draw calls are accumulated in CPU side vertex buffers between ``begin_scene`` and ``end_scene``
//! and submitted through a [`RenderBackend`](rendering::backend::RenderBackend). ``GlBackend``
//! draws with OpenGL 4.5, ``HeadlessBackend`` records the calls without a GPU.

pub mod rendering;
pub mod systems;
pub mod utils;

pub use env_logger;
pub use log;
pub use nalgebra_glm as glm;
pub use stb_image;
pub use winit;

/// All features that are very common to use.
pub mod prelude {
    pub use crate::glm;
    pub use crate::glm::vec2;
    pub use crate::glm::vec3;
    pub use crate::glm::vec4;
    pub use crate::glm::Mat4;
    pub use crate::glm::Vec2;
    pub use crate::glm::Vec3;
    pub use crate::glm::Vec4;
    pub use crate::log;
    pub use crate::rendering::backend::RenderBackend;
    pub use crate::rendering::camera::{Camera, OrthoCamera};
    pub use crate::rendering::config::Renderer2DConfig;
    pub use crate::rendering::data::{colors, rgba8, LineVertex, QuadVertex, Statistics};
    pub use crate::rendering::error::RenderError;
    pub use crate::rendering::gl_backend::GlBackend;
    pub use crate::rendering::headless::{HeadlessBackend, RenderCall};
    pub use crate::rendering::renderer_2d::Renderer2D;
    pub use crate::rendering::texture::{SubTexture2D, Texture2D};
    pub use crate::systems::video_system::{VideoSystem, WindowConfig};
    pub use crate::utils::constants::*;
}
