pub mod backend;
pub mod camera;
pub mod config;
pub mod data;
pub mod error;
pub mod gl_backend;
pub mod headless;
pub mod renderer_2d;
pub(crate) mod shader;
pub mod texture;
