use crate::glm;
use crate::rendering::backend::{BufferLayout, ShaderDataType};
use crate::utils::constants::{LINE_NUM_VERTICES, QUAD_NUM_INDICES, QUAD_NUM_VERTICES};
use bytemuck::{Pod, Zeroable};

/// data for a single quad vertex as it is uploaded to the GPU
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub uv_coords: [f32; 2],
    pub tex_index: f32,
    pub tiling: f32,
    pub entity_id: i32,
}

impl QuadVertex {
    /// the attribute layout matching the quad shader locations
    pub fn layout() -> BufferLayout {
        BufferLayout::new(&[
            ("position", ShaderDataType::Float3),
            ("color", ShaderDataType::Float4),
            ("uv", ShaderDataType::Float2),
            ("tex_idx", ShaderDataType::Float),
            ("tiling", ShaderDataType::Float),
            ("entity_id", ShaderDataType::Int),
        ])
    }
}

/// data for a single line vertex as it is uploaded to the GPU
#[derive(Default, Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub entity_id: i32,
}

impl LineVertex {
    /// the attribute layout matching the line shader locations
    pub fn layout() -> BufferLayout {
        BufferLayout::new(&[
            ("position", ShaderDataType::Float3),
            ("color", ShaderDataType::Float4),
            ("entity_id", ShaderDataType::Int),
        ])
    }
}

/// draw statistics since the last reset
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    pub draw_calls: u32,
    pub quad_count: u32,
    pub line_count: u32,
}

impl Statistics {
    /// number of vertices submitted for quads and lines
    pub fn total_vertex_count(&self) -> u64 {
        self.quad_count as u64 * QUAD_NUM_VERTICES as u64
            + self.line_count as u64 * LINE_NUM_VERTICES as u64
    }

    /// number of indices submitted for quads
    pub fn total_index_count(&self) -> u64 {
        self.quad_count as u64 * QUAD_NUM_INDICES as u64
    }
}

/// Common colors for tinting quads and lines.
pub mod colors {
    use crate::glm;

    pub const WHITE: glm::Vec4 = glm::Vec4::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: glm::Vec4 = glm::Vec4::new(0.0, 0.0, 0.0, 1.0);
    pub const RED: glm::Vec4 = glm::Vec4::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: glm::Vec4 = glm::Vec4::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: glm::Vec4 = glm::Vec4::new(0.0, 0.0, 1.0, 1.0);
    pub const TRANSPARENT: glm::Vec4 = glm::Vec4::new(0.0, 0.0, 0.0, 0.0);
}

/// converts 8bit RGBA components to a normalized color
pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> glm::Vec4 {
    glm::vec4(r as f32, g as f32, b as f32, a as f32) / 255.0
}
