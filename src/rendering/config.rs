use crate::glm;
use crate::rendering::data::QuadVertex;
use crate::rendering::error::RenderError;
use crate::utils::constants::*;
use std::mem::size_of;

/// capacity and look settings for a ``Renderer2D`` (default is the standard batch size)
#[derive(Debug, Clone, PartialEq)]
pub struct Renderer2DConfig {
    pub max_quads: usize,
    pub max_texture_slots: usize,
    pub line_width: f32,
    pub clear_color: glm::Vec4,
}

impl Renderer2DConfig {
    /// changes the number of quads one batch can hold
    pub fn with_max_quads(mut self, max_quads: usize) -> Self {
        self.max_quads = max_quads;
        self
    }

    /// changes the number of texture units used per batch (including the white texture slot)
    pub fn with_max_texture_slots(mut self, max_texture_slots: usize) -> Self {
        self.max_texture_slots = max_texture_slots;
        self
    }

    /// changes the line width used for line draw calls
    pub fn with_line_width(mut self, line_width: f32) -> Self {
        self.line_width = line_width;
        self
    }

    /// changes the color the render target is cleared with
    pub fn with_clear_color(mut self, clear_color: glm::Vec4) -> Self {
        self.clear_color = clear_color;
        self
    }

    /// the vertex capacity of the quad and line staging buffers
    #[inline]
    pub fn max_vertices(&self) -> usize {
        self.max_quads.saturating_mul(QUAD_NUM_VERTICES)
    }

    /// the length of the static quad index buffer
    #[inline]
    pub fn max_indices(&self) -> usize {
        self.max_quads.saturating_mul(QUAD_NUM_INDICES)
    }

    /// checks that the config describes a usable renderer
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.max_quads == 0 {
            return Err(RenderError::InvalidConfig(String::from(
                "max_quads must be at least 1",
            )));
        }
        // index counts are drawn as GLsizei, the staging buffers are sized in bytes
        let fits_draw_range = self
            .max_quads
            .checked_mul(QUAD_NUM_INDICES)
            .is_some_and(|indices| indices <= i32::MAX as usize);
        let fits_buffer_size = self
            .max_quads
            .checked_mul(QUAD_NUM_VERTICES)
            .and_then(|vertices| vertices.checked_mul(size_of::<QuadVertex>()))
            .is_some_and(|bytes| bytes <= isize::MAX as usize);
        if !fits_draw_range || !fits_buffer_size {
            return Err(RenderError::InvalidConfig(format!(
                "max_quads {} exceeds the drawable index range",
                self.max_quads
            )));
        }
        if !(2..=SHADER_SAMPLER_COUNT).contains(&self.max_texture_slots) {
            return Err(RenderError::InvalidConfig(format!(
                "max_texture_slots must be in 2..={SHADER_SAMPLER_COUNT}, got {}",
                self.max_texture_slots
            )));
        }
        if !(self.line_width > 0.0) {
            return Err(RenderError::InvalidConfig(format!(
                "line_width must be positive, got {}",
                self.line_width
            )));
        }
        Ok(())
    }
}

impl Default for Renderer2DConfig {
    fn default() -> Self {
        Self {
            max_quads: MAX_QUADS,
            max_texture_slots: MAX_TEXTURE_SLOTS,
            line_width: DEFAULT_LINE_WIDTH,
            clear_color: glm::vec4(0.1, 0.1, 0.1, 1.0),
        }
    }
}
