use crate::glm;
use crate::rendering::backend::*;
use crate::rendering::camera::{Camera, OrthoCamera};
use crate::rendering::config::Renderer2DConfig;
use crate::rendering::data::{LineVertex, QuadVertex, Statistics};
use crate::rendering::error::RenderError;
use crate::rendering::shader::{
    ShaderSource, LINE_SHADER, QUAD_SHADER, SAMPLER_UNIFORM, VIEW_PROJECTION_UNIFORM,
};
use crate::rendering::texture::{SubTexture2D, Texture2D};
use crate::utils::constants::*;
use crate::utils::tools::{mult_mat4_vec3, quad_transform, rotated_quad_transform};
use std::mem::size_of;
use std::path::Path;

/// Generates the static quad index buffer: quad ``q`` uses ``[4q, 4q+1, 4q+2, 4q+2, 4q+3, 4q]``.
pub fn quad_index_pattern(max_quads: usize) -> Vec<u32> {
    let mut indices: Vec<u32> = vec![0; QUAD_NUM_INDICES * max_quads];
    for (i, index) in indices.iter_mut().enumerate() {
        *index = QUAD_INDICES[i % QUAD_NUM_INDICES]
            + QUAD_NUM_VERTICES as u32 * (i / QUAD_NUM_INDICES) as u32;
    }
    indices
}

/// the per batch accumulation state
struct BatchState {
    quad_vertices: Vec<QuadVertex>,
    quad_vertex_index: usize,
    quad_index_count: usize,
    line_vertices: Vec<LineVertex>,
    line_vertex_count: usize,
    texture_slots: Vec<Option<Texture2D>>,
    texture_slot_index: usize,
}

impl BatchState {
    /// allocates the fixed size staging arrays, slot 0 holds the white texture
    fn new(config: &Renderer2DConfig, white_texture: Texture2D) -> Self {
        let mut texture_slots = vec![None; config.max_texture_slots];
        texture_slots[0] = Some(white_texture);

        Self {
            quad_vertices: vec![QuadVertex::default(); config.max_vertices()],
            quad_vertex_index: 0,
            quad_index_count: 0,
            line_vertices: vec![LineVertex::default(); config.max_vertices()],
            line_vertex_count: 0,
            texture_slots,
            texture_slot_index: 1,
        }
    }

    /// resets all cursors, the staging memory is reused as is
    fn reset(&mut self) {
        self.quad_vertex_index = 0;
        self.quad_index_count = 0;
        self.line_vertex_count = 0;
        self.texture_slot_index = 1;
    }
}

/// The batched 2D quad and line renderer.
///
/// Quads and lines are accumulated in CPU side staging buffers between ``begin_scene`` and
/// ``end_scene`` and submitted with as few draw calls as possible. When a batch runs out of
/// vertex space or texture slots it is flushed before the next draw is accepted, so every draw
/// call succeeds and at most one extra draw call per overflow is issued.
pub struct Renderer2D<B: RenderBackend> {
    backend: B,
    config: Renderer2DConfig,
    quad_vao: VertexArrayID,
    quad_vbo: BufferID,
    quad_ibo: BufferID,
    quad_shader: ShaderID,
    line_vao: VertexArrayID,
    line_vbo: BufferID,
    line_shader: ShaderID,
    white_texture: Texture2D,
    batch: BatchState,
    stats: Statistics,
    line_width: f32,
    scene_active: bool,
}

impl<B: RenderBackend> Renderer2D<B> {
    /// creates all GPU resources and the staging buffers
    pub fn new(mut backend: B, config: Renderer2DConfig) -> Result<Self, RenderError> {
        config.validate()?;
        backend.init();

        // SHADERS
        let quad_shader = create_program(&mut backend, &QUAD_SHADER)?;
        let line_shader = match create_program(&mut backend, &LINE_SHADER) {
            Ok(shader) => shader,
            Err(e) => {
                backend.delete_shader(quad_shader);
                return Err(e);
            }
        };

        // 1x1 WHITE TEXTURE
        let white_texture = match Texture2D::from_rgba(&mut backend, 1, 1, &[255, 255, 255, 255])
        {
            Ok(texture) => texture,
            Err(e) => {
                backend.delete_shader(quad_shader);
                backend.delete_shader(line_shader);
                return Err(e);
            }
        };

        // TEXTURE SAMPLERS
        let samplers: Vec<i32> = (0..config.max_texture_slots as i32).collect();
        backend.set_int_array(quad_shader, SAMPLER_UNIFORM, &samplers);

        // QUAD BUFFERS
        let quad_vao = backend.create_vertex_array();
        let quad_vbo = backend.create_vertex_buffer(
            quad_vao,
            config.max_vertices() * size_of::<QuadVertex>(),
            &QuadVertex::layout(),
        );
        let quad_ibo = backend.create_index_buffer(quad_vao, &quad_index_pattern(config.max_quads));

        // LINE BUFFERS
        let line_vao = backend.create_vertex_array();
        let line_vbo = backend.create_vertex_buffer(
            line_vao,
            config.max_vertices() * size_of::<LineVertex>(),
            &LineVertex::layout(),
        );

        backend.set_clear_color(&config.clear_color);

        log::info!(
            "2D renderer initialized: {} quads per batch, {} texture slots",
            config.max_quads,
            config.max_texture_slots
        );

        Ok(Self {
            batch: BatchState::new(&config, white_texture),
            line_width: config.line_width,
            backend,
            config,
            quad_vao,
            quad_vbo,
            quad_ibo,
            quad_shader,
            line_vao,
            line_vbo,
            line_shader,
            white_texture,
            stats: Statistics::default(),
            scene_active: false,
        })
    }

    /// starts a new scene seen through ``camera`` placed at ``transform``
    pub fn begin_scene(&mut self, camera: &Camera, transform: &glm::Mat4) {
        let view_projection = camera.view_projection(transform);
        self.begin_scene_view_projection(&view_projection);
    }

    /// starts a new scene seen through an ``OrthoCamera``
    pub fn begin_scene_ortho(&mut self, camera: &OrthoCamera) {
        self.begin_scene_view_projection(camera.view_projection());
    }

    /// starts a new scene with a precomputed view projection matrix
    pub fn begin_scene_view_projection(&mut self, view_projection: &glm::Mat4) {
        self.backend
            .set_mat4(self.quad_shader, VIEW_PROJECTION_UNIFORM, view_projection);
        self.backend
            .set_mat4(self.line_shader, VIEW_PROJECTION_UNIFORM, view_projection);
        self.start_batch();
        self.scene_active = true;
    }

    /// submits everything drawn since the last flush and ends the scene
    pub fn end_scene(&mut self) {
        debug_assert!(self.scene_active, "end_scene called without begin_scene");
        self.flush();
        self.scene_active = false;
    }

    /// draws a colored quad
    pub fn draw_quad(&mut self, position: &glm::Vec3, size: &glm::Vec2, color: &glm::Vec4) {
        let transform = quad_transform(position, size);
        self.draw_quad_transform(&transform, color, NO_ENTITY);
    }

    /// draws a textured quad
    pub fn draw_textured_quad(
        &mut self,
        position: &glm::Vec3,
        size: &glm::Vec2,
        texture: &Texture2D,
        tiling: f32,
        tint: &glm::Vec4,
    ) {
        let transform = quad_transform(position, size);
        self.draw_textured_quad_transform(&transform, texture, tiling, tint, NO_ENTITY);
    }

    /// draws a quad showing a region of a texture atlas
    pub fn draw_sub_textured_quad(
        &mut self,
        position: &glm::Vec3,
        size: &glm::Vec2,
        sub_texture: &SubTexture2D,
        tiling: f32,
        tint: &glm::Vec4,
    ) {
        let transform = quad_transform(position, size);
        self.draw_quad_transformed(
            &transform,
            Some(sub_texture.texture()),
            sub_texture.tex_coords(),
            tiling,
            tint,
            NO_ENTITY,
        );
    }

    /// draws a colored quad rotated around its center by ``rotation`` radians
    pub fn draw_rotated_quad(
        &mut self,
        position: &glm::Vec3,
        size: &glm::Vec2,
        rotation: f32,
        color: &glm::Vec4,
    ) {
        let transform = rotated_quad_transform(position, size, rotation);
        self.draw_quad_transform(&transform, color, NO_ENTITY);
    }

    /// draws a textured quad rotated around its center by ``rotation`` radians
    pub fn draw_rotated_textured_quad(
        &mut self,
        position: &glm::Vec3,
        size: &glm::Vec2,
        rotation: f32,
        texture: &Texture2D,
        tiling: f32,
        tint: &glm::Vec4,
    ) {
        let transform = rotated_quad_transform(position, size, rotation);
        self.draw_textured_quad_transform(&transform, texture, tiling, tint, NO_ENTITY);
    }

    /// draws a colored quad with an arbitrary model matrix
    pub fn draw_quad_transform(
        &mut self,
        transform: &glm::Mat4,
        color: &glm::Vec4,
        entity_id: i32,
    ) {
        self.draw_quad_transformed(transform, None, &QUAD_UVS, 1.0, color, entity_id);
    }

    /// draws a textured quad with an arbitrary model matrix
    pub fn draw_textured_quad_transform(
        &mut self,
        transform: &glm::Mat4,
        texture: &Texture2D,
        tiling: f32,
        tint: &glm::Vec4,
        entity_id: i32,
    ) {
        self.draw_quad_transformed(transform, Some(texture), &QUAD_UVS, tiling, tint, entity_id);
    }

    /// Adds one quad to the batch. All other quad drawing functions end up here.
    /// ``texture = None`` draws with the white texture in slot 0, so only ``tint`` is visible.
    pub fn draw_quad_transformed(
        &mut self,
        transform: &glm::Mat4,
        texture: Option<&Texture2D>,
        tex_coords: &[glm::Vec2; 4],
        tiling: f32,
        tint: &glm::Vec4,
        entity_id: i32,
    ) {
        debug_assert!(self.scene_active, "draw call outside of begin_scene/end_scene");
        if self.batch.quad_index_count >= self.config.max_indices() {
            self.next_batch("quad buffer full");
        }

        let tex_index = match texture {
            Some(texture) => self.texture_slot_for(texture) as f32,
            None => 0.0,
        };

        // copy the transformed corners into the staging buffer
        for (corner, uv) in QUAD_CORNERS.iter().zip(tex_coords.iter()) {
            self.batch.quad_vertices[self.batch.quad_vertex_index] = QuadVertex {
                position: mult_mat4_vec3(transform, corner).into(),
                color: (*tint).into(),
                uv_coords: (*uv).into(),
                tex_index,
                tiling,
                entity_id,
            };
            self.batch.quad_vertex_index += 1;
        }
        self.batch.quad_index_count += QUAD_NUM_INDICES;
        self.stats.quad_count = self.stats.quad_count.saturating_add(1);
    }

    /// draws a line segment from ``p0`` to ``p1``
    pub fn draw_line(&mut self, p0: &glm::Vec3, p1: &glm::Vec3, color: &glm::Vec4, entity_id: i32) {
        debug_assert!(self.scene_active, "draw call outside of begin_scene/end_scene");
        if self.batch.line_vertex_count + LINE_NUM_VERTICES > self.config.max_vertices() {
            self.next_batch("line buffer full");
        }

        for point in [p0, p1] {
            self.batch.line_vertices[self.batch.line_vertex_count] = LineVertex {
                position: (*point).into(),
                color: (*color).into(),
                entity_id,
            };
            self.batch.line_vertex_count += 1;
        }
        self.stats.line_count = self.stats.line_count.saturating_add(1);
    }

    /// draws the outline of an axis-aligned rectangle centered at ``position``
    pub fn draw_rect(
        &mut self,
        position: &glm::Vec3,
        size: &glm::Vec2,
        color: &glm::Vec4,
        entity_id: i32,
    ) {
        let half = size * 0.5;
        let corners = [
            glm::vec3(position.x - half.x, position.y - half.y, position.z),
            glm::vec3(position.x + half.x, position.y - half.y, position.z),
            glm::vec3(position.x + half.x, position.y + half.y, position.z),
            glm::vec3(position.x - half.x, position.y + half.y, position.z),
        ];
        self.draw_outline(&corners, color, entity_id);
    }

    /// draws the outline of the unit quad transformed by ``transform``
    pub fn draw_rect_transform(
        &mut self,
        transform: &glm::Mat4,
        color: &glm::Vec4,
        entity_id: i32,
    ) {
        let corners = QUAD_CORNERS.map(|corner| mult_mat4_vec3(transform, &corner));
        self.draw_outline(&corners, color, entity_id);
    }

    /// clears the render target and checks the backend for errors
    pub fn clear(&mut self) -> Result<(), RenderError> {
        self.backend.clear();
        check_error(&mut self.backend, "clear")
    }

    /// changes the clear color of the render target
    pub fn set_clear_color(&mut self, color: &glm::Vec4) {
        self.config.clear_color = *color;
        self.backend.set_clear_color(color);
    }

    /// changes the width used for the next line flush
    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    #[inline]
    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    /// uploads RGBA8 pixel data as a texture that can be drawn with this renderer
    pub fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<Texture2D, RenderError> {
        Texture2D::from_rgba(&mut self.backend, width, height, rgba)
    }

    /// loads an image file as a texture that can be drawn with this renderer
    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> Result<Texture2D, RenderError> {
        Texture2D::from_file(&mut self.backend, path)
    }

    /// the statistics accumulated since the last reset
    #[inline]
    pub fn stats(&self) -> Statistics {
        self.stats
    }

    /// zeroes the statistics, the batch is not affected
    pub fn reset_stats(&mut self) {
        self.stats = Statistics::default();
    }

    #[inline]
    pub fn config(&self) -> &Renderer2DConfig {
        &self.config
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// the texture bound to slot 0 for untextured quads
    #[inline]
    pub fn white_texture(&self) -> &Texture2D {
        &self.white_texture
    }

    /// number of quad indices in the current batch
    #[inline]
    pub fn quad_index_count(&self) -> usize {
        self.batch.quad_index_count
    }

    /// number of quad vertices in the current batch
    #[inline]
    pub fn quad_vertex_count(&self) -> usize {
        self.batch.quad_vertex_index
    }

    /// number of line vertices in the current batch
    #[inline]
    pub fn line_vertex_count(&self) -> usize {
        self.batch.line_vertex_count
    }

    /// the next free texture slot of the current batch
    #[inline]
    pub fn texture_slot_index(&self) -> usize {
        self.batch.texture_slot_index
    }

    /// the quad vertices of the current batch
    pub fn quad_vertices(&self) -> &[QuadVertex] {
        &self.batch.quad_vertices[..self.batch.quad_vertex_index]
    }

    /// the line vertices of the current batch
    pub fn line_vertices(&self) -> &[LineVertex] {
        &self.batch.line_vertices[..self.batch.line_vertex_count]
    }

    /// finds the slot of ``texture`` in the current batch or assigns a free one
    /// (flushing if there is none)
    fn texture_slot_for(&mut self, texture: &Texture2D) -> usize {
        let used = &self.batch.texture_slots[1..self.batch.texture_slot_index];
        if let Some(i) = used.iter().position(|slot| slot.as_ref() == Some(texture)) {
            return i + 1;
        }
        if self.batch.texture_slot_index >= self.config.max_texture_slots {
            self.next_batch("texture slots exhausted");
        }
        let slot = self.batch.texture_slot_index;
        self.batch.texture_slots[slot] = Some(*texture);
        self.batch.texture_slot_index += 1;
        slot
    }

    /// four lines around the corners in order
    fn draw_outline(&mut self, corners: &[glm::Vec3; 4], color: &glm::Vec4, entity_id: i32) {
        for i in 0..corners.len() {
            self.draw_line(&corners[i], &corners[(i + 1) % corners.len()], color, entity_id);
        }
    }

    /// resets the batch to the initial state
    fn start_batch(&mut self) {
        self.batch.reset();
    }

    /// submits the current batch and starts a new one
    fn next_batch(&mut self, reason: &str) {
        log::trace!("batch break: {reason}");
        self.flush();
        self.start_batch();
    }

    /// uploads the used part of the staging buffers and issues the draw calls
    fn flush(&mut self) {
        if self.batch.quad_index_count > 0 {
            let vertices = &self.batch.quad_vertices[..self.batch.quad_vertex_index];
            self.backend.bind_shader(self.quad_shader);
            self.backend.bind_vertex_array(self.quad_vao);
            self.backend
                .set_vertex_data(self.quad_vbo, bytemuck::cast_slice(vertices));
            // bind textures
            for (unit, texture) in self.batch.texture_slots[..self.batch.texture_slot_index]
                .iter()
                .enumerate()
            {
                if let Some(texture) = texture {
                    self.backend.bind_texture(texture.id(), unit as u32);
                }
            }
            self.backend
                .draw_indexed(self.quad_vao, self.batch.quad_index_count as u32);
            self.stats.draw_calls = self.stats.draw_calls.saturating_add(1);
            log::debug!(
                "flushed {} quads using {} texture slots",
                self.batch.quad_index_count / QUAD_NUM_INDICES,
                self.batch.texture_slot_index
            );
        }

        if self.batch.line_vertex_count > 0 {
            let vertices = &self.batch.line_vertices[..self.batch.line_vertex_count];
            self.backend.bind_shader(self.line_shader);
            self.backend.bind_vertex_array(self.line_vao);
            self.backend
                .set_vertex_data(self.line_vbo, bytemuck::cast_slice(vertices));
            self.backend.set_line_width(self.line_width);
            self.backend
                .draw_lines(self.line_vao, self.batch.line_vertex_count as u32);
            self.stats.draw_calls = self.stats.draw_calls.saturating_add(1);
            log::debug!(
                "flushed {} lines",
                self.batch.line_vertex_count / LINE_NUM_VERTICES
            );
        }
    }
}

impl<B: RenderBackend> Drop for Renderer2D<B> {
    fn drop(&mut self) {
        self.batch.texture_slots.fill(None);
        self.backend.delete_shader(self.quad_shader);
        self.backend.delete_shader(self.line_shader);
        self.backend.delete_buffer(self.quad_vbo);
        self.backend.delete_buffer(self.quad_ibo);
        self.backend.delete_buffer(self.line_vbo);
        self.backend.delete_vertex_array(self.quad_vao);
        self.backend.delete_vertex_array(self.line_vao);
        self.backend.delete_texture(self.white_texture.id());
        log::info!("2D renderer resources released");
    }
}

/// compiles one of the built-in programs
fn create_program<B: RenderBackend>(
    backend: &mut B,
    source: &ShaderSource,
) -> Result<ShaderID, RenderError> {
    backend.create_shader(source.name, source.vertex, source.fragment)
}
