//! A backend that renders nothing and records everything.
//!
//! ``HeadlessBackend`` hands out fresh handles for every created object, keeps the contents of
//! uploaded buffers and logs each call as a [`RenderCall`]. Clones share the same recording,
//! so a test can keep one clone as a recorder while the renderer owns the other:
//!
//! ```
//! use falling_leaf_2d::prelude::*;
//!
//! let recorder = HeadlessBackend::new();
//! let mut renderer = Renderer2D::new(recorder.clone(), Renderer2DConfig::default()).unwrap();
//! renderer.begin_scene(&Camera::from_size(1.0), &Mat4::identity());
//! renderer.draw_quad(&vec3(0.0, 0.0, 0.0), &vec2(1.0, 1.0), &vec4(1.0, 0.0, 0.0, 1.0));
//! renderer.end_scene();
//! assert_eq!(recorder.draw_indexed_counts(), vec![6]);
//! ```
//!
//! The call log grows with every frame. Long running scene code without a GPU should turn it
//! off with ``set_recording(false)`` or drain it with ``clear_calls()`` regularly.

use crate::glm;
use crate::rendering::backend::*;
use crate::rendering::error::RenderError;
use crate::utils::tools::{shared_ptr, SharedPtr};
use std::collections::{HashMap, HashSet};

/// Records a backend call for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Init,
    CreateVertexArray { id: VertexArrayID },
    BindVertexArray { id: VertexArrayID },
    CreateVertexBuffer {
        id: BufferID,
        vertex_array: VertexArrayID,
        byte_capacity: usize,
        stride: usize,
    },
    CreateIndexBuffer { id: BufferID, vertex_array: VertexArrayID, index_count: usize },
    SetVertexData { buffer: BufferID, size: usize },
    CreateTexture { id: TextureID, width: u32, height: u32 },
    BindTexture { texture: TextureID, slot: u32 },
    CreateShader { id: ShaderID, name: String },
    BindShader { id: ShaderID },
    SetMat4 { shader: ShaderID, name: String, value: glm::Mat4 },
    SetIntArray { shader: ShaderID, name: String, values: Vec<i32> },
    SetFloat { shader: ShaderID, name: String, value: f32 },
    SetFloat4 { shader: ShaderID, name: String, value: glm::Vec4 },
    DrawIndexed { vertex_array: VertexArrayID, index_count: u32 },
    DrawLines { vertex_array: VertexArrayID, vertex_count: u32 },
    SetLineWidth { width: f32 },
    SetClearColor { color: glm::Vec4 },
    Clear,
    DeleteVertexArray { id: VertexArrayID },
    DeleteBuffer { id: BufferID },
    DeleteTexture { id: TextureID },
    DeleteShader { id: ShaderID },
}

#[derive(Debug, Default)]
struct HeadlessState {
    calls: Vec<RenderCall>,
    next_id: u32,
    vertex_capacities: HashMap<BufferID, usize>,
    vertex_strides: HashMap<BufferID, usize>,
    vertex_data: HashMap<BufferID, Vec<u8>>,
    index_data: HashMap<BufferID, Vec<u32>>,
    live_vertex_arrays: HashSet<VertexArrayID>,
    live_buffers: HashSet<BufferID>,
    live_textures: HashSet<TextureID>,
    live_shaders: HashSet<ShaderID>,
    pending_error: u32,
    failing_shader: Option<String>,
    recording_disabled: bool,
}

impl HeadlessState {
    fn push(&mut self, call: RenderCall) {
        if !self.recording_disabled {
            self.calls.push(call);
        }
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

/// CPU only ``RenderBackend`` that records every call (see the module docs)
#[derive(Debug, Clone)]
pub struct HeadlessBackend {
    state: SharedPtr<HeadlessState>,
}

impl HeadlessBackend {
    /// creates a new backend with an empty recording
    pub fn new() -> Self {
        Self {
            state: shared_ptr(HeadlessState::default()),
        }
    }

    /// a copy of all recorded calls
    pub fn calls(&self) -> Vec<RenderCall> {
        self.state.borrow().calls.clone()
    }

    /// clears the recording, created objects stay alive
    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Turns the call log on or off (default on). Object tracking and buffer contents are kept
    /// either way, only ``calls`` and the queries derived from it stop growing.
    pub fn set_recording(&self, enabled: bool) {
        self.state.borrow_mut().recording_disabled = !enabled;
    }

    /// the index counts of all indexed draw calls in order
    pub fn draw_indexed_counts(&self) -> Vec<u32> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::DrawIndexed { index_count, .. } => Some(*index_count),
                _ => None,
            })
            .collect()
    }

    /// the vertex counts of all line draw calls in order
    pub fn draw_lines_counts(&self) -> Vec<u32> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::DrawLines { vertex_count, .. } => Some(*vertex_count),
                _ => None,
            })
            .collect()
    }

    /// number of draw calls of any kind
    pub fn count_draw_calls(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    RenderCall::DrawIndexed { .. } | RenderCall::DrawLines { .. }
                )
            })
            .count()
    }

    /// the sizes of all vertex uploads in order
    pub fn vertex_upload_sizes(&self) -> Vec<usize> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::SetVertexData { size, .. } => Some(*size),
                _ => None,
            })
            .collect()
    }

    /// the texture handle bound to each slot, in binding order
    pub fn texture_bindings(&self) -> Vec<(u32, TextureID)> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::BindTexture { texture, slot } => Some((*slot, *texture)),
                _ => None,
            })
            .collect()
    }

    /// the bytes of the last upload into a vertex buffer
    pub fn vertex_data(&self, buffer: BufferID) -> Option<Vec<u8>> {
        self.state.borrow().vertex_data.get(&buffer).cloned()
    }

    /// the live vertex buffer whose layout has the given stride
    pub fn vertex_buffer_with_stride(&self, stride: usize) -> Option<BufferID> {
        let state = self.state.borrow();
        let mut buffers: Vec<BufferID> = state
            .vertex_strides
            .iter()
            .filter(|(_, s)| **s == stride)
            .map(|(id, _)| *id)
            .collect();
        buffers.sort_unstable();
        buffers.first().copied()
    }

    /// the contents of an index buffer
    pub fn index_data(&self, buffer: BufferID) -> Option<Vec<u32>> {
        self.state.borrow().index_data.get(&buffer).cloned()
    }

    /// all index buffers that were created and not deleted
    pub fn index_buffers(&self) -> Vec<BufferID> {
        let state = self.state.borrow();
        let mut buffers: Vec<BufferID> = state
            .index_data
            .keys()
            .filter(|id| state.live_buffers.contains(*id))
            .copied()
            .collect();
        buffers.sort_unstable();
        buffers
    }

    /// number of objects of any kind that were created and not deleted yet
    pub fn live_object_count(&self) -> usize {
        let state = self.state.borrow();
        state.live_vertex_arrays.len()
            + state.live_buffers.len()
            + state.live_textures.len()
            + state.live_shaders.len()
    }

    /// whether the texture exists on the "GPU"
    pub fn is_texture_alive(&self, texture: TextureID) -> bool {
        self.state.borrow().live_textures.contains(&texture)
    }

    /// makes the next ``get_error`` report ``code``
    pub fn inject_error(&self, code: u32) {
        self.state.borrow_mut().pending_error = code;
    }

    /// makes compilation of the shader program with the given name fail
    pub fn fail_shader(&self, name: &str) {
        self.state.borrow_mut().failing_shader = Some(name.to_string());
    }

    fn record(&self, call: RenderCall) {
        self.state.borrow_mut().push(call);
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for HeadlessBackend {
    fn init(&mut self) {
        self.record(RenderCall::Init);
    }

    fn create_vertex_array(&mut self) -> VertexArrayID {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.live_vertex_arrays.insert(id);
        state.push(RenderCall::CreateVertexArray { id });
        id
    }

    fn bind_vertex_array(&mut self, vertex_array: VertexArrayID) {
        self.record(RenderCall::BindVertexArray { id: vertex_array });
    }

    fn create_vertex_buffer(
        &mut self,
        vertex_array: VertexArrayID,
        byte_capacity: usize,
        layout: &BufferLayout,
    ) -> BufferID {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.live_buffers.insert(id);
        state.vertex_capacities.insert(id, byte_capacity);
        state.vertex_strides.insert(id, layout.stride());
        state.push(RenderCall::CreateVertexBuffer {
            id,
            vertex_array,
            byte_capacity,
            stride: layout.stride(),
        });
        id
    }

    fn create_index_buffer(&mut self, vertex_array: VertexArrayID, indices: &[u32]) -> BufferID {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.live_buffers.insert(id);
        state.index_data.insert(id, indices.to_vec());
        state.push(RenderCall::CreateIndexBuffer {
            id,
            vertex_array,
            index_count: indices.len(),
        });
        id
    }

    fn set_vertex_data(&mut self, buffer: BufferID, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        let capacity = state.vertex_capacities.get(&buffer).copied().unwrap_or(0);
        assert!(
            data.len() <= capacity,
            "vertex upload of {} bytes overflows buffer {buffer} of {capacity} bytes",
            data.len()
        );
        state.vertex_data.insert(buffer, data.to_vec());
        state.push(RenderCall::SetVertexData {
            buffer,
            size: data.len(),
        });
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        _rgba: &[u8],
    ) -> Result<TextureID, RenderError> {
        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        state.live_textures.insert(id);
        state.push(RenderCall::CreateTexture { id, width, height });
        Ok(id)
    }

    fn bind_texture(&mut self, texture: TextureID, slot: u32) {
        self.record(RenderCall::BindTexture { texture, slot });
    }

    fn create_shader(
        &mut self,
        name: &str,
        _vertex_src: &str,
        _fragment_src: &str,
    ) -> Result<ShaderID, RenderError> {
        let mut state = self.state.borrow_mut();
        if state.failing_shader.as_deref() == Some(name) {
            return Err(RenderError::ShaderCompile {
                stage: "vertex",
                log: format!("compilation of {name:?} failed on request"),
            });
        }
        let id = state.next_id();
        state.live_shaders.insert(id);
        state.push(RenderCall::CreateShader {
            id,
            name: name.to_string(),
        });
        Ok(id)
    }

    fn bind_shader(&mut self, shader: ShaderID) {
        self.record(RenderCall::BindShader { id: shader });
    }

    fn set_mat4(&mut self, shader: ShaderID, name: &str, value: &glm::Mat4) {
        self.record(RenderCall::SetMat4 {
            shader,
            name: name.to_string(),
            value: *value,
        });
    }

    fn set_int_array(&mut self, shader: ShaderID, name: &str, values: &[i32]) {
        self.record(RenderCall::SetIntArray {
            shader,
            name: name.to_string(),
            values: values.to_vec(),
        });
    }

    fn set_float(&mut self, shader: ShaderID, name: &str, value: f32) {
        self.record(RenderCall::SetFloat {
            shader,
            name: name.to_string(),
            value,
        });
    }

    fn set_float4(&mut self, shader: ShaderID, name: &str, value: &glm::Vec4) {
        self.record(RenderCall::SetFloat4 {
            shader,
            name: name.to_string(),
            value: *value,
        });
    }

    fn draw_indexed(&mut self, vertex_array: VertexArrayID, index_count: u32) {
        self.record(RenderCall::DrawIndexed {
            vertex_array,
            index_count,
        });
    }

    fn draw_lines(&mut self, vertex_array: VertexArrayID, vertex_count: u32) {
        self.record(RenderCall::DrawLines {
            vertex_array,
            vertex_count,
        });
    }

    fn set_line_width(&mut self, width: f32) {
        self.record(RenderCall::SetLineWidth { width });
    }

    fn set_clear_color(&mut self, color: &glm::Vec4) {
        self.record(RenderCall::SetClearColor { color: *color });
    }

    fn clear(&mut self) {
        self.record(RenderCall::Clear);
    }

    fn get_error(&mut self) -> u32 {
        std::mem::take(&mut self.state.borrow_mut().pending_error)
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayID) {
        let mut state = self.state.borrow_mut();
        state.live_vertex_arrays.remove(&vertex_array);
        state.push(RenderCall::DeleteVertexArray { id: vertex_array });
    }

    fn delete_buffer(&mut self, buffer: BufferID) {
        let mut state = self.state.borrow_mut();
        state.live_buffers.remove(&buffer);
        state.vertex_capacities.remove(&buffer);
        state.vertex_strides.remove(&buffer);
        state.vertex_data.remove(&buffer);
        state.push(RenderCall::DeleteBuffer { id: buffer });
    }

    fn delete_texture(&mut self, texture: TextureID) {
        let mut state = self.state.borrow_mut();
        state.live_textures.remove(&texture);
        state.push(RenderCall::DeleteTexture { id: texture });
    }

    fn delete_shader(&mut self, shader: ShaderID) {
        let mut state = self.state.borrow_mut();
        state.live_shaders.remove(&shader);
        state.push(RenderCall::DeleteShader { id: shader });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_recording() {
        let recorder = HeadlessBackend::new();
        let mut backend = recorder.clone();
        let vao = backend.create_vertex_array();
        backend.draw_lines(vao, 4);
        assert_eq!(recorder.draw_lines_counts(), vec![4]);
        assert_eq!(recorder.live_object_count(), 1);
        backend.delete_vertex_array(vao);
        assert_eq!(recorder.live_object_count(), 0);
    }

    #[test]
    fn disabled_recording_keeps_tracking_objects() {
        let recorder = HeadlessBackend::new();
        recorder.set_recording(false);
        let mut backend = recorder.clone();
        let vao = backend.create_vertex_array();
        let layout = BufferLayout::new(&[("position", ShaderDataType::Float3)]);
        let vbo = backend.create_vertex_buffer(vao, 12, &layout);
        backend.set_vertex_data(vbo, &[1; 12]);
        backend.draw_lines(vao, 2);

        assert!(recorder.calls().is_empty());
        assert_eq!(recorder.live_object_count(), 2);
        assert_eq!(recorder.vertex_data(vbo), Some(vec![1; 12]));

        recorder.set_recording(true);
        backend.draw_lines(vao, 2);
        assert_eq!(recorder.draw_lines_counts(), vec![2]);
    }

    #[test]
    fn injected_error_is_reported_once() {
        let mut backend = HeadlessBackend::new();
        backend.inject_error(0x505);
        assert_eq!(backend.get_error(), 0x505);
        assert_eq!(backend.get_error(), 0);
    }

    #[test]
    #[should_panic(expected = "overflows")]
    fn oversized_upload_panics() {
        let mut backend = HeadlessBackend::new();
        let vao = backend.create_vertex_array();
        let layout = BufferLayout::new(&[("position", ShaderDataType::Float3)]);
        let vbo = backend.create_vertex_buffer(vao, 12, &layout);
        backend.set_vertex_data(vbo, &[0; 24]);
    }
}
