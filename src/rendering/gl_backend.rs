use crate::glm;
use crate::rendering::backend::*;
use crate::rendering::error::RenderError;
use crate::rendering::shader::{compile_shader, link_program};
use gl::types::*;
use std::collections::HashMap;
use std::ffi::CString;
use std::{mem, ptr};

/// ``RenderBackend`` on top of OpenGL 4.5.
///
/// The gl function pointers have to be loaded and a context has to be current on the calling thread
/// for the whole lifetime of this backend (see ``VideoSystem``).
pub struct GlBackend {
    uniform_locations: HashMap<ShaderID, HashMap<String, GLint>>,
}

impl GlBackend {
    /// creates a new backend for the current gl context
    pub fn new() -> Self {
        Self {
            uniform_locations: HashMap::new(),
        }
    }

    /// gets an uniform location and caches it
    fn unif(&mut self, shader: ShaderID, name: &str) -> GLint {
        let locations = self.uniform_locations.entry(shader).or_default();
        if let Some(location) = locations.get(name) {
            return *location;
        }
        let location = match CString::new(name) {
            Ok(c_name) => unsafe { gl::GetUniformLocation(shader, c_name.as_ptr()) },
            Err(_) => -1,
        };
        if location == -1 {
            log::warn!("uniform {name:?} not found in shader program {shader}");
        }
        locations.insert(name.to_string(), location);
        location
    }
}

impl Default for GlBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for GlBackend {
    fn init(&mut self) {
        unsafe {
            gl::Enable(gl::BLEND);
            gl::BlendFunc(gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA);
            gl::Enable(gl::DEPTH_TEST);
            gl::DepthFunc(gl::LEQUAL);
            gl::Enable(gl::LINE_SMOOTH);
        }
    }

    fn create_vertex_array(&mut self) -> VertexArrayID {
        let mut vao = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut vao);
        }
        vao
    }

    fn bind_vertex_array(&mut self, vertex_array: VertexArrayID) {
        unsafe {
            gl::BindVertexArray(vertex_array);
        }
    }

    fn create_vertex_buffer(
        &mut self,
        vertex_array: VertexArrayID,
        byte_capacity: usize,
        layout: &BufferLayout,
    ) -> BufferID {
        let mut vbo = 0;
        unsafe {
            gl::BindVertexArray(vertex_array);
            gl::GenBuffers(1, &mut vbo);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                byte_capacity as GLsizeiptr,
                ptr::null(),
                gl::DYNAMIC_DRAW,
            );

            // BIND ATTRIB POINTERS
            for (location, element) in layout.elements().iter().enumerate() {
                let location = location as GLuint;
                gl::EnableVertexAttribArray(location);
                if element.data_type.is_integer() {
                    gl::VertexAttribIPointer(
                        location,
                        element.data_type.component_count() as GLint,
                        gl::INT,
                        layout.stride() as GLsizei,
                        element.offset as *const GLvoid,
                    );
                } else {
                    gl::VertexAttribPointer(
                        location,
                        element.data_type.component_count() as GLint,
                        gl::FLOAT,
                        gl::FALSE as GLboolean,
                        layout.stride() as GLsizei,
                        element.offset as *const GLvoid,
                    );
                }
            }
            gl::BindVertexArray(0);
        }
        vbo
    }

    fn create_index_buffer(&mut self, vertex_array: VertexArrayID, indices: &[u32]) -> BufferID {
        let mut ibo = 0;
        unsafe {
            gl::BindVertexArray(vertex_array);
            gl::GenBuffers(1, &mut ibo);
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ibo);
            gl::BufferData(
                gl::ELEMENT_ARRAY_BUFFER,
                mem::size_of_val(indices) as GLsizeiptr,
                indices.as_ptr() as *const GLvoid,
                gl::STATIC_DRAW,
            );
            gl::BindVertexArray(0);
        }
        ibo
    }

    fn set_vertex_data(&mut self, buffer: BufferID, data: &[u8]) {
        unsafe {
            gl::BindBuffer(gl::ARRAY_BUFFER, buffer);
            gl::BufferSubData(
                gl::ARRAY_BUFFER,
                0,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const GLvoid,
            );
        }
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureID, RenderError> {
        let mut tex_id = 0;
        unsafe {
            gl::GenTextures(1, &mut tex_id);
            gl::BindTexture(gl::TEXTURE_2D, tex_id);
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGBA8 as GLint,
                width as GLint,
                height as GLint,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                rgba.as_ptr() as *const GLvoid,
            );
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::NEAREST as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::REPEAT as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::REPEAT as GLint);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }
        check_error(self, "texture upload")?;
        Ok(tex_id)
    }

    fn bind_texture(&mut self, texture: TextureID, slot: u32) {
        unsafe {
            gl::BindTextureUnit(slot, texture);
        }
    }

    fn create_shader(
        &mut self,
        name: &str,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ShaderID, RenderError> {
        let vs = compile_shader(vertex_src, gl::VERTEX_SHADER)?;
        let fs = match compile_shader(fragment_src, gl::FRAGMENT_SHADER) {
            Ok(fs) => fs,
            Err(e) => {
                unsafe { gl::DeleteShader(vs) };
                return Err(e);
            }
        };
        let program = link_program(name, vs, fs)?;
        log::debug!("linked shader program {name:?} ({program})");
        Ok(program)
    }

    fn bind_shader(&mut self, shader: ShaderID) {
        unsafe {
            gl::UseProgram(shader);
        }
    }

    fn set_mat4(&mut self, shader: ShaderID, name: &str, value: &glm::Mat4) {
        let location = self.unif(shader, name);
        unsafe {
            gl::ProgramUniformMatrix4fv(shader, location, 1, gl::FALSE, value.as_ptr());
        }
    }

    fn set_int_array(&mut self, shader: ShaderID, name: &str, values: &[i32]) {
        let location = self.unif(shader, name);
        unsafe {
            gl::ProgramUniform1iv(shader, location, values.len() as GLsizei, values.as_ptr());
        }
    }

    fn set_float(&mut self, shader: ShaderID, name: &str, value: f32) {
        let location = self.unif(shader, name);
        unsafe {
            gl::ProgramUniform1f(shader, location, value);
        }
    }

    fn set_float4(&mut self, shader: ShaderID, name: &str, value: &glm::Vec4) {
        let location = self.unif(shader, name);
        unsafe {
            gl::ProgramUniform4fv(shader, location, 1, value.as_ptr());
        }
    }

    fn draw_indexed(&mut self, vertex_array: VertexArrayID, index_count: u32) {
        unsafe {
            gl::BindVertexArray(vertex_array);
            gl::DrawElements(
                gl::TRIANGLES,
                index_count as GLsizei,
                gl::UNSIGNED_INT,
                ptr::null(),
            );
            gl::BindVertexArray(0);
        }
    }

    fn draw_lines(&mut self, vertex_array: VertexArrayID, vertex_count: u32) {
        unsafe {
            gl::BindVertexArray(vertex_array);
            gl::DrawArrays(gl::LINES, 0, vertex_count as GLsizei);
            gl::BindVertexArray(0);
        }
    }

    fn set_line_width(&mut self, width: f32) {
        unsafe {
            gl::LineWidth(width);
        }
    }

    fn set_clear_color(&mut self, color: &glm::Vec4) {
        unsafe {
            gl::ClearColor(color.x, color.y, color.z, color.w);
        }
    }

    fn clear(&mut self) {
        unsafe {
            gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        }
    }

    fn get_error(&mut self) -> u32 {
        unsafe { gl::GetError() }
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayID) {
        unsafe {
            gl::DeleteVertexArrays(1, &vertex_array);
        }
    }

    fn delete_buffer(&mut self, buffer: BufferID) {
        unsafe {
            gl::DeleteBuffers(1, &buffer);
        }
    }

    fn delete_texture(&mut self, texture: TextureID) {
        unsafe {
            gl::DeleteTextures(1, &texture);
        }
    }

    fn delete_shader(&mut self, shader: ShaderID) {
        self.uniform_locations.remove(&shader);
        unsafe {
            gl::DeleteProgram(shader);
        }
    }
}
