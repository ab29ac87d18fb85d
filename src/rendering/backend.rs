use crate::glm;
use crate::rendering::error::RenderError;

/// handle of a vertex array object
pub type VertexArrayID = u32;
/// handle of a vertex or index buffer
pub type BufferID = u32;
/// handle of a texture, equality of handles is texture identity
pub type TextureID = u32;
/// handle of a linked shader program
pub type ShaderID = u32;

/// the data type of a single vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderDataType {
    Float,
    Float2,
    Float3,
    Float4,
    Int,
}

impl ShaderDataType {
    /// number of scalar components
    pub fn component_count(self) -> usize {
        match self {
            ShaderDataType::Float | ShaderDataType::Int => 1,
            ShaderDataType::Float2 => 2,
            ShaderDataType::Float3 => 3,
            ShaderDataType::Float4 => 4,
        }
    }

    /// size in bytes
    pub fn size(self) -> usize {
        self.component_count() * 4
    }

    /// integer attributes have to be bound without float conversion
    pub fn is_integer(self) -> bool {
        self == ShaderDataType::Int
    }
}

/// one named attribute inside a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferElement {
    pub name: &'static str,
    pub data_type: ShaderDataType,
    pub offset: usize,
}

/// the memory layout of one vertex, attribute locations are the element indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferLayout {
    elements: Vec<BufferElement>,
    stride: usize,
}

impl BufferLayout {
    /// creates a tightly packed layout from the attribute list in order
    pub fn new(attributes: &[(&'static str, ShaderDataType)]) -> Self {
        let mut offset = 0;
        let elements = attributes
            .iter()
            .map(|&(name, data_type)| {
                let element = BufferElement {
                    name,
                    data_type,
                    offset,
                };
                offset += data_type.size();
                element
            })
            .collect();

        Self {
            elements,
            stride: offset,
        }
    }

    /// all elements in attribute location order
    pub fn elements(&self) -> &[BufferElement] {
        &self.elements
    }

    /// byte size of one vertex
    pub fn stride(&self) -> usize {
        self.stride
    }
}

/// The graphics API the 2D renderer talks to.
///
/// Every GPU object is referred to by an opaque integer handle. Implementations
/// decide what the handles mean: ``GlBackend`` hands out OpenGL object names,
/// ``HeadlessBackend`` counts up and records what was asked of it.
pub trait RenderBackend {
    /// one-time global pipeline state setup (blending, depth test)
    fn init(&mut self);

    /// creates an empty vertex array object
    fn create_vertex_array(&mut self) -> VertexArrayID;
    /// binds a vertex array object for drawing
    fn bind_vertex_array(&mut self, vertex_array: VertexArrayID);
    /// creates a dynamic vertex buffer of ``byte_capacity`` bytes attached to ``vertex_array``
    /// with the given layout
    fn create_vertex_buffer(
        &mut self,
        vertex_array: VertexArrayID,
        byte_capacity: usize,
        layout: &BufferLayout,
    ) -> BufferID;
    /// creates a static index buffer attached to ``vertex_array``
    fn create_index_buffer(&mut self, vertex_array: VertexArrayID, indices: &[u32]) -> BufferID;
    /// uploads ``data`` to the start of the vertex buffer
    fn set_vertex_data(&mut self, buffer: BufferID, data: &[u8]);

    /// creates a 2D RGBA8 texture from tightly packed pixel data
    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureID, RenderError>;
    /// binds a texture to a texture unit
    fn bind_texture(&mut self, texture: TextureID, slot: u32);

    /// compiles and links a shader program
    fn create_shader(
        &mut self,
        name: &str,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<ShaderID, RenderError>;
    fn bind_shader(&mut self, shader: ShaderID);
    fn set_mat4(&mut self, shader: ShaderID, name: &str, value: &glm::Mat4);
    fn set_int_array(&mut self, shader: ShaderID, name: &str, values: &[i32]);
    /// Sets a float uniform. The built-in programs have none, this is for custom programs
    /// created through the same backend.
    fn set_float(&mut self, shader: ShaderID, name: &str, value: f32);
    /// sets a vec4 uniform of a custom program
    fn set_float4(&mut self, shader: ShaderID, name: &str, value: &glm::Vec4);

    /// draws ``index_count`` indices of the bound index buffer as triangles
    fn draw_indexed(&mut self, vertex_array: VertexArrayID, index_count: u32);
    /// draws ``vertex_count`` vertices as separate line segments
    fn draw_lines(&mut self, vertex_array: VertexArrayID, vertex_count: u32);
    fn set_line_width(&mut self, width: f32);
    fn set_clear_color(&mut self, color: &glm::Vec4);
    fn clear(&mut self);
    /// the last error code of the API, ``0`` means no error
    fn get_error(&mut self) -> u32;

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayID);
    fn delete_buffer(&mut self, buffer: BufferID);
    fn delete_texture(&mut self, texture: TextureID);
    fn delete_shader(&mut self, shader: ShaderID);
}

/// Polls the backend error state and turns a set error code into a ``RenderError``.
pub fn check_error(
    backend: &mut dyn RenderBackend,
    during: &'static str,
) -> Result<(), RenderError> {
    match backend.get_error() {
        0 => Ok(()),
        code => {
            log::error!("graphics backend error {code:#x} during {during}");
            Err(RenderError::Backend { code, during })
        }
    }
}
