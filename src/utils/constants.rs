use crate::glm;

/// default number of quads a single batch can hold before it is flushed
pub const MAX_QUADS: usize = 10_000;

/// default number of bound texture units per batch (slot 0 is the white texture)
pub const MAX_TEXTURE_SLOTS: usize = 16;

/// the sampler array size declared in the quad shader
pub(crate) const SHADER_SAMPLER_COUNT: usize = 32;

pub(crate) const QUAD_NUM_VERTICES: usize = 4;
pub(crate) const QUAD_NUM_INDICES: usize = 6;
pub(crate) const LINE_NUM_VERTICES: usize = 2;

/// the index pattern of one quad relative to its first vertex
pub(crate) const QUAD_INDICES: [u32; QUAD_NUM_INDICES] = [0, 1, 2, 2, 3, 0];

/// local space corners of the unit quad every quad is generated from
pub const QUAD_CORNERS: [glm::Vec3; QUAD_NUM_VERTICES] = [
    glm::Vec3::new(-0.5, -0.5, 0.0),
    glm::Vec3::new(0.5, -0.5, 0.0),
    glm::Vec3::new(0.5, 0.5, 0.0),
    glm::Vec3::new(-0.5, 0.5, 0.0),
];

/// texture coordinates that map the full texture onto the unit quad
pub const QUAD_UVS: [glm::Vec2; QUAD_NUM_VERTICES] = [
    glm::Vec2::new(0.0, 0.0),
    glm::Vec2::new(1.0, 0.0),
    glm::Vec2::new(1.0, 1.0),
    glm::Vec2::new(0.0, 1.0),
];

/// placeholder entity id for geometry that is not pickable
pub const NO_ENTITY: i32 = -1;

pub const DEFAULT_LINE_WIDTH: f32 = 2.0;

pub const Z_AXIS: glm::Vec3 = glm::Vec3::new(0.0, 0.0, 1.0);

pub(crate) const WIN_TITLE: &str = "Falling Leaf 2D";
pub(crate) const DEFAULT_WIN_WIDTH: u32 = 1280;
pub(crate) const DEFAULT_WIN_HEIGHT: u32 = 720;
