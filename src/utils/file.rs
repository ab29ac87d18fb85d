// directory paths
macro_rules! renderer2d_shader_path {
    ($file:literal) => {
        concat!(
            concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shaders/renderer2d/"),
            $file
        )
    };
}

// shader files
pub(crate) const QUAD_VERT: &str = include_str!(renderer2d_shader_path!("quad.vert"));
pub(crate) const QUAD_FRAG: &str = include_str!(renderer2d_shader_path!("quad.frag"));
pub(crate) const LINE_VERT: &str = include_str!(renderer2d_shader_path!("line.vert"));
pub(crate) const LINE_FRAG: &str = include_str!(renderer2d_shader_path!("line.frag"));
