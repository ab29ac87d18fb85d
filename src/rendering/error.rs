/// all errors the 2D renderer and its backends can report
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid renderer config: {0}")]
    InvalidConfig(String),

    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: &'static str, log: String },

    #[error("shader program {name:?} failed to link: {log}")]
    ShaderLink { name: String, log: String },

    #[error("could not load texture {path:?}: {reason}")]
    TextureLoad { path: String, reason: String },

    #[error("graphics backend reported error code {code:#x} during {during}")]
    Backend { code: u32, during: &'static str },
}
