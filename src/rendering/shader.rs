use crate::rendering::error::RenderError;
use crate::utils::file::{LINE_FRAG, LINE_VERT, QUAD_FRAG, QUAD_VERT};
use gl::types::*;
use std::ffi::CString;
use std::ptr;

/// name of the view projection matrix uniform in both programs
pub(crate) const VIEW_PROJECTION_UNIFORM: &str = "view_projection";
/// name of the sampler array uniform in the quad program
pub(crate) const SAMPLER_UNIFORM: &str = "tex_sampler";

/// the sources of one shader program
#[derive(Debug, Clone, Copy)]
pub(crate) struct ShaderSource {
    pub(crate) name: &'static str,
    pub(crate) vertex: &'static str,
    pub(crate) fragment: &'static str,
}

pub(crate) const QUAD_SHADER: ShaderSource = ShaderSource {
    name: "renderer2d_quad",
    vertex: QUAD_VERT,
    fragment: QUAD_FRAG,
};

pub(crate) const LINE_SHADER: ShaderSource = ShaderSource {
    name: "renderer2d_line",
    vertex: LINE_VERT,
    fragment: LINE_FRAG,
};

/// compiles a gl shader
pub(crate) fn compile_shader(src: &str, ty: GLenum) -> Result<GLuint, RenderError> {
    let stage = match ty {
        gl::VERTEX_SHADER => "vertex",
        gl::FRAGMENT_SHADER => "fragment",
        _ => "unknown",
    };
    let c_str = CString::new(src.as_bytes()).map_err(|_| RenderError::ShaderCompile {
        stage,
        log: String::from("shader source contains a nul byte"),
    })?;
    unsafe {
        let shader = gl::CreateShader(ty);
        gl::ShaderSource(shader, 1, &c_str.as_ptr(), ptr::null());
        gl::CompileShader(shader);

        // Get the compile status
        let mut status = gl::FALSE as GLint;
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);

        if status != (gl::TRUE as GLint) {
            let mut len = 0;
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
            let mut buf = vec![0u8; len.max(1) as usize];
            gl::GetShaderInfoLog(
                shader,
                len,
                ptr::null_mut(),
                buf.as_mut_ptr() as *mut GLchar,
            );
            gl::DeleteShader(shader);
            return Err(RenderError::ShaderCompile {
                stage,
                log: info_log_to_string(buf),
            });
        }
        Ok(shader)
    }
}

/// links a gl shader program, the shader objects are deleted either way
pub(crate) fn link_program(name: &str, vs: GLuint, fs: GLuint) -> Result<GLuint, RenderError> {
    unsafe {
        let program = gl::CreateProgram();
        gl::AttachShader(program, vs);
        gl::AttachShader(program, fs);
        gl::LinkProgram(program);

        gl::DetachShader(program, fs);
        gl::DetachShader(program, vs);
        gl::DeleteShader(fs);
        gl::DeleteShader(vs);

        // Get the link status
        let mut status = gl::FALSE as GLint;
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);

        if status != (gl::TRUE as GLint) {
            let mut len: GLint = 0;
            gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
            let mut buf = vec![0u8; len.max(1) as usize];
            gl::GetProgramInfoLog(
                program,
                len,
                ptr::null_mut(),
                buf.as_mut_ptr() as *mut GLchar,
            );
            gl::DeleteProgram(program);
            return Err(RenderError::ShaderLink {
                name: name.to_string(),
                log: info_log_to_string(buf),
            });
        }
        Ok(program)
    }
}

/// strips the trailing null characters of a gl info log
fn info_log_to_string(mut buf: Vec<u8>) -> String {
    while buf.last() == Some(&0) {
        buf.pop();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_declare_the_uniforms() {
        for source in [QUAD_SHADER, LINE_SHADER] {
            assert!(source.vertex.contains(VIEW_PROJECTION_UNIFORM));
            assert!(source.vertex.starts_with("#version"));
            assert!(source.fragment.starts_with("#version"));
        }
        assert!(QUAD_SHADER.fragment.contains(SAMPLER_UNIFORM));
    }

    #[test]
    fn info_log_trimming() {
        assert_eq!(info_log_to_string(b"oops\0\0".to_vec()), "oops");
        assert_eq!(info_log_to_string(vec![0]), "");
    }
}
