use crate::glm;
use crate::rendering::backend::{RenderBackend, TextureID};
use crate::rendering::error::RenderError;
use crate::utils::constants::QUAD_UVS;
use stb_image::image::LoadResult;
use std::path::Path;

/// A texture living on the GPU.
///
/// Two ``Texture2D``s are the same texture iff their handles are equal, the size is only carried
/// along.
/// The texture is not deleted on drop, call ``Texture2D::delete`` when it is no longer drawn.
#[derive(Debug, Clone, Copy)]
pub struct Texture2D {
    id: TextureID,
    width: u32,
    height: u32,
}

impl Texture2D {
    /// uploads tightly packed RGBA8 pixel data as a new texture
    pub fn from_rgba(
        backend: &mut dyn RenderBackend,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<Self, RenderError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(RenderError::TextureLoad {
                path: String::from("<memory>"),
                reason: format!("expected {expected} bytes of RGBA data, got {}", rgba.len()),
            });
        }
        let id = backend.create_texture(width, height, rgba)?;
        log::debug!("created {width}x{height} texture {id}");
        Ok(Self { id, width, height })
    }

    /// loads an image file and uploads it as a new texture
    pub fn from_file(
        backend: &mut dyn RenderBackend,
        path: impl AsRef<Path>,
    ) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let image = match stb_image::image::load_with_depth(path, 4, false) {
            LoadResult::ImageU8(image) => image,
            LoadResult::ImageF32(_) => {
                return Err(RenderError::TextureLoad {
                    path: path.display().to_string(),
                    reason: String::from("HDR images are not supported"),
                })
            }
            LoadResult::Error(reason) => {
                return Err(RenderError::TextureLoad {
                    path: path.display().to_string(),
                    reason,
                })
            }
        };
        // images are stored top row first, texture coordinates start at the bottom
        let row_len = image.width * 4;
        let flipped: Vec<u8> = image
            .data
            .chunks_exact(row_len)
            .rev()
            .flatten()
            .copied()
            .collect();
        Self::from_rgba(backend, image.width as u32, image.height as u32, &flipped)
    }

    /// wraps an already existing texture handle
    pub fn from_raw(id: TextureID, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    /// the backend handle of this texture
    #[inline]
    pub fn id(&self) -> TextureID {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// releases the GPU texture
    pub fn delete(self, backend: &mut dyn RenderBackend) {
        backend.delete_texture(self.id);
    }
}

impl PartialEq for Texture2D {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Texture2D {}

/// A rectangular region of a texture atlas with its own texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubTexture2D {
    texture: Texture2D,
    tex_coords: [glm::Vec2; 4],
}

impl SubTexture2D {
    /// creates a sub texture that covers the whole texture
    pub fn full(texture: Texture2D) -> Self {
        Self {
            texture,
            tex_coords: QUAD_UVS,
        }
    }

    /// Creates a sub texture from a cell index in a grid atlas.
    /// ``cell_size`` is in pixels, ``sprite_size`` is the number of cells the sprite spans.
    pub fn from_coords(
        texture: Texture2D,
        coords: glm::Vec2,
        cell_size: glm::Vec2,
        sprite_size: glm::Vec2,
    ) -> Self {
        let tex_size = glm::vec2(texture.width as f32, texture.height as f32);
        let min =
            glm::vec2(coords.x * cell_size.x, coords.y * cell_size.y).component_div(&tex_size);
        let max = glm::vec2(
            (coords.x + sprite_size.x) * cell_size.x,
            (coords.y + sprite_size.y) * cell_size.y,
        )
        .component_div(&tex_size);

        Self {
            texture,
            tex_coords: [
                glm::vec2(min.x, min.y),
                glm::vec2(max.x, min.y),
                glm::vec2(max.x, max.y),
                glm::vec2(min.x, max.y),
            ],
        }
    }

    #[inline]
    pub fn texture(&self) -> &Texture2D {
        &self.texture
    }

    #[inline]
    pub fn tex_coords(&self) -> &[glm::Vec2; 4] {
        &self.tex_coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_handle() {
        let a = Texture2D::from_raw(7, 16, 16);
        let b = Texture2D::from_raw(7, 32, 32);
        let c = Texture2D::from_raw(8, 16, 16);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn atlas_cell_coordinates() {
        let atlas = Texture2D::from_raw(1, 256, 128);
        let sub = SubTexture2D::from_coords(
            atlas,
            glm::vec2(2.0, 1.0),
            glm::vec2(64.0, 64.0),
            glm::vec2(1.0, 1.0),
        );
        assert_eq!(
            sub.tex_coords(),
            &[
                glm::vec2(0.5, 0.5),
                glm::vec2(0.75, 0.5),
                glm::vec2(0.75, 1.0),
                glm::vec2(0.5, 1.0),
            ]
        );
        assert_eq!(sub.texture(), &atlas);
    }

    #[test]
    fn full_sub_texture_uses_default_uvs() {
        let texture = Texture2D::from_raw(3, 4, 4);
        assert_eq!(SubTexture2D::full(texture).tex_coords(), &QUAD_UVS);
    }
}
