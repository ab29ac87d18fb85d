use crate::glm;
use crate::utils::constants::Z_AXIS;

/// A projection for 2D rendering. The camera placement comes from the transform passed to
/// ``begin_scene``.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub projection: glm::Mat4,
}

impl Camera {
    /// creates a new orthographic camera
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        Self {
            projection: glm::ortho(left, right, bottom, top, -1.0, 1.0),
        }
    }

    /// creates a new orthographic camera from a size: `(-size, size, -size, size)`
    pub fn from_size(size: f32) -> Self {
        Self::orthographic(-size, size, -size, size)
    }

    /// computes the view projection for a camera placed by ``transform``
    pub fn view_projection(&self, transform: &glm::Mat4) -> glm::Mat4 {
        let view = transform.try_inverse().unwrap_or_else(|| {
            log::warn!("camera transform is not invertible, using identity view");
            glm::Mat4::identity()
        });
        self.projection * view
    }
}

/// stores the current camera config for 2D rendering with its own position and rotation
#[derive(Debug, Clone)]
pub struct OrthoCamera {
    projection: glm::Mat4,
    view: glm::Mat4,
    view_projection: glm::Mat4,
    position: glm::Vec3,
    rotation: f32,
}

impl OrthoCamera {
    /// creates a new orthographic camera
    pub fn new(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        let projection = glm::ortho(left, right, bottom, top, -1.0, 1.0);

        Self {
            projection,
            view: glm::Mat4::identity(),
            view_projection: projection,
            position: glm::Vec3::zeros(),
            rotation: 0.0,
        }
    }

    /// changes the projection bounds (e.g. after a window resize)
    pub fn set_projection(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        self.projection = glm::ortho(left, right, bottom, top, -1.0, 1.0);
        self.view_projection = self.projection * self.view;
    }

    /// moves the camera
    pub fn set_position(&mut self, position: glm::Vec3) {
        self.position = position;
        self.recalculate_view();
    }

    /// rotates the camera around the z axis (radians)
    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
        self.recalculate_view();
    }

    #[inline]
    pub fn position(&self) -> &glm::Vec3 {
        &self.position
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    #[inline]
    pub fn projection(&self) -> &glm::Mat4 {
        &self.projection
    }

    #[inline]
    pub fn view(&self) -> &glm::Mat4 {
        &self.view
    }

    #[inline]
    pub fn view_projection(&self) -> &glm::Mat4 {
        &self.view_projection
    }

    fn recalculate_view(&mut self) {
        let transform = glm::translate(&glm::Mat4::identity(), &self.position)
            * glm::rotate(&glm::Mat4::identity(), self.rotation, &Z_AXIS);
        // rigid transforms are always invertible
        self.view = transform.try_inverse().unwrap_or_else(glm::Mat4::identity);
        self.view_projection = self.projection * self.view;
    }
}
