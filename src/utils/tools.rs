use crate::glm;
use crate::utils::constants::Z_AXIS;
use std::cell::RefCell;
use std::rc::Rc;

/// alias for a ``Rc<RefCell>``
pub type SharedPtr<T> = Rc<RefCell<T>>;

/// creates a new ``SharedPtr<T>``
pub fn shared_ptr<T>(value: T) -> SharedPtr<T> {
    Rc::new(RefCell::new(value))
}

/// Converts a ``Vec3`` to a ``Vec4`` by adding a ``1.0`` in the ``w`` slot.
pub fn to_vec4(v: &glm::Vec3) -> glm::Vec4 {
    glm::vec4(v.x, v.y, v.z, 1.0)
}

/// Converts ``v`` to a ``Vec4`` and right-multiplies it to ``m`` and returns the result converted
/// back to a ``Vec3``.
pub fn mult_mat4_vec3(m: &glm::Mat4, v: &glm::Vec3) -> glm::Vec3 {
    (m * to_vec4(v)).xyz()
}

/// Builds the model matrix ``translate * scale`` for an axis-aligned quad.
pub fn quad_transform(position: &glm::Vec3, size: &glm::Vec2) -> glm::Mat4 {
    glm::translate(&glm::Mat4::identity(), position)
        * glm::scale(&glm::Mat4::identity(), &glm::vec3(size.x, size.y, 1.0))
}

/// Builds the model matrix ``translate * rotate_z * scale`` for a quad rotated by ``rotation``
/// radians.
pub fn rotated_quad_transform(position: &glm::Vec3, size: &glm::Vec2, rotation: f32) -> glm::Mat4 {
    glm::translate(&glm::Mat4::identity(), position)
        * glm::rotate(&glm::Mat4::identity(), rotation, &Z_AXIS)
        * glm::scale(&glm::Mat4::identity(), &glm::vec3(size.x, size.y, 1.0))
}

/// Component-wise approximate equality of two ``Vec3``s.
pub fn approx_eq_vec3(a: &glm::Vec3, b: &glm::Vec3, eps: f32) -> bool {
    (a - b).abs().max() <= eps
}
