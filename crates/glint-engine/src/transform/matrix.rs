use glam::{Mat4, Vec4};

/// How far `build_view` pushes the camera back along -Z.
pub const DEFAULT_VIEW_DISTANCE: f32 = 6.0;

/// Perspective projection.
///
/// With `t = tan(fov / 2)`: index 0 is `0.5 / t`, index 5 is
/// `0.5 * aspect / t`, index 10 is `-(far + near) / (far - near)`, index 11
/// is `-1` and index 14 is `-2 * far * near / (far - near)`. Everything else
/// is zero.
pub fn build_projection(fov_degrees: f32, aspect: f32, z_near: f32, z_max: f32) -> Mat4 {
    let t = (fov_degrees.to_radians() * 0.5).tan();
    let depth = z_max - z_near;

    let mut m = [0.0f32; 16];
    m[0] = 0.5 / t;
    m[5] = 0.5 * aspect / t;
    m[10] = -(z_max + z_near) / depth;
    m[11] = -1.0;
    m[14] = -2.0 * z_max * z_near / depth;
    Mat4::from_cols_array(&m)
}

/// Uniform scale with the camera pushed back by [`DEFAULT_VIEW_DISTANCE`].
pub fn build_view(scale: f32) -> Mat4 {
    build_view_at(scale, DEFAULT_VIEW_DISTANCE)
}

/// `diag(scale, scale, scale, 1)` with `distance` subtracted from index 14.
pub fn build_view_at(scale: f32, distance: f32) -> Mat4 {
    let mut view = Mat4::from_diagonal(Vec4::new(scale, scale, scale, 1.0));
    view.w_axis.z -= distance;
    view
}

/// Rotates `model` about Z by `angle` radians, in place.
///
/// Only rows 0 and 1 of the first three columns change; both are computed
/// from the values before the update.
pub fn rotate_z(model: &mut Mat4, angle: f32) {
    let (s, c) = angle.sin_cos();
    for col in [&mut model.x_axis, &mut model.y_axis, &mut model.z_axis] {
        let (x, y) = (col.x, col.y);
        col.x = c * x - s * y;
        col.y = c * y + s * x;
    }
}
