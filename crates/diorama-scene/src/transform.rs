//! Affine transform algebra.
//!
//! Every operation right-multiplies onto the incoming matrix, so each new
//! operation is expressed in the instance's current local frame:
//!
//! ```
//! use diorama_scene::transform;
//! use glam::{Mat4, Vec3};
//!
//! let t = transform::translate(Mat4::IDENTITY, Vec3::new(1.0, 0.0, 0.0));
//! let t = transform::scale(t, Vec3::splat(2.0));
//! // The scale does not move the origin that the translation placed.
//! assert_eq!(transform::position(&t), Vec3::new(1.0, 0.0, 0.0));
//! ```

use glam::{Mat4, Vec3, Vec4};

use crate::axis::Axis;

pub fn translate(t: Mat4, offset: Vec3) -> Mat4 {
    t * Mat4::from_translation(offset)
}

/// Rotate by `angle` radians about `axis`. The axis need not be unit
/// length; a zero axis leaves the transform unchanged.
pub fn rotate(t: Mat4, angle: f32, axis: Vec3) -> Mat4 {
    let axis = axis.normalize_or_zero();
    if axis == Vec3::ZERO {
        return t;
    }
    t * Mat4::from_axis_angle(axis, angle)
}

pub fn scale(t: Mat4, factors: Vec3) -> Mat4 {
    t * Mat4::from_scale(factors)
}

/// Shear driven by the x coordinate: `y += s·x`, `z += u·x`.
pub fn shear_x(t: Mat4, s: f32, u: f32) -> Mat4 {
    let mut r = Mat4::IDENTITY;
    r.x_axis = Vec4::new(1.0, s, u, 0.0);
    t * r
}

/// Shear driven by the y coordinate: `x += s·y`, `z += u·y`.
pub fn shear_y(t: Mat4, s: f32, u: f32) -> Mat4 {
    let mut r = Mat4::IDENTITY;
    r.y_axis = Vec4::new(s, 1.0, u, 0.0);
    t * r
}

/// Shear driven by the z coordinate: `x += s·z`, `y += u·z`.
pub fn shear_z(t: Mat4, s: f32, u: f32) -> Mat4 {
    let mut r = Mat4::IDENTITY;
    r.z_axis = Vec4::new(s, u, 1.0, 0.0);
    t * r
}

/// Shear driven by `axis`; `s` and `u` feed the two remaining axes in
/// x, y, z order.
pub fn shear(t: Mat4, axis: Axis, s: f32, u: f32) -> Mat4 {
    match axis {
        Axis::X => shear_x(t, s, u),
        Axis::Y => shear_y(t, s, u),
        Axis::Z => shear_z(t, s, u),
    }
}

/// Mirror-and-rescale: a scale by `-k·f + 1` on every axis.
///
/// With `k·f == 2` this is an exact reflection; any other product also
/// resizes the instance.
pub fn reflect(t: Mat4, factors: Vec3, k: f32) -> Mat4 {
    scale(t, -k * factors + Vec3::ONE)
}

/// Right-multiply by `I - n·nᵀ`. `n` is used as given, not normalized.
pub fn project_onto_axes(t: Mat4, n: Vec3) -> Mat4 {
    let r = Mat4::from_cols(
        Vec4::new(1.0 - n.x * n.x, -n.x * n.y, -n.x * n.z, 0.0),
        Vec4::new(-n.x * n.y, 1.0 - n.y * n.y, -n.y * n.z, 0.0),
        Vec4::new(-n.x * n.z, -n.y * n.z, 1.0 - n.z * n.z, 0.0),
        Vec4::W,
    );
    t * r
}

/// Rotate, translate along the rotated offset, rotate again.
///
/// Repeated small steps make the instance circle a point that sits off its
/// own origin while its orientation keeps facing along the path. This only
/// approximates a circular orbit and drifts over many calls.
pub fn orbit(t: Mat4, angle: f32, axis: Vec3, offset: Vec3) -> Mat4 {
    let t = rotate(t, angle, axis);
    let t = translate(t, offset);
    rotate(t, angle, axis)
}

/// Translation column of the transform.
pub fn position(t: &Mat4) -> Vec3 {
    t.w_axis.truncate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < EPSILON
    }

    fn approx_eq_mat4(a: &Mat4, b: &Mat4) -> bool {
        a.abs_diff_eq(*b, EPSILON)
    }

    #[test]
    fn operations_compose_in_local_frame() {
        let t = rotate(Mat4::IDENTITY, FRAC_PI_2, Vec3::Z);
        let t = translate(t, Vec3::X);

        // Local +X is world +Y after the quarter turn about Z.
        assert!(approx_eq_vec3(position(&t), Vec3::Y), "got {:?}", position(&t));
    }

    #[test]
    fn orbit_with_zero_angle_is_a_translation() {
        let base = scale(translate(Mat4::IDENTITY, Vec3::new(3.0, 0.0, 0.0)), Vec3::splat(0.1));
        let offset = Vec3::new(-0.5, 2.0, 0.25);

        let orbited = orbit(base, 0.0, Vec3::Y, offset);
        assert!(approx_eq_mat4(&orbited, &translate(base, offset)));
    }

    #[test]
    fn orbit_matches_its_three_steps() {
        let axis = Vec3::new(0.0, 0.0, 1.0);
        let offset = Vec3::new(-1.0, 0.0, 0.0);
        let expected = rotate(translate(rotate(Mat4::IDENTITY, 0.3, axis), offset), 0.3, axis);

        assert!(approx_eq_mat4(&orbit(Mat4::IDENTITY, 0.3, axis, offset), &expected));
    }

    #[test]
    fn orbit_turns_the_frame_twice_per_step() {
        let angle = std::f32::consts::TAU / 64.0;
        let mut t = Mat4::IDENTITY;
        for _ in 0..16 {
            t = orbit(t, angle, Vec3::Z, Vec3::new(-0.1, 0.0, 0.0));
        }

        // 16 steps of two rotations each: a half turn of orientation.
        let half_turn = Mat4::from_rotation_z(std::f32::consts::PI);
        assert!(t.x_axis.abs_diff_eq(half_turn.x_axis, EPSILON));
        assert!(t.y_axis.abs_diff_eq(half_turn.y_axis, EPSILON));
        assert!(position(&t).length() > 0.1);
    }

    #[test]
    fn rotate_with_zero_axis_is_identity() {
        let t = translate(Mat4::IDENTITY, Vec3::ONE);
        assert_eq!(rotate(t, 1.0, Vec3::ZERO), t);
    }

    #[test]
    fn shear_x_feeds_y_and_z() {
        let t = shear_x(Mat4::IDENTITY, 0.5, -0.25);
        let p = t.transform_point3(Vec3::new(2.0, 1.0, 1.0));
        assert!(approx_eq_vec3(p, Vec3::new(2.0, 2.0, 0.5)));
    }

    #[test]
    fn shear_y_and_z_feed_the_other_axes() {
        let p = shear_y(Mat4::IDENTITY, 1.0, 2.0).transform_point3(Vec3::new(0.0, 1.0, 0.0));
        assert!(approx_eq_vec3(p, Vec3::new(1.0, 1.0, 2.0)));

        let p = shear_z(Mat4::IDENTITY, 1.0, 2.0).transform_point3(Vec3::new(0.0, 0.0, 1.0));
        assert!(approx_eq_vec3(p, Vec3::new(1.0, 2.0, 1.0)));

        assert_eq!(shear(Mat4::IDENTITY, Axis::Y, 1.0, 2.0), shear_y(Mat4::IDENTITY, 1.0, 2.0));
    }

    #[test]
    fn reflect_scales_by_one_minus_k_f() {
        let t = reflect(Mat4::IDENTITY, Vec3::new(1.0, 0.0, 0.05), 40.0);
        assert!(approx_eq_mat4(&t, &Mat4::from_scale(Vec3::new(-39.0, 1.0, -1.0))));
    }

    #[test]
    fn project_onto_single_axis_flattens_it() {
        let t = project_onto_axes(Mat4::IDENTITY, Vec3::Y);
        let p = t.transform_point3(Vec3::new(1.0, 5.0, -2.0));
        assert!(approx_eq_vec3(p, Vec3::new(1.0, 0.0, -2.0)));
    }

    #[test]
    fn project_keeps_prior_translation() {
        let base = translate(Mat4::IDENTITY, Vec3::new(4.0, 0.0, 0.0));
        let t = project_onto_axes(base, Vec3::ONE);
        assert_eq!(position(&t), Vec3::new(4.0, 0.0, 0.0));
    }
}
