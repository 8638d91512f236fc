#![allow(dead_code)]

use std::ops::Add;
use rapier3d::na;
use rapier3d::prelude::Real;

// Type defs for convenience
// Makes it easier to switch the maths library

// Float specializations
pub type Vec2f = na::Vector2<f32>;
pub type Vec3f = na::Vector3<f32>;
pub type Point3f = na::Point3<f32>;
pub type Mat3f = na::Matrix3<f32>;
pub type Mat4f = na::Matrix4<f32>;
pub type Quatf = na::Quaternion<f32>;
pub type UnitQuatf = na::UnitQuaternion<f32>;

// Generic
pub type Vec3<T> = na::Vector3<T>;
pub type Point3<T> = na::Point3<T>;
pub type Mat4<T> = na::Matrix4<T>;
pub type UnitQuat<T> = na::UnitQuaternion<T>;


// WTF, how else to cast?
pub fn to_point(v3: Vec3f) -> Point3<Real> {
    Point3::origin().add(v3)
}

pub fn is_finite(v: &Vec3f) -> bool {
    v.iter().all(|c| c.is_finite())
}

/// Heading of `rot` around the world Y axis, in radians.
///
/// Uses the YXZ Euler decomposition that WebXR scenes conventionally use,
/// so pitch and roll of the headset never leak into the heading. When the
/// view points straight up or down the heading is read from the X column
/// instead.
pub fn yaw_angle(rot: &UnitQuatf) -> f32 {
    let m = rot.to_rotation_matrix();
    let m = m.matrix();
    if m[(1, 2)].abs() < 0.999_999_9 {
        m[(0, 2)].atan2(m[(2, 2)])
    } else {
        (-m[(2, 0)]).atan2(m[(0, 0)])
    }
}

/// `rot` with pitch and roll stripped.
pub fn yaw_only(rot: &UnitQuatf) -> UnitQuatf {
    UnitQuat::from_axis_angle(&Vec3::y_axis(), yaw_angle(rot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn pure_yaw_is_recovered() {
        let rot = UnitQuat::from_axis_angle(&Vec3::y_axis(), 0.7);
        assert!(close(yaw_angle(&rot), 0.7));
    }

    #[test]
    fn pitch_and_roll_are_stripped() {
        let yaw = UnitQuat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_4);
        let pitch = UnitQuat::from_axis_angle(&Vec3::x_axis(), -0.9);
        let roll = UnitQuat::from_axis_angle(&Vec3::z_axis(), 0.3);
        // YXZ order: yaw applied last in world space
        let head = yaw * pitch * roll;

        let flat = yaw_only(&head);
        assert!(close(yaw_angle(&flat), FRAC_PI_4));

        // Forward stays in the horizontal plane
        let forward = flat * Vec3f::new(0.0, 0.0, -1.0);
        assert!(close(forward.y, 0.0));
        assert!(close(forward.norm(), 1.0));
    }

    #[test]
    fn looking_straight_down_keeps_a_heading() {
        let yaw = UnitQuat::from_axis_angle(&Vec3::y_axis(), 0.5);
        let pitch = UnitQuat::from_axis_angle(&Vec3::x_axis(), -FRAC_PI_2);
        let angle = yaw_angle(&(yaw * pitch));
        assert!(angle.is_finite());
        assert!(close(angle, 0.5));
    }

    #[test]
    fn to_point_keeps_coordinates() {
        let p = to_point(Vec3f::new(1.0, -2.0, 3.5));
        assert_eq!(p.coords, Vec3f::new(1.0, -2.0, 3.5));
    }
}
