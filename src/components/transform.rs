use bevy_ecs::prelude::*;
use crate::math::{Vec3f, UnitQuat, UnitQuatf};

/// Pose of an entity. Children of the rig (head, grips) hold poses
/// relative to the rig; the rig itself is in world space.
#[derive(Component,Debug,Clone)]
pub struct Transform {
    pos: Vec3f,
    rot: UnitQuatf,
}

impl Transform {
    pub fn new(pos: Vec3f, rot: UnitQuatf) -> Self {
        Self { pos, rot }
    }

    pub fn from_position(pos: Vec3f) -> Self {
        Transform::new(pos, UnitQuat::identity())
    }

    // Getters

    pub fn position(&self) -> Vec3f {
        self.pos
    }

    pub fn rotation(&self) -> UnitQuatf {
        self.rot
    }

    // Setters

    pub fn set_position(&mut self, pos: Vec3f) {
        self.pos = pos;
    }

    pub fn set_pose(&mut self, pos: Vec3f, rot: UnitQuatf) {
        self.pos = pos;
        self.rot = rot;
    }

    /// World pose of a child whose pose is relative to `self`.
    pub fn compose(&self, child: &Transform) -> Transform {
        Transform::new(self.pos + self.rot * child.pos, self.rot * child.rot)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::from_position(Vec3f::zeros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn compose_places_child_in_world() {
        let rig = Transform::new(
            Vec3f::new(10.0, 0.0, 0.0),
            UnitQuat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2),
        );
        let head = Transform::from_position(Vec3f::new(0.0, 1.6, -1.0));
        let world = rig.compose(&head);
        assert!((world.position() - Vec3f::new(9.0, 1.6, 0.0)).norm() < 1e-5);
        let forward = world.rotation() * Vec3f::new(0.0, 0.0, -1.0);
        assert!((forward - Vec3f::new(-1.0, 0.0, 0.0)).norm() < 1e-5);
    }
}
