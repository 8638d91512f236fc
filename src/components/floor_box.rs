use crate::components::transform::Transform;
use crate::config::Settings;
use crate::math::Vec3f;
use crate::physics_world::{GroundId, PhysicsWorld};
use bevy_ecs::prelude::*;

/// Static floor of the room and forest scenes. Its top face is at y = 0.
#[derive(Component)]
pub struct FloorBox {
    pub ground: GroundId,
}

impl FloorBox {
    pub fn spawn(
        mut commands: Commands,
        mut physics: ResMut<PhysicsWorld>,
        settings: Res<Settings>,
    ) {
        let Some(half_extents) = settings.variant.floor_half_extents() else {
            return;
        };
        let half_extents = Vec3f::from(half_extents);
        let pos = Vec3f::new(0.0, -half_extents.y, 0.0);
        let ground = physics.add_floor_box(pos, half_extents);

        commands.spawn((FloorBox { ground }, Transform::from_position(pos)));
    }
}
