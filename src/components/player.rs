use bevy_ecs::prelude::*;
use bevy_hierarchy::BuildChildren;
use log::{debug, info};

use crate::components::{ControllerGrip, Transform};
use crate::config::Settings;
use crate::events::CameraSetEvent;
use crate::frame_time::FrameTime;
use crate::input::{Hand, Input};
use crate::locomotion::{Locomotion, PlayerState};
use crate::physics_world::PhysicsWorld;

/// The rig: the point on the ground the headset and controllers are
/// tracked relative to.
#[derive(Component, Debug)]
pub struct Player {
    pub state: PlayerState,
}

/// The headset, child of the rig.
#[derive(Component, Debug)]
pub struct Head;

impl Player {
    pub fn spawn(mut commands: Commands, settings: Res<Settings>) {
        let position = settings.spawn_position();
        info!("Spawning rig at {:?} in {:?}", position, settings.variant);

        commands
            .spawn((
                Player { state: PlayerState::new(position) },
                Transform::from_position(position),
            ))
            .with_children(|parent| {
                parent.spawn((Head, Transform::default()));
                for hand in [Hand::Left, Hand::Right] {
                    parent.spawn((hand, ControllerGrip::default(), Transform::default()));
                }
            });
    }

    pub fn update(
        frame_time: Res<FrameTime>,
        input: Res<Input>,
        settings: Res<Settings>,
        physics: Res<PhysicsWorld>,
        q_head: Query<&Transform, (With<Head>, Without<Player>)>,
        mut q_player: Query<(&mut Player, &mut Transform), Without<Head>>,
    ) {
        let locomotion = Locomotion::new(settings.locomotion);
        let head = q_head.get_single().cloned().unwrap_or_default();

        for (mut player, mut transform) in q_player.iter_mut() {
            let look = transform.compose(&head).rotation();
            player.state = locomotion.step(player.state, frame_time.delta, &input, &look, &*physics);
            transform.set_position(player.state.position);
        }
    }

    /// Stores the latest headset pose on the head.
    pub fn update_player_view_xr(
        mut events: EventReader<CameraSetEvent>,
        mut q_head: Query<&mut Transform, With<Head>>,
    ) {
        if let Some(event) = events.iter().last() {
            for mut transform in q_head.iter_mut() {
                transform.set_pose(event.pos, event.rot);
            }
        }
    }

    pub fn log_state(
        frame_time: Res<FrameTime>,
        settings: Res<Settings>,
        physics: Res<PhysicsWorld>,
        q_player: Query<&Player>,
    ) {
        if frame_time.every(180) {
            for player in q_player.iter() {
                let s = &player.state;
                debug!(
                    "Rig pos: X={:.2}, Y={:.2}, Z={:.2}, VelY: {:.2}, {:?}",
                    s.position.x, s.position.y, s.position.z, s.velocity.y, s.footing
                );
            }
        }
        if physics.is_empty() && settings.variant.floor_half_extents().is_none() && frame_time.every(300) {
            info!("Waiting for ground geometry to stream in...");
        }
    }
}
