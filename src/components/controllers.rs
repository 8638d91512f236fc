use bevy_ecs::prelude::*;
use bevy_hierarchy::{BuildChildren, DespawnRecursiveExt};
use log::info;

use crate::events::ControllerConnectionEvent;
use crate::input::Hand;

/// Where a controller model hangs off the rig. One per hand.
#[derive(Debug, Default, Component)]
pub struct ControllerGrip {
    model: Option<Entity>,
}

impl ControllerGrip {
    pub fn model(&self) -> Option<Entity> {
        self.model
    }
}

/// A controller model for the renderer to draw. The renderer picks the
/// mesh from `profiles`.
#[derive(Debug, Clone, Component)]
pub struct ControllerModel {
    pub name: String,
    pub hand: Hand,
    pub profiles: Vec<String>,
}

impl ControllerModel {
    pub fn new(hand: Hand, profiles: Vec<String>) -> Self {
        Self {
            name: format!("ControllerModel_{}", hand.label()),
            hand,
            profiles,
        }
    }
}

pub struct Controllers;

impl Controllers {
    /// Attaches a model on connect and drops it on disconnect.
    ///
    /// Both are idempotent: connecting twice leaves one model (the newest),
    /// disconnecting a bare grip does nothing.
    pub fn handle_connections(
        mut commands: Commands,
        mut events: EventReader<ControllerConnectionEvent>,
        mut q_grips: Query<(Entity, &Hand, &mut ControllerGrip)>,
    ) {
        for event in events.iter() {
            let (hand, profiles) = match event {
                ControllerConnectionEvent::Connected { hand, profiles } => (*hand, Some(profiles)),
                ControllerConnectionEvent::Disconnected { hand } => (*hand, None),
            };

            for (grip_entity, &grip_hand, mut grip) in q_grips.iter_mut() {
                if grip_hand != hand {
                    continue;
                }
                if let Some(old) = grip.model.take() {
                    info!("Removing {} controller model", hand.label());
                    commands.entity(old).despawn_recursive();
                }
                if let Some(profiles) = profiles {
                    let model = ControllerModel::new(hand, profiles.clone());
                    info!("Attaching {} to {} grip", model.name, hand.label());
                    let model = commands.spawn(model).id();
                    commands.entity(grip_entity).add_child(model);
                    grip.model = Some(model);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_hierarchy::Children;

    fn world_with_grips() -> World {
        let mut world = World::new();
        world.init_resource::<Events<ControllerConnectionEvent>>();
        world.spawn((Hand::Left, ControllerGrip::default()));
        world.spawn((Hand::Right, ControllerGrip::default()));
        world
    }

    fn send(world: &mut World, events: Vec<ControllerConnectionEvent>) {
        for event in events {
            world.resource_mut::<Events<ControllerConnectionEvent>>().send(event);
        }
        let mut schedule = Schedule::default();
        schedule.add_systems(Controllers::handle_connections);
        schedule.run(world);
        world.resource_mut::<Events<ControllerConnectionEvent>>().clear();
    }

    fn connected(hand: Hand) -> ControllerConnectionEvent {
        ControllerConnectionEvent::Connected {
            hand,
            profiles: vec![String::from("oculus-touch-v3")],
        }
    }

    fn models(world: &mut World) -> Vec<ControllerModel> {
        world.query::<&ControllerModel>().iter(world).cloned().collect()
    }

    #[test]
    fn connect_attaches_one_model_per_hand() {
        let mut world = world_with_grips();
        send(&mut world, vec![connected(Hand::Left), connected(Hand::Left)]);

        let models = models(&mut world);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "ControllerModel_left");
        assert_eq!(models[0].profiles, vec![String::from("oculus-touch-v3")]);

        // Hangs off the left grip
        let mut grips = world.query::<(&Hand, &ControllerGrip, Option<&Children>)>();
        for (hand, grip, children) in grips.iter(&world) {
            match hand {
                Hand::Left => {
                    let model = grip.model().unwrap();
                    assert!(children.unwrap().contains(&model));
                }
                Hand::Right => assert!(grip.model().is_none()),
            }
        }
    }

    #[test]
    fn reconnect_replaces_model() {
        let mut world = world_with_grips();
        send(&mut world, vec![connected(Hand::Right)]);
        send(&mut world, vec![connected(Hand::Right)]);
        assert_eq!(models(&mut world).len(), 1);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut world = world_with_grips();
        send(&mut world, vec![connected(Hand::Left), connected(Hand::Right)]);
        assert_eq!(models(&mut world).len(), 2);

        let gone = ControllerConnectionEvent::Disconnected { hand: Hand::Left };
        send(&mut world, vec![gone.clone(), gone]);
        let left = models(&mut world);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].hand, Hand::Right);

        send(&mut world, vec![ControllerConnectionEvent::Disconnected { hand: Hand::Left }]);
        assert_eq!(models(&mut world).len(), 1);
    }
}
