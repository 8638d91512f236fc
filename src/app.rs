use crate::components::{ControllerGrip, ControllerModel, Player, Transform};
use crate::config::Settings;
use crate::events::{CameraSetEvent, ControllerConnectionEvent, FrameTimeEvent};
use crate::frame_time::FrameTime;
use crate::input::{GamepadSnapshot, Hand, Input};
use crate::locomotion::PlayerState;
use crate::math::{UnitQuatf, Vec3f};
use crate::physics_world::{GroundId, GroundMeshError, PhysicsWorld};
use crate::systems::*;
use bevy_ecs::prelude::*;
use log::info;

#[derive(Resource)]
pub struct AppState {
    pub running: bool,
    pub webxr: bool,
    pub frametime_manual: bool,
}

/// The ECS world of one session and the entry points the frame driver
/// calls into.
pub struct App {
    pub world: World,
}

impl App {
    pub fn new(settings: Settings, webxr: bool) -> Self {
        let mut world = World::default();
        world.init_resource::<Schedules>();

        world.insert_resource(AppState {
            running: true,
            webxr,
            frametime_manual: webxr,
        });
        world.insert_resource(FrameTime::new(settings.locomotion.max_delta));
        world.insert_resource(Input::new());
        world.insert_resource(PhysicsWorld::new());
        world.insert_resource(settings);

        // Events
        world.init_resource::<Events<FrameTimeEvent>>();
        world.init_resource::<Events<CameraSetEvent>>();
        world.init_resource::<Events<ControllerConnectionEvent>>();

        // Schedules
        let spawn_scene_schedule = new_spawn_scene_schedule();
        world.add_schedule(spawn_scene_schedule.0, spawn_scene_schedule.1);
        let preupdate_schedule = new_preupdate_schedule();
        world.add_schedule(preupdate_schedule.0, preupdate_schedule.1);
        let update_schedule = new_update_schedule();
        world.add_schedule(update_schedule.0, update_schedule.1);
        let controller_update_schedule = new_controller_update_schedule();
        world.add_schedule(controller_update_schedule.0, controller_update_schedule.1);
        let camera_update_schedule = new_camera_update_schedule();
        world.add_schedule(camera_update_schedule.0, camera_update_schedule.1);

        // Spawn right away so controllers connecting before the first
        // frame find their grips.
        world.run_schedule(SpawnLabel);

        Self { world }
    }

    /// Advances the simulation by one frame. `duration` is only used in XR
    /// mode; otherwise the frame time is measured.
    pub fn update_scene(&mut self, duration: std::time::Duration) {
        self.world.resource_mut::<Events<FrameTimeEvent>>().send(FrameTimeEvent { duration });
        self.world.run_schedule(PreupdateLabel);
        self.world.run_schedule(UpdateLabel);

        self.world.resource_mut::<Events<FrameTimeEvent>>().update();
        self.world.resource_mut::<Events<CameraSetEvent>>().update();
        self.world.resource_mut::<Events<ControllerConnectionEvent>>().update();
    }

    /// Sets the headset pose, relative to the rig.
    pub fn update_camera(&mut self, pos: Vec3f, rot: UnitQuatf) {
        self.world.resource_mut::<Events<CameraSetEvent>>().send(CameraSetEvent { pos, rot });
        self.world.run_schedule(CameraUpdateLabel);
    }

    pub fn update_controller_input(&mut self, hand: Hand, snapshot: Option<GamepadSnapshot>) {
        self.world.resource_mut::<Input>().set(hand, snapshot);
    }

    pub fn controller_connected(&mut self, hand: Hand, profiles: Vec<String>) {
        self.send_connection_event(ControllerConnectionEvent::Connected { hand, profiles });
    }

    pub fn controller_disconnected(&mut self, hand: Hand) {
        self.world.resource_mut::<Input>().set(hand, None);
        self.send_connection_event(ControllerConnectionEvent::Disconnected { hand });
    }

    fn send_connection_event(&mut self, event: ControllerConnectionEvent) {
        self.world.resource_mut::<Events<ControllerConnectionEvent>>().send(event);
        self.world.run_schedule(ControllerUpdateLabel);
    }

    /// Hands a terrain mesh (flat xyz positions, triangle indices) to the
    /// ground world.
    pub fn add_ground_mesh(&mut self, positions: &[f32], indices: &[u32]) -> Result<GroundId, GroundMeshError> {
        let id = self.world.resource_mut::<PhysicsWorld>().add_mesh(positions, indices)?;
        info!("Ground mesh {:?} added ({} triangles)", id, indices.len() / 3);
        Ok(id)
    }

    pub fn add_ground_box(&mut self, center: Vec3f, half_extents: Vec3f) -> GroundId {
        self.world.resource_mut::<PhysicsWorld>().add_floor_box(center, half_extents)
    }

    pub fn remove_ground(&mut self, id: GroundId) -> bool {
        self.world.resource_mut::<PhysicsWorld>().remove(id)
    }

    pub fn player_state(&mut self) -> Option<PlayerState> {
        self.world
            .query::<&Player>()
            .get_single(&self.world)
            .ok()
            .map(|p| p.state)
    }

    /// World position of the rig, for the renderer to place the view.
    pub fn rig_position(&mut self) -> Option<Vec3f> {
        self.world
            .query_filtered::<&Transform, With<Player>>()
            .get_single(&self.world)
            .ok()
            .map(Transform::position)
    }

    /// The model attached to `hand`'s grip, if any.
    pub fn attached_model(&mut self, hand: Hand) -> Option<ControllerModel> {
        let model = self
            .world
            .query::<(&Hand, &ControllerGrip)>()
            .iter(&self.world)
            .find(|(h, _)| **h == hand)
            .and_then(|(_, grip)| grip.model())?;
        self.world.get::<ControllerModel>(model).cloned()
    }

    pub fn end_session(&mut self) {
        info!("Session ended");
        self.world.resource_mut::<AppState>().running = false;
    }

    pub fn is_running(&self) -> bool {
        self.world.resource::<AppState>().running
    }
}
