use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ScheduleLabel;
use crate::systems::update_frame_time;
use crate::components::{Controllers, FloorBox, Player};


#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SpawnLabel;

pub fn new_spawn_scene_schedule() -> (Schedule, SpawnLabel) {
    let mut schedule = Schedule::default();
    schedule
        .add_systems(FloorBox::spawn.run_if(run_once()))
        .add_systems(Player::spawn.run_if(run_once()));
    (schedule, SpawnLabel)
}


#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PreupdateLabel;

pub fn new_preupdate_schedule() -> (Schedule, PreupdateLabel) {
    let mut schedule = Schedule::default();
    schedule.add_systems(update_frame_time);
    (schedule, PreupdateLabel)
}


#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UpdateLabel;

pub fn new_update_schedule() -> (Schedule, UpdateLabel) {
    let mut schedule = Schedule::default();
    schedule
        .add_systems(Player::update)
        .add_systems(Player::log_state.after(Player::update));
    (schedule, UpdateLabel)
}

#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ControllerUpdateLabel;

pub fn new_controller_update_schedule() -> (Schedule, ControllerUpdateLabel) {
    let mut schedule = Schedule::default();
    schedule.add_systems(Controllers::handle_connections);
    (schedule, ControllerUpdateLabel)
}

#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CameraUpdateLabel;

pub fn new_camera_update_schedule() -> (Schedule, CameraUpdateLabel) {
    let mut schedule = Schedule::default();
    schedule.add_systems(Player::update_player_view_xr);
    (schedule, CameraUpdateLabel)
}
