use bevy_ecs::prelude::*;

use crate::input::Hand;
use crate::math::{UnitQuatf, Vec3f};

#[derive(Event)]
pub struct FrameTimeEvent {
    pub duration: std::time::Duration
}

/// Viewer pose relative to the rig, as reported by the headset.
#[derive(Event)]
pub struct CameraSetEvent {
    pub pos: Vec3f,
    pub rot: UnitQuatf,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub enum ControllerConnectionEvent {
    Connected {
        hand: Hand,
        /// Input profile ids, most specific first (e.g. `oculus-touch-v3`).
        profiles: Vec<String>,
    },
    Disconnected {
        hand: Hand,
    },
}
