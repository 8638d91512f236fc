mod schedules;

use crate::app::AppState;
use crate::events::FrameTimeEvent;
use crate::frame_time::FrameTime;
use bevy_ecs::prelude::*;

pub use schedules::{new_spawn_scene_schedule, new_preupdate_schedule, new_update_schedule,
                    new_camera_update_schedule, new_controller_update_schedule,
                    SpawnLabel, PreupdateLabel, UpdateLabel, CameraUpdateLabel,
                    ControllerUpdateLabel};

/// In XR the session hands us frame times; otherwise measure them.
pub fn update_frame_time(
    app: Res<AppState>,
    mut frame_time: ResMut<FrameTime>,
    mut events: EventReader<FrameTimeEvent>,
) {
    if app.frametime_manual {
        if let Some(e) = events.iter().last() {
            frame_time.advance(e.duration);
        }
    } else {
        frame_time.update();
    }
}
