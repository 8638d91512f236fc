pub mod app;
pub mod components;
pub mod config;
pub mod events;
pub mod frame_hook;
pub mod frame_time;
pub mod input;
pub mod locomotion;
pub mod logging;
pub mod math;
pub mod physics_world;
pub mod systems;


#[cfg(all(target_arch = "wasm32", web_sys_unstable_apis))]
mod xr;

#[cfg(all(target_arch = "wasm32", web_sys_unstable_apis))]
pub use xr::{start, Session};

pub use app::App;
pub use config::{LocomotionConfig, SceneVariant, Settings};
pub use locomotion::{Footing, GroundProbe, Locomotion, PlayerState};
