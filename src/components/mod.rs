mod controllers;
mod floor_box;
mod player;
mod transform;

pub use controllers::{ControllerGrip, ControllerModel, Controllers};
pub use floor_box::FloorBox;
pub use player::{Head, Player};
pub use transform::Transform;
