use crate::math::Vec3f;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Footing {
    Grounded,
    #[default]
    Airborne,
}

/// Everything the locomotion update carries from one frame to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    /// Rig base (feet) in world space.
    pub position: Vec3f,
    pub velocity: Vec3f,
    pub footing: Footing,
    /// Jump button state last frame, for edge detection.
    pub jump_held: bool,
}

impl PlayerState {
    /// A rig at `position`, at rest and falling.
    pub fn new(position: Vec3f) -> Self {
        Self {
            position,
            velocity: Vec3f::zeros(),
            footing: Footing::Airborne,
            jump_held: false,
        }
    }

    /// A rig standing at `position`.
    pub fn grounded_at(position: Vec3f) -> Self {
        Self { footing: Footing::Grounded, ..Self::new(position) }
    }

    pub fn is_grounded(&self) -> bool {
        self.footing == Footing::Grounded
    }

    pub(crate) fn land(&mut self, height: f32) {
        self.position.y = height;
        self.velocity.y = 0.0;
        self.footing = Footing::Grounded;
    }
}
