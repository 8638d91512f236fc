//! Per-frame locomotion of the player rig: thumbstick walking, jumping,
//! gravity and snapping onto whatever ground is below.
//!
//! [`Locomotion::step`] is the whole update. Its phases are public so a
//! caller (or a test) can drive them one at a time:
//!
//! 1. [`Locomotion::steer`] sets horizontal velocity from the left stick
//! 2. [`Locomotion::try_jump`] starts a jump on a fresh right-hand press
//! 3. [`Locomotion::apply_gravity`]
//! 4. [`Locomotion::integrate`]
//! 5. [`Locomotion::resolve_ground`] casts down and lands or lifts off
//! 6. [`Locomotion::apply_safety_floor`]

mod ground;
mod state;

pub use ground::{highest_hit, GroundHit, GroundProbe, GroundQueryError, GroundRay, NoGround};
pub use state::{Footing, PlayerState};

use log::{debug, trace, warn};

use crate::config::LocomotionConfig;
use crate::input::Input;
use crate::math::{yaw_only, UnitQuatf, Vec2f, Vec3f};

/// Extra reach of the ground ray beyond the distance fallen this frame.
const TRAVEL_MARGIN: f32 = 1.1;

#[derive(Debug, Clone, Copy, Default)]
pub struct Locomotion {
    config: LocomotionConfig,
}

impl Locomotion {
    pub fn new(config: LocomotionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    /// Advances `state` by `dt` seconds.
    ///
    /// Never fails: a broken or empty ground query leaves the rig airborne
    /// and the safety floor catches it.
    pub fn step<G: GroundProbe + ?Sized>(
        &self,
        mut state: PlayerState,
        dt: f32,
        input: &Input,
        head: &UnitQuatf,
        ground: &G,
    ) -> PlayerState {
        let dt = self.clamp_delta(dt);

        let horizontal = self.steer(input.move_stick(), head);
        state.velocity.x = horizontal.x;
        state.velocity.z = horizontal.z;

        self.try_jump(&mut state, input.jump_pressed(self.config.jump_button));
        self.apply_gravity(&mut state, dt);
        Self::integrate(&mut state, dt);
        self.resolve_ground(&mut state, dt, ground);
        self.apply_safety_floor(&mut state);
        state
    }

    pub fn clamp_delta(&self, dt: f32) -> f32 {
        if dt.is_finite() && dt > 0.0 {
            dt.min(self.config.max_delta)
        } else {
            0.0
        }
    }

    pub fn apply_deadzone(&self, stick: Vec2f) -> Vec2f {
        let dz = self.config.deadzone;
        if stick.norm_squared() < dz * dz {
            Vec2f::zeros()
        } else {
            stick
        }
    }

    /// Horizontal velocity for `stick` while looking along `head`.
    /// Only the heading of `head` counts.
    pub fn steer(&self, stick: Vec2f, head: &UnitQuatf) -> Vec3f {
        let stick = self.apply_deadzone(stick);
        if stick.x == 0.0 && stick.y == 0.0 {
            return Vec3f::zeros();
        }
        let intent = yaw_only(head) * Vec3f::new(stick.x, 0.0, stick.y);
        Vec3f::new(intent.x, 0.0, intent.z) * self.config.movement_speed
    }

    /// Starts a jump when `pressed` is a new press and the rig stands on
    /// something. Returns whether it jumped.
    pub fn try_jump(&self, state: &mut PlayerState, pressed: bool) -> bool {
        let just_pressed = pressed && !state.jump_held;
        state.jump_held = pressed;

        if !just_pressed || !state.is_grounded() {
            return false;
        }
        state.velocity.y = self.config.jump_velocity;
        state.footing = Footing::Airborne;
        debug!("Jump!");
        true
    }

    pub fn apply_gravity(&self, state: &mut PlayerState, dt: f32) {
        if !state.is_grounded() {
            state.velocity.y += self.config.gravity * dt;
        }
    }

    pub fn integrate(state: &mut PlayerState, dt: f32) {
        state.position += state.velocity * dt;
    }

    /// The ray used to find ground under `state` after it moved for `dt`.
    ///
    /// It starts `probe_height` plus this frame's vertical travel (with a
    /// margin) above the feet. Falling, that is above where the feet were
    /// before the move, so a fast fall can't skip through a thin surface.
    /// It ends `min_probe_depth` below the feet.
    pub fn ground_ray(&self, state: &PlayerState, dt: f32) -> GroundRay {
        let travel = (state.velocity.y * dt).abs() * TRAVEL_MARGIN;
        let lift = self.config.probe_height + travel;
        GroundRay {
            origin: state.position + Vec3f::y() * lift,
            max_distance: lift + self.config.min_probe_depth,
        }
    }

    pub fn resolve_ground<G: GroundProbe + ?Sized>(
        &self,
        state: &mut PlayerState,
        dt: f32,
        ground: &G,
    ) {
        let ray = self.ground_ray(state, dt);
        let height = match ground.cast_down(&ray) {
            Ok(hits) => highest_hit(&hits),
            Err(GroundQueryError::NotLoaded) => {
                trace!("No ground geometry yet");
                None
            }
            Err(e) => {
                warn!("Ground query failed, rig treated as airborne: {}", e);
                None
            }
        };

        match height {
            Some(h) if state.position.y <= h + self.config.snap_tolerance
                && state.velocity.y <= 0.0 =>
            {
                if !state.is_grounded() {
                    debug!("Landed at y={:.2}", h);
                }
                state.land(h);
            }
            _ => state.footing = Footing::Airborne,
        }
    }

    /// Keeps the rig from falling forever when there is no ground below.
    /// Returns whether the floor caught it.
    pub fn apply_safety_floor(&self, state: &mut PlayerState) -> bool {
        let floor = self.config.safety_floor;
        // Also catches a NaN height
        if state.position.y > floor {
            return false;
        }
        if state.position.y < floor || state.position.y.is_nan() {
            debug!("Hit the safety floor at y={}", floor);
        }
        state.position.y = floor;
        state.velocity.y = state.velocity.y.max(0.0);
        state.footing = Footing::Grounded;
        true
    }
}
