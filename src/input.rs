use bevy_ecs::prelude::*;

use crate::math::Vec2f;

/// Thumbstick axes of an `xr-standard` gamepad. Indices 0 and 1 belong to
/// the touchpad, which Quest-style controllers don't have.
pub const STICK_X_AXIS: usize = 2;
pub const STICK_Y_AXIS: usize = 3;

#[derive(Debug, Component, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right
}

impl Hand {
    /// Resolves a controller's hand from the handedness it reports,
    /// falling back to its slot: the first controller is the left one.
    pub fn resolve(handedness: Option<&str>, index: usize) -> Self {
        match handedness {
            Some("left") => Hand::Left,
            Some("right") => Hand::Right,
            _ if index == 0 => Hand::Left,
            _ => Hand::Right,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Hand::Left => "left",
            Hand::Right => "right",
        }
    }
}

/// Remembers the hand each connected controller was given, so its
/// disconnect resolves to the same hand even when the controller reports
/// no handedness.
#[derive(Debug, Clone)]
pub struct HandSlots<K> {
    connected: Vec<(K, Hand)>,
}

impl<K> Default for HandSlots<K> {
    fn default() -> Self {
        Self { connected: Vec::new() }
    }
}

impl<K: PartialEq> HandSlots<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves and records the hand of a controller in `slot`.
    pub fn connect(&mut self, key: K, handedness: Option<&str>, slot: usize) -> Hand {
        let hand = Hand::resolve(handedness, slot);
        self.connected.retain(|(k, _)| *k != key);
        self.connected.push((key, hand));
        hand
    }

    /// The hand `key` connected as. Unknown controllers are resolved afresh.
    pub fn disconnect(&mut self, key: &K, handedness: Option<&str>, slot: usize) -> Hand {
        match self.connected.iter().position(|(k, _)| k == key) {
            Some(i) => self.connected.remove(i).1,
            None => Hand::resolve(handedness, slot),
        }
    }
}

/// One frame's reading of a controller's gamepad.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamepadSnapshot {
    pub axes: Vec<f32>,
    /// Pressed flag per button.
    pub buttons: Vec<bool>,
}

impl GamepadSnapshot {
    pub fn new(axes: Vec<f32>, buttons: Vec<bool>) -> Self {
        Self { axes, buttons }
    }

    /// A snapshot with only the thumbstick set.
    pub fn with_stick(x: f32, y: f32) -> Self {
        Self { axes: vec![0.0, 0.0, x, y], buttons: Vec::new() }
    }

    /// A snapshot with only button `index` held.
    pub fn with_button(index: usize) -> Self {
        let mut buttons = vec![false; index + 1];
        buttons[index] = true;
        Self { axes: Vec::new(), buttons }
    }

    /// Thumbstick deflection, x right and y back. Zero when the gamepad
    /// reports too few axes or garbage values.
    pub fn stick(&self) -> Vec2f {
        if self.axes.len() <= STICK_Y_AXIS {
            return Vec2f::zeros();
        }
        let axis = |i: usize| {
            let v = self.axes[i];
            if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 }
        };
        Vec2f::new(axis(STICK_X_AXIS), axis(STICK_Y_AXIS))
    }

    pub fn is_pressed(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }
}

/// Latest gamepad state per hand. `None` means the controller is absent
/// or has no gamepad.
#[derive(Resource, Debug, Clone, Default)]
pub struct Input {
    left: Option<GamepadSnapshot>,
    right: Option<GamepadSnapshot>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, hand: Hand, snapshot: Option<GamepadSnapshot>) {
        match hand {
            Hand::Left => self.left = snapshot,
            Hand::Right => self.right = snapshot,
        }
    }

    pub fn hand(&self, hand: Hand) -> Option<&GamepadSnapshot> {
        match hand {
            Hand::Left => self.left.as_ref(),
            Hand::Right => self.right.as_ref(),
        }
    }

    /// Left thumbstick, zero without a left gamepad.
    pub fn move_stick(&self) -> Vec2f {
        self.left.as_ref().map_or_else(Vec2f::zeros, GamepadSnapshot::stick)
    }

    pub fn jump_pressed(&self, button: usize) -> bool {
        self.right.as_ref().map_or(false, |g| g.is_pressed(button))
    }

    pub fn reset(&mut self) {
        self.left = None;
        self.right = None;
    }
}
