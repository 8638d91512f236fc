//! Tunables for the player rig and the scene variants they belong to.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::Vec3f;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Parameters of the locomotion update.
///
/// All values use metres and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Horizontal speed at full stick deflection.
    pub movement_speed: f32,

    /// Vertical velocity set by a jump.
    pub jump_velocity: f32,

    /// Vertical acceleration while airborne. Negative is down.
    pub gravity: f32,

    /// Stick magnitude below which input counts as zero.
    pub deadzone: f32,

    /// Largest frame delta fed to the integrator.
    pub max_delta: f32,

    /// Lowest height the rig may reach.
    pub safety_floor: f32,

    /// How far above a hit the feet may be and still snap to it.
    pub snap_tolerance: f32,

    /// How far above the feet the ground ray starts. This is also the
    /// tallest step the rig walks up.
    pub probe_height: f32,

    /// How far below the feet the ground ray reaches at rest.
    pub min_probe_depth: f32,

    /// Button index of the right controller that triggers a jump.
    pub jump_button: usize,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self::map_tiles()
    }
}

impl LocomotionConfig {
    /// Map tiles scene: larger distances, so faster and higher.
    pub fn map_tiles() -> Self {
        Self {
            movement_speed: 3.0,
            jump_velocity: 6.0,
            gravity: -9.8,
            deadzone: 0.1,
            max_delta: 0.1,
            safety_floor: -200.0,
            snap_tolerance: 0.01,
            probe_height: 0.5,
            min_probe_depth: 0.1,
            jump_button: 4,
        }
    }

    pub fn cube_room() -> Self {
        Self {
            movement_speed: 2.0,
            jump_velocity: 5.0,
            deadzone: 0.15,
            ..Self::map_tiles()
        }
    }

    pub fn forest() -> Self {
        Self {
            movement_speed: 2.5,
            jump_velocity: 5.0,
            deadzone: 0.15,
            ..Self::map_tiles()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("movement_speed", self.movement_speed),
            ("jump_velocity", self.jump_velocity),
            ("gravity", self.gravity),
            ("deadzone", self.deadzone),
            ("max_delta", self.max_delta),
            ("safety_floor", self.safety_floor),
            ("snap_tolerance", self.snap_tolerance),
            ("probe_height", self.probe_height),
            ("min_probe_depth", self.min_probe_depth),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid { field, reason: "must be finite" });
            }
        }
        if self.movement_speed < 0.0 {
            return Err(ConfigError::Invalid { field: "movement_speed", reason: "must not be negative" });
        }
        if self.jump_velocity < 0.0 {
            return Err(ConfigError::Invalid { field: "jump_velocity", reason: "must not be negative" });
        }
        if self.gravity >= 0.0 {
            return Err(ConfigError::Invalid { field: "gravity", reason: "must point down" });
        }
        if !(0.0..1.0).contains(&self.deadzone) {
            return Err(ConfigError::Invalid { field: "deadzone", reason: "must be in [0, 1)" });
        }
        if self.max_delta <= 0.0 {
            return Err(ConfigError::Invalid { field: "max_delta", reason: "must be positive" });
        }
        if self.snap_tolerance < 0.0 {
            return Err(ConfigError::Invalid { field: "snap_tolerance", reason: "must not be negative" });
        }
        if self.probe_height < 0.0 {
            return Err(ConfigError::Invalid { field: "probe_height", reason: "must not be negative" });
        }
        if self.min_probe_depth <= 0.0 {
            return Err(ConfigError::Invalid { field: "min_probe_depth", reason: "must be positive" });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneVariant {
    CubeRoom,
    Forest,
    MapTiles,
}

impl SceneVariant {
    pub fn locomotion(self) -> LocomotionConfig {
        match self {
            SceneVariant::CubeRoom => LocomotionConfig::cube_room(),
            SceneVariant::Forest => LocomotionConfig::forest(),
            SceneVariant::MapTiles => LocomotionConfig::map_tiles(),
        }
    }

    /// Where the rig starts. Always above the ground so it settles in.
    pub fn spawn_position(self) -> [f32; 3] {
        match self {
            SceneVariant::CubeRoom => [0.0, 1.0, 3.0],
            SceneVariant::Forest => [0.0, 5.0, 0.0],
            // ~20m above the tiles, 15m back from the map centre
            SceneVariant::MapTiles => [0.0, 20.5, 15.0],
        }
    }

    /// Half extents of the static floor, if the scene ships one.
    pub fn floor_half_extents(self) -> Option<[f32; 3]> {
        match self {
            SceneVariant::CubeRoom => Some([10.0, 0.25, 10.0]),
            SceneVariant::Forest => Some([100.0, 0.25, 100.0]),
            SceneVariant::MapTiles => None,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub variant: SceneVariant,
    pub locomotion: LocomotionConfig,
    pub spawn_position: [f32; 3],
}

impl Default for Settings {
    fn default() -> Self {
        Self::for_variant(SceneVariant::MapTiles)
    }
}

impl Settings {
    pub fn for_variant(variant: SceneVariant) -> Self {
        Self {
            variant,
            locomotion: variant.locomotion(),
            spawn_position: variant.spawn_position(),
        }
    }

    /// Reads settings from JSON. The `variant` key picks the preset and any
    /// other keys given override it, e.g.
    /// `{"variant": "forest", "locomotion": {"jump_velocity": 5.5}}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let given: serde_json::Value = serde_json::from_str(json)?;
        let variant = match given.get("variant") {
            Some(v) => serde_json::from_value(v.clone())?,
            None => SceneVariant::MapTiles,
        };

        let mut merged = serde_json::to_value(Self::for_variant(variant))?;
        overlay(&mut merged, given);
        let settings: Settings = serde_json::from_value(merged)?;
        settings.locomotion.validate()?;
        Ok(settings)
    }

    pub fn spawn_position(&self) -> Vec3f {
        Vec3f::from(self.spawn_position)
    }
}

fn overlay(base: &mut serde_json::Value, given: serde_json::Value) {
    match (base, given) {
        (serde_json::Value::Object(base), serde_json::Value::Object(given)) => {
            for (key, value) in given {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for variant in [SceneVariant::CubeRoom, SceneVariant::Forest, SceneVariant::MapTiles] {
            variant.locomotion().validate().unwrap();
        }
    }

    #[test]
    fn presets_stay_within_known_ranges() {
        for variant in [SceneVariant::CubeRoom, SceneVariant::Forest, SceneVariant::MapTiles] {
            let config = variant.locomotion();
            assert!((2.0..=3.0).contains(&config.movement_speed));
            assert!((5.0..=6.0).contains(&config.jump_velocity));
            assert!((0.1..=0.15).contains(&config.deadzone));
        }
    }

    #[test]
    fn json_overrides_only_given_keys() {
        let settings = Settings::from_json(
            r#"{"variant": "forest", "locomotion": {"jump_velocity": 5.5}}"#,
        )
        .unwrap();
        assert_eq!(settings.variant, SceneVariant::Forest);
        assert_eq!(settings.locomotion.jump_velocity, 5.5);
        assert_eq!(settings.locomotion.movement_speed, LocomotionConfig::forest().movement_speed);
        assert_eq!(settings.spawn_position, SceneVariant::Forest.spawn_position());
    }

    #[test]
    fn json_without_variant_uses_map_tiles() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn json_rejects_upward_gravity() {
        let err = Settings::from_json(r#"{"locomotion": {"gravity": 9.8}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "gravity", .. }));
    }

    #[test]
    fn ray_extents_report_their_own_field() {
        let invalid_field = |config: LocomotionConfig| match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => Some(field),
            _ => None,
        };
        let base = LocomotionConfig::default();
        assert_eq!(invalid_field(LocomotionConfig { snap_tolerance: -0.1, ..base }), Some("snap_tolerance"));
        assert_eq!(invalid_field(LocomotionConfig { probe_height: -0.5, ..base }), Some("probe_height"));
        assert_eq!(invalid_field(LocomotionConfig { min_probe_depth: 0.0, ..base }), Some("min_probe_depth"));
        assert_eq!(invalid_field(LocomotionConfig { probe_height: 0.0, ..base }), None);
    }

    #[test]
    fn json_rejects_unknown_variant() {
        assert!(matches!(
            Settings::from_json(r#"{"variant": "moon"}"#),
            Err(ConfigError::Json(_))
        ));
    }
}
