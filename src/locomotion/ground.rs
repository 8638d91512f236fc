use thiserror::Error;

use crate::math::{is_finite, Vec3f};

/// A ray cast straight down from `origin`, at most `max_distance` long.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundRay {
    pub origin: Vec3f,
    pub max_distance: f32,
}

impl GroundRay {
    pub fn is_valid(&self) -> bool {
        is_finite(&self.origin) && self.max_distance.is_finite() && self.max_distance >= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundHit {
    pub point: Vec3f,
    /// Distance from the ray origin.
    pub distance: f32,
}

#[derive(Debug, Error)]
pub enum GroundQueryError {
    /// No ground geometry has arrived yet.
    #[error("no ground geometry loaded")]
    NotLoaded,

    #[error("ground ray is not finite: {0:?}")]
    InvalidRay(GroundRay),

    #[error("ground provider failed: {0}")]
    Provider(String),
}

/// Something the rig can stand on.
///
/// A query may legitimately return no hits, e.g. while terrain is still
/// streaming in. Hits come back in no particular order.
pub trait GroundProbe {
    fn cast_down(&self, ray: &GroundRay) -> Result<Vec<GroundHit>, GroundQueryError>;
}

/// A world with nothing in it.
pub struct NoGround;

impl GroundProbe for NoGround {
    fn cast_down(&self, _ray: &GroundRay) -> Result<Vec<GroundHit>, GroundQueryError> {
        Ok(Vec::new())
    }
}

/// Height of the highest hit. Layered geometry can report several.
pub fn highest_hit(hits: &[GroundHit]) -> Option<f32> {
    hits.iter()
        .map(|h| h.point.y)
        .filter(|y| y.is_finite())
        .fold(None, |best, y| Some(best.map_or(y, |b: f32| b.max(y))))
}
