use bevy_ecs::prelude::*;
use bevy_utils::HashMap;
use rapier3d::parry::query::{Ray, RayCast};
use rapier3d::prelude::*;
use thiserror::Error;

use crate::locomotion::{GroundHit, GroundProbe, GroundQueryError, GroundRay};
use crate::math::{is_finite, to_point, Vec3f};

/// Identifies a piece of ground handed to the [`PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroundId(pub u32);

#[derive(Debug, Error, PartialEq)]
pub enum GroundMeshError {
    #[error("mesh has no triangles")]
    Empty,

    #[error("vertex buffer length {0} is not a multiple of 3")]
    RaggedVertices(usize),

    #[error("index buffer length {0} is not a multiple of 3")]
    RaggedIndices(usize),

    #[error("triangle index {index} out of range for {vertices} vertices")]
    IndexOutOfRange { index: u32, vertices: usize },

    #[error("vertex {0} is not finite")]
    NonFiniteVertex(usize),
}

/// Static ground geometry the rig can stand on: the floor of a room, or
/// terrain tiles as they stream in and out.
#[derive(Resource, Default)]
pub struct PhysicsWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    islands: IslandManager,
    ground: HashMap<GroundId, ColliderHandle>,
    next_id: u32,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ground.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ground.is_empty()
    }

    /// Adds a box centred on `center`.
    pub fn add_floor_box(&mut self, center: Vec3f, half_extents: Vec3f) -> GroundId {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![center.x, center.y, center.z])
            .friction(0.7)
            .build();
        self.insert(collider)
    }

    /// Adds a triangle mesh given as flat xyz positions and triangle indices,
    /// the layout terrain tiles arrive in.
    pub fn add_mesh(&mut self, positions: &[f32], indices: &[u32]) -> Result<GroundId, GroundMeshError> {
        if positions.len() % 3 != 0 {
            return Err(GroundMeshError::RaggedVertices(positions.len()));
        }
        if indices.len() % 3 != 0 {
            return Err(GroundMeshError::RaggedIndices(indices.len()));
        }
        if indices.is_empty() {
            return Err(GroundMeshError::Empty);
        }

        let vertices = positions
            .chunks_exact(3)
            .enumerate()
            .map(|(i, p)| {
                let v = Vec3f::new(p[0], p[1], p[2]);
                if is_finite(&v) { Ok(to_point(v)) } else { Err(GroundMeshError::NonFiniteVertex(i)) }
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(GroundMeshError::IndexOutOfRange { index, vertices: vertices.len() });
        }

        let triangles = indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect::<Vec<_>>();

        let collider = ColliderBuilder::trimesh(vertices, triangles)
            .friction(0.7)
            .build();
        Ok(self.insert(collider))
    }

    /// Removes a piece of ground. Returns whether it was there.
    pub fn remove(&mut self, id: GroundId) -> bool {
        match self.ground.remove(&id) {
            Some(handle) => {
                self.colliders.remove(handle, &mut self.islands, &mut self.bodies, false);
                true
            }
            None => false,
        }
    }

    fn insert(&mut self, collider: Collider) -> GroundId {
        let id = GroundId(self.next_id);
        self.next_id += 1;
        let handle = self.colliders.insert(collider);
        self.ground.insert(id, handle);
        id
    }
}

impl GroundProbe for PhysicsWorld {
    fn cast_down(&self, ray: &GroundRay) -> Result<Vec<GroundHit>, GroundQueryError> {
        if !ray.is_valid() {
            return Err(GroundQueryError::InvalidRay(*ray));
        }
        if self.is_empty() {
            return Err(GroundQueryError::NotLoaded);
        }

        let down = Ray::new(to_point(ray.origin), -Vec3f::y());
        let hits = self
            .colliders
            .iter()
            .filter_map(|(_, collider)| {
                // Surfaces only: from inside a box the ray reports the face
                // it leaves through, never its own origin.
                collider
                    .shape()
                    .cast_ray(collider.position(), &down, ray.max_distance, false)
            })
            .map(|distance| GroundHit {
                point: ray.origin - Vec3f::y() * distance,
                distance,
            })
            .collect();
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locomotion::highest_hit;

    fn ray_at(x: f32, y: f32, z: f32, max_distance: f32) -> GroundRay {
        GroundRay { origin: Vec3f::new(x, y, z), max_distance }
    }

    /// Two triangles covering [-size, size] on x and z at `height`.
    fn quad(height: f32, size: f32) -> (Vec<f32>, Vec<u32>) {
        let positions = vec![
            -size, height, -size,
            size, height, -size,
            size, height, size,
            -size, height, size,
        ];
        (positions, vec![0, 2, 1, 0, 3, 2])
    }

    #[test]
    fn empty_world_is_not_loaded() {
        let world = PhysicsWorld::new();
        assert!(matches!(
            world.cast_down(&ray_at(0.0, 1.0, 0.0, 10.0)),
            Err(GroundQueryError::NotLoaded)
        ));
    }

    #[test]
    fn floor_box_top_is_hit() {
        let mut world = PhysicsWorld::new();
        world.add_floor_box(Vec3f::new(0.0, -0.25, 0.0), Vec3f::new(10.0, 0.25, 10.0));

        let hits = world.cast_down(&ray_at(1.0, 0.5, -2.0, 0.6)).unwrap();
        let top = highest_hit(&hits).unwrap();
        assert!(top.abs() < 1e-4, "top at {}", top);

        // Out of reach
        assert!(world.cast_down(&ray_at(1.0, 5.0, -2.0, 0.6)).unwrap().is_empty());
        // Beside the box
        assert!(world.cast_down(&ray_at(20.0, 0.5, 0.0, 0.6)).unwrap().is_empty());
    }

    #[test]
    fn overlapping_tiles_report_every_layer() {
        let mut world = PhysicsWorld::new();
        let (p, i) = quad(0.0, 5.0);
        world.add_mesh(&p, &i).unwrap();
        let (p, i) = quad(0.4, 5.0);
        world.add_mesh(&p, &i).unwrap();

        let hits = world.cast_down(&ray_at(0.5, 1.0, 0.5, 2.0)).unwrap();
        assert_eq!(hits.len(), 2);
        assert!((highest_hit(&hits).unwrap() - 0.4).abs() < 1e-4);
    }

    #[test]
    fn removed_tiles_stop_colliding() {
        let mut world = PhysicsWorld::new();
        let (p, i) = quad(0.0, 5.0);
        let low = world.add_mesh(&p, &i).unwrap();
        let (p, i) = quad(0.4, 5.0);
        let high = world.add_mesh(&p, &i).unwrap();

        assert!(world.remove(high));
        assert!(!world.remove(high));
        let hits = world.cast_down(&ray_at(0.5, 1.0, 0.5, 2.0)).unwrap();
        assert!(highest_hit(&hits).unwrap().abs() < 1e-4);

        assert!(world.remove(low));
        assert!(world.is_empty());
    }

    #[test]
    fn bad_meshes_are_rejected() {
        let mut world = PhysicsWorld::new();
        assert_eq!(world.add_mesh(&[0.0; 9], &[]), Err(GroundMeshError::Empty));
        assert_eq!(world.add_mesh(&[0.0; 8], &[0, 1, 2]), Err(GroundMeshError::RaggedVertices(8)));
        assert_eq!(world.add_mesh(&[0.0; 9], &[0, 1]), Err(GroundMeshError::RaggedIndices(2)));
        assert_eq!(
            world.add_mesh(&[0.0; 9], &[0, 1, 3]),
            Err(GroundMeshError::IndexOutOfRange { index: 3, vertices: 3 })
        );
        let mut nan = vec![0.0; 9];
        nan[4] = f32::NAN;
        assert_eq!(world.add_mesh(&nan, &[0, 1, 2]), Err(GroundMeshError::NonFiniteVertex(1)));
        assert!(world.is_empty());
    }

    #[test]
    fn non_finite_ray_is_an_error() {
        let mut world = PhysicsWorld::new();
        world.add_floor_box(Vec3f::zeros(), Vec3f::from_element(1.0));
        assert!(matches!(
            world.cast_down(&ray_at(f32::INFINITY, 1.0, 0.0, 1.0)),
            Err(GroundQueryError::InvalidRay(_))
        ));
    }

    #[test]
    fn ray_inside_a_box_hits_its_bottom_face() {
        let mut world = PhysicsWorld::new();
        world.add_floor_box(Vec3f::new(0.0, 5.0, 0.0), Vec3f::new(1.0, 5.0, 1.0));

        let hits = world.cast_down(&ray_at(0.5, 0.5, 0.5, 0.6)).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].point.y.abs() < 1e-4, "hit at {}", hits[0].point.y);

        // Bottom face out of reach
        assert!(world.cast_down(&ray_at(0.5, 3.0, 0.5, 0.6)).unwrap().is_empty());
    }

    #[test]
    fn rig_inside_a_tall_box_stays_put() {
        use crate::config::LocomotionConfig;
        use crate::input::Input;
        use crate::locomotion::{Locomotion, PlayerState};
        use crate::math::UnitQuatf;

        let mut world = PhysicsWorld::new();
        world.add_floor_box(Vec3f::new(0.0, -0.25, 0.0), Vec3f::new(10.0, 0.25, 10.0));
        world.add_floor_box(Vec3f::new(0.0, 5.0, 0.0), Vec3f::new(1.0, 5.0, 1.0));

        let config = LocomotionConfig::default();
        let locomotion = Locomotion::new(config);
        let mut state = PlayerState::grounded_at(Vec3f::new(0.5, 0.0, 0.5));
        for frame in 0..120 {
            state = locomotion.step(state, 1.0 / 60.0, &Input::new(), &UnitQuatf::identity(), &world);
            assert!(
                state.position.y <= config.probe_height,
                "frame {}: rig rose to {}", frame, state.position.y
            );
        }
        assert!(state.is_grounded());
        assert!(state.position.y.abs() < 1e-4);
    }
}
