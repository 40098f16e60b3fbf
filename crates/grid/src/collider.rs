//! A simple static world made of colliders which can be scanned.

use glam::Vec2;
use parry2d::{
    math::{Isometry, Point, Vector},
    query::PointQuery,
    shape::{Ball, Cuboid, Shape},
};
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::{LayerMask, WeightSource, WorldQuery};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColliderShape {
    Circle {
        radius: f32,
    },
    Rectangle {
        half_extents: Vec2,
        /// Counter clockwise rotation in radians.
        #[serde(default)]
        rotation: f32,
    },
}

/// A static world entity: an obstacle, a weight emitting area, or both,
/// depending on its collision categories.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    shape: ColliderShape,
    position: Vec2,
    layers: LayerMask,
    #[serde(default)]
    weight: f32,
}

impl Collider {
    pub fn new(shape: ColliderShape, position: Vec2, layers: LayerMask, weight: f32) -> Self {
        Self {
            shape,
            position,
            layers,
            weight,
        }
    }

    /// Creates a circle collider.
    pub fn circle(position: Vec2, radius: f32, layers: LayerMask, weight: f32) -> Self {
        Self::new(ColliderShape::Circle { radius }, position, layers, weight)
    }

    /// Creates an axis aligned rectangle collider.
    pub fn rectangle(position: Vec2, half_extents: Vec2, layers: LayerMask, weight: f32) -> Self {
        Self::new(
            ColliderShape::Rectangle {
                half_extents,
                rotation: 0.,
            },
            position,
            layers,
            weight,
        )
    }

    pub fn shape(&self) -> ColliderShape {
        self.shape
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn layers(&self) -> LayerMask {
        self.layers
    }

    pub(crate) fn validate(&self) -> Result<(), ColliderError> {
        if !self.position.is_finite() {
            return Err(ColliderError::Position(self.position));
        }
        if !self.weight.is_finite() || self.weight < 0. {
            return Err(ColliderError::Weight(self.weight));
        }

        match self.shape {
            ColliderShape::Circle { radius } => {
                if !radius.is_finite() || radius <= 0. {
                    return Err(ColliderError::Radius(radius));
                }
            }
            ColliderShape::Rectangle {
                half_extents,
                rotation,
            } => {
                if !half_extents.is_finite() || half_extents.cmple(Vec2::ZERO).any() {
                    return Err(ColliderError::HalfExtents(half_extents));
                }
                if !rotation.is_finite() {
                    return Err(ColliderError::Rotation(rotation));
                }
            }
        }

        Ok(())
    }

    fn isometry(&self) -> Isometry<f32> {
        let rotation = match self.shape {
            ColliderShape::Circle { .. } => 0.,
            ColliderShape::Rectangle { rotation, .. } => rotation,
        };
        Isometry::new(Vector::new(self.position.x, self.position.y), rotation)
    }

    fn distance_to_point(&self, point: Vec2) -> f32 {
        let point = Point::new(point.x, point.y);
        let isometry = self.isometry();
        match self.shape {
            ColliderShape::Circle { radius } => {
                Ball::new(radius).distance_to_point(&isometry, &point, true)
            }
            ColliderShape::Rectangle { half_extents, .. } => {
                Cuboid::new(Vector::new(half_extents.x, half_extents.y))
                    .distance_to_point(&isometry, &point, true)
            }
        }
    }

    /// Returns true if the collider overlaps (or touches) a circle.
    fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        self.distance_to_point(center) <= radius
    }

    fn envelope(&self) -> AABB<[f32; 2]> {
        let isometry = self.isometry();
        let aabb = match self.shape {
            ColliderShape::Circle { radius } => Ball::new(radius).compute_aabb(&isometry),
            ColliderShape::Rectangle { half_extents, .. } => {
                Cuboid::new(Vector::new(half_extents.x, half_extents.y)).compute_aabb(&isometry)
            }
        };
        AABB::from_corners([aabb.mins.x, aabb.mins.y], [aabb.maxs.x, aabb.maxs.y])
    }
}

impl WeightSource for Collider {
    fn weight(&self) -> f32 {
        self.weight
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ColliderError {
    #[error("Collider position has to be finite: got ({}, {})", .0.x, .0.y)]
    Position(Vec2),
    #[error("Collider weight has to be non-negative and finite: got {0}")]
    Weight(f32),
    #[error("Circle radius has to be positive and finite: got {0}")]
    Radius(f32),
    #[error("Rectangle half-extents have to be positive and finite: got ({}, {})", .0.x, .0.y)]
    HalfExtents(Vec2),
    #[error("Rectangle rotation has to be finite: got {0}")]
    Rotation(f32),
}

/// Entry of the spatial index pointing to a collider.
#[derive(Debug)]
struct IndexedCollider {
    index: usize,
    envelope: AABB<[f32; 2]>,
}

impl RTreeObject for IndexedCollider {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Immutable set of colliders with a spatial index.
#[derive(Debug)]
pub struct StaticWorld {
    colliders: Vec<Collider>,
    index: RTree<IndexedCollider>,
}

impl StaticWorld {
    /// Creates an empty world.
    pub fn empty() -> Self {
        Self {
            colliders: Vec::new(),
            index: RTree::new(),
        }
    }

    /// Creates a new world from validated colliders.
    pub fn new(colliders: Vec<Collider>) -> Result<Self, ColliderError> {
        for collider in colliders.iter() {
            collider.validate()?;
        }

        let indexed = colliders
            .iter()
            .enumerate()
            .map(|(index, collider)| IndexedCollider {
                index,
                envelope: collider.envelope(),
            })
            .collect();

        Ok(Self {
            colliders,
            index: RTree::bulk_load(indexed),
        })
    }

    pub fn colliders(&self) -> &[Collider] {
        self.colliders.as_slice()
    }
}

impl WorldQuery for StaticWorld {
    type Entity = Collider;

    /// Returns the overlapping collider declared first.
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> Option<&Collider> {
        let envelope = AABB::from_corners(
            [center.x - radius, center.y - radius],
            [center.x + radius, center.y + radius],
        );

        self.index
            .locate_in_envelope_intersecting(&envelope)
            .map(|indexed| indexed.index)
            .filter(|&index| {
                let collider = &self.colliders[index];
                collider.layers().intersects(mask) && collider.overlaps_circle(center, radius)
            })
            .min()
            .map(|index| &self.colliders[index])
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_4;

    use super::*;

    const WALLS: LayerMask = LayerMask::layer(0);
    const HAZARDS: LayerMask = LayerMask::layer(1);

    #[test]
    fn test_overlap_circle() {
        let world = StaticWorld::new(vec![
            Collider::circle(Vec2::new(10., 10.), 2., WALLS, 0.),
            Collider::rectangle(Vec2::new(-5., 0.), Vec2::new(1., 3.), WALLS, 0.),
            Collider::circle(Vec2::new(10., 10.), 5., HAZARDS, 12.),
        ])
        .unwrap();

        let hit = world
            .overlap_circle(Vec2::new(10., 13.), 1.5, WALLS)
            .unwrap();
        assert_eq!(hit.position(), Vec2::new(10., 10.));
        assert!(world.overlap_circle(Vec2::new(10., 13.), 0.5, WALLS).is_none());

        assert!(world.overlap_circle(Vec2::new(-5., 2.9), 0.1, WALLS).is_some());
        assert!(world.overlap_circle(Vec2::new(-3.5, 0.), 0.4, WALLS).is_none());

        let hit = world
            .overlap_circle(Vec2::new(13., 10.), 0.1, HAZARDS)
            .unwrap();
        assert_eq!(hit.weight(), 12.);
        assert!(world
            .overlap_circle(Vec2::new(13., 10.), 0.1, LayerMask::NONE)
            .is_none());
    }

    #[test]
    fn test_first_declared_wins() {
        let world = StaticWorld::new(vec![
            Collider::circle(Vec2::ZERO, 5., HAZARDS, 3.),
            Collider::circle(Vec2::new(1., 0.), 5., HAZARDS, 7.),
        ])
        .unwrap();
        for _ in 0..3 {
            assert_eq!(
                world
                    .overlap_circle(Vec2::new(0.5, 0.), 1., HAZARDS)
                    .unwrap()
                    .weight(),
                3.
            );
        }
    }

    #[test]
    fn test_rotated_rectangle() {
        let world = StaticWorld::new(vec![Collider::new(
            ColliderShape::Rectangle {
                half_extents: Vec2::new(4., 0.5),
                rotation: FRAC_PI_4,
            },
            Vec2::ZERO,
            WALLS,
            0.,
        )])
        .unwrap();

        assert!(world.overlap_circle(Vec2::new(2., 2.), 0.1, WALLS).is_some());
        assert!(world.overlap_circle(Vec2::new(2., -2.), 0.1, WALLS).is_none());
    }

    #[test]
    fn test_invalid() {
        assert_eq!(
            StaticWorld::new(vec![Collider::circle(Vec2::ZERO, 0., WALLS, 0.)]).err(),
            Some(ColliderError::Radius(0.))
        );
        assert_eq!(
            StaticWorld::new(vec![Collider::circle(Vec2::ZERO, 1., HAZARDS, -1.)]).err(),
            Some(ColliderError::Weight(-1.))
        );
        assert!(StaticWorld::new(vec![Collider::rectangle(
            Vec2::ZERO,
            Vec2::new(1., 0.),
            WALLS,
            0.
        )])
        .is_err());
    }
}
