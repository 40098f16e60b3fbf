//! Capabilities a world has to provide in order to be scanned.

use std::ops::BitOr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Set of collision categories. Each bit corresponds to a single category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Mask containing only category `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not smaller than 32.
    pub const fn layer(index: u32) -> Self {
        assert!(index < 32);
        Self(1 << index)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if the two masks share at least one category.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for LayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// An entity which emits a traversal weight (e.g. damage dealt to agents
/// entering its area).
pub trait WeightSource {
    /// Non-negative weight of the entity.
    fn weight(&self) -> f32;
}

/// Spatial queries the scan depends on.
pub trait WorldQuery {
    type Entity: WeightSource;

    /// Returns an entity whose shape overlaps a circle and whose collision
    /// categories intersect `mask`.
    ///
    /// When multiple entities overlap the circle, which of them is returned
    /// is up to the implementation. It must, however, be the same entity
    /// for repeated queries on an unchanged world.
    fn overlap_circle(&self, center: Vec2, radius: f32, mask: LayerMask) -> Option<&Self::Entity>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_mask() {
        let obstacles = LayerMask::layer(1);
        assert_eq!(obstacles.bits(), 2);
        assert!(obstacles.intersects(LayerMask::new(3)));
        assert!(!obstacles.intersects(LayerMask::layer(0)));
        assert!(!obstacles.intersects(LayerMask::NONE));
        assert!(obstacles.intersects(LayerMask::ALL));
        assert_eq!((LayerMask::layer(0) | obstacles).bits(), 3);
    }
}
