use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// A single discretized cell of a scanned area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    position: IVec2,
    center: Vec2,
    walkable: bool,
    weight: f32,
}

impl GridCell {
    /// # Arguments
    ///
    /// * `position` - coordinates of the cell within the grid. These are
    ///   unique within a single grid.
    ///
    /// * `center` - world position of the cell centroid.
    ///
    /// * `walkable` - whether agents may enter the cell.
    ///
    /// * `weight` - non-negative traversal cost (e.g. damage) of the cell.
    pub fn new(position: IVec2, center: Vec2, walkable: bool, weight: f32) -> Self {
        debug_assert!(weight >= 0.);
        Self {
            position,
            center,
            walkable,
            weight,
        }
    }

    pub fn position(&self) -> IVec2 {
        self.position
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn walkable(&self) -> bool {
        self.walkable
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Returns true if the cell carries a non-zero weight.
    pub fn weightable(&self) -> bool {
        self.weight > 0.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weightable() {
        let cell = GridCell::new(IVec2::new(1, 2), Vec2::new(1.5, 2.5), true, 0.);
        assert!(!cell.weightable());
        assert_eq!(cell.position(), IVec2::new(1, 2));
        assert_eq!(cell.center(), Vec2::new(1.5, 2.5));

        let cell = GridCell::new(IVec2::ZERO, Vec2::ZERO, false, 0.25);
        assert!(cell.weightable());
        assert!(!cell.walkable());
    }
}
