use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Axis aligned rectangle of the world which is scanned into a grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanBounds {
    center: Vec2,
    extents: Vec2,
}

impl ScanBounds {
    /// Creates new bounds.
    ///
    /// # Arguments
    ///
    /// * `center` - center of the rectangle in world coordinates.
    ///
    /// * `extents` - half-size of the rectangle.
    pub fn new(center: Vec2, extents: Vec2) -> Self {
        Self { center, extents }
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Returns half-size of the bounds.
    pub fn extents(&self) -> Vec2 {
        self.extents
    }

    pub fn size(&self) -> Vec2 {
        2. * self.extents
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.extents
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.extents
    }

    /// Return true if the point lies within the bounds. Note that the bounds
    /// are inclusive.
    pub fn contains(&self, point: Vec2) -> bool {
        self.min().cmple(point).all() && self.max().cmpge(point).all()
    }

    /// Returns bounds whose extents are truncated to a whole multiple of
    /// `node_size` and whose center is moved by `origin`.
    ///
    /// The truncation may produce zero extents, these are rejected later
    /// when the grid dimensions are computed.
    pub fn clamped(&self, node_size: f32, origin: Vec2) -> Result<Self, BoundsError> {
        if !node_size.is_finite() || node_size <= 0. {
            return Err(BoundsError::NodeSize(node_size));
        }
        self.validate()?;

        let remainder = Vec2::new(self.extents.x % node_size, self.extents.y % node_size);
        Ok(Self::new(self.center + origin, self.extents - remainder))
    }

    pub(crate) fn validate(&self) -> Result<(), BoundsError> {
        if !self.center.is_finite()
            || !self.extents.is_finite()
            || self.extents.cmple(Vec2::ZERO).any()
        {
            return Err(BoundsError::Invalid {
                center: self.center,
                extents: self.extents,
            });
        }
        Ok(())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum BoundsError {
    #[error("Node size has to be positive and finite: got {0}")]
    NodeSize(f32),
    #[error(
        "Scan bounds have to be finite with positive extents: got center ({}, {}), extents ({}, {})",
        .center.x, .center.y, .extents.x, .extents.y
    )]
    Invalid { center: Vec2, extents: Vec2 },
}
