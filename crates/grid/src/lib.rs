//! This crate implements the navigation grid: sampling of a world into
//! cells, queries on the resulting grid and loading of static scenes.
//!
//! The grid is a read-only product of [`scan`]. A re-scan creates a new
//! [`Grid`] which is supposed to replace the old one as a whole.

pub use bounds::{BoundsError, ScanBounds};
pub use cell::GridCell;
pub use collider::{Collider, ColliderError, ColliderShape, StaticWorld};
pub use grid::{Grid, GridError};
pub use scan::{scan, CheckingMode, ScanError, ScanParams, MAX_CELLS};
pub use scene::{load_scene, SceneDescription, SceneLoadingError};
pub use world::{LayerMask, WeightSource, WorldQuery};

mod bounds;
mod cell;
mod collider;
mod grid;
mod scan;
mod scene;
mod world;
