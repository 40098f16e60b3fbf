//! This module implements sampling of a world into a grid.

use glam::{IVec2, UVec2, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    bounds::{BoundsError, ScanBounds},
    cell::GridCell,
    grid::{cell_count, Grid},
    world::{LayerMask, WeightSource, WorldQuery},
};

/// Largest number of cells a scan may produce.
pub const MAX_CELLS: usize = 1 << 26;

/// Shape of the probe used to sample the world at each cell center.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckingMode {
    /// A circle almost covering the whole cell.
    #[default]
    Circle,
    /// A small circle around the cell center.
    Point,
}

impl CheckingMode {
    /// Radius of the probe for cells of a given size.
    pub fn probe_radius(self, node_size: f32) -> f32 {
        match self {
            Self::Circle => node_size / 2.2,
            Self::Point => node_size / 10.,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanParams {
    bounds: ScanBounds,
    origin: Vec2,
    node_size: f32,
    checking_mode: CheckingMode,
    obstacle_mask: LayerMask,
    weight_mask: LayerMask,
}

impl ScanParams {
    /// # Arguments
    ///
    /// * `bounds` - requested (not yet clamped) area to be scanned.
    ///
    /// * `origin` - offset added to the center of the bounds.
    ///
    /// * `node_size` - width and height of a single cell. It must be
    ///   positive, otherwise the scan fails.
    ///
    /// * `checking_mode` - probe shape.
    ///
    /// * `obstacle_mask` - collision categories of obstacles. Cells
    ///   overlapping an obstacle are not walkable.
    ///
    /// * `weight_mask` - collision categories of weight sources.
    pub fn new(
        bounds: ScanBounds,
        origin: Vec2,
        node_size: f32,
        checking_mode: CheckingMode,
        obstacle_mask: LayerMask,
        weight_mask: LayerMask,
    ) -> Self {
        Self {
            bounds,
            origin,
            node_size,
            checking_mode,
            obstacle_mask,
            weight_mask,
        }
    }

    pub fn bounds(&self) -> ScanBounds {
        self.bounds
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn node_size(&self) -> f32 {
        self.node_size
    }

    pub fn checking_mode(&self) -> CheckingMode {
        self.checking_mode
    }

    pub fn obstacle_mask(&self) -> LayerMask {
        self.obstacle_mask
    }

    pub fn weight_mask(&self) -> LayerMask {
        self.weight_mask
    }
}

/// Scans `world` and returns a new grid.
///
/// The requested bounds are clamped to whole multiples of the node size and
/// a cell is created for every node fitting into them. Cells are visited
/// column by column (X outer, Y inner) and sampled at their centers.
///
/// The scan is deterministic: scanning an unchanged world with the same
/// parameters yields equal grids. Callers must not run searches on a grid
/// while its replacement is being scanned from a different thread.
pub fn scan<W: WorldQuery>(params: &ScanParams, world: &W) -> Result<Grid, ScanError> {
    let node_size = params.node_size();
    let bounds = params.bounds().clamped(node_size, params.origin())?;

    let size = ((bounds.extents() / node_size).floor() * 2.).as_uvec2();
    if size.cmpeq(UVec2::ZERO).any() {
        return Err(ScanError::ZeroDimension {
            extents: params.bounds().extents(),
            node_size,
        });
    }

    let count = cell_count(size)
        .filter(|&count| count <= MAX_CELLS)
        .ok_or(ScanError::TooLarge { size })?;

    info!(
        "Scanning {}x{} grid with node size {} in {:?} mode",
        size.x,
        size.y,
        node_size,
        params.checking_mode()
    );

    let radius = params.checking_mode().probe_radius(node_size);
    let min = bounds.min();

    let mut cells = Vec::with_capacity(count);
    for i in 0..size.x {
        for j in 0..size.y {
            let position = IVec2::new(i as i32, j as i32);
            let center = min + (position.as_vec2() + 0.5) * node_size;

            let walkable = world
                .overlap_circle(center, radius, params.obstacle_mask())
                .is_none();
            let weight = world
                .overlap_circle(center, radius, params.weight_mask())
                .map_or(0., |source| source.weight());

            cells.push(Some(GridCell::new(position, center, walkable, weight)));
        }
    }

    let grid = Grid::new(bounds, node_size, size, cells);
    debug!(
        "Scanned {} cells, {} walkable, average weight {}",
        count,
        grid.cells().filter(|cell| cell.walkable()).count(),
        grid.average_weight()
    );
    Ok(grid)
}

#[derive(Error, Debug, PartialEq)]
pub enum ScanError {
    #[error(transparent)]
    Bounds(#[from] BoundsError),
    #[error(
        "Scan bounds with extents ({}, {}) do not fit a single node of size {node_size}",
        .extents.x, .extents.y
    )]
    ZeroDimension { extents: Vec2, node_size: f32 },
    #[error(
        "Scanned grid would have {}x{} cells, at most {} cells are supported",
        .size.x, .size.y, MAX_CELLS
    )]
    TooLarge { size: UVec2 },
}
