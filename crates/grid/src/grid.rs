//! This module implements the read-only grid produced by a scan.

use glam::{IVec2, UVec2, Vec2};
use thiserror::Error;
use tracing::warn;

use crate::{bounds::ScanBounds, cell::GridCell};

/// 2D array of scanned cells.
///
/// The grid is never mutated after it has been created, a re-scan produces a
/// new grid which replaces the old one.
#[derive(Clone, Debug)]
pub struct Grid {
    bounds: ScanBounds,
    node_size: f32,
    size: UVec2,
    /// Cells stored column by column, i.e. cell `(x, y)` is at index `x *
    /// height + y`. A missing cell is tolerated and treated as a walkable
    /// cell without weight by the path finding.
    cells: Vec<Option<GridCell>>,
    average_weight: f32,
}

impl Grid {
    /// Creates a new grid.
    ///
    /// # Panics
    ///
    /// May panic if the number of cells does not correspond to `size`.
    pub(crate) fn new(
        bounds: ScanBounds,
        node_size: f32,
        size: UVec2,
        cells: Vec<Option<GridCell>>,
    ) -> Self {
        debug_assert_eq!(Some(cells.len()), cell_count(size));

        let (sum, count) = cells
            .iter()
            .flatten()
            .filter(|cell| cell.weightable())
            .fold((0., 0_u32), |(sum, count), cell| (sum + cell.weight(), count + 1));
        let average_weight = if count > 0 { sum / count as f32 } else { 0. };

        Self {
            bounds,
            node_size,
            size,
            cells,
            average_weight,
        }
    }

    /// Creates a grid from already prepared cells, bypassing the world scan.
    ///
    /// The grid bounds are derived from the centers of the first, the middle
    /// and the last cell: they are centered at the middle cell and extend by
    /// half a node beyond the further of the two outermost cells.
    ///
    /// # Arguments
    ///
    /// * `columns` - cells indexed as `columns[x][y]`. All columns must have
    ///   the same length and each cell's position must correspond to its
    ///   index. Missing cells are allowed except for the three reference
    ///   cells named above.
    ///
    /// * `node_size` - width and height of a single cell.
    pub fn from_cells(
        columns: Vec<Vec<Option<GridCell>>>,
        node_size: f32,
    ) -> Result<Self, GridError> {
        if !node_size.is_finite() || node_size <= 0. {
            return Err(GridError::NodeSize(node_size));
        }

        let width = columns.len();
        let height = columns.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimension);
        }
        let max_dimension = i32::MAX as usize;
        if width > max_dimension || height > max_dimension {
            return Err(GridError::TooLarge { width, height });
        }

        let mut cells = Vec::with_capacity(width * height);
        for (x, column) in columns.into_iter().enumerate() {
            if column.len() != height {
                return Err(GridError::Ragged {
                    column: x,
                    expected: height,
                    got: column.len(),
                });
            }

            for (y, cell) in column.into_iter().enumerate() {
                let expected = IVec2::new(x as i32, y as i32);
                if let Some(cell) = cell.as_ref() {
                    if cell.position() != expected {
                        return Err(GridError::Position {
                            expected,
                            got: cell.position(),
                        });
                    }
                }
                cells.push(cell);
            }
        }

        let reference = |x: usize, y: usize| {
            cells[x * height + y]
                .as_ref()
                .map(GridCell::center)
                .ok_or(GridError::MissingReference(IVec2::new(x as i32, y as i32)))
        };
        let center = reference(width / 2, height / 2)?;
        let first = reference(0, 0)?;
        let last = reference(width - 1, height - 1)?;
        let extents = (center - first).max(last - center) + node_size / 2.;

        Ok(Self::new(
            ScanBounds::new(center, extents),
            node_size,
            UVec2::new(width as u32, height as u32),
            cells,
        ))
    }

    /// Clamped bounds of the scanned area.
    pub fn bounds(&self) -> ScanBounds {
        self.bounds
    }

    pub fn node_size(&self) -> f32 {
        self.node_size
    }

    /// Number of columns (cells along X axis).
    pub fn width(&self) -> u32 {
        self.size.x
    }

    /// Number of rows (cells along Y axis).
    pub fn height(&self) -> u32 {
        self.size.y
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    /// Mean weight of all weightable cells, or 0 if there are none.
    pub fn average_weight(&self) -> f32 {
        self.average_weight
    }

    /// Iterates over all (present) cells, column by column.
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter().flatten()
    }

    /// Returns the cell whose bucket contains `position`.
    ///
    /// This is a direct lookup rather than a nearest neighbour search: the
    /// cell index is `floor((position - bounds.min) / node_size)`. `None` is
    /// returned for positions outside of the bounds or whose index falls
    /// beyond the last row or column.
    pub fn nearest_cell(&self, position: Vec2) -> Option<&GridCell> {
        if !self.bounds.contains(position) {
            return None;
        }

        let index = ((position - self.bounds.min()) / self.node_size)
            .floor()
            .as_uvec2();
        self.cell_at(index.x, index.y)
    }

    /// Returns the cell at column `x` and row `y`, or `None` if the index is
    /// out of range or the cell is missing.
    pub fn cell_at(&self, x: u32, y: u32) -> Option<&GridCell> {
        if x >= self.size.x || y >= self.size.y {
            warn!(
                "Grid index ({}, {}) out of range ({}, {})",
                x, y, self.size.x, self.size.y
            );
            return None;
        }

        self.cells[self.index(x, y)].as_ref()
    }

    /// Returns the cell at a grid position. Unlike [`Self::cell_at`] this
    /// does not log positions outside of the grid.
    pub fn cell(&self, position: IVec2) -> Option<&GridCell> {
        if !self.contains_index(position) {
            return None;
        }
        let position = position.as_uvec2();
        self.cells[self.index(position.x, position.y)].as_ref()
    }

    /// Returns true if `position` is a valid index into the grid (regardless
    /// of whether the cell is present).
    pub fn contains_index(&self, position: IVec2) -> bool {
        position.cmpge(IVec2::ZERO).all() && position.as_uvec2().cmplt(self.size).all()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        x as usize * self.size.y as usize + y as usize
    }

    /// Returns world coordinates of the center of a cell at `position`.
    pub fn cell_center(&self, position: IVec2) -> Vec2 {
        match self.cell(position) {
            Some(cell) => cell.center(),
            None => self.bounds.min() + (position.as_vec2() + 0.5) * self.node_size,
        }
    }
}

/// Returns the number of cells of a grid of a given size, or `None` if it
/// does not fit into `usize`.
pub(crate) fn cell_count(size: UVec2) -> Option<usize> {
    (size.x as usize).checked_mul(size.y as usize)
}

#[derive(Error, Debug, PartialEq)]
pub enum GridError {
    #[error("Node size has to be positive and finite: got {0}")]
    NodeSize(f32),
    #[error("Zero dimension grid")]
    ZeroDimension,
    #[error("Grid with {width}x{height} cells cannot be indexed")]
    TooLarge { width: usize, height: usize },
    #[error("Column {column} has {got} cells, expected {expected}")]
    Ragged {
        column: usize,
        expected: usize,
        got: usize,
    },
    #[error("Cell at ({}, {}) has position ({}, {})", .expected.x, .expected.y, .got.x, .got.y)]
    Position { expected: IVec2, got: IVec2 },
    #[error("Cell at ({}, {}) is required to derive grid bounds", .0.x, .0.y)]
    MissingReference(IVec2),
}
