use fastrand::Rng;
use glam::{IVec2, UVec2, Vec2};
use gn_grid::{Grid, GridCell};

/// Layout code of a walkable cell.
pub const FREE: u8 = 0;
/// Layout code of a non-walkable cell emitting weight.
pub const HAZARD: u8 = 1;
/// Layout code of a non-walkable cell without weight.
pub const WALL: u8 = 2;

/// Creates a grid from a layout of cell codes.
///
/// # Arguments
///
/// * `layout` - cell codes indexed as `layout[x][y]`, see [`FREE`],
///   [`HAZARD`] and [`WALL`].
///
/// * `weight` - weight of hazard cells.
///
/// * `node_size` - cell `(x, y)` is centered at `(x, y) * node_size`.
///
/// # Panics
///
/// Panics if the layout is empty or ragged.
pub fn grid_from_layout<R: AsRef<[u8]>>(layout: &[R], weight: f32, node_size: f32) -> Grid {
    build(layout, node_size, |code| {
        (code == FREE, if code == HAZARD { weight } else { 0. })
    })
}

/// Creates a grid from per-cell weights indexed as `weights[x][y]`. `None`
/// marks a non-walkable cell, all other cells are walkable.
///
/// # Panics
///
/// Panics if the weights are empty or ragged.
pub fn grid_from_weights<R: AsRef<[Option<f32>]>>(weights: &[R], node_size: f32) -> Grid {
    build(weights, node_size, |weight| {
        (weight.is_some(), weight.unwrap_or(0.))
    })
}

/// Creates a fully walkable grid without any weight.
pub fn open_grid(width: u32, height: u32, node_size: f32) -> Grid {
    let column = vec![FREE; height as usize];
    let layout = vec![column; width as usize];
    grid_from_layout(&layout, 0., node_size)
}

fn build<T, R, F>(columns: &[R], node_size: f32, cell: F) -> Grid
where
    T: Copy,
    R: AsRef<[T]>,
    F: Fn(T) -> (bool, f32),
{
    let columns = columns
        .iter()
        .enumerate()
        .map(|(x, column)| {
            column
                .as_ref()
                .iter()
                .enumerate()
                .map(|(y, &value)| {
                    let position = IVec2::new(x as i32, y as i32);
                    let (walkable, weight) = cell(value);
                    Some(GridCell::new(
                        position,
                        position.as_vec2() * node_size,
                        walkable,
                        weight,
                    ))
                })
                .collect()
        })
        .collect();
    Grid::from_cells(columns, node_size).unwrap()
}

/// World position of the center of cell `(x, y)` of a grid created by this
/// module.
pub fn cell_point(x: i32, y: i32, node_size: f32) -> Vec2 {
    IVec2::new(x, y).as_vec2() * node_size
}

/// Returns deterministic pseudo-random walkable cell indices.
///
/// The same `seed` yields the same sequence across calls.
pub fn random_walkable(grid: &Grid, number: usize, seed: u64) -> Vec<UVec2> {
    let rng = Rng::with_seed(seed);
    let mut cells = Vec::with_capacity(number);
    // Bounded so that a grid without walkable cells does not hang.
    for _ in 0..number * 1000 {
        if cells.len() == number {
            break;
        }

        let index = UVec2::new(rng.u32(0..grid.width()), rng.u32(0..grid.height()));
        if grid
            .cell_at(index.x, index.y)
            .map_or(false, |cell| cell.walkable())
        {
            cells.push(index);
        }
    }
    cells
}
