//! Paths on the grid produced by the search.

use glam::{IVec2, Vec2};

/// A single cell of a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathStep {
    position: IVec2,
    center: Vec2,
    weight_from_start: f32,
}

impl PathStep {
    /// # Arguments
    ///
    /// * `position` - grid coordinates of the cell.
    ///
    /// * `center` - world position of the cell center.
    ///
    /// * `weight_from_start` - weight accumulated along the path from its
    ///   start up to and including this cell.
    pub fn new(position: IVec2, center: Vec2, weight_from_start: f32) -> Self {
        Self {
            position,
            center,
            weight_from_start,
        }
    }

    pub fn position(&self) -> IVec2 {
        self.position
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn weight_from_start(&self) -> f32 {
        self.weight_from_start
    }
}

/// A path on the grid. Start and goal cells are included, the first step
/// corresponds to the start.
#[derive(Clone, Debug, PartialEq)]
pub struct GridPath {
    steps: Vec<PathStep>,
}

impl GridPath {
    /// Creates a new path. Path modifiers may create paths whose steps are
    /// not grid neighbours.
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    /// Creates a path from reconstructed search steps.
    ///
    /// # Panics
    ///
    /// May panic if two consecutive steps are not 4-adjacent or if the path
    /// is empty.
    pub(crate) fn from_search(steps: Vec<PathStep>) -> Self {
        #[cfg(debug_assertions)]
        {
            assert!(!steps.is_empty());
            for pair in steps.windows(2) {
                let delta = (pair[1].position() - pair[0].position()).abs();
                assert_eq!(delta.x + delta.y, 1);
            }
        }
        Self::new(steps)
    }

    /// Number of cells of the path, including the start and the goal.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[PathStep] {
        self.steps.as_slice()
    }

    pub fn into_steps(self) -> Vec<PathStep> {
        self.steps
    }

    /// Returns world positions of cell centers from the start to the goal.
    pub fn waypoints(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.steps.iter().map(PathStep::center)
    }

    /// Returns grid positions of the cells from the start to the goal.
    pub fn positions(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.steps.iter().map(PathStep::position)
    }

    /// Weight accumulated along the whole path (e.g. total damage suffered
    /// by an agent following it).
    pub fn total_weight(&self) -> f32 {
        self.steps
            .last()
            .map_or(0., |step| step.weight_from_start())
    }
}
