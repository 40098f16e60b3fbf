//! This module contains the grid path finder.

use glam::{IVec2, Vec2};
use gn_grid::Grid;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    astar::find_path,
    mode::WeightDetectionMode,
    path::GridPath,
    query::{AgentWeight, SearchProps},
};

/// A struct used for path finding on a grid.
///
/// The finder keeps frontier diagnostics of the last search until the next
/// search overwrites them.
pub struct PathFinder {
    props: SearchProps,
    diagnostics: SearchDiagnostics,
}

impl PathFinder {
    pub fn new(props: SearchProps) -> Self {
        Self {
            props,
            diagnostics: SearchDiagnostics::default(),
        }
    }

    pub fn props(&self) -> SearchProps {
        self.props
    }

    pub fn set_props(&mut self, props: SearchProps) {
        self.props = props;
    }

    /// Open and closed sets of the last executed search.
    pub fn diagnostics(&self) -> &SearchDiagnostics {
        &self.diagnostics
    }

    /// Returns a path between the cells containing two world positions.
    ///
    /// # Arguments
    ///
    /// * `grid` - the grid must not be replaced by a re-scan while the
    ///   search is running.
    ///
    /// * `from` - start position, it is resolved with
    ///   [`Grid::nearest_cell`].
    ///
    /// * `to` - goal position, it is resolved with [`Grid::nearest_cell`].
    ///
    /// * `agent` - weight properties of the agent the path is searched for.
    pub fn find_path(
        &mut self,
        grid: &Grid,
        from: Vec2,
        to: Vec2,
        agent: &AgentWeight,
    ) -> Result<GridPath, PathNotFound> {
        let Some(start) = grid.nearest_cell(from) else {
            warn!("Cannot resolve start position {:?}", from);
            return Err(PathNotFound::StartUnresolved);
        };
        let Some(goal) = grid.nearest_cell(to) else {
            warn!("Cannot resolve goal position {:?}", to);
            return Err(PathNotFound::GoalUnresolved);
        };

        self.search(grid, start.position(), goal.position(), agent)
    }

    /// Returns a path between two grid positions.
    ///
    /// Cells which are missing in the grid are treated as walkable cells
    /// without weight, positions outside of the grid are unresolvable.
    pub fn find_cell_path(
        &mut self,
        grid: &Grid,
        from: IVec2,
        to: IVec2,
        agent: &AgentWeight,
    ) -> Result<GridPath, PathNotFound> {
        if !grid.contains_index(from) {
            warn!("Start cell {:?} is outside of the grid", from);
            return Err(PathNotFound::StartUnresolved);
        }
        if !grid.contains_index(to) {
            warn!("Goal cell {:?} is outside of the grid", to);
            return Err(PathNotFound::GoalUnresolved);
        }

        self.search(grid, from, to, agent)
    }

    fn search(
        &mut self,
        grid: &Grid,
        from: IVec2,
        to: IVec2,
        agent: &AgentWeight,
    ) -> Result<GridPath, PathNotFound> {
        if self.props.mode() == WeightDetectionMode::SelfPreservationInstinct {
            warn!(
                "Weight detection mode {} is reserved, searching without weight checks",
                self.props.mode()
            );
        }

        debug!(
            "Finding path from {:?} to {:?} in {} mode",
            from,
            to,
            self.props.mode()
        );

        let outcome = find_path(grid, from, to, &self.props, agent);
        self.diagnostics = outcome.diagnostics;

        match outcome.path {
            Some(path) => {
                debug!(
                    "Path of length {} and weight {} from {:?} to {:?} found, {} nodes checked",
                    path.len(),
                    path.total_weight(),
                    from,
                    to,
                    self.diagnostics.checked_nodes()
                );
                Ok(path)
            }
            None => {
                debug!(
                    "No path from {:?} to {:?} found, {} nodes checked",
                    from,
                    to,
                    self.diagnostics.checked_nodes()
                );
                Err(PathNotFound::Exhausted)
            }
        }
    }
}

/// Reason of an unsuccessful search. Not finding a path is an expected
/// outcome.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathNotFound {
    #[error("Start position is outside of the grid")]
    StartUnresolved,
    #[error("Goal position is outside of the grid")]
    GoalUnresolved,
    #[error("No route exists under current walkability and weight constraints")]
    Exhausted,
}

/// Frontier state at the end of a search.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchDiagnostics {
    open: Vec<IVec2>,
    closed: Vec<IVec2>,
}

impl SearchDiagnostics {
    pub(crate) fn new(open: Vec<IVec2>, closed: Vec<IVec2>) -> Self {
        Self { open, closed }
    }

    /// Positions of nodes left in the open set.
    pub fn open(&self) -> &[IVec2] {
        self.open.as_slice()
    }

    /// Positions of closed nodes in the order they were closed.
    pub fn closed(&self) -> &[IVec2] {
        self.closed.as_slice()
    }

    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    pub fn closed_count(&self) -> usize {
        self.closed.len()
    }

    /// Total number of nodes touched by the search.
    pub fn checked_nodes(&self) -> usize {
        self.open_count() + self.closed_count()
    }
}
