//! Per-agent path planning driven by the host loop.

use glam::Vec2;
use gn_grid::Grid;
use tracing::{debug, warn};

use crate::{
    finder::{PathFinder, PathNotFound},
    modifier::{ModifierChain, PathModifier},
    path::{GridPath, PathStep},
    query::AgentWeight,
};

/// Timing of periodic re-planning and of path following.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSettings {
    path_update_interval: f32,
    node_move_duration: f32,
    node_stop_duration: f32,
}

impl AgentSettings {
    /// # Arguments
    ///
    /// * `path_update_interval` - the path to the target is re-planned
    ///   once per this many seconds.
    ///
    /// * `node_move_duration` - time in seconds the mover should take to
    ///   move between two consecutive cells.
    ///
    /// * `node_stop_duration` - time in seconds between two consecutive
    ///   move orders.
    ///
    /// # Panics
    ///
    /// May panic if any of the durations is negative or not finite.
    pub fn new(
        path_update_interval: f32,
        node_move_duration: f32,
        node_stop_duration: f32,
    ) -> Self {
        debug_assert!(path_update_interval.is_finite() && path_update_interval >= 0.);
        debug_assert!(node_move_duration.is_finite() && node_move_duration >= 0.);
        debug_assert!(node_stop_duration.is_finite() && node_stop_duration >= 0.);
        Self {
            path_update_interval,
            node_move_duration,
            node_stop_duration,
        }
    }

    pub fn path_update_interval(&self) -> f32 {
        self.path_update_interval
    }

    pub fn node_move_duration(&self) -> f32 {
        self.node_move_duration
    }

    pub fn node_stop_duration(&self) -> f32 {
        self.node_stop_duration
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::new(1., 0.2, 0.2)
    }
}

/// Instruction for an external mover to move the agent to a cell center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveOrder {
    destination: Vec2,
    duration: f32,
}

impl MoveOrder {
    fn new(destination: Vec2, duration: f32) -> Self {
        Self {
            destination,
            duration,
        }
    }

    pub fn destination(&self) -> Vec2 {
        self.destination
    }

    /// Time in seconds the move should take.
    pub fn duration(&self) -> f32 {
        self.duration
    }
}

/// An agent periodically planning a path to its target and issuing move
/// orders along the path.
///
/// The agent does not move by itself: the host is expected to execute
/// emitted [`MoveOrder`]s and report the resulting position with
/// [`Agent::set_position`].
pub struct Agent {
    settings: AgentSettings,
    weight: AgentWeight,
    modifiers: ModifierChain,
    position: Vec2,
    target: Option<Vec2>,
    active: bool,
    can_move: bool,
    /// Time till the next re-planning.
    replan_timer: f32,
    /// Time till the next move order.
    stop_timer: f32,
    path: Option<GridPath>,
    /// Index of the path step the agent was last ordered to.
    cursor: usize,
}

impl Agent {
    /// Creates a new active agent which is allowed to move.
    ///
    /// # Arguments
    ///
    /// * `position` - current world position of the agent.
    ///
    /// * `settings` - re-planning and path following timing.
    ///
    /// * `weight` - weight properties used for path searches.
    ///
    /// * `modifiers` - chain applied to every found path.
    pub fn new(
        position: Vec2,
        settings: AgentSettings,
        weight: AgentWeight,
        modifiers: ModifierChain,
    ) -> Self {
        Self {
            settings,
            weight,
            modifiers,
            position,
            target: None,
            active: true,
            can_move: true,
            replan_timer: 0.,
            stop_timer: 0.,
            path: None,
            cursor: 0,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn target(&self) -> Option<Vec2> {
        self.target
    }

    /// Sets a target the agent periodically plans a path to. The path is
    /// planned during the next [`Self::tick`] at the latest.
    pub fn set_target(&mut self, target: Option<Vec2>) {
        self.target = target;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Inactive agents neither plan nor move.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn can_move(&self) -> bool {
        self.can_move
    }

    /// Agents which cannot move keep planning but emit no move orders.
    pub fn set_can_move(&mut self, can_move: bool) {
        self.can_move = can_move;
    }

    pub fn weight(&self) -> AgentWeight {
        self.weight
    }

    /// Updates weight properties, e.g. after the agent received damage.
    pub fn set_weight(&mut self, weight: AgentWeight) {
        self.weight = weight;
    }

    pub fn settings(&self) -> AgentSettings {
        self.settings
    }

    /// Currently followed path.
    pub fn path(&self) -> Option<&GridPath> {
        self.path.as_ref()
    }

    /// Index of the path step the agent was last ordered to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Immediately plans a path from the current position to `target`.
    ///
    /// On success the found path, post-processed by the modifier chain,
    /// replaces the followed path and path following starts over. On
    /// failure the previously followed path is kept.
    pub fn request_path(
        &mut self,
        target: Vec2,
        finder: &mut PathFinder,
        grid: &Grid,
    ) -> Result<&GridPath, PathNotFound> {
        match finder.find_path(grid, self.position, target, &self.weight) {
            Ok(path) => {
                let path = self.modifiers.apply(path);
                debug!(
                    "Agent at {:?} follows a new path with {} cells",
                    self.position,
                    path.len()
                );
                self.cursor = 0;
                Ok(&*self.path.insert(path))
            }
            Err(error) => {
                warn!(
                    "Agent path from {:?} to {:?} not found: {}",
                    self.position, target, error
                );
                Err(error)
            }
        }
    }

    /// Advances the agent by `delta` seconds.
    ///
    /// The path to the target is re-planned whenever the re-planning
    /// countdown runs out. When the agent is allowed to move and the
    /// countdown since the last move order has run out, the next cell of
    /// the path is returned as a move order. The path is dropped once the
    /// agent has been ordered to all its cells.
    pub fn tick(
        &mut self,
        delta: f32,
        finder: &mut PathFinder,
        grid: &Grid,
    ) -> Option<MoveOrder> {
        if !self.active {
            return None;
        }

        if let Some(target) = self.target {
            if self.replan_timer > 0. {
                self.replan_timer -= delta;
            } else {
                if let Err(error) = self.request_path(target, finder, grid) {
                    debug!("Re-planning failed, following the previous path: {error}");
                }
                self.replan_timer = self.settings.path_update_interval();
            }
        }

        if !self.can_move {
            return None;
        }
        let len = self.path.as_ref().map(GridPath::len)?;

        if self.stop_timer > 0. {
            self.stop_timer -= delta;
            return None;
        }
        if self.cursor >= len {
            self.path = None;
            self.cursor = 0;
            return None;
        }

        self.cursor += 1;
        let destination = self
            .path
            .as_ref()
            .and_then(|path| path.steps().get(self.cursor))
            .map(PathStep::center)?;
        self.stop_timer = self.settings.node_stop_duration();
        Some(MoveOrder::new(destination, self.settings.node_move_duration()))
    }
}

#[cfg(test)]
mod tests {
    use gn_test_utils::open_grid;

    use super::*;
    use crate::{mode::WeightDetectionMode, query::SearchProps};

    fn setup() -> (Agent, PathFinder, Grid) {
        let agent = Agent::new(
            Vec2::ZERO,
            AgentSettings::new(1., 0.5, 0.25),
            AgentWeight::new(100., None),
            ModifierChain::new(),
        );
        let finder = PathFinder::new(SearchProps::new(WeightDetectionMode::None, 1, 0.5));
        (agent, finder, open_grid(4, 1, 1.))
    }

    #[test]
    fn test_follow_path() {
        let (mut agent, mut finder, grid) = setup();
        agent.set_target(Some(Vec2::new(3., 0.)));

        let mut orders = Vec::new();
        for _ in 0..8 {
            let order = agent.tick(0.25, &mut finder, &grid);
            if let Some(order) = order {
                assert_eq!(order.duration(), 0.5);
                agent.set_position(order.destination());
            }
            orders.push(order.map(|order| order.destination()));
        }

        assert_eq!(
            orders,
            vec![
                Some(Vec2::new(1., 0.)),
                None,
                Some(Vec2::new(2., 0.)),
                None,
                Some(Vec2::new(3., 0.)),
                None,
                None,
                None,
            ]
        );
        assert!(agent.path().is_none());
        assert_eq!(agent.position(), Vec2::new(3., 0.));
    }

    #[test]
    fn test_inactive() {
        let (mut agent, mut finder, grid) = setup();
        agent.set_target(Some(Vec2::new(3., 0.)));
        agent.set_active(false);
        assert!(agent.tick(0.25, &mut finder, &grid).is_none());
        assert!(agent.path().is_none());

        agent.set_active(true);
        agent.set_can_move(false);
        assert!(agent.tick(0.25, &mut finder, &grid).is_none());
        assert_eq!(agent.path().unwrap().len(), 4);
        assert_eq!(agent.cursor(), 0);
    }

    #[test]
    fn test_no_target() {
        let (mut agent, mut finder, grid) = setup();
        for _ in 0..4 {
            assert!(agent.tick(0.5, &mut finder, &grid).is_none());
        }
        assert!(agent.path().is_none());

        let path = agent
            .request_path(Vec2::new(2., 0.), &mut finder, &grid)
            .unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(
            agent.tick(0.5, &mut finder, &grid).unwrap().destination(),
            Vec2::new(1., 0.)
        );
    }

    #[test]
    fn test_failure_keeps_path() {
        let (mut agent, mut finder, grid) = setup();
        agent
            .request_path(Vec2::new(3., 0.), &mut finder, &grid)
            .unwrap();
        assert!(agent.tick(0.25, &mut finder, &grid).is_some());
        assert_eq!(agent.cursor(), 1);

        assert_eq!(
            agent
                .request_path(Vec2::new(30., 0.), &mut finder, &grid)
                .unwrap_err(),
            PathNotFound::GoalUnresolved
        );
        assert_eq!(agent.path().unwrap().len(), 4);
        assert_eq!(agent.cursor(), 1);
    }

    #[test]
    fn test_failed_replan_follows_previous_path() {
        let (mut agent, mut finder, grid) = setup();
        agent
            .request_path(Vec2::new(3., 0.), &mut finder, &grid)
            .unwrap();
        agent.set_target(Some(Vec2::new(30., 0.)));

        let order = agent.tick(0.25, &mut finder, &grid).unwrap();
        assert_eq!(order.destination(), Vec2::new(1., 0.));
        assert_eq!(agent.path().unwrap().len(), 4);
        assert_eq!(agent.cursor(), 1);
    }
}
