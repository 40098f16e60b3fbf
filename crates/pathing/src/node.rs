//! Search scoped node records.

use glam::IVec2;

/// Handle of a node within the arena of a single search.
pub(crate) type NodeId = usize;

/// State of a single grid cell during one search.
pub(crate) struct SearchNode {
    position: IVec2,
    came_from: Option<NodeId>,
    /// Number of steps from the start.
    g_cost: u32,
    /// Manhattan distance to the goal times the heuristic multiplier.
    h_cost: u64,
    weight_from_start: f32,
    heuristic_weight: f32,
    weight_ratio: f32,
    closed: bool,
}

impl SearchNode {
    pub(crate) fn new(
        position: IVec2,
        came_from: Option<NodeId>,
        g_cost: u32,
        h_cost: u64,
        weight_from_start: f32,
        heuristic_weight: f32,
        weight_ratio: f32,
    ) -> Self {
        debug_assert!((0. ..=1.).contains(&weight_ratio));
        Self {
            position,
            came_from,
            g_cost,
            h_cost,
            weight_from_start,
            heuristic_weight,
            weight_ratio,
            closed: false,
        }
    }

    pub(crate) fn position(&self) -> IVec2 {
        self.position
    }

    pub(crate) fn came_from(&self) -> Option<NodeId> {
        self.came_from
    }

    pub(crate) fn g_cost(&self) -> u32 {
        self.g_cost
    }

    pub(crate) fn weight_from_start(&self) -> f32 {
        self.weight_from_start
    }

    pub(crate) fn closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
    }

    /// Re-links an open node through a shorter route. The weight
    /// accumulated along the new route replaces the old one.
    pub(crate) fn relink(&mut self, came_from: NodeId, g_cost: u32, weight_from_start: f32) {
        debug_assert!(!self.closed);
        debug_assert!(g_cost < self.g_cost);
        self.came_from = Some(came_from);
        self.g_cost = g_cost;
        self.weight_from_start = weight_from_start;
    }

    /// Total priority of the node, lower is better.
    pub(crate) fn score(&self) -> f32 {
        (u64::from(self.g_cost) + self.h_cost) as f32
            + self.weight_ratio * (self.weight_from_start + self.heuristic_weight)
    }
}
