//! This module contains weighted A* search over grid cells.

use std::{cmp::Ordering, collections::BinaryHeap};

use ahash::AHashMap;
use glam::IVec2;
use gn_grid::{Grid, GridCell};
use tinyvec::ArrayVec;

use crate::{
    finder::SearchDiagnostics,
    mode::WeightDetectionMode,
    node::{NodeId, SearchNode},
    path::{GridPath, PathStep},
    query::{AgentWeight, SearchProps},
};

/// Neighbour offsets in the order in which neighbours are expanded.
const NEIGHBOURS: [IVec2; 4] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
];

pub(crate) struct SearchOutcome {
    pub(crate) path: Option<GridPath>,
    pub(crate) diagnostics: SearchDiagnostics,
}

/// Finds a path between two grid positions.
///
/// Both positions must be valid grid indices. The goal is reached even if
/// its cell is not walkable when it equals the start, otherwise such a goal
/// is never admitted and the search exhausts.
pub(crate) fn find_path(
    grid: &Grid,
    start: IVec2,
    goal: IVec2,
    props: &SearchProps,
    agent: &AgentWeight,
) -> SearchOutcome {
    debug_assert!(grid.contains_index(start));
    debug_assert!(grid.contains_index(goal));

    let mut search = Search::new(grid, goal, props, agent);
    let path = search.run(start);
    SearchOutcome {
        path,
        diagnostics: search.diagnostics(),
    }
}

struct Search<'a> {
    grid: &'a Grid,
    goal: IVec2,
    mode: WeightDetectionMode,
    heuristic_multiplier: u32,
    heuristic_weight: f32,
    weight_ratio: f32,
    capacity: f32,
    nodes: Vec<SearchNode>,
    /// Grid position to arena index of all opened nodes.
    index: AHashMap<IVec2, NodeId>,
    open_set: OpenSet,
    /// Closed nodes in the order of their closing.
    closed: Vec<NodeId>,
}

impl<'a> Search<'a> {
    fn new(grid: &'a Grid, goal: IVec2, props: &SearchProps, agent: &AgentWeight) -> Self {
        let mode = props.mode();
        Self {
            grid,
            goal,
            mode,
            heuristic_multiplier: props.heuristic_multiplier(),
            heuristic_weight: if mode.blends_weight() {
                grid.average_weight()
            } else {
                0.
            },
            weight_ratio: agent.weight_ratio(props),
            capacity: agent.capacity(),
            nodes: Vec::new(),
            index: AHashMap::new(),
            open_set: OpenSet::new(),
            closed: Vec::new(),
        }
    }

    fn run(&mut self, start: IVec2) -> Option<GridPath> {
        let start_weight = self.grid.cell(start).map_or(0., GridCell::weight);
        self.open(start, None, 0, start_weight);

        while let Some(step) = self.open_set.pop() {
            let current = step.node();
            {
                let node = &self.nodes[current];
                // Superseded by a later push after a relink.
                if node.closed() || node.g_cost() != step.g_cost() {
                    continue;
                }
                if node.position() == self.goal {
                    return Some(self.path_to(current));
                }
            }

            self.nodes[current].close();
            self.closed.push(current);

            let g_cost = self.nodes[current].g_cost() + 1;
            for (position, weight) in self.neighbours(current) {
                let weight_from_start = self.nodes[current].weight_from_start() + weight;
                match self.index.get(&position) {
                    None => self.open(position, Some(current), g_cost, weight_from_start),
                    Some(&id) => {
                        let node = &mut self.nodes[id];
                        if !node.closed() && node.g_cost() > g_cost {
                            node.relink(current, g_cost, weight_from_start);
                            self.open_set.push(Step::new(node.score(), id, g_cost));
                        }
                    }
                }
            }
        }

        None
    }

    fn open(
        &mut self,
        position: IVec2,
        came_from: Option<NodeId>,
        g_cost: u32,
        weight_from_start: f32,
    ) {
        let id = self.nodes.len();
        let node = SearchNode::new(
            position,
            came_from,
            g_cost,
            self.heuristic(position),
            weight_from_start,
            self.heuristic_weight,
            self.weight_ratio,
        );
        self.open_set.push(Step::new(node.score(), id, g_cost));
        self.nodes.push(node);
        self.index.insert(position, id);
    }

    fn heuristic(&self, position: IVec2) -> u64 {
        let delta = (position - self.goal).abs().as_uvec2();
        u64::from(self.heuristic_multiplier) * (u64::from(delta.x) + u64::from(delta.y))
    }

    /// Returns admitted neighbours of a node together with their cell
    /// weights.
    fn neighbours(&self, id: NodeId) -> ArrayVec<[(IVec2, f32); 4]> {
        let node = &self.nodes[id];

        let mut neighbours = ArrayVec::new();
        for offset in NEIGHBOURS {
            let position = node.position() + offset;
            if !self.grid.contains_index(position) {
                continue;
            }

            // Missing cells are walkable and carry no weight.
            let cell = self.grid.cell(position);
            if cell.map_or(false, |cell| !cell.walkable()) {
                continue;
            }
            let weight = cell.map_or(0., GridCell::weight);

            let admitted = match self.mode {
                WeightDetectionMode::OnlyCriticalWeightCheck => weight < self.capacity,
                WeightDetectionMode::PredictedLethalCheck => {
                    node.weight_from_start() + weight < self.capacity
                }
                WeightDetectionMode::None
                | WeightDetectionMode::Average
                | WeightDetectionMode::SelfPreservationInstinct => true,
            };
            if admitted {
                neighbours.push((position, weight));
            }
        }
        neighbours
    }

    fn path_to(&self, id: NodeId) -> GridPath {
        let mut steps = Vec::with_capacity(self.nodes[id].g_cost() as usize + 1);
        let mut current = Some(id);
        while let Some(id) = current {
            let node = &self.nodes[id];
            steps.push(PathStep::new(
                node.position(),
                self.grid.cell_center(node.position()),
                node.weight_from_start(),
            ));
            current = node.came_from();
        }
        steps.reverse();
        GridPath::from_search(steps)
    }

    fn diagnostics(&self) -> SearchDiagnostics {
        let open = self
            .nodes
            .iter()
            .filter(|node| !node.closed())
            .map(SearchNode::position)
            .collect();
        let closed = self
            .closed
            .iter()
            .map(|&id| self.nodes[id].position())
            .collect();
        SearchDiagnostics::new(open, closed)
    }
}

/// A priority queue of nodes to be expanded.
struct OpenSet {
    heap: BinaryHeap<Step>,
}

impl OpenSet {
    fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    fn pop(&mut self) -> Option<Step> {
        self.heap.pop()
    }

    fn push(&mut self, step: Step) {
        self.heap.push(step);
    }
}

/// An entry of the open set. Nodes are expanded in the order of increasing
/// score, nodes with equal score in the order they were first opened.
struct Step {
    score: f32,
    node: NodeId,
    /// Step count of the node at the time of the push. The entry is stale
    /// once the node is relinked.
    g_cost: u32,
}

impl Step {
    fn new(score: f32, node: NodeId, g_cost: u32) -> Self {
        Self {
            score,
            node,
            g_cost,
        }
    }

    fn node(&self) -> NodeId {
        self.node
    }

    fn g_cost(&self) -> u32 {
        self.g_cost
    }
}

impl PartialEq for Step {
    fn eq(&self, other: &Step) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Step {}

impl PartialOrd for Step {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Step {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.node.cmp(&self.node))
    }
}

#[cfg(test)]
mod tests {
    use gn_test_utils::{grid_from_weights, open_grid};

    use super::*;

    #[test]
    fn test_open_set() {
        let mut set = OpenSet::new();
        set.push(Step::new(2., 1, 0));
        set.push(Step::new(1.1, 2, 0));
        set.push(Step::new(4., 3, 0));
        set.push(Step::new(2., 0, 0));
        assert_eq!(set.pop().unwrap().node(), 2);
        assert_eq!(set.pop().unwrap().node(), 0);
        assert_eq!(set.pop().unwrap().node(), 1);
        assert_eq!(set.pop().unwrap().node(), 3);
        assert!(set.pop().is_none());
    }

    #[test]
    fn test_step_ord() {
        let step_a = Step::new(2., 1, 0);
        let step_b = Step::new(2.1, 0, 0);
        assert!(step_b < step_a);
        let step_c = Step::new(2., 5, 0);
        assert!(step_c < step_a);
    }

    #[test]
    fn test_first_opened_wins() {
        let grid = open_grid(5, 5, 1.);
        let props = SearchProps::new(WeightDetectionMode::None, 1, 0.5);
        let outcome = find_path(
            &grid,
            IVec2::ZERO,
            IVec2::new(2, 2),
            &props,
            &AgentWeight::new(100., None),
        );

        let path = outcome.path.unwrap();
        assert_eq!(
            path.positions().collect::<Vec<_>>(),
            vec![
                IVec2::new(0, 0),
                IVec2::new(1, 0),
                IVec2::new(2, 0),
                IVec2::new(2, 1),
                IVec2::new(2, 2),
            ]
        );
        assert_eq!(outcome.diagnostics.closed_count(), 8);
        assert_eq!(outcome.diagnostics.open_count(), 5);
        assert_eq!(outcome.diagnostics.closed()[0], IVec2::ZERO);
    }

    #[test]
    fn test_huge_heuristic_multiplier() {
        let grid = open_grid(3, 1, 1.);
        let props = SearchProps::new(WeightDetectionMode::None, u32::MAX, 0.5);
        let outcome = find_path(
            &grid,
            IVec2::ZERO,
            IVec2::new(2, 0),
            &props,
            &AgentWeight::new(100., None),
        );
        assert_eq!(outcome.path.unwrap().len(), 3);

        let grid = open_grid(6, 6, 1.);
        let props = SearchProps::new(WeightDetectionMode::Average, u32::MAX, 1.);
        let outcome = find_path(
            &grid,
            IVec2::new(5, 0),
            IVec2::new(0, 5),
            &props,
            &AgentWeight::new(100., None),
        );
        assert_eq!(outcome.path.unwrap().len(), 11);
    }

    #[test]
    fn test_missing_cells_walkable() {
        let mut columns: Vec<Vec<Option<GridCell>>> = (0..3)
            .map(|x| {
                (0..3)
                    .map(|y| {
                        let position = IVec2::new(x, y);
                        let walkable = x != 1;
                        Some(GridCell::new(position, position.as_vec2(), walkable, 0.))
                    })
                    .collect()
            })
            .collect();
        columns[1][1] = None;
        let grid = Grid::from_cells(columns, 1.).unwrap();

        let outcome = find_path(
            &grid,
            IVec2::new(0, 1),
            IVec2::new(2, 1),
            &SearchProps::default(),
            &AgentWeight::new(100., None),
        );
        let path = outcome.path.unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path.steps()[1].position(), IVec2::new(1, 1));
        assert_eq!(path.steps()[1].center(), grid.cell_center(IVec2::new(1, 1)));
        assert_eq!(path.total_weight(), 0.);
    }

    /// 6x6 grid with diagonal stripes of walls and weights 4 and 1.5.
    fn striped_grid() -> Grid {
        let weights: Vec<Vec<Option<f32>>> = (0..6)
            .map(|x| {
                (0..6)
                    .map(|y| match (x + 2 * y) % 5 {
                        0 => None,
                        1 => Some(4.),
                        2 => Some(1.5),
                        _ => Some(0.),
                    })
                    .collect()
            })
            .collect();
        grid_from_weights(&weights, 2.)
    }

    #[test]
    fn test_relinked_weight() {
        let grid = striped_grid();
        assert_eq!(grid.average_weight(), 2.75);

        // Cell (3, 2) is first opened through a longer route with
        // accumulated weight 7 and later relinked through (4, 2).
        let props = SearchProps::new(WeightDetectionMode::Average, 2, 1.);
        let outcome = find_path(
            &grid,
            IVec2::new(4, 0),
            IVec2::new(2, 5),
            &props,
            &AgentWeight::new(100., None),
        );
        let path = outcome.path.unwrap();
        assert_eq!(
            path.steps()
                .iter()
                .map(|step| (step.position(), step.weight_from_start()))
                .collect::<Vec<_>>(),
            vec![
                (IVec2::new(4, 0), 0.),
                (IVec2::new(4, 1), 4.),
                (IVec2::new(4, 2), 4.),
                (IVec2::new(3, 2), 5.5),
                (IVec2::new(3, 3), 5.5),
                (IVec2::new(3, 4), 9.5),
                (IVec2::new(3, 5), 9.5),
                (IVec2::new(2, 5), 11.),
            ]
        );

        let mut sum = 0.;
        for step in path.steps() {
            sum += grid.cell(step.position()).unwrap().weight();
            assert_eq!(step.weight_from_start(), sum);
        }
        assert_eq!(path.total_weight(), 11.);
    }

    #[test]
    fn test_weight_from_start_consistent() {
        let grid = striped_grid();

        for multiplier in [0, 1, 3, 10] {
            let props = SearchProps::new(WeightDetectionMode::Average, multiplier, 1.);
            let outcome = find_path(
                &grid,
                IVec2::new(0, 1),
                IVec2::new(5, 4),
                &props,
                &AgentWeight::new(100., None),
            );
            let path = outcome.path.unwrap();
            assert_eq!(path.steps()[0].position(), IVec2::new(0, 1));
            assert_eq!(path.steps()[path.len() - 1].position(), IVec2::new(5, 4));

            let mut sum = 0.;
            for step in path.steps() {
                sum += grid.cell(step.position()).unwrap().weight();
                assert_eq!(step.weight_from_start(), sum);
            }
        }
    }
}
