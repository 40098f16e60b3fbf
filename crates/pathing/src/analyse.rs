//! Sweeping of search parameters and comparison of the resulting paths.

use glam::Vec2;
use gn_grid::Grid;
use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, info};

use crate::{finder::PathFinder, path::GridPath, query::AgentWeight};

/// Search parameter to be swept. The parameter starts at 0 and is
/// increased by `step` while it stays below `max`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sweep {
    /// Sweeps the default weight ratio. Ratio overrides of the agent are
    /// disregarded during the sweep.
    WeightRatio { step: f32, max: f32 },
    HeuristicMultiplier { step: u32, max: u32 },
}

impl Sweep {
    fn validate(&self) -> Result<(), AnalysisError> {
        match *self {
            Self::WeightRatio { step, max } => {
                if !step.is_finite() || step <= 0. {
                    return Err(AnalysisError::Step(step));
                }
                if !max.is_finite() {
                    return Err(AnalysisError::Max(max));
                }
            }
            Self::HeuristicMultiplier { step, .. } => {
                if step == 0 {
                    return Err(AnalysisError::Step(0.));
                }
            }
        }
        Ok(())
    }
}

/// Properties of a path found with a particular parameter value.
#[derive(Clone, Debug, PartialEq)]
pub struct PathReport {
    parameter: f32,
    weight_sum: f32,
    length: usize,
    checked_nodes: usize,
    lethal: bool,
}

impl PathReport {
    fn new(parameter: f32, path: &GridPath, checked_nodes: usize, capacity: f32) -> Self {
        Self {
            parameter,
            weight_sum: path.total_weight(),
            length: path.len(),
            checked_nodes,
            lethal: path
                .steps()
                .iter()
                .any(|step| step.weight_from_start() >= capacity),
        }
    }

    /// Value of the swept parameter.
    pub fn parameter(&self) -> f32 {
        self.parameter
    }

    /// Weight accumulated along the path.
    pub fn weight_sum(&self) -> f32 {
        self.weight_sum
    }

    /// Number of path cells.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of open and closed nodes at the end of the search.
    pub fn checked_nodes(&self) -> usize {
        self.checked_nodes
    }

    /// True if the agent would not survive the path, i.e. the accumulated
    /// weight reaches its capacity at some cell.
    pub fn lethal(&self) -> bool {
        self.lethal
    }
}

/// Searches for a path once per swept parameter value and reports every
/// path found. Parameter values for which no path exists are skipped.
///
/// Search properties of `finder` are restored afterwards.
pub fn sweep(
    finder: &mut PathFinder,
    grid: &Grid,
    from: Vec2,
    to: Vec2,
    agent: &AgentWeight,
    sweep: Sweep,
) -> Result<Vec<PathReport>, AnalysisError> {
    sweep.validate()?;
    info!("Analysing paths from {:?} to {:?} with {:?}", from, to, sweep);

    let original = finder.props();
    let mut reports = Vec::new();

    let mut run = |finder: &mut PathFinder, parameter: f32, agent: &AgentWeight| {
        match finder.find_path(grid, from, to, agent) {
            Ok(path) => reports.push(PathReport::new(
                parameter,
                &path,
                finder.diagnostics().checked_nodes(),
                agent.capacity(),
            )),
            Err(error) => debug!("No path with parameter {}: {}", parameter, error),
        }
    };

    match sweep {
        Sweep::WeightRatio { step, max } => {
            let agent = AgentWeight::new(agent.capacity(), None);
            let mut ratio = 0.;
            while ratio < max {
                finder.set_props(original.with_default_weight_ratio(ratio));
                run(finder, ratio, &agent);
                ratio += step;
            }
        }
        Sweep::HeuristicMultiplier { step, max } => {
            let mut multiplier = Some(0);
            while let Some(value) = multiplier.filter(|&value| value < max) {
                finder.set_props(original.with_heuristic_multiplier(value));
                run(finder, value as f32, agent);
                // The sweep ends once the multiplier leaves the u32 range.
                multiplier = value.checked_add(step);
            }
        }
    }

    finder.set_props(original);
    info!("{} paths analysed", reports.len());
    Ok(reports)
}

/// Extremes of a set of path reports.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepSummary {
    min_weight: f32,
    max_weight: f32,
    min_length: usize,
    max_length: usize,
}

impl SweepSummary {
    pub fn min_weight(&self) -> f32 {
        self.min_weight
    }

    pub fn max_weight(&self) -> f32 {
        self.max_weight
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }
}

/// Returns minimum and maximum path weight and length, or `None` if there
/// are no reports.
pub fn summarize(reports: &[PathReport]) -> Option<SweepSummary> {
    let (min_weight, max_weight) = reports
        .iter()
        .map(PathReport::weight_sum)
        .minmax()
        .into_option()?;
    let (min_length, max_length) = reports
        .iter()
        .map(PathReport::length)
        .minmax()
        .into_option()?;

    Some(SweepSummary {
        min_weight,
        max_weight,
        min_length,
        max_length,
    })
}

#[derive(Error, Debug, PartialEq)]
pub enum AnalysisError {
    #[error("Sweep step has to be positive and finite: got {0}")]
    Step(f32),
    #[error("Sweep maximum has to be finite: got {0}")]
    Max(f32),
}

#[cfg(test)]
mod tests {
    use gn_test_utils::{grid_from_weights, open_grid};

    use super::*;
    use crate::{mode::WeightDetectionMode, query::SearchProps};

    fn hazard_grid() -> Grid {
        let weights: Vec<Vec<Option<f32>>> = (0..5)
            .map(|x| {
                (0..3)
                    .map(|y| Some(if y == 0 && (1..=3).contains(&x) { 5. } else { 0. }))
                    .collect()
            })
            .collect();
        grid_from_weights(&weights, 1.)
    }

    #[test]
    fn test_weight_ratio_sweep() {
        let grid = hazard_grid();
        let props = SearchProps::new(WeightDetectionMode::Average, 1, 0.5);
        let mut finder = PathFinder::new(props);

        let reports = sweep(
            &mut finder,
            &grid,
            Vec2::new(0., 0.),
            Vec2::new(4., 0.),
            &AgentWeight::new(10., Some(0.)),
            Sweep::WeightRatio {
                step: 0.25,
                max: 1.,
            },
        )
        .unwrap();
        assert_eq!(finder.props(), props);

        assert_eq!(
            reports
                .iter()
                .map(|report| (report.parameter(), report.length(), report.lethal()))
                .collect::<Vec<_>>(),
            vec![(0., 5, true), (0.25, 5, true), (0.5, 7, false), (0.75, 7, false)]
        );
        assert_eq!(reports[0].weight_sum(), 15.);
        assert_eq!(reports[0].checked_nodes(), 9);
        assert_eq!(reports[3].weight_sum(), 0.);

        let summary = summarize(&reports).unwrap();
        assert_eq!(summary.min_weight(), 0.);
        assert_eq!(summary.max_weight(), 15.);
        assert_eq!(summary.min_length(), 5);
        assert_eq!(summary.max_length(), 7);
    }

    #[test]
    fn test_heuristic_sweep() {
        let grid = open_grid(8, 8, 1.);
        let mut finder = PathFinder::new(SearchProps::new(WeightDetectionMode::None, 1, 0.5));

        let reports = sweep(
            &mut finder,
            &grid,
            Vec2::new(0., 0.),
            Vec2::new(6., 5.),
            &AgentWeight::new(100., None),
            Sweep::HeuristicMultiplier { step: 1, max: 4 },
        )
        .unwrap();
        assert_eq!(finder.props().heuristic_multiplier(), 1);

        assert_eq!(
            reports
                .iter()
                .map(|report| (report.parameter(), report.length(), report.checked_nodes()))
                .collect::<Vec<_>>(),
            vec![(0., 12, 59), (1., 12, 53), (2., 12, 26), (3., 12, 26)]
        );
        assert!(reports.iter().all(|report| !report.lethal()));
    }

    #[test]
    fn test_heuristic_sweep_large_step() {
        let grid = open_grid(3, 1, 1.);
        let mut finder = PathFinder::new(SearchProps::new(WeightDetectionMode::None, 1, 0.5));

        let reports = sweep(
            &mut finder,
            &grid,
            Vec2::new(0., 0.),
            Vec2::new(2., 0.),
            &AgentWeight::new(100., None),
            Sweep::HeuristicMultiplier {
                step: 3_000_000_000,
                max: 4_000_000_000,
            },
        )
        .unwrap();
        assert_eq!(
            reports
                .iter()
                .map(|report| (report.parameter(), report.length()))
                .collect::<Vec<_>>(),
            vec![(0., 3), (3_000_000_000_u32 as f32, 3)]
        );
        assert_eq!(finder.props().heuristic_multiplier(), 1);
    }

    #[test]
    fn test_invalid_sweep() {
        let grid = open_grid(2, 2, 1.);
        let mut finder = PathFinder::new(SearchProps::default());
        let agent = AgentWeight::new(100., None);

        assert_eq!(
            sweep(
                &mut finder,
                &grid,
                Vec2::ZERO,
                Vec2::ONE,
                &agent,
                Sweep::HeuristicMultiplier { step: 0, max: 4 }
            )
            .unwrap_err(),
            AnalysisError::Step(0.)
        );
        assert!(sweep(
            &mut finder,
            &grid,
            Vec2::ZERO,
            Vec2::ONE,
            &agent,
            Sweep::WeightRatio {
                step: 0.1,
                max: f32::INFINITY
            }
        )
        .is_err());
        assert!(summarize(&[]).is_none());
    }
}
