//! This module implements final (i.e. parsed and validated) configuration
//! objects and their building from persistent configuration.

use anyhow::{ensure, Context, Error, Result};
use glam::Vec2;
use gn_grid::{CheckingMode, LayerMask, ScanBounds, ScanParams};
use gn_pathing::{AgentSettings, AgentWeight, SearchProps, WeightDetectionMode};

use crate::persisted;

/// Highest accepted heuristic multiplier.
const MAX_HEURISTIC_MULTIPLIER: u32 = 10;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Configuration {
    scan: ScanConf,
    search: SearchConf,
    agent: AgentConf,
}

impl Configuration {
    pub fn scan(&self) -> &ScanConf {
        &self.scan
    }

    pub fn search(&self) -> &SearchConf {
        &self.search
    }

    pub fn agent(&self) -> &AgentConf {
        &self.agent
    }
}

impl TryFrom<persisted::Configuration> for Configuration {
    type Error = Error;

    fn try_from(conf: persisted::Configuration) -> Result<Self> {
        Ok(Self {
            scan: ScanConf::try_from(conf.scan.unwrap_or_default())
                .context("Invalid `scan` configuration")?,
            search: SearchConf::try_from(conf.search.unwrap_or_default())
                .context("Invalid `search` configuration")?,
            agent: AgentConf::try_from(conf.agent.unwrap_or_default())
                .context("Invalid `agent` configuration")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScanConf {
    node_size: f32,
    center: Vec2,
    extents: Vec2,
    origin: Vec2,
    checking_mode: CheckingMode,
    obstacle_mask: LayerMask,
    weight_mask: LayerMask,
}

impl ScanConf {
    /// Width and height of a single grid cell.
    pub fn node_size(&self) -> f32 {
        self.node_size
    }

    /// Center of the requested scan area.
    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Half-size of the requested scan area.
    pub fn extents(&self) -> Vec2 {
        self.extents
    }

    /// Offset added to the scan area center.
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn checking_mode(&self) -> CheckingMode {
        self.checking_mode
    }

    /// Collision categories of obstacles.
    pub fn obstacle_mask(&self) -> LayerMask {
        self.obstacle_mask
    }

    /// Collision categories of weight emitting entities.
    pub fn weight_mask(&self) -> LayerMask {
        self.weight_mask
    }

    pub fn params(&self) -> ScanParams {
        ScanParams::new(
            ScanBounds::new(self.center, self.extents),
            self.origin,
            self.node_size,
            self.checking_mode,
            self.obstacle_mask,
            self.weight_mask,
        )
    }
}

impl Default for ScanConf {
    fn default() -> Self {
        Self {
            node_size: 1.,
            center: Vec2::ZERO,
            extents: Vec2::splat(10.),
            origin: Vec2::ZERO,
            checking_mode: CheckingMode::Circle,
            obstacle_mask: LayerMask::layer(0),
            weight_mask: LayerMask::layer(1),
        }
    }
}

impl TryFrom<persisted::Scan> for ScanConf {
    type Error = Error;

    fn try_from(value: persisted::Scan) -> Result<Self> {
        let defaults = Self::default();

        let node_size = value.node_size.unwrap_or(defaults.node_size);
        ensure!(node_size.is_finite(), "`node_size` must be finite.");
        ensure!(node_size > 0., "`node_size` must be positive.");

        let center = value.center.unwrap_or(defaults.center);
        ensure!(center.is_finite(), "`center` must be finite.");

        let extents = value.extents.unwrap_or(defaults.extents);
        ensure!(extents.is_finite(), "`extents` must be finite.");
        ensure!(
            extents.cmpgt(Vec2::ZERO).all(),
            "`extents` must be positive."
        );
        ensure!(
            extents.cmpge(Vec2::splat(node_size)).all(),
            "`extents` must be larger or equal to `node_size`."
        );

        let origin = value.origin.unwrap_or(defaults.origin);
        ensure!(origin.is_finite(), "`origin` must be finite.");

        Ok(Self {
            node_size,
            center,
            extents,
            origin,
            checking_mode: value.checking_mode.unwrap_or(defaults.checking_mode),
            obstacle_mask: value.obstacle_mask.unwrap_or(defaults.obstacle_mask),
            weight_mask: value.weight_mask.unwrap_or(defaults.weight_mask),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchConf {
    weight_detection_mode: WeightDetectionMode,
    heuristic_multiplier: u32,
    default_weight_ratio: f32,
}

impl SearchConf {
    pub fn weight_detection_mode(&self) -> WeightDetectionMode {
        self.weight_detection_mode
    }

    pub fn heuristic_multiplier(&self) -> u32 {
        self.heuristic_multiplier
    }

    /// Influence of weight on node priority in average weight detection
    /// mode.
    pub fn default_weight_ratio(&self) -> f32 {
        self.default_weight_ratio
    }

    pub fn props(&self) -> SearchProps {
        SearchProps::new(
            self.weight_detection_mode,
            self.heuristic_multiplier,
            self.default_weight_ratio,
        )
    }
}

impl Default for SearchConf {
    fn default() -> Self {
        Self {
            weight_detection_mode: WeightDetectionMode::Average,
            heuristic_multiplier: 1,
            default_weight_ratio: 0.5,
        }
    }
}

impl TryFrom<persisted::Search> for SearchConf {
    type Error = Error;

    fn try_from(value: persisted::Search) -> Result<Self> {
        let defaults = Self::default();

        let heuristic_multiplier = value
            .heuristic_multiplier
            .unwrap_or(defaults.heuristic_multiplier);
        ensure!(
            heuristic_multiplier <= MAX_HEURISTIC_MULTIPLIER,
            "`heuristic_multiplier` must be smaller or equal to {}.",
            MAX_HEURISTIC_MULTIPLIER
        );

        let default_weight_ratio = value
            .default_weight_ratio
            .unwrap_or(defaults.default_weight_ratio);
        ensure!(
            (0. ..=1.).contains(&default_weight_ratio),
            "`default_weight_ratio` must be between 0.0 and 1.0."
        );

        Ok(Self {
            weight_detection_mode: value
                .weight_detection_mode
                .unwrap_or(defaults.weight_detection_mode),
            heuristic_multiplier,
            default_weight_ratio,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AgentConf {
    weight: f32,
    weight_ratio_override: Option<f32>,
    path_update_interval: f32,
    node_move_duration: f32,
    node_stop_duration: f32,
}

impl AgentConf {
    /// Weight capacity of the agent (e.g. its hit points).
    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn weight_ratio_override(&self) -> Option<f32> {
        self.weight_ratio_override
    }

    /// Seconds between two consecutive path re-plannings.
    pub fn path_update_interval(&self) -> f32 {
        self.path_update_interval
    }

    /// Seconds it takes to move between two neighbouring cells.
    pub fn node_move_duration(&self) -> f32 {
        self.node_move_duration
    }

    /// Seconds between two consecutive move orders.
    pub fn node_stop_duration(&self) -> f32 {
        self.node_stop_duration
    }

    pub fn agent_weight(&self) -> AgentWeight {
        AgentWeight::new(self.weight, self.weight_ratio_override)
    }

    pub fn settings(&self) -> AgentSettings {
        AgentSettings::new(
            self.path_update_interval,
            self.node_move_duration,
            self.node_stop_duration,
        )
    }
}

impl Default for AgentConf {
    fn default() -> Self {
        Self {
            weight: 100.,
            weight_ratio_override: None,
            path_update_interval: 1.,
            node_move_duration: 0.2,
            node_stop_duration: 0.2,
        }
    }
}

impl TryFrom<persisted::Agent> for AgentConf {
    type Error = Error;

    fn try_from(value: persisted::Agent) -> Result<Self> {
        let defaults = Self::default();

        let weight = value.weight.unwrap_or(defaults.weight);
        ensure!(weight.is_finite(), "`weight` must be finite.");
        ensure!(weight >= 0., "`weight` must be greater than or equal to 0.0.");

        if let Some(ratio) = value.weight_ratio_override {
            ensure!(
                (0. ..=1.).contains(&ratio),
                "`weight_ratio_override` must be between 0.0 and 1.0."
            );
        }

        let path_update_interval = value
            .path_update_interval
            .unwrap_or(defaults.path_update_interval);
        ensure!(
            path_update_interval.is_finite(),
            "`path_update_interval` must be finite."
        );
        ensure!(
            path_update_interval > 0.,
            "`path_update_interval` must be positive."
        );

        let node_move_duration = value
            .node_move_duration
            .unwrap_or(defaults.node_move_duration);
        ensure!(
            node_move_duration.is_finite() && node_move_duration >= 0.,
            "`node_move_duration` must be a finite non-negative number."
        );

        let node_stop_duration = value
            .node_stop_duration
            .unwrap_or(defaults.node_stop_duration);
        ensure!(
            node_stop_duration.is_finite() && node_stop_duration >= 0.,
            "`node_stop_duration` must be a finite non-negative number."
        );

        Ok(Self {
            weight,
            weight_ratio_override: value.weight_ratio_override,
            path_update_interval,
            node_move_duration,
            node_stop_duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Configuration> {
        let persisted: persisted::Configuration = serde_yaml::from_str(text)?;
        Configuration::try_from(persisted)
    }

    #[test]
    fn test_defaults() {
        let conf = parse("{}").unwrap();
        assert_eq!(conf, Configuration::default());
        assert_eq!(conf.scan().node_size(), 1.);
        assert_eq!(conf.scan().params().bounds().extents(), Vec2::splat(10.));
        assert_eq!(conf.search().props(), SearchProps::default());
        assert_eq!(conf.agent().agent_weight(), AgentWeight::new(100., None));
        assert_eq!(conf.agent().settings(), AgentSettings::default());
    }

    #[test]
    fn test_partial() {
        let conf = parse(
            r#"
search:
  weight_detection_mode: only_critical_weight_check
agent:
  weight_ratio_override: 0.25
"#,
        )
        .unwrap();
        assert_eq!(
            conf.search().weight_detection_mode(),
            WeightDetectionMode::OnlyCriticalWeightCheck
        );
        assert_eq!(conf.search().heuristic_multiplier(), 1);
        assert_eq!(conf.agent().agent_weight().ratio_override(), Some(0.25));
        assert_eq!(conf.agent().weight(), 100.);
        assert_eq!(conf.scan(), &ScanConf::default());
    }

    #[test]
    fn test_invalid() {
        let error = parse("scan:\n  node_size: 0.0\n").unwrap_err();
        assert_eq!(error.to_string(), "Invalid `scan` configuration");
        assert_eq!(
            error.root_cause().to_string(),
            "`node_size` must be positive."
        );

        let error = parse("scan:\n  node_size: 4.0\n  extents: [10.0, 2.0]\n").unwrap_err();
        assert_eq!(
            error.root_cause().to_string(),
            "`extents` must be larger or equal to `node_size`."
        );

        let error = parse("search:\n  heuristic_multiplier: 11\n").unwrap_err();
        assert_eq!(
            error.root_cause().to_string(),
            "`heuristic_multiplier` must be smaller or equal to 10."
        );

        let error = parse("search:\n  default_weight_ratio: 1.5\n").unwrap_err();
        assert_eq!(error.to_string(), "Invalid `search` configuration");

        let error = parse("agent:\n  path_update_interval: 0.0\n").unwrap_err();
        assert_eq!(
            error.root_cause().to_string(),
            "`path_update_interval` must be positive."
        );

        let error = parse("agent:\n  weight_ratio_override: -0.5\n").unwrap_err();
        assert_eq!(error.to_string(), "Invalid `agent` configuration");

        assert!(parse("search:\n  weight_detection_mode: lethal\n").is_err());
    }
}
