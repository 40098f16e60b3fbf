//! This module contains configuration object which can be (de)serialized from
//! a configuration file. It does not contain final configuration object which
//! must be build and validated from the objects here.

use glam::Vec2;
use gn_grid::{CheckingMode, LayerMask};
use gn_pathing::WeightDetectionMode;
use serde::Deserialize;

#[derive(Deserialize, Default)]
pub(super) struct Configuration {
    pub(super) scan: Option<Scan>,
    pub(super) search: Option<Search>,
    pub(super) agent: Option<Agent>,
}

#[derive(Deserialize, Default)]
pub(super) struct Scan {
    pub(super) node_size: Option<f32>,
    pub(super) center: Option<Vec2>,
    pub(super) extents: Option<Vec2>,
    pub(super) origin: Option<Vec2>,
    pub(super) checking_mode: Option<CheckingMode>,
    pub(super) obstacle_mask: Option<LayerMask>,
    pub(super) weight_mask: Option<LayerMask>,
}

#[derive(Deserialize, Default)]
pub(super) struct Search {
    pub(super) weight_detection_mode: Option<WeightDetectionMode>,
    pub(super) heuristic_multiplier: Option<u32>,
    pub(super) default_weight_ratio: Option<f32>,
}

#[derive(Deserialize, Default)]
pub(super) struct Agent {
    pub(super) weight: Option<f32>,
    pub(super) weight_ratio_override: Option<f32>,
    pub(super) path_update_interval: Option<f32>,
    pub(super) node_move_duration: Option<f32>,
    pub(super) node_stop_duration: Option<f32>,
}
