use crate::mode::WeightDetectionMode;

/// Parameters of path searches shared by all agents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchProps {
    mode: WeightDetectionMode,
    heuristic_multiplier: u32,
    default_weight_ratio: f32,
}

impl SearchProps {
    /// # Arguments
    ///
    /// * `mode` - weight detection policy.
    ///
    /// * `heuristic_multiplier` - Manhattan distance to the goal is multiplied
    ///   by this value. The search returns shortest paths only with the
    ///   multiplier equal to 1 (or 0), larger values trade optimality for
    ///   fewer expanded nodes.
    ///
    /// * `default_weight_ratio` - influence of weight on node priority in
    ///   [`WeightDetectionMode::Average`] mode. It is clamped to `[0, 1]`.
    ///
    /// # Panics
    ///
    /// May panic if `default_weight_ratio` is NaN.
    pub fn new(
        mode: WeightDetectionMode,
        heuristic_multiplier: u32,
        default_weight_ratio: f32,
    ) -> Self {
        debug_assert!(!default_weight_ratio.is_nan());
        Self {
            mode,
            heuristic_multiplier,
            default_weight_ratio: default_weight_ratio.clamp(0., 1.),
        }
    }

    pub fn mode(&self) -> WeightDetectionMode {
        self.mode
    }

    pub fn heuristic_multiplier(&self) -> u32 {
        self.heuristic_multiplier
    }

    pub fn default_weight_ratio(&self) -> f32 {
        self.default_weight_ratio
    }

    pub fn with_mode(self, mode: WeightDetectionMode) -> Self {
        Self { mode, ..self }
    }

    pub fn with_heuristic_multiplier(self, heuristic_multiplier: u32) -> Self {
        Self {
            heuristic_multiplier,
            ..self
        }
    }

    pub fn with_default_weight_ratio(self, default_weight_ratio: f32) -> Self {
        Self::new(self.mode, self.heuristic_multiplier, default_weight_ratio)
    }
}

impl Default for SearchProps {
    fn default() -> Self {
        Self::new(WeightDetectionMode::Average, 1, 0.5)
    }
}

/// Per-agent weight properties consumed by path searches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentWeight {
    capacity: f32,
    ratio_override: Option<f32>,
}

impl AgentWeight {
    /// # Arguments
    ///
    /// * `capacity` - weight the agent is able to withstand (e.g. its
    ///   remaining hit points). Lethal checks reject cells at which this
    ///   capacity would be reached.
    ///
    /// * `ratio_override` - when set, it replaces the default weight ratio
    ///   of [`SearchProps`] for searches of this agent. It is clamped to
    ///   `[0, 1]`.
    pub fn new(capacity: f32, ratio_override: Option<f32>) -> Self {
        Self {
            capacity,
            ratio_override: ratio_override.map(|ratio| ratio.clamp(0., 1.)),
        }
    }

    pub fn capacity(&self) -> f32 {
        self.capacity
    }

    pub fn ratio_override(&self) -> Option<f32> {
        self.ratio_override
    }

    /// Weight ratio used by searches of this agent.
    pub(crate) fn weight_ratio(&self, props: &SearchProps) -> f32 {
        if props.mode().blends_weight() {
            self.ratio_override
                .unwrap_or_else(|| props.default_weight_ratio())
        } else {
            0.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping() {
        let props = SearchProps::new(WeightDetectionMode::Average, 2, 1.5);
        assert_eq!(props.default_weight_ratio(), 1.);
        assert_eq!(props.with_default_weight_ratio(-0.5).default_weight_ratio(), 0.);
        assert_eq!(AgentWeight::new(10., Some(3.)).ratio_override(), Some(1.));
    }

    #[test]
    fn test_weight_ratio() {
        let props = SearchProps::new(WeightDetectionMode::Average, 1, 0.25);
        assert_eq!(AgentWeight::new(10., None).weight_ratio(&props), 0.25);
        assert_eq!(AgentWeight::new(10., Some(0.75)).weight_ratio(&props), 0.75);

        let props = props.with_mode(WeightDetectionMode::PredictedLethalCheck);
        assert_eq!(AgentWeight::new(10., Some(0.75)).weight_ratio(&props), 0.);
    }
}
