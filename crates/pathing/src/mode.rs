use std::{fmt, str::FromStr};

use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Policy controlling how cell weights shape the search: which part of the
/// weight enters the priority of a node and which neighbours are admitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Sequence)]
#[serde(rename_all = "snake_case")]
pub enum WeightDetectionMode {
    /// Weights are ignored, the search minimizes the number of steps.
    None,
    /// Weight accumulated from the start plus the grid's mean weight as a
    /// heuristic are blended into the priority.
    #[default]
    Average,
    /// Cells whose own weight reaches the agent capacity are never entered.
    OnlyCriticalWeightCheck,
    /// Cells which would bring the weight accumulated from the start to the
    /// agent capacity are never entered.
    PredictedLethalCheck,
    /// Reserved. It currently behaves as [`Self::None`].
    SelfPreservationInstinct,
}

impl WeightDetectionMode {
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Average => "average",
            Self::OnlyCriticalWeightCheck => "only_critical_weight_check",
            Self::PredictedLethalCheck => "predicted_lethal_check",
            Self::SelfPreservationInstinct => "self_preservation_instinct",
        }
    }

    /// Returns true if the weight terms contribute to node priority.
    pub const fn blends_weight(self) -> bool {
        matches!(self, Self::Average)
    }
}

impl fmt::Display for WeightDetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for WeightDetectionMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        enum_iterator::all::<Self>()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| UnknownModeError(s.to_owned()))
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Unknown weight detection mode \"{0}\"")]
pub struct UnknownModeError(String);
