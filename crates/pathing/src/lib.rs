//! This library implements weighted A* path finding on navigation grids,
//! post-processing of found paths and per-agent path planning.
//!
//! Searches run synchronously to completion. The grid searched must not be
//! replaced by a re-scan while a search is in progress.

mod agent;
mod analyse;
mod astar;
mod finder;
mod mode;
mod modifier;
mod node;
mod path;
mod query;

pub use agent::{Agent, AgentSettings, MoveOrder};
pub use analyse::{summarize, sweep, AnalysisError, PathReport, Sweep, SweepSummary};
pub use finder::{PathFinder, PathNotFound, SearchDiagnostics};
pub use mode::{UnknownModeError, WeightDetectionMode};
pub use modifier::{BezierModifier, ModifierChain, PathModifier, TunnelModifier};
pub use path::{GridPath, PathStep};
pub use query::{AgentWeight, SearchProps};
