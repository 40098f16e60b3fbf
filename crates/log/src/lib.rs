//! Logging setup shared by GridNav binaries.

mod setup;

pub use setup::{init, LogHandle};
