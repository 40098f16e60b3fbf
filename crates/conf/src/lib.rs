//! This crate implements functionality around GridNav configuration:
//!
//! * Loading of the configuration from a YAML file.
//!
//! * Parsing, validation and conversion of the configuration to parameters
//!   of scanning, searching and agents.

mod conf;
mod io;
mod persisted;

pub use conf::*;
pub use io::{default_conf_path, load_conf};
