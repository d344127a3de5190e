//! asgraph: configuration and conversion shared by the `asgraph` binary
//! and its integration tests.

pub mod config;
pub mod convert;

pub use config::{Config, ConfigError, SpecialNodes};
pub use convert::asg_to_graph;
