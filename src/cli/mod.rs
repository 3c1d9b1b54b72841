//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod agent;
mod commands;
mod dump;
mod logging;
mod version;

pub use agent::{dump_topology, run_agent};
pub use commands::{ConfigSubcommand, handle_config_command};
pub use dump::{OutputFormat, TopologyDump};
pub use logging::*;
pub use version::display_version;
