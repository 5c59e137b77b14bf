//! CLI command implementations

pub mod error;
pub mod top_agents;

pub use error::CliError;
pub use top_agents::{Cli, Commands, OutputFormat, TopAgentsArgs};
