// Dance Skeleton 🕺 AGPL-3.0 License

//! CLI module for the skeleton overlay tool.
//!
//! Argument parsing, the logging macros, and the `process` command
//! implementation.

// Modules
/// CLI arguments.
pub mod args;

/// Logging macros and verbosity state.
pub mod logging;

/// Video processing command.
pub mod process;
