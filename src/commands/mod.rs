//! CLI subcommand implementations

pub mod index;
pub mod list;
pub mod new;
