//! reaper-core — configuration shared by the Reaper crates.
//!
//! Parses `reaper.toml` and supplies the defaults the terminator falls back
//! to when a section is omitted.

pub mod config;

pub use config::{
    parse_duration, Backend, ConfigError, FleetConfig, ReaperConfig, ScheduleConfig, TagsConfig,
};
