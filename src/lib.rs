//! dirwatcher - Watch a directory for magic text appended to files.

pub mod config;
pub mod display;
pub mod signals;
pub mod watcher;
