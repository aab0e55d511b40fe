// src/watch/mod.rs

//! The poll-extract-diff-notify watchers and their scheduler loop.

mod changes;
mod date;
mod runner;

pub use changes::ChangeListWatcher;
pub use date::DateWatcher;
pub use runner::{Watcher, run_once, run_watch_loop};
