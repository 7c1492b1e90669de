//! Snapboard Application
//!
//! Headless host for the Snapboard engine: configuration loading, input
//! script replay and keyboard shortcuts.

mod app;
mod script;
mod shortcuts;

pub use app::{App, AppConfig, AppError, ReplayStats};
pub use script::{ScriptStep, parse_script};
pub use shortcuts::{Shortcut, ShortcutAction, ShortcutRegistry};
