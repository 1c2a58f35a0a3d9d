use std::fmt;

use log::{Level, LevelFilter};

/// Logger handed to a [`MolView`](crate::MolView) at construction.
///
/// Records go through the `log` facade under `target`, filtered by the
/// logger's own level before the global one; changing the level of one view
/// does not affect any other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLogger {
    target: String,
    level: LevelFilter,
}

impl Default for ViewLogger {
    fn default() -> Self {
        Self::new("molview", LevelFilter::Warn)
    }
}

impl ViewLogger {
    pub fn new(target: impl Into<String>, level: LevelFilter) -> Self {
        Self {
            target: target.into(),
            level,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn set_level(&mut self, level: LevelFilter) {
        self.level = level;
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            log::log!(target: self.target.as_str(), level, "{args}");
        }
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }
}
