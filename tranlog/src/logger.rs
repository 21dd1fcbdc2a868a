use std::{
    path::PathBuf,
    sync::{Mutex, MutexGuard},
};

use tranlog_core::{
    Clock, LogFile, LogWriter, Message, MsgType, Settings, SystemClock, TagRecord, TagSettings,
    TranLogCore, TranLogError,
};

/// Thread-safe tag-routed logger.
///
/// One lock guards the tag registry, the counters and the writer, so a
/// `log` call and a concurrent `end_transaction` never interleave.
pub struct TranLog<W: LogWriter = LogFile, C: Clock = SystemClock> {
    core: Mutex<TranLogCore<W, C>>,
}

impl<W: LogWriter, C: Clock> TranLog<W, C> {
    pub fn from_core(core: TranLogCore<W, C>) -> Self {
        Self {
            core: Mutex::new(core),
        }
    }

    fn core(&self) -> MutexGuard<'_, TranLogCore<W, C>> {
        // The core is consistent between calls, even after a panic in one.
        self.core.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `f` with exclusive access to the core.
    pub fn with_core<R>(&self, f: impl FnOnce(&mut TranLogCore<W, C>) -> R) -> R {
        f(&mut self.core())
    }

    /// Applies `settings`; redefined tags are reported with `log::warn!`
    /// and returned.
    pub fn configure(&self, settings: &Settings) -> Vec<tranlog_core::ConfigWarning> {
        let warnings = self.core().configure(settings);
        for warning in &warnings {
            log::warn!(target: "tranlog", "{warning}");
        }
        warnings
    }

    pub fn add_transaction(&self, tag: &str, description: &str, settings: &TagSettings) {
        self.core().add_transaction(tag, description, settings)
    }

    pub fn get_transaction(&self, description: &str, settings: &TagSettings) -> String {
        self.core().get_transaction(description, settings)
    }

    pub fn end_transaction(&self, tag: &str) -> Result<(), TranLogError> {
        self.core().end_transaction(tag)
    }

    pub fn set_logging(&self, tag: &str, msg_type: &str, enabled: bool) {
        self.core().set_logging(tag, msg_type, enabled)
    }

    pub fn set_logfile(&self, tag: &str, file_name: &str) {
        self.core().set_logfile(tag, file_name)
    }

    pub fn audit(&self, tag: &str, msg_type: &str) -> String {
        self.core().audit(tag, msg_type)
    }

    pub fn resolve_destinations(
        &self,
        tags: &str,
        msg_type: Option<MsgType>,
        increment: bool,
    ) -> Vec<PathBuf> {
        self.core().resolve_destinations(tags, msg_type, increment)
    }

    pub fn log(
        &self,
        tags: &str,
        msg_type: MsgType,
        messages: &[Message],
    ) -> Result<(), TranLogError> {
        self.core().log(tags, msg_type, messages)
    }

    pub fn write_line(&self, paths: &[PathBuf], line: &str) -> Result<(), TranLogError> {
        self.core().write_line(paths, line)
    }

    /// Snapshot of the record of `tag`.
    pub fn record(&self, tag: &str) -> Option<TagRecord> {
        self.core().record(tag).cloned()
    }

    pub fn flush(&self) -> Result<(), TranLogError> {
        self.core().flush()
    }
}
