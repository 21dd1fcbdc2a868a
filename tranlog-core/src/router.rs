use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, Local, Utc};

use crate::{
    error::{ConfigWarning, TranLogError},
    log_writer::{LogWriter, write_line},
    message::{Message, format_lines, iso_timestamp},
    msg_type::MsgType,
    registry::{DEFAULT_LOG_FILE_NAME, DEFAULT_TAG, TagRecord, TagRegistry},
    settings::{Settings, TagSettings},
};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

static TRANSACTION_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Splits a comma separated tag list. An empty list means `default`.
pub fn split_tags(tags: &str) -> Vec<&str> {
    let tags: Vec<&str> = tags
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .collect();
    if tags.is_empty() {
        vec![DEFAULT_TAG]
    } else {
        tags
    }
}

/// Tag registry, destination settings and writer of one logger.
///
/// Not synchronized; see `tranlog::TranLog` for the shared version.
pub struct TranLogCore<W: LogWriter, C: Clock = SystemClock> {
    log_root: PathBuf,
    date_prefix: bool,
    registry: TagRegistry,
    writer: W,
    clock: C,
    /// Date prefix of the last resolution, to notice the day rolling over.
    last_prefix: Option<String>,
}

impl<W: LogWriter> TranLogCore<W> {
    pub fn new(writer: W) -> Self {
        Self::with_clock(writer, SystemClock)
    }
}

impl<W: LogWriter, C: Clock> TranLogCore<W, C> {
    pub fn with_clock(writer: W, clock: C) -> Self {
        Self {
            log_root: std::env::temp_dir(),
            date_prefix: false,
            registry: TagRegistry::new(DEFAULT_LOG_FILE_NAME),
            writer,
            clock,
            last_prefix: None,
        }
    }

    /// Applies `settings` on top of the current state.
    ///
    /// Every tag that is already defined is reported and then overwritten.
    pub fn configure(&mut self, settings: &Settings) -> Vec<ConfigWarning> {
        if let Some(log_root) = &settings.log_root {
            self.log_root = log_root.clone();
        }
        if let Some(file_name) = &settings.log_file_name {
            self.registry.resolve_mut(DEFAULT_TAG).set_log_file_name(file_name);
        }
        if let Some(date_prefix) = settings.date_prefix_logfile {
            self.date_prefix = date_prefix;
        }
        let mut warnings = Vec::new();
        for (tag, tag_settings) in &settings.tags {
            if self.registry.contains(tag) {
                warnings.push(ConfigWarning::DuplicateTag(tag.clone()));
            }
            self.registry.insert(TagRecord::from_settings(tag, tag_settings));
        }
        warnings
    }

    /// Defines (or redefines) the tag `tag`.
    pub fn add_transaction(&mut self, tag: &str, description: &str, settings: &TagSettings) {
        let mut record = TagRecord::from_settings(tag, settings);
        record.description = Some(description.to_string());
        self.registry.insert(record);
    }

    /// Defines a new tag with a generated name and returns that name.
    pub fn get_transaction(&mut self, description: &str, settings: &TagSettings) -> String {
        let tag = loop {
            let sequence = TRANSACTION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
            let tag = format!(
                "{}-{sequence}",
                self.clock.now().format("%Y%m%d%H%M%S%6f")
            );
            if !self.registry.contains(&tag) {
                break tag;
            }
        };
        self.add_transaction(&tag, description, settings);
        tag
    }

    /// Removes `tag`, writing `"<tag>: End transaction."` first if anything
    /// was logged under it. `default` is never removed.
    ///
    /// The writer releases the tag's file once no remaining tag routes there.
    pub fn end_transaction(&mut self, tag: &str) -> Result<(), TranLogError> {
        if tag == DEFAULT_TAG {
            return Ok(());
        }
        let Some(record) = self.registry.get(tag) else {
            return Ok(());
        };
        let path = self.destination_of(record);
        if record.count > 0 {
            let line = format!("{tag}: End transaction.");
            write_line(&mut self.writer, &[path.clone()], &line)?;
        }
        self.registry.remove(tag);
        let still_used = self
            .registry
            .records()
            .any(|record| self.destination_of(record) == path);
        if !still_used {
            self.writer.release(&path);
        }
        Ok(())
    }

    /// Enables or disables one message type of `tag`. Unknown tags and types
    /// are ignored, and `Error` stays enabled.
    pub fn set_logging(&mut self, tag: &str, msg_type: &str, enabled: bool) {
        let Ok(msg_type) = msg_type.parse::<MsgType>() else {
            return;
        };
        if let Some(record) = self.registry.get_mut(tag) {
            record.msg_types.set(msg_type, enabled);
        }
    }

    /// Points `tag` at the base name of `file_name`.
    pub fn set_logfile(&mut self, tag: &str, file_name: &str) {
        if let Some(record) = self.registry.get_mut(tag) {
            record.set_log_file_name(file_name);
        }
    }

    /// Explains whether `tag` currently logs `msg_type`.
    pub fn audit(&self, tag: &str, msg_type: &str) -> String {
        let (record, label) = match self.registry.get(tag) {
            Some(record) => (record, tag),
            None => (self.registry.default_record(), "Default"),
        };
        match msg_type.parse::<MsgType>() {
            Err(_) => format!("False [Tag: {label}] [{msg_type} not defined]"),
            Ok(ty) if record.msg_types.is_enabled(ty) => {
                format!("True [Tag: {label}] [{msg_type} set to true]")
            }
            Ok(_) => format!("False [Tag: {label}] [{msg_type} set to false]"),
        }
    }

    /// Files that a message of `msg_type` under `tags` goes to, without
    /// duplicates. Without a type every tag matches. With `increment`, each
    /// matching tag's counter is bumped.
    pub fn resolve_destinations(
        &mut self,
        tags: &str,
        msg_type: Option<MsgType>,
        increment: bool,
    ) -> Vec<PathBuf> {
        let prefix = self.date_prefix_now();
        if prefix != self.last_prefix {
            if self.last_prefix.is_some() {
                // Yesterday's files are not written again.
                self.writer.release_all();
            }
            self.last_prefix.clone_from(&prefix);
        }
        let mut paths = Vec::new();
        for tag in split_tags(tags) {
            let record = self.registry.resolve_mut(tag);
            if let Some(ty) = msg_type {
                if !record.msg_types.is_enabled(ty) {
                    continue;
                }
                if increment {
                    record.count += 1;
                }
            }
            let record = self.registry.resolve(tag);
            let path = self.path_for(self.registry.file_name_of(record), prefix.as_deref());
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    /// Formats `messages` and writes the lines to every file `tags` routes
    /// `msg_type` to.
    pub fn log(
        &mut self,
        tags: &str,
        msg_type: MsgType,
        messages: &[Message],
    ) -> Result<(), TranLogError> {
        if tags.trim().is_empty() || messages.is_empty() {
            return Ok(());
        }
        let paths = self.resolve_destinations(tags, Some(msg_type), true);
        if paths.is_empty() {
            return Ok(());
        }
        let header = format!(
            "{} {tags} ({msg_type}):",
            iso_timestamp(&self.clock.now())
        );
        for line in format_lines(header, messages) {
            write_line(&mut self.writer, &paths, &line)?;
        }
        Ok(())
    }

    pub fn write_line(&mut self, paths: &[PathBuf], line: &str) -> Result<(), TranLogError> {
        write_line(&mut self.writer, paths, line)
    }

    fn destination_of(&self, record: &TagRecord) -> PathBuf {
        let prefix = self.date_prefix_now();
        self.path_for(self.registry.file_name_of(record), prefix.as_deref())
    }

    fn date_prefix_now(&self) -> Option<String> {
        self.date_prefix.then(|| {
            self.clock
                .now()
                .with_timezone(&Local)
                .format("%Y%m%d")
                .to_string()
        })
    }

    fn path_for(&self, file_name: &str, prefix: Option<&str>) -> PathBuf {
        match prefix {
            Some(prefix) => self.log_root.join(format!("{prefix}_{file_name}")),
            None => self.log_root.join(file_name),
        }
    }

    pub fn record(&self, tag: &str) -> Option<&TagRecord> {
        self.registry.get(tag)
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn log_root(&self) -> &Path {
        &self.log_root
    }

    pub fn set_log_root<P: Into<PathBuf>>(&mut self, log_root: P) {
        self.log_root = log_root.into();
    }

    pub fn date_prefix(&self) -> bool {
        self.date_prefix
    }

    pub fn set_date_prefix(&mut self, enabled: bool) {
        self.date_prefix = enabled;
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn flush(&mut self) -> Result<(), TranLogError> {
        self.writer.flush().map_err(TranLogError::Io)
    }
}
