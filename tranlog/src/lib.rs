//! # tranlog
//! Selective, tag-routed transaction logger.
//!
//! Every log call carries a tag list and a message type. Each tag decides
//! which types it writes and to which file, so a transaction or a subsystem
//! can be traced into its own log file, and tags that are not configured
//! fall back to the `default` tag.
//!
//! ## Usage
//! ```toml
//! // Cargo.toml
//! ...
//! [dependencies]
//! tranlog = "0.1.0"
//! ```
//!
//! ```rust
//! use tranlog::{MsgType, TagSettings, logger_config, tlog};
//!
//! let dir = std::env::temp_dir().join("tranlog_doc_usage");
//! std::fs::create_dir_all(&dir).unwrap();
//! let logger = logger_config()
//!     .with_log_root(&dir)
//!     .with_log_file_name("app.log")
//!     .build();
//!
//! logger.add_transaction("db", "database access", &TagSettings::with_types([MsgType::Info]));
//! tlog!(logger, "db", MsgType::Info, "connected to ", "primary").unwrap();
//! tlog!(logger, "db", MsgType::Debug, "not written").unwrap();
//! logger.end_transaction("db").unwrap();
//!
//! let content = std::fs::read_to_string(dir.join("app.log")).unwrap();
//! assert!(content.contains("db (info):connected to primary"));
//! assert!(content.contains("db: End transaction."));
//! assert!(!content.contains("not written"));
//! ```
//!
//! ## Settings
//! Tags are usually defined in a JSON settings document.
//!
//! ```rust
//! use tranlog::{Settings, logger_config};
//!
//! let settings = Settings::from_json_str(r#"{
//!     "LogFileName": "main.log",
//!     "Tags": {"test": {"MsgTypeSettings": {"Error": false, "Warning": true}}}
//! }"#).unwrap();
//! let logger = logger_config().with_settings(settings).build();
//!
//! assert!(logger.audit("test", "Warning").starts_with("True"));
//! assert!(logger.audit("test", "Error").starts_with("True"));
//! assert!(logger.audit("test", "Bogus").ends_with("[Bogus not defined]"));
//! ```
//!
//! ## Logging through the `log` crate
//! Once installed globally, `log` records are routed by their target.
//!
//! ```rust
//! use tranlog::{MsgType, TagSettings, logger_config};
//!
//! let dir = std::env::temp_dir().join("tranlog_doc_global");
//! std::fs::create_dir_all(&dir).unwrap();
//! let logger = logger_config()
//!     .with_log_root(&dir)
//!     .with_tag(
//!         "worker",
//!         TagSettings::with_types([MsgType::Info]).with_log_file_name("worker.log"),
//!     )
//!     .init_global()
//!     .expect("Unable to install the global logger");
//!
//! log::info!(target: "worker", "job done");
//! assert_eq!(logger.record("worker").unwrap().count, 1);
//! ```

mod bridge;
mod logger;

use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use log::LevelFilter;
pub use logger::TranLog;
pub use tranlog_core::{
    Clock, ConfigWarning, FixedClock, LogFile, LogMemory, LogWriter, Message, MsgType,
    MsgTypeMatrix, Settings, SystemClock, TagRecord, TagSettings, TranLogCore, TranLogError,
};

static GLOBAL_TRANLOG: OnceLock<TranLog> = OnceLock::new();

/// Logs each argument, converted with `Message::from`, under `tags`.
///
/// ```rust
/// # use tranlog::{MsgType, logger_config, tlog};
/// let logger = logger_config().build_with_writer(tranlog::LogMemory::new());
/// tlog!(logger, "default", MsgType::Error, "code ", 42_i64, serde_json::json!({"k": 1})).unwrap();
/// ```
#[macro_export]
macro_rules! tlog {
    ($logger:expr, $tags:expr, $msg_type:expr $(, $message:expr)* $(,)?) => {
        $logger.log($tags, $msg_type, &[$($crate::Message::from($message)),*])
    };
}

/// Builder for configuring and initializing the logger.
#[derive(Default)]
pub struct ConfigBuilder {
    settings: Settings,
}

impl ConfigBuilder {
    /// Overlays a settings document.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings.merge(settings);
        self
    }

    /// Overlays a JSON settings file.
    pub fn with_settings_file<P: AsRef<Path>>(self, path: P) -> Result<Self, TranLogError> {
        Ok(self.with_settings(Settings::from_json_file(path)?))
    }

    /// Overlays the `TRANLOG_*` environment variables.
    pub fn with_env(self) -> Result<Self, TranLogError> {
        Ok(self.with_settings(Settings::from_env()?))
    }

    /// Sets the directory log files are written to.
    pub fn with_log_root<P: Into<PathBuf>>(mut self, log_root: P) -> Self {
        self.settings.log_root = Some(log_root.into());
        self
    }

    /// Sets the file name of the `default` tag.
    pub fn with_log_file_name(mut self, file_name: &str) -> Self {
        self.settings.log_file_name = Some(file_name.into());
        self
    }

    /// Dynamically set the `YYYYMMDD_` file name prefix.
    pub fn with_date_prefix(mut self, yes: bool) -> Self {
        self.settings.date_prefix_logfile = Some(yes);
        self
    }

    pub fn with_tag(mut self, tag: &str, settings: TagSettings) -> Self {
        self.settings.tags.push((tag.into(), settings));
        self
    }

    /// Builds a logger writing to files on disk.
    pub fn build(self) -> TranLog {
        self.build_with_writer(LogFile::new())
    }

    pub fn build_with_writer<W: LogWriter>(self, writer: W) -> TranLog<W> {
        self.build_with(writer, SystemClock)
    }

    pub fn build_with<W: LogWriter, C: Clock>(self, writer: W, clock: C) -> TranLog<W, C> {
        let logger = TranLog::from_core(TranLogCore::with_clock(writer, clock));
        logger.configure(&self.settings);
        logger
    }

    /// Builds the process-wide logger and installs it as the `log` backend.
    ///
    /// Nothing is installed when another `log` backend is already set.
    pub fn init_global(self) -> Result<&'static TranLog, TranLogError> {
        let logger = self.build();
        log::set_logger(&bridge::TranLogger).map_err(|_| TranLogError::LoggerAlreadySet)?;
        if GLOBAL_TRANLOG.set(logger).is_err() {
            return Err(TranLogError::GlobalAlreadySet);
        }
        log::set_max_level(LevelFilter::Trace);
        GLOBAL_TRANLOG.get().ok_or(TranLogError::GlobalAlreadySet)
    }
}

/// Returns a default ConfigBuilder for configuring the logger.
pub fn logger_config() -> ConfigBuilder {
    ConfigBuilder::default()
}

/// The logger installed by [`ConfigBuilder::init_global`], if any.
pub fn global() -> Option<&'static TranLog> {
    GLOBAL_TRANLOG.get()
}
