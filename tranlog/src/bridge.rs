use log::{Level, Log};
use tranlog_core::{Clock, LogWriter, Message, MsgType, TranLogError};

use crate::{GLOBAL_TRANLOG, TranLog};

pub(crate) fn msg_type_of(level: Level) -> MsgType {
    match level {
        Level::Error => MsgType::Error,
        Level::Warn => MsgType::Warning,
        Level::Info => MsgType::Info,
        Level::Debug => MsgType::Debug,
        Level::Trace => MsgType::Diagnostic,
    }
}

/// Targets of this crate's own records, e.g. configuration warnings.
fn is_own_target(target: &str) -> bool {
    target == "tranlog" || target.starts_with("tranlog::")
}

/// Routes `record` into `logger`, using its target as the tag list.
pub(crate) fn forward<W: LogWriter, C: Clock>(
    logger: &TranLog<W, C>,
    record: &log::Record,
) -> Result<(), TranLogError> {
    if is_own_target(record.target()) {
        return Ok(());
    }
    let message = Message::Text(format!(" {}", record.args()));
    logger.log(record.target(), msg_type_of(record.level()), &[message])
}

/// `log` backend forwarding records to the global [`crate::TranLog`].
pub(crate) struct TranLogger;

impl Log for TranLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        GLOBAL_TRANLOG.get().is_some() && !is_own_target(metadata.target())
    }

    fn log(&self, record: &log::Record) {
        let Some(logger) = GLOBAL_TRANLOG.get() else {
            return;
        };
        if let Err(err) = forward(logger, record) {
            eprintln!("tranlog: {err}");
        }
    }

    fn flush(&self) {
        if let Some(logger) = GLOBAL_TRANLOG.get()
            && let Err(err) = logger.flush()
        {
            eprintln!("tranlog: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tranlog_core::{LogMemory, Settings, TagSettings, TranLogCore};

    fn memory_logger() -> (TranLog<LogMemory>, LogMemory) {
        let memory = LogMemory::new();
        let mut core = TranLogCore::new(memory.clone());
        core.set_log_root("/logs");
        let logger = TranLog::from_core(core);
        logger.add_transaction(
            "default",
            "",
            &TagSettings::with_types([MsgType::Warning, MsgType::Info]),
        );
        (logger, memory)
    }

    #[test]
    fn test_level_mapping() {
        assert_eq!(msg_type_of(Level::Error), MsgType::Error);
        assert_eq!(msg_type_of(Level::Warn), MsgType::Warning);
        assert_eq!(msg_type_of(Level::Info), MsgType::Info);
        assert_eq!(msg_type_of(Level::Debug), MsgType::Debug);
        assert_eq!(msg_type_of(Level::Trace), MsgType::Diagnostic);
    }

    #[test]
    fn test_forward_routes_by_target() {
        let (logger, memory) = memory_logger();
        logger.add_transaction(
            "worker",
            "",
            &TagSettings::with_types([MsgType::Info]).with_log_file_name("worker.log"),
        );
        forward(
            &logger,
            &log::Record::builder()
                .args(format_args!("job done"))
                .target("worker")
                .level(Level::Info)
                .build(),
        )
        .unwrap();
        let lines = memory.lines("/logs/worker.log");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(" worker (info): job done"));
        assert_eq!(logger.record("worker").unwrap().count, 1);
    }

    #[test]
    fn test_forward_drops_own_records() {
        let (logger, memory) = memory_logger();
        for target in ["tranlog", "tranlog::logger"] {
            forward(
                &logger,
                &log::Record::builder()
                    .args(format_args!("Tag 'a' has multiple definitions in the settings"))
                    .target(target)
                    .level(Level::Warn)
                    .build(),
            )
            .unwrap();
        }
        let settings = Settings::from_json_str(r#"{"Tags": {"a": {}}}"#).unwrap();
        logger.configure(&settings);
        assert_eq!(logger.configure(&settings).len(), 1);
        assert!(memory.paths().is_empty());
        assert_eq!(logger.record("default").unwrap().count, 0);

        forward(
            &logger,
            &log::Record::builder()
                .args(format_args!("not ours"))
                .target("tranlog_other")
                .level(Level::Warn)
                .build(),
        )
        .unwrap();
        assert_eq!(memory.lines("/logs/logfile.log").len(), 1);
    }
}
