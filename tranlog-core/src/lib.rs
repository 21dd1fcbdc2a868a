//! # tranlog-core
//! Core of tranlog: tag registry, message routing, line formatting and the
//! log file writer.

mod config;
mod error;
mod log_writer;
mod message;
mod msg_type;
mod registry;
mod router;
mod settings;

pub use config::{TRANLOG_ENV, TranLogEnv};
pub use error::{ConfigWarning, TranLogError, UnknownMsgType};
pub use log_writer::{LINE_ENDING, LogFile, LogMemory, LogWriter, write_line};
pub use message::{LineBuilder, Message, SOFT_LINE_LIMIT, format_lines, iso_timestamp};
pub use msg_type::{MsgType, MsgTypeMatrix};
pub use registry::{DEFAULT_LOG_FILE_NAME, DEFAULT_TAG, TagRecord, TagRegistry};
pub use router::{Clock, FixedClock, SystemClock, TranLogCore, split_tags};
pub use settings::{Settings, TagSettings, base_name};
