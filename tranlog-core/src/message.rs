use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Lines are flushed once they grow past this many characters.
pub const SOFT_LINE_LIMIT: usize = 120;

/// One piece of a log call.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Null,
    Text(String),
    Collection(Vec<Value>),
    Mapping(Map<String, Value>),
    Error(String),
    Timestamp(DateTime<Utc>),
    /// Anything else, already stringified.
    Other(String),
}

impl Message {
    pub fn error<E: std::error::Error + ?Sized>(error: &E) -> Self {
        Message::Error(error.to_string())
    }

    pub fn other<T: Display>(value: T) -> Self {
        Message::Other(value.to_string())
    }
}

impl From<&str> for Message {
    fn from(value: &str) -> Self {
        Message::Text(value.to_string())
    }
}

impl From<String> for Message {
    fn from(value: String) -> Self {
        Message::Text(value)
    }
}

impl From<&String> for Message {
    fn from(value: &String) -> Self {
        Message::Text(value.clone())
    }
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Message::Null,
            Value::String(s) => Message::Text(s),
            Value::Array(items) => Message::Collection(items),
            Value::Object(map) => Message::Mapping(map),
            other => Message::Other(other.to_string()),
        }
    }
}

impl From<DateTime<Utc>> for Message {
    fn from(value: DateTime<Utc>) -> Self {
        Message::Timestamp(value)
    }
}

impl<T: Into<Message>> From<Option<T>> for Message {
    fn from(value: Option<T>) -> Self {
        value.map_or(Message::Null, Into::into)
    }
}

macro_rules! message_from_display {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Message {
            fn from(value: $ty) -> Self {
                Message::Other(value.to_string())
            }
        })*
    };
}

message_from_display!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

pub fn iso_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Accumulates messages into lines of roughly [`SOFT_LINE_LIMIT`] characters.
#[derive(Debug)]
pub struct LineBuilder {
    buffer: String,
    lines: Vec<String>,
}

impl LineBuilder {
    pub fn new(header: String) -> Self {
        Self {
            buffer: header,
            lines: Vec::new(),
        }
    }

    pub fn push(&mut self, message: &Message) {
        match message {
            Message::Null => self.buffer.push_str(" null"),
            Message::Text(text) | Message::Other(text) => self.buffer.push_str(text),
            Message::Collection(items) => {
                self.push_structured(Value::Array(items.clone()).to_string())
            }
            Message::Mapping(map) => {
                self.push_structured(Value::Object(map.clone()).to_string())
            }
            Message::Error(error) => {
                self.buffer.push_str(" ERROR(");
                self.buffer.push_str(error);
                self.buffer.push(')');
            }
            Message::Timestamp(time) => {
                self.buffer.push(' ');
                self.buffer.push_str(&iso_timestamp(time));
            }
        }
        if char_len(&self.buffer) > SOFT_LINE_LIMIT {
            self.flush_buffer();
        }
    }

    /// A serialized value that does not fit goes on a line of its own.
    fn push_structured(&mut self, json: String) {
        let separator = if self.buffer.is_empty() { "" } else { " " };
        if char_len(&self.buffer) + separator.len() + char_len(&json) > SOFT_LINE_LIMIT {
            self.flush_buffer();
            self.lines.push(json);
        } else {
            self.buffer.push_str(separator);
            self.buffer.push_str(&json);
        }
    }

    fn flush_buffer(&mut self) {
        if !self.buffer.is_empty() {
            self.lines.push(std::mem::take(&mut self.buffer));
        }
    }

    pub fn finish(mut self) -> Vec<String> {
        self.flush_buffer();
        self.lines
    }
}

pub fn format_lines(header: String, messages: &[Message]) -> Vec<String> {
    let mut builder = LineBuilder::new(header);
    for message in messages {
        builder.push(message);
    }
    builder.finish()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    const HEADER: &str = "2024-01-02T03:04:05.678Z a (info):";

    #[test]
    fn test_inline_rendering() {
        let time = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let error = std::io::Error::other("disk full");
        let lines = format_lines(
            HEADER.into(),
            &[
                " started".into(),
                Message::Null,
                Message::error(&error),
                time.into(),
                42_i32.into(),
                json!([1, 2]).into(),
                json!({"k": "v"}).into(),
            ],
        );
        assert_eq!(
            lines,
            vec![format!(
                "{HEADER} started null ERROR(disk full) 2024-05-06T07:08:09.000Z42 [1,2] {}",
                r#"{"k":"v"}"#
            )]
        );
    }

    #[test]
    fn test_value_conversion() {
        assert_eq!(Message::from(json!(null)), Message::Null);
        assert_eq!(Message::from(json!("s")), Message::Text("s".into()));
        assert_eq!(Message::from(json!(1.5)), Message::Other("1.5".into()));
        assert_eq!(Message::from(None::<&str>), Message::Null);
        assert_eq!(Message::from(Some("x")), Message::Text("x".into()));
    }

    #[test]
    fn test_structured_value_gets_own_line() {
        let filler = " ".to_string() + &"x".repeat(70);
        let numbers: Vec<u32> = (0..20).collect();
        let value = json!({ "numbers": numbers });
        let lines = format_lines(
            HEADER.into(),
            &[filler.clone().into(), value.clone().into(), " tail".into()],
        );
        assert_eq!(
            lines,
            vec![format!("{HEADER}{filler}"), value.to_string(), " tail".to_string()]
        );
    }

    #[test]
    fn test_soft_wrap_does_not_split_text() {
        let long = "y".repeat(200);
        let lines = format_lines(HEADER.into(), &[" a".into(), long.clone().into(), " b".into()]);
        assert_eq!(lines, vec![format!("{HEADER} a{long}"), " b".to_string()]);
    }

    #[test]
    fn test_header_only() {
        let lines = format_lines(HEADER.into(), &["".into()]);
        assert_eq!(lines, vec![HEADER.to_string()]);
    }
}
