use std::{collections::HashMap, fmt, str::FromStr};

use serde_json::Value;

use crate::error::UnknownMsgType;

/// Category of a log message, used to filter what a tag writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MsgType {
    Error,
    Warning,
    Status,
    Info,
    Debug,
    Diagnostic,
}

impl MsgType {
    pub const ALL: [MsgType; 6] = [
        MsgType::Error,
        MsgType::Warning,
        MsgType::Status,
        MsgType::Info,
        MsgType::Debug,
        MsgType::Diagnostic,
    ];

    /// Lowercase name, as written in log line headers.
    pub fn as_str(self) -> &'static str {
        match self {
            MsgType::Error => "error",
            MsgType::Warning => "warning",
            MsgType::Status => "status",
            MsgType::Info => "info",
            MsgType::Debug => "debug",
            MsgType::Diagnostic => "diagnostic",
        }
    }

    /// Capitalised name, as used for `MsgTypeSettings` keys.
    pub fn key(self) -> &'static str {
        match self {
            MsgType::Error => "Error",
            MsgType::Warning => "Warning",
            MsgType::Status => "Status",
            MsgType::Info => "Info",
            MsgType::Debug => "Debug",
            MsgType::Diagnostic => "Diagnostic",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MsgType {
    type Err = UnknownMsgType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MsgType::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownMsgType(s.to_string()))
    }
}

/// Per-tag table of which message types are written.
///
/// `Error` is always enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsgTypeMatrix {
    enabled: [bool; MsgType::ALL.len()],
}

impl Default for MsgTypeMatrix {
    fn default() -> Self {
        let mut enabled = [false; MsgType::ALL.len()];
        enabled[MsgType::Error.index()] = true;
        Self { enabled }
    }
}

impl MsgTypeMatrix {
    /// Builds the matrix from `MsgTypeSettings`. Only a JSON `true` enables a
    /// type; keys that name no message type are ignored.
    ///
    /// Keys match case-insensitively. When several keys name the same type,
    /// the exact key (`"Info"`) wins, then the lowercase one (`"info"`), then
    /// the smallest of the others.
    pub fn from_settings(settings: &HashMap<String, Value>) -> Self {
        let mut matrix = Self::default();
        for ty in MsgType::ALL {
            let value = settings
                .get(ty.key())
                .or_else(|| settings.get(ty.as_str()))
                .or_else(|| {
                    settings
                        .iter()
                        .filter(|(key, _)| key.parse::<MsgType>() == Ok(ty))
                        .min_by(|a, b| a.0.cmp(b.0))
                        .map(|(_, value)| value)
                });
            matrix.enabled[ty.index()] = value.and_then(Value::as_bool) == Some(true);
        }
        matrix.enabled[MsgType::Error.index()] = true;
        matrix
    }

    pub fn is_enabled(&self, ty: MsgType) -> bool {
        self.enabled[ty.index()]
    }

    /// Sets one flag. Disabling `Error` is ignored.
    pub fn set(&mut self, ty: MsgType, enabled: bool) {
        if ty == MsgType::Error {
            return;
        }
        self.enabled[ty.index()] = enabled;
    }

    pub fn iter(&self) -> impl Iterator<Item = (MsgType, bool)> + '_ {
        MsgType::ALL.into_iter().map(|ty| (ty, self.is_enabled(ty)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_msg_type() {
        assert_eq!("Warning".parse::<MsgType>(), Ok(MsgType::Warning));
        assert_eq!("diagnostic".parse::<MsgType>(), Ok(MsgType::Diagnostic));
        assert_eq!("STATUS".parse::<MsgType>(), Ok(MsgType::Status));
        assert_eq!(
            "Bogus".parse::<MsgType>(),
            Err(UnknownMsgType("Bogus".into()))
        );
    }

    #[test]
    fn test_disabled_types_stay_disabled_except_error() {
        for ty in MsgType::ALL {
            let input = HashMap::from([(ty.key().to_string(), Value::Bool(false))]);
            let matrix = MsgTypeMatrix::from_settings(&input);
            assert_eq!(matrix.is_enabled(ty), ty == MsgType::Error, "{ty}");
        }
    }

    #[test]
    fn test_unlisted_and_unknown_keys() {
        let matrix = MsgTypeMatrix::from_settings(&settings(json!({
            "Warning": true,
            "Test": true,
            "Info": "yes"
        })));
        let enabled: Vec<_> = matrix.iter().filter(|(_, on)| *on).map(|(ty, _)| ty).collect();
        assert_eq!(enabled, vec![MsgType::Error, MsgType::Warning]);
    }

    #[test]
    fn test_key_precedence_is_deterministic() {
        let on = |value: Value| {
            MsgTypeMatrix::from_settings(&settings(value)).is_enabled(MsgType::Info)
        };
        assert!(on(json!({"Info": true, "info": false, "INFO": false})));
        assert!(on(json!({"info": true, "INFO": false, " Info ": false})));
        assert!(!on(json!({"INFO": false, "iNfO": true})));
        assert!(on(json!({" info": true, "iNfO": false})));
    }

    #[test]
    fn test_set_cannot_disable_error() {
        let mut matrix = MsgTypeMatrix::default();
        matrix.set(MsgType::Error, false);
        matrix.set(MsgType::Debug, true);
        assert!(matrix.is_enabled(MsgType::Error));
        assert!(matrix.is_enabled(MsgType::Debug));
        matrix.set(MsgType::Debug, false);
        assert!(!matrix.is_enabled(MsgType::Debug));
    }
}
