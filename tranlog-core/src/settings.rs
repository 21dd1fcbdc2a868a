use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};
use serde_json::Value;

use crate::{config::TRANLOG_ENV, error::TranLogError};

/// Logger configuration, in the shape of the JSON settings document.
///
/// ```json
/// {
///   "LogRoot": "/var/log/app",
///   "LogFileName": "app.log",
///   "DatePrefixLogfile": true,
///   "Tags": {
///     "db": { "LogFileName": "db.log", "MsgTypeSettings": { "Warning": true } }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    #[serde(default)]
    pub log_root: Option<PathBuf>,
    #[serde(default)]
    pub log_file_name: Option<String>,
    #[serde(default)]
    pub date_prefix_logfile: Option<bool>,
    /// Tag definitions in document order, duplicates included.
    #[serde(default, deserialize_with = "entries_in_order")]
    pub tags: Vec<(String, TagSettings)>,
}

/// Settings of one tag. Also the argument of `add_transaction`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TagSettings {
    #[serde(default)]
    pub log_file_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub msg_type_settings: HashMap<String, Value>,
}

impl TagSettings {
    /// Enables the given message types (on top of `Error`).
    pub fn with_types<I: IntoIterator<Item = crate::MsgType>>(types: I) -> Self {
        Self {
            msg_type_settings: types
                .into_iter()
                .map(|ty| (ty.key().to_string(), Value::Bool(true)))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_log_file_name(self, name: &str) -> Self {
        Self {
            log_file_name: Some(name.into()),
            ..self
        }
    }
}

fn entries_in_order<'de, D>(deserializer: D) -> Result<Vec<(String, TagSettings)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, TagSettings)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of tag name to tag settings")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, TagSettings>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self, TranLogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, TranLogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Overlays `other`: its set fields win, its tags are applied after ours.
    pub fn merge(&mut self, other: Settings) {
        if other.log_root.is_some() {
            self.log_root = other.log_root;
        }
        if other.log_file_name.is_some() {
            self.log_file_name = other.log_file_name;
        }
        if other.date_prefix_logfile.is_some() {
            self.date_prefix_logfile = other.date_prefix_logfile;
        }
        self.tags.extend(other.tags);
    }

    /// Reads `TRANLOG_SETTINGS_FILE` (if set) and overlays `TRANLOG_LOG_ROOT`,
    /// `TRANLOG_LOG_FILE_NAME` and `TRANLOG_DATE_PREFIX_LOGFILE`.
    pub fn from_env() -> Result<Self, TranLogError> {
        let env = TRANLOG_ENV.as_ref().map_err(|e| TranLogError::Env(e.clone()))?;
        let mut settings = if env.SETTINGS_FILE.is_empty() {
            Settings::default()
        } else {
            Settings::from_json_file(&env.SETTINGS_FILE)?
        };
        if !env.LOG_ROOT.is_empty() {
            settings.log_root = Some(PathBuf::from(&env.LOG_ROOT));
        }
        if !env.LOG_FILE_NAME.is_empty() {
            settings.log_file_name = Some(env.LOG_FILE_NAME.clone());
        }
        if !env.DATE_PREFIX_LOGFILE.is_empty() {
            settings.date_prefix_logfile = Some(parse_flag(&env.DATE_PREFIX_LOGFILE)?);
        }
        Ok(settings)
    }
}

fn parse_flag(value: &str) -> Result<bool, TranLogError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(TranLogError::Env(format!(
            "TRANLOG_DATE_PREFIX_LOGFILE: expected a boolean, got '{other}'"
        ))),
    }
}

/// Strips any directory part, for both `/` and `\` separators.
pub fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("C:\\logs\\sub\\app.log"), "app.log");
        assert_eq!(base_name("/var/log/app.log"), "app.log");
        assert_eq!(base_name("mixed/dir\\app.log"), "app.log");
        assert_eq!(base_name("app.log"), "app.log");
    }

    #[test]
    fn test_parse_settings() {
        let settings = Settings::from_json_str(
            r#"{
                "LogRoot": "/tmp/logs",
                "LogFileName": "main.log",
                "DatePrefixLogfile": true,
                "Unknown": 42,
                "Tags": {
                    "db": {"LogFileName": "db.log", "Description": "database",
                           "MsgTypeSettings": {"Warning": true}},
                    "net": {}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(settings.log_root, Some(PathBuf::from("/tmp/logs")));
        assert_eq!(settings.log_file_name.as_deref(), Some("main.log"));
        assert_eq!(settings.date_prefix_logfile, Some(true));
        let names: Vec<_> = settings.tags.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["db", "net"]);
        let (_, db) = &settings.tags[0];
        assert_eq!(db.log_file_name.as_deref(), Some("db.log"));
        assert_eq!(db.description.as_deref(), Some("database"));
        assert_eq!(db.msg_type_settings.get("Warning"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_duplicate_tags_are_kept() {
        let settings =
            Settings::from_json_str(r#"{"Tags": {"a": {}, "b": {}, "a": {"LogFileName": "x"}}}"#)
                .unwrap();
        let names: Vec<_> = settings.tags.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["a", "b", "a"]);
    }

    #[test]
    fn test_merge() {
        let mut settings = Settings::from_json_str(
            r#"{"LogRoot": "/a", "LogFileName": "a.log", "Tags": {"x": {}}}"#,
        )
        .unwrap();
        settings.merge(
            Settings::from_json_str(r#"{"LogRoot": "/b", "Tags": {"y": {}}}"#).unwrap(),
        );
        assert_eq!(settings.log_root, Some(PathBuf::from("/b")));
        assert_eq!(settings.log_file_name.as_deref(), Some("a.log"));
        assert_eq!(settings.date_prefix_logfile, None);
        let names: Vec<_> = settings.tags.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["x", "y"]);
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            Settings::from_json_str(r#"{"Tags": []}"#),
            Err(TranLogError::Settings(_))
        ));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE").unwrap());
        assert!(!parse_flag("0").unwrap());
        assert!(parse_flag("maybe").is_err());
    }
}
