use std::collections::HashMap;

use crate::{
    msg_type::MsgTypeMatrix,
    settings::{TagSettings, base_name},
};

pub const DEFAULT_TAG: &str = "default";
pub const DEFAULT_LOG_FILE_NAME: &str = "logfile.log";

/// Routing record of one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord {
    name: String,
    pub(crate) log_file_name: Option<String>,
    pub description: Option<String>,
    pub msg_types: MsgTypeMatrix,
    /// Messages written under this tag since it was created.
    pub count: u64,
}

impl TagRecord {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            log_file_name: None,
            description: None,
            msg_types: MsgTypeMatrix::default(),
            count: 0,
        }
    }

    pub fn from_settings(name: &str, settings: &TagSettings) -> Self {
        Self {
            name: name.to_string(),
            log_file_name: settings.log_file_name.as_deref().map(|f| base_name(f).to_string()),
            description: settings.description.clone(),
            msg_types: MsgTypeMatrix::from_settings(&settings.msg_type_settings),
            count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log_file_name(&self) -> Option<&str> {
        self.log_file_name.as_deref()
    }

    /// Stores the base name of `file_name`.
    pub fn set_log_file_name(&mut self, file_name: &str) {
        self.log_file_name = Some(base_name(file_name).to_string());
    }
}

/// Tag name to [`TagRecord`] map with a permanent `default` record.
///
/// The default record lives outside the map, so it cannot be removed, and it
/// always carries a file name that tags without one fall back to.
#[derive(Debug, Clone)]
pub struct TagRegistry {
    default: TagRecord,
    tags: HashMap<String, TagRecord>,
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FILE_NAME)
    }
}

impl TagRegistry {
    pub fn new(default_file_name: &str) -> Self {
        let mut default = TagRecord::new(DEFAULT_TAG);
        default.set_log_file_name(default_file_name);
        Self {
            default,
            tags: HashMap::new(),
        }
    }

    pub fn default_record(&self) -> &TagRecord {
        &self.default
    }

    pub fn default_file_name(&self) -> &str {
        self.default
            .log_file_name()
            .unwrap_or(DEFAULT_LOG_FILE_NAME)
    }

    pub fn get(&self, tag: &str) -> Option<&TagRecord> {
        if tag == DEFAULT_TAG {
            Some(&self.default)
        } else {
            self.tags.get(tag)
        }
    }

    pub fn get_mut(&mut self, tag: &str) -> Option<&mut TagRecord> {
        if tag == DEFAULT_TAG {
            Some(&mut self.default)
        } else {
            self.tags.get_mut(tag)
        }
    }

    /// Looks up `tag`, falling back to the default record.
    pub fn resolve(&self, tag: &str) -> &TagRecord {
        self.tags.get(tag).unwrap_or(&self.default)
    }

    pub fn resolve_mut(&mut self, tag: &str) -> &mut TagRecord {
        self.tags.get_mut(tag).unwrap_or(&mut self.default)
    }

    /// File name written to by `record`.
    pub fn file_name_of<'a>(&'a self, record: &'a TagRecord) -> &'a str {
        record
            .log_file_name()
            .unwrap_or_else(|| self.default_file_name())
    }

    pub fn contains(&self, tag: &str) -> bool {
        tag == DEFAULT_TAG || self.tags.contains_key(tag)
    }

    /// Inserts or replaces a record; returns `true` if one was replaced.
    ///
    /// Replacing `default` without a file name keeps the current one.
    pub fn insert(&mut self, mut record: TagRecord) -> bool {
        if record.name == DEFAULT_TAG {
            if record.log_file_name.is_none() {
                record.log_file_name = self.default.log_file_name.take();
            }
            self.default = record;
            true
        } else {
            self.tags.insert(record.name.clone(), record).is_some()
        }
    }

    /// Removes a record. The default record is never removed.
    pub fn remove(&mut self, tag: &str) -> Option<TagRecord> {
        if tag == DEFAULT_TAG {
            return None;
        }
        self.tags.remove(tag)
    }

    /// Number of tags besides `default`.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// All records, `default` first.
    pub fn records(&self) -> impl Iterator<Item = &TagRecord> {
        std::iter::once(&self.default).chain(self.tags.values())
    }
}
