//! The JSON record written for every log call.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::{Map, Value};

use super::fields::Fields;
use super::level::Level;

/// Keys always populated by the logger. User fields never override them.
pub const RESERVED_KEYS: [&str; 4] = ["level", "time", "message", "callers"];

/// One log line: `{"level", "time", "message", "callers", ...fields}`.
#[derive(Debug, Serialize)]
pub struct Record<'a> {
    pub level: &'static str,
    /// Nanoseconds since the Unix epoch.
    pub time: i64,
    pub message: &'a str,
    pub callers: &'a [String],
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl<'a> Record<'a> {
    /// Assemble a record stamped with the current time.
    ///
    /// Fails if any field value cannot be serialized.
    pub fn new(
        level: Level,
        message: &'a str,
        callers: &'a [String],
        fields: &Fields,
    ) -> serde_json::Result<Self> {
        Ok(Self {
            level: level.as_str(),
            time: unix_nanos(),
            message,
            callers,
            fields: fields.to_json_map(&RESERVED_KEYS)?,
        })
    }

    /// Serialize to a single JSON object, without the trailing newline.
    pub fn to_line(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

fn unix_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
