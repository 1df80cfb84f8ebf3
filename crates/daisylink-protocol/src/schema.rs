use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::command::names;
use crate::error::ConfigError;

/// How a command's payload is laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodingKind {
    /// UTF-8 text, verbatim.
    #[serde(rename = "text")]
    RawText,
    /// One byte per number, 0..=255.
    #[serde(rename = "bytes")]
    NumericBytes,
    /// Signed 16-bit little-endian per number.
    #[serde(rename = "words")]
    NumericWords,
    /// IEEE-754 single precision little-endian per number.
    #[serde(rename = "floats")]
    Floats,
    /// Opaque bytes, verbatim.
    #[serde(rename = "raw_bytes")]
    RawBytes,
}

impl EncodingKind {
    /// Name used in the JSON table format.
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingKind::RawText => "text",
            EncodingKind::NumericBytes => "bytes",
            EncodingKind::NumericWords => "words",
            EncodingKind::Floats => "floats",
            EncodingKind::RawBytes => "raw_bytes",
        }
    }

    /// Bytes per value for fixed-width numeric kinds.
    pub fn width(&self) -> Option<usize> {
        match self {
            EncodingKind::NumericBytes => Some(1),
            EncodingKind::NumericWords => Some(2),
            EncodingKind::Floats => Some(4),
            EncodingKind::RawText | EncodingKind::RawBytes => None,
        }
    }
}

impl fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload declaration for one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub kind: EncodingKind,
    /// Exact number of values a numeric payload must carry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(rename = "desc", default)]
    pub description: String,
}

impl Schema {
    pub fn new(kind: EncodingKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            count: None,
            description: description.into(),
        }
    }

    /// Require exactly `count` values.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// Per-command payload schemas, keyed by command name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaTable {
    schemas: HashMap<String, Schema>,
}

impl SchemaTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schemas for the standard command set.
    ///
    /// `PING`, `ACK` and `NACK` carry no schema and use the heuristic
    /// payload path.
    pub fn standard() -> Self {
        use EncodingKind::*;

        let entries: [(&str, EncodingKind, &str); 27] = [
            (names::HELLO, RawText, "Hello message with optional text"),
            (names::MODE, RawText, "Operating mode: IDLE, ACTIVE, or SLEEP"),
            (names::ID_ASSIGN, RawText, "Device ID string like \"0100\""),
            (names::NEW_SAT, RawText, "Satellite type ID like \"01\""),
            (names::ERROR, RawText, "Error description text"),
            (names::LOG, RawText, "Log message text"),
            (names::SYNC_FRAME, Floats, "Frame sync: frame_number,time_seconds"),
            (names::REBOOT, RawText, "Reboot command with optional reason text"),
            (names::LED, NumericBytes, "R,G,B,brightness bytes"),
            (names::LEDFLASH, NumericBytes, "R,G,B,brightness"),
            (names::LEDBREATH, NumericBytes, "R,G,B,brightness"),
            (names::LEDCYLON, NumericBytes, "R,G,B,brightness"),
            (names::LEDCENTRI, NumericBytes, "R,G,B,brightness"),
            (names::LEDRAINBOW, NumericBytes, "speed,brightness"),
            (names::LEDGLITCH, NumericBytes, "intensity,brightness"),
            (names::DSP, RawText, "Display message text"),
            (names::DSPCORRUPT, NumericBytes, "level,duration"),
            (names::DSPMATRIX, NumericBytes, "speed,density"),
            (names::POWER, Floats, "voltage1,voltage2,current"),
            (names::STATUS, NumericBytes, "status bytes (variable length)"),
            (names::SETENC, NumericWords, "encoder position"),
            (names::FILE_START, RawText, "filename,total_size e.g. \"firmware.bin,4096\""),
            (names::FILE_CHUNK, RawBytes, "raw binary chunk data"),
            (names::FILE_END, RawText, "SHA256 hex digest of the complete file"),
            (names::VERSION_CHECK, RawText, "Firmware version string e.g. \"0.4.0\""),
            (names::UPDATE_START, RawText, "file_count,total_bytes e.g. \"5,12800\""),
            (names::UPDATE_WAIT, RawText, "Update in progress; retry version check later"),
        ];

        let mut table = Self::new();
        for (name, kind, desc) in entries {
            table.insert(name, Schema::new(kind, desc));
        }
        table
    }

    /// Parse a JSON object mapping command names to schemas:
    ///
    /// ```json
    /// { "LED": { "type": "bytes", "desc": "R,G,B,brightness", "count": 4 } }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Register or replace the schema for `command`.
    pub fn insert(&mut self, command: impl Into<String>, schema: Schema) -> Option<Schema> {
        self.schemas.insert(command.into(), schema)
    }

    pub fn get(&self, command: &str) -> Option<&Schema> {
        self.schemas.get(command)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.schemas.iter().map(|(name, schema)| (name.as_str(), schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_schema_kinds() {
        let table = SchemaTable::standard();
        assert_eq!(table.get(names::ID_ASSIGN).unwrap().kind, EncodingKind::RawText);
        assert_eq!(table.get(names::LED).unwrap().kind, EncodingKind::NumericBytes);
        assert_eq!(table.get(names::SETENC).unwrap().kind, EncodingKind::NumericWords);
        assert_eq!(table.get(names::POWER).unwrap().kind, EncodingKind::Floats);
        assert_eq!(table.get(names::FILE_CHUNK).unwrap().kind, EncodingKind::RawBytes);
        assert!(table.get(names::PING).is_none());
    }

    #[test]
    fn parses_json_table() {
        let table = SchemaTable::from_json(
            r#"{
                "LED": {"type": "bytes", "desc": "R,G,B,brightness", "count": 4},
                "SETENC": {"type": "words"},
                "FILE_CHUNK": {"type": "raw_bytes", "desc": "chunk"}
            }"#,
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        let led = table.get("LED").unwrap();
        assert_eq!(led.kind, EncodingKind::NumericBytes);
        assert_eq!(led.count, Some(4));
        assert_eq!(led.description, "R,G,B,brightness");
        assert_eq!(table.get("SETENC").unwrap().description, "");
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = SchemaTable::from_json(r#"{"LED": {"type": "nibbles"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn serializes_with_wire_names() {
        let schema = Schema::new(EncodingKind::Floats, "v").with_count(3);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["type"], "floats");
        assert_eq!(json["count"], 3);
        assert_eq!(json["desc"], "v");
    }
}
