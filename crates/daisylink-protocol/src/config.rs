use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::command::CommandTable;
use crate::error::ConfigError;
use crate::schema::{Schema, SchemaTable};

/// Immutable protocol tables shared by every transport on a node.
#[derive(Debug, Clone, Default)]
pub struct ProtocolConfig {
    commands: CommandTable,
    schemas: SchemaTable,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ProtocolFile {
    commands: BTreeMap<String, u8>,
    #[serde(default)]
    schemas: SchemaTable,
}

impl ProtocolConfig {
    /// Combine a command table and schemas.
    ///
    /// Every schema must name a registered command.
    pub fn new(commands: CommandTable, schemas: SchemaTable) -> Result<Self, ConfigError> {
        if let Some((name, _)) = schemas.iter().find(|(name, _)| !commands.contains(name)) {
            return Err(ConfigError::SchemaWithoutCommand(name.to_owned()));
        }
        Ok(Self { commands, schemas })
    }

    /// The standard satellite-network command set and schemas.
    pub fn standard() -> Self {
        Self {
            commands: CommandTable::standard(),
            schemas: SchemaTable::standard(),
        }
    }

    /// Load tables from JSON:
    ///
    /// ```json
    /// {
    ///   "commands": { "PING": 1, "LED": 16 },
    ///   "schemas": { "LED": { "type": "bytes", "desc": "R,G,B,brightness" } }
    /// }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: ProtocolFile = serde_json::from_str(json)?;
        let commands = CommandTable::from_pairs(file.commands)?;
        Self::new(commands, file.schemas)
    }

    /// Load tables from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    pub fn schemas(&self) -> &SchemaTable {
        &self.schemas
    }

    /// Schema registered for `command`, if any.
    pub fn schema(&self, command: &str) -> Option<&Schema> {
        self.schemas.get(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::names;
    use crate::schema::EncodingKind;

    #[test]
    fn standard_schemas_name_known_commands() {
        let config = ProtocolConfig::standard();
        assert!(ProtocolConfig::new(config.commands().clone(), config.schemas().clone()).is_ok());
        assert_eq!(
            config.schema(names::NEW_SAT).map(|s| s.kind),
            Some(EncodingKind::RawText)
        );
    }

    #[test]
    fn loads_from_json() {
        let config = ProtocolConfig::from_json(
            r#"{
                "commands": {"PING": 1, "LED": 16, "NAME": 32},
                "schemas": {
                    "LED": {"type": "bytes", "count": 3},
                    "NAME": {"type": "text", "desc": "unit name"}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.commands().code("LED"), Some(0x10));
        assert_eq!(config.schema("LED").unwrap().count, Some(3));
        assert!(config.schema("PING").is_none());
    }

    #[test]
    fn schemas_are_optional_in_json() {
        let config = ProtocolConfig::from_json(r#"{"commands": {"PING": 1}}"#).unwrap();
        assert!(config.schemas().is_empty());
    }

    #[test]
    fn rejects_schema_for_unknown_command() {
        let err = ProtocolConfig::from_json(
            r#"{"commands": {"PING": 1}, "schemas": {"LED": {"type": "bytes"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::SchemaWithoutCommand(name) if name == "LED"));
    }

    #[test]
    fn rejects_duplicate_codes_in_json() {
        let err = ProtocolConfig::from_json(r#"{"commands": {"A": 1, "B": 1}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateCode { code: 1, .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let missing = std::env::temp_dir().join(format!(
            "daisylink-protocol-missing-{}.json",
            std::process::id()
        ));
        let err = ProtocolConfig::from_path(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::Read { path, .. } if path == missing));
    }
}
