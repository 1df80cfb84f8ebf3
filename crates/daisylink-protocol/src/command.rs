use std::collections::HashMap;

use crate::error::ConfigError;

/// Names of the standard command set.
pub mod names {
    pub const HELLO: &str = "HELLO";
    pub const PING: &str = "PING";
    pub const ACK: &str = "ACK";
    pub const NACK: &str = "NACK";
    pub const ID_ASSIGN: &str = "ID_ASSIGN";
    pub const NEW_SAT: &str = "NEW_SAT";
    pub const STATUS: &str = "STATUS";
    pub const ERROR: &str = "ERROR";
    pub const LOG: &str = "LOG";
    pub const SYNC_FRAME: &str = "SYNC_FRAME";
    pub const POWER: &str = "POWER";
    pub const REBOOT: &str = "REBOOT";
    pub const MODE: &str = "MODE";

    pub const LED: &str = "LED";
    pub const LEDFLASH: &str = "LEDFLASH";
    pub const LEDBREATH: &str = "LEDBREATH";
    pub const LEDCYLON: &str = "LEDCYLON";
    pub const LEDCENTRI: &str = "LEDCENTRI";
    pub const LEDRAINBOW: &str = "LEDRAINBOW";
    pub const LEDGLITCH: &str = "LEDGLITCH";

    pub const DSP: &str = "DSP";
    pub const DSPCORRUPT: &str = "DSPCORRUPT";
    pub const DSPMATRIX: &str = "DSPMATRIX";

    pub const SETENC: &str = "SETENC";

    pub const FILE_START: &str = "FILE_START";
    pub const FILE_CHUNK: &str = "FILE_CHUNK";
    pub const FILE_END: &str = "FILE_END";

    pub const VERSION_CHECK: &str = "VERSION_CHECK";
    pub const UPDATE_START: &str = "UPDATE_START";
    pub const UPDATE_WAIT: &str = "UPDATE_WAIT";
}

/// Standard command codes.
pub const STANDARD_COMMANDS: &[(&str, u8)] = &[
    (names::HELLO, 0xAA),
    (names::PING, 0x01),
    (names::ACK, 0x02),
    (names::NACK, 0x03),
    (names::ID_ASSIGN, 0x04),
    (names::NEW_SAT, 0x05),
    (names::STATUS, 0x06),
    (names::ERROR, 0x07),
    (names::LOG, 0x08),
    (names::SYNC_FRAME, 0x09),
    (names::POWER, 0x0A),
    (names::REBOOT, 0x0B),
    (names::MODE, 0x0C),
    (names::LED, 0x10),
    (names::LEDFLASH, 0x11),
    (names::LEDBREATH, 0x12),
    (names::LEDCYLON, 0x13),
    (names::LEDCENTRI, 0x14),
    (names::LEDRAINBOW, 0x15),
    (names::LEDGLITCH, 0x16),
    (names::DSP, 0x20),
    (names::DSPCORRUPT, 0x21),
    (names::DSPMATRIX, 0x22),
    (names::SETENC, 0x30),
    (names::FILE_START, 0x40),
    (names::FILE_CHUNK, 0x41),
    (names::FILE_END, 0x42),
    (names::VERSION_CHECK, 0x50),
    (names::UPDATE_START, 0x51),
    (names::UPDATE_WAIT, 0x52),
];

/// Bidirectional mapping between command names and wire bytes.
///
/// Construction rejects duplicate names and duplicate codes, so every
/// lookup in either direction has at most one answer.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    by_name: HashMap<String, u8>,
    by_code: HashMap<u8, String>,
}

impl CommandTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard satellite-network command set.
    pub fn standard() -> Self {
        let mut table = Self::new();
        for &(name, code) in STANDARD_COMMANDS {
            table.by_name.insert(name.to_owned(), code);
            table.by_code.insert(code, name.to_owned());
        }
        table
    }

    /// Build a table from name/code pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, u8)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (name, code) in pairs {
            table.insert(name, code)?;
        }
        Ok(table)
    }

    /// Register a command.
    pub fn insert(&mut self, name: impl Into<String>, code: u8) -> Result<(), ConfigError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(ConfigError::DuplicateName(name));
        }
        if let Some(first) = self.by_code.get(&code) {
            return Err(ConfigError::DuplicateCode {
                code,
                first: first.clone(),
                second: name,
            });
        }
        self.by_name.insert(name.clone(), code);
        self.by_code.insert(code, name);
        Ok(())
    }

    /// Wire byte for `name`.
    pub fn code(&self, name: &str) -> Option<u8> {
        self.by_name.get(name).copied()
    }

    /// Name registered for `code`.
    pub fn name(&self, code: u8) -> Option<&str> {
        self.by_code.get(&code).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Iterate over `(name, code)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.by_name.iter().map(|(name, code)| (name.as_str(), *code))
    }
}
