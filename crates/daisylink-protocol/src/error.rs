use std::path::PathBuf;

/// Errors raised while turning a [`Message`](crate::Message) into bytes.
///
/// These indicate a caller mistake and are reported synchronously.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The command name is not in the command table.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// A numeric payload has the wrong number of values for its schema.
    #[error("command {command} expects {expected} values, got {actual}")]
    SchemaCountMismatch {
        command: String,
        expected: usize,
        actual: usize,
    },

    /// The payload variant does not match the schema's encoding kind.
    #[error("command {command} expects a {expected} payload, got {actual}")]
    EncodeType {
        command: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// A number cannot be represented in the schema's wire width.
    #[error("value {value} out of range for {kind} encoding")]
    ValueOutOfRange { value: f64, kind: &'static str },

    /// The destination cannot be encoded.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The encoded frame would not fit the configured frame size.
    #[error("encoded frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },
}

/// Errors raised while interpreting a verified frame body.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The command byte has no entry in the command table.
    #[error("unknown command code {0:#04x}")]
    UnknownCommand(u8),

    /// A device address was cut short.
    #[error("truncated destination address")]
    TruncatedAddress,

    /// The body ends before the command byte.
    #[error("frame body has no command byte")]
    MissingCommand,

    /// A fixed-width numeric payload has a trailing partial value.
    #[error("payload length {len} is not a multiple of {width}")]
    MisalignedPayload { len: usize, width: usize },

    /// A text payload is not valid UTF-8.
    #[error("text payload is not valid UTF-8: {0}")]
    InvalidText(#[from] std::str::Utf8Error),
}

/// Errors raised while building or loading protocol tables.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Two command names map to the same byte.
    #[error("command code {code:#04x} assigned to both {first} and {second}")]
    DuplicateCode {
        code: u8,
        first: String,
        second: String,
    },

    /// A command name was registered twice.
    #[error("command {0} registered twice")]
    DuplicateName(String),

    /// A schema refers to a command that does not exist.
    #[error("schema for unknown command {0}")]
    SchemaWithoutCommand(String),

    /// The table description is not valid JSON.
    #[error("invalid protocol JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The table file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
