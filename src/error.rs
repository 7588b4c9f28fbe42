use thiserror::Error;

/// Failures while reading or writing the DNS wire format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error("end of buffer")]
    EndOfBuffer,

    #[error("too many compression jumps (max {0})")]
    TooManyJumps(usize),

    #[error("compression pointer at offset {at} targets {target}, which is not behind it")]
    ForwardPointer { at: usize, target: usize },

    #[error("unsupported label type {0:#04x}")]
    LabelType(u8),

    #[error("label too long ({0} bytes, max 63)")]
    LabelTooLong(usize),

    #[error("name too long ({0} bytes, max 255)")]
    NameTooLong(usize),

    #[error("empty label in name {0:?}")]
    EmptyLabel(String),

    #[error("invalid escape in name {0:?}")]
    InvalidEscape(String),

    #[error("failed to unpack header")]
    HeaderUnpack,

    #[error("failed to pack header")]
    HeaderPack,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZoneError {
    #[error("zone name {0:?} is not fully qualified (missing trailing '.')")]
    NotFullyQualified(String),

    #[error("invalid zone name {name:?}: {reason}")]
    InvalidName { name: String, reason: PacketError },

    #[error("invalid IPv4 address {address:?} for {name}")]
    InvalidAddress { name: String, address: String },

    #[error("duplicate zone name {0}")]
    DuplicateName(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    FileRead(String, String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Zone(#[from] ZoneError),
}

/// Reasons a single datagram produced no reply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    #[error("malformed datagram: {0}")]
    Malformed(PacketError),

    #[error("failed to serialize reply: {0}")]
    Serialize(PacketError),

    #[error("query carries no question")]
    NoQuestion,
}
