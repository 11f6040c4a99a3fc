//! Command definitions
//!
//! Represents commands from clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Read = 0x01,
    Create = 0x02,
    Delete = 0x03,
    Ping = 0x04,
    Overwrite = 0x05,
    Exists = 0x06,
    List = 0x07,
    Space = 0x08,
    Compact = 0x09,
    Format = 0x0A,
}

impl CommandType {
    /// Map a wire byte back to its command type
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(CommandType::Read),
            0x02 => Some(CommandType::Create),
            0x03 => Some(CommandType::Delete),
            0x04 => Some(CommandType::Ping),
            0x05 => Some(CommandType::Overwrite),
            0x06 => Some(CommandType::Exists),
            0x07 => Some(CommandType::List),
            0x08 => Some(CommandType::Space),
            0x09 => Some(CommandType::Compact),
            0x0A => Some(CommandType::Format),
            _ => None,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read an entry's content
    Read { name: String },

    /// Create a new entry (fails if the name is live)
    Create { name: String, content: Vec<u8> },

    /// Delete an entry
    Delete { name: String },

    /// Ping (health check)
    Ping,

    /// Replace an entry's content, creating it if absent
    Overwrite { name: String, content: Vec<u8> },

    /// Check whether an entry exists
    Exists { name: String },

    /// List all live names
    List,

    /// Report available space
    Space,

    /// Reclaim tombstoned space
    Compact,

    /// Drop every entry
    Format,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Read { .. } => CommandType::Read,
            Command::Create { .. } => CommandType::Create,
            Command::Delete { .. } => CommandType::Delete,
            Command::Ping => CommandType::Ping,
            Command::Overwrite { .. } => CommandType::Overwrite,
            Command::Exists { .. } => CommandType::Exists,
            Command::List => CommandType::List,
            Command::Space => CommandType::Space,
            Command::Compact => CommandType::Compact,
            Command::Format => CommandType::Format,
        }
    }
}
