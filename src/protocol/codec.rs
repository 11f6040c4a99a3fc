//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - READ / DELETE / EXISTS: name_len (4 bytes) + name
//! - CREATE / OVERWRITE:     name_len (4 bytes) + name + content
//! - PING / LIST / SPACE / COMPACT / FORMAT: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use crate::error::{FlatError, Result};

use super::{Command, CommandType, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let cmd_type = command.command_type() as u8;

    // Build payload based on command type
    let payload = match command {
        Command::Read { name } | Command::Delete { name } | Command::Exists { name } => {
            let mut payload = Vec::with_capacity(4 + name.len());
            put_name(&mut payload, name);
            payload
        }
        Command::Create { name, content } | Command::Overwrite { name, content } => {
            let mut payload = Vec::with_capacity(4 + name.len() + content.len());
            put_name(&mut payload, name);
            payload.extend_from_slice(content);
            payload
        }
        Command::Ping | Command::List | Command::Space | Command::Compact | Command::Format => {
            Vec::new()
        }
    };

    // Build full message: header + payload
    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(cmd_type);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(&payload);

    message
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let payload = split_frame(bytes, "command")?;
    let cmd_type = bytes[0];

    let command_type = CommandType::from_byte(cmd_type).ok_or_else(|| {
        FlatError::Protocol(format!("Unknown command type: 0x{:02x}", cmd_type))
    })?;

    // Parse command based on type
    match command_type {
        CommandType::Read => {
            let (name, _) = take_name(payload, "READ")?;
            Ok(Command::Read { name })
        }
        CommandType::Create => {
            let (name, content) = take_name(payload, "CREATE")?;
            Ok(Command::Create {
                name,
                content: content.to_vec(),
            })
        }
        CommandType::Delete => {
            let (name, _) = take_name(payload, "DELETE")?;
            Ok(Command::Delete { name })
        }
        CommandType::Overwrite => {
            let (name, content) = take_name(payload, "OVERWRITE")?;
            Ok(Command::Overwrite {
                name,
                content: content.to_vec(),
            })
        }
        CommandType::Exists => {
            let (name, _) = take_name(payload, "EXISTS")?;
            Ok(Command::Exists { name })
        }
        CommandType::Ping => expect_empty(payload, "PING").map(|_| Command::Ping),
        CommandType::List => expect_empty(payload, "LIST").map(|_| Command::List),
        CommandType::Space => expect_empty(payload, "SPACE").map(|_| Command::Space),
        CommandType::Compact => expect_empty(payload, "COMPACT").map(|_| Command::Compact),
        CommandType::Format => expect_empty(payload, "FORMAT").map(|_| Command::Format),
    }
}

/// Read `name_len (4) + name` from the front of a payload, returning the rest
fn take_name<'a>(payload: &'a [u8], what: &str) -> Result<(String, &'a [u8])> {
    if payload.len() < 4 {
        return Err(FlatError::Protocol(format!(
            "{} command: missing name length",
            what
        )));
    }

    let name_len = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;

    if payload.len() < 4 + name_len {
        return Err(FlatError::Protocol(format!(
            "{} command: incomplete name (expected {}, got {})",
            what,
            name_len,
            payload.len() - 4
        )));
    }

    let name = String::from_utf8(payload[4..4 + name_len].to_vec())
        .map_err(|_| FlatError::Protocol(format!("{} command: name is not UTF-8", what)))?;

    Ok((name, &payload[4 + name_len..]))
}

fn expect_empty(payload: &[u8], what: &str) -> Result<()> {
    if !payload.is_empty() {
        return Err(FlatError::Protocol(format!(
            "{} command: unexpected payload of {} bytes",
            what,
            payload.len()
        )));
    }
    Ok(())
}

fn put_name(out: &mut Vec<u8>, name: &str) {
    out.extend_from_slice(&(name.len() as u32).to_be_bytes());
    out.extend_from_slice(name.as_bytes());
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    let payload_len = payload.len() as u32;

    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(response.status as u8);
    message.extend_from_slice(&payload_len.to_be_bytes());
    message.extend_from_slice(payload);

    message
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let payload = split_frame(bytes, "response")?;
    let status_byte = bytes[0];

    // Parse status
    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::Error,
        0x03 => Status::NameExists,
        0x04 => Status::NoSpace,
        _ => {
            return Err(FlatError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    // Extract payload
    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

/// Validate header + length and return the payload slice of one frame
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<&'a [u8]> {
    if bytes.len() < HEADER_SIZE {
        return Err(FlatError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
    check_payload_len(payload_len)?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(FlatError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok(&bytes[HEADER_SIZE..total_len])
}

fn check_payload_len(payload_len: usize) -> Result<()> {
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(FlatError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

// =============================================================================
// Payload helpers
// =============================================================================

/// Encode a LIST payload: name_len (4) + name, repeated
pub fn encode_name_list(names: &[String]) -> Vec<u8> {
    let total: usize = names.iter().map(|n| 4 + n.len()).sum();
    let mut out = Vec::with_capacity(total);
    for name in names {
        put_name(&mut out, name);
    }
    out
}

/// Decode a LIST payload
pub fn decode_name_list(mut bytes: &[u8]) -> Result<Vec<String>> {
    let mut names = Vec::new();
    while !bytes.is_empty() {
        let (name, rest) = take_name(bytes, "LIST")?;
        names.push(name);
        bytes = rest;
    }
    Ok(names)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one frame (header + payload) from a stream
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    // Read header first
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    // Parse and validate payload length
    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
    check_payload_len(payload_len)?;

    // Read payload into the same buffer
    let mut frame = vec![0u8; HEADER_SIZE + payload_len];
    frame[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut frame[HEADER_SIZE..])?;
    }

    Ok(frame)
}

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let frame = read_frame(reader)?;
    decode_command(&frame)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let frame = read_frame(reader)?;
    decode_response(&frame)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
