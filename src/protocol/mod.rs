//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: READ      - Payload: name
//! - 0x02: CREATE    - Payload: name_len (4) + name + content
//! - 0x03: DELETE    - Payload: name
//! - 0x04: PING      - Payload: empty
//! - 0x05: OVERWRITE - Payload: name_len (4) + name + content
//! - 0x06: EXISTS    - Payload: name
//! - 0x07: LIST      - Payload: empty
//! - 0x08: SPACE     - Payload: empty
//! - 0x09: COMPACT   - Payload: empty
//! - 0x0A: FORMAT    - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: NOT_FOUND
//! - 0x02: ERROR
//! - 0x03: NAME_EXISTS
//! - 0x04: NO_SPACE

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{
    encode_command, decode_command, encode_response, decode_response,
    encode_name_list, decode_name_list,
    read_command, write_command, read_response, write_response,
    HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
