//! Protocol module containing message types and the JSON codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_binary, decode_text, encode_command, parse_text, ProtocolError};
pub use messages::*;
