//! Contract ABI encoding.
//!
//! Values are encoded as a sequence of 32-byte words split into a head
//! (one slot per top-level value) and a tail holding dynamic payloads.
//! Dynamic values leave a byte offset in their head slot, measured from
//! the start of the enclosing head block.

mod decoder;
mod encoder;
mod error;
mod event;
mod function;
mod json;
mod structs;
mod types;
mod value;

pub use decoder::{decode, decode_hex};
pub use encoder::{encode, encode_constructor, encode_function_call};
pub use error::{AbiParseError, DecodeError, EncodeError};
pub use event::{encode_topic, Event, EventValues};
pub use function::{Function, Param, StateMutability};
pub use json::{Constructor, ContractAbi};
pub use structs::{StructDef, StructRegistry};
pub use types::AbiType;
pub use value::AbiValue;

/// Size of one encoded word.
pub const WORD_SIZE: usize = 32;

/// Selector of the standard `Error(string)` revert payload.
pub const REVERT_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];
