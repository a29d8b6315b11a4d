//! Primitive building blocks shared by the Thinkium client crates.
//!
//! - [`numeric`]: hex prefix handling, padding and big-integer conversions
//! - [`hash`]: Keccak-256 (the pre-standard variant, not SHA3-256)
//! - [`address`]: 20-byte account addresses with mixed-case checksums
//! - [`iban`]: direct IBAN encoding of addresses

pub mod address;
pub mod hash;
pub mod iban;
pub mod numeric;

pub use address::{Address, AddressError};
pub use alloy_primitives::{I256, U256};
pub use hash::{keccak256, keccak256_hex, Hash};
pub use numeric::HexError;
