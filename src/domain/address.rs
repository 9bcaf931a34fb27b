//! Address input validation
//!
//! A candidate string only becomes a query argument when it is a
//! `0x`-prefixed, 42-character hex address. Anything else is treated as
//! absent: the dependent query is simply not issued.

use alloy_primitives::Address;

/// Parse user input into an address, or `None` if it is not well formed.
/// Mixed-case input is accepted without checksum enforcement.
pub fn normalize(input: &str) -> Option<Address> {
    let trimmed = input.trim();
    if !trimmed.starts_with("0x") || trimmed.len() != 42 {
        return None;
    }
    trimmed.parse::<Address>().ok()
}
