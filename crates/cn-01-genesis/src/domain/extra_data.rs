//! Clique extraData codec.
//!
//! ```text
//! ┌──────────────┬───────────────────────────┬──────────────┐
//! │ vanity (32)  │ signer addresses (20 × V) │ seal (65)    │
//! └──────────────┴───────────────────────────┴──────────────┘
//! ```
//!
//! In genesis the vanity and seal are all zeroes.

use shared_types::Address;

use crate::error::{GenesisError, Result};

/// Vanity prefix length.
pub const EXTRA_VANITY_LEN: usize = 32;

/// Seal (signature placeholder) length.
pub const EXTRA_SEAL_LEN: usize = 65;

/// Byte length of extraData for `validators` signers.
pub const fn extra_data_len(validators: usize) -> usize {
    EXTRA_VANITY_LEN + Address::LEN * validators + EXTRA_SEAL_LEN
}

/// Encode the signer list in the given order.
pub fn encode_extra_data(validators: &[Address]) -> Vec<u8> {
    let mut extra = Vec::with_capacity(extra_data_len(validators.len()));
    extra.extend_from_slice(&[0u8; EXTRA_VANITY_LEN]);
    for validator in validators {
        extra.extend_from_slice(validator.as_bytes());
    }
    extra.extend_from_slice(&[0u8; EXTRA_SEAL_LEN]);
    extra
}

/// Recover the signer list from extraData bytes.
pub fn decode_extra_data(extra: &[u8]) -> Result<Vec<Address>> {
    let fixed = EXTRA_VANITY_LEN + EXTRA_SEAL_LEN;
    if extra.len() < fixed {
        return Err(GenesisError::MalformedExtraData(format!(
            "{} bytes is shorter than vanity and seal",
            extra.len()
        )));
    }
    let signers = &extra[EXTRA_VANITY_LEN..extra.len() - EXTRA_SEAL_LEN];
    if signers.len() % Address::LEN != 0 {
        return Err(GenesisError::MalformedExtraData(format!(
            "signer section of {} bytes is not a multiple of {}",
            signers.len(),
            Address::LEN
        )));
    }

    Ok(signers
        .chunks_exact(Address::LEN)
        .map(|chunk| {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(chunk);
            Address::new(bytes)
        })
        .collect())
}

/// `0x`-prefixed lowercase hex of extraData.
pub fn extra_data_hex(validators: &[Address]) -> String {
    format!("0x{}", hex::encode(encode_extra_data(validators)))
}
