//! # Shared Crypto - Node Key Material
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `ecdsa` | secp256k1 keypairs, node public keys, address derivation |
//! | `key_material` | Per-node `key` / `address` / `publicKey` artifacts |
//!
//! Keys are generated once per node and reused on every later run: the
//! genesis signer list and prefunded balances are derived from them.

#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod key_material;

// Re-exports
pub use ecdsa::{NodePublicKey, Secp256k1KeyPair};
pub use errors::CryptoError;
pub use key_material::{read_public_key, KeyMaterial, ADDRESS_FILE, KEY_FILE, PUBLIC_KEY_FILE};
