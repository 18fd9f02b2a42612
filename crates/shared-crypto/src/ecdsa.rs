//! # ECDSA Keys (secp256k1)
//!
//! Account keypairs as used by Ethereum clients.
//!
//! ## Derivations
//!
//! - Node public key: uncompressed SEC1 point without the `0x04` prefix
//!   (64 bytes). This is also the enode node id.
//! - Account address: last 20 bytes of `keccak256(public_key)`.

use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};
use shared_types::Address;
use zeroize::{Zeroize, Zeroizing};

use crate::CryptoError;

/// Uncompressed secp256k1 public key without the SEC1 tag byte.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NodePublicKey([u8; 64]);

impl NodePublicKey {
    /// Wrap raw bytes, checking they are a point on the curve.
    pub fn from_bytes(bytes: [u8; 64]) -> Result<Self, CryptoError> {
        let mut sec1 = [0u8; 65];
        sec1[0] = 0x04;
        sec1[1..].copy_from_slice(&bytes);
        VerifyingKey::from_sec1_bytes(&sec1).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Parse 128 hex characters, `0x` optional.
    pub fn from_hex(raw: &str) -> Result<Self, CryptoError> {
        let raw = raw.trim();
        let digits = raw.strip_prefix("0x").unwrap_or(raw);
        let bytes = hex::decode(digits).map_err(|_| CryptoError::InvalidHex(raw.to_string()))?;
        let bytes: [u8; 64] = bytes.try_into().map_err(|_| CryptoError::InvalidPublicKey)?;
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Lowercase hex without `0x`; usable as an enode node id.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Account address controlled by this key.
    pub fn to_address(&self) -> Address {
        let hash = Keccak256::digest(self.0);
        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..32]);
        Address::new(address)
    }
}

impl std::fmt::Debug for NodePublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodePublicKey({}…)", &self.to_hex()[..16])
    }
}

/// secp256k1 keypair.
///
/// The signing key is wiped from memory on drop.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate a random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Parse a hex secret, `0x` optional.
    pub fn from_hex(raw: &str) -> Result<Self, CryptoError> {
        let raw = raw.trim();
        let digits = raw.strip_prefix("0x").unwrap_or(raw);
        let bytes = Zeroizing::new(
            hex::decode(digits).map_err(|_| CryptoError::InvalidHex("<secret>".to_string()))?,
        );
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        Self::from_bytes(bytes)
    }

    /// Public key in node-id form.
    pub fn public_key(&self) -> NodePublicKey {
        let point = self.signing_key.verifying_key().as_affine().to_encoded_point(false);
        // Uncompressed SEC1 encoding is always 0x04 || x || y.
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&point.as_bytes()[1..65]);
        NodePublicKey(bytes)
    }

    /// Account address of this keypair.
    pub fn address(&self) -> Address {
        self.public_key().to_address()
    }

    /// Secret as lowercase hex without `0x`.
    pub fn secret_hex(&self) -> Zeroizing<String> {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        let encoded = Zeroizing::new(hex::encode(bytes));
        bytes.zeroize();
        encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development accounts (mnemonic "test test ... junk").
    const DEV_SECRET_0: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS_0: &str = "f39fd6e51aad88f6f4ce6ab8827279cfffb92266";
    const DEV_SECRET_1: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const DEV_ADDRESS_1: &str = "70997970c51812dc3a010c7d01b50e0d17dc79c8";

    #[test]
    fn test_known_address_derivation() {
        let keypair = Secp256k1KeyPair::from_hex(DEV_SECRET_0).unwrap();
        assert_eq!(keypair.address().to_hex(), DEV_ADDRESS_0);

        let keypair = Secp256k1KeyPair::from_hex(&format!("0x{}", DEV_SECRET_1)).unwrap();
        assert_eq!(keypair.address().to_hex(), DEV_ADDRESS_1);
    }

    #[test]
    fn test_secret_hex_roundtrip() {
        let keypair = Secp256k1KeyPair::generate();
        let restored = Secp256k1KeyPair::from_hex(&keypair.secret_hex()).unwrap();
        assert_eq!(keypair.public_key(), restored.public_key());
        assert_eq!(keypair.secret_hex().len(), 64);
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let keypair = Secp256k1KeyPair::generate();
        let public_key = keypair.public_key();
        assert_eq!(public_key.to_hex().len(), 128);
        let parsed = NodePublicKey::from_hex(&public_key.to_hex()).unwrap();
        assert_eq!(parsed, public_key);
        assert_eq!(parsed.to_address(), keypair.address());
    }

    #[test]
    fn test_rejects_invalid_secrets() {
        assert!(matches!(
            Secp256k1KeyPair::from_bytes([0u8; 32]),
            Err(CryptoError::InvalidPrivateKey)
        ));
        assert!(Secp256k1KeyPair::from_hex("abcd").is_err());
        assert!(Secp256k1KeyPair::from_hex("not hex").is_err());
    }

    #[test]
    fn test_rejects_point_off_curve() {
        assert!(NodePublicKey::from_bytes([0x01u8; 64]).is_err());
    }
}
