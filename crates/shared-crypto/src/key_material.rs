//! # Node Key Material
//!
//! Each node directory holds three artifacts:
//!
//! | File | Content |
//! |------|---------|
//! | `key` | private key, hex, no `0x`, no trailing newline |
//! | `address` | account address, hex, no `0x` |
//! | `publicKey` | 64-byte public key, hex, no `0x` |
//!
//! `key` is authoritative; the other two are derived and checked on load.

use std::fs;
use std::path::Path;

use shared_types::Address;
use tracing::{debug, info};

use crate::ecdsa::{NodePublicKey, Secp256k1KeyPair};
use crate::CryptoError;

/// Private key file name.
pub const KEY_FILE: &str = "key";
/// Address file name.
pub const ADDRESS_FILE: &str = "address";
/// Public key file name.
pub const PUBLIC_KEY_FILE: &str = "publicKey";

/// A node's account keypair with its derived identities.
pub struct KeyMaterial {
    keypair: Secp256k1KeyPair,
    public_key: NodePublicKey,
    address: Address,
}

impl KeyMaterial {
    pub fn from_keypair(keypair: Secp256k1KeyPair) -> Self {
        let public_key = keypair.public_key();
        let address = public_key.to_address();
        Self {
            keypair,
            public_key,
            address,
        }
    }

    /// Fresh random key material.
    pub fn generate() -> Self {
        Self::from_keypair(Secp256k1KeyPair::generate())
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> NodePublicKey {
        self.public_key
    }

    pub fn keypair(&self) -> &Secp256k1KeyPair {
        &self.keypair
    }

    /// Whether `dir` already holds a private key.
    pub fn exists(dir: &Path) -> bool {
        dir.join(KEY_FILE).is_file()
    }

    /// Write all artifacts into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<(), CryptoError> {
        fs::create_dir_all(dir).map_err(|e| CryptoError::io(dir, e))?;

        let key_path = dir.join(KEY_FILE);
        fs::write(&key_path, self.keypair.secret_hex().as_bytes())
            .map_err(|e| CryptoError::io(&key_path, e))?;
        restrict_permissions(&key_path)?;

        let address_path = dir.join(ADDRESS_FILE);
        fs::write(&address_path, self.address.to_hex())
            .map_err(|e| CryptoError::io(&address_path, e))?;

        let public_key_path = dir.join(PUBLIC_KEY_FILE);
        fs::write(&public_key_path, self.public_key.to_hex())
            .map_err(|e| CryptoError::io(&public_key_path, e))?;

        debug!(dir = %dir.display(), address = %self.address, "Key material written");
        Ok(())
    }

    /// Load key material from `dir`, verifying the derived artifacts.
    ///
    /// Missing `address`/`publicKey` files are recreated.
    pub fn load(dir: &Path) -> Result<Self, CryptoError> {
        let key_path = dir.join(KEY_FILE);
        let secret = fs::read_to_string(&key_path).map_err(|e| CryptoError::io(&key_path, e))?;
        let material = Self::from_keypair(Secp256k1KeyPair::from_hex(&secret)?);

        let address_path = dir.join(ADDRESS_FILE);
        match fs::read_to_string(&address_path) {
            Ok(raw) => {
                let found = Address::from_hex(&raw).map_err(|_| CryptoError::ArtifactMismatch {
                    path: address_path.clone(),
                    expected: material.address.to_hex(),
                    found: raw.trim().to_string(),
                })?;
                if found != material.address {
                    return Err(CryptoError::ArtifactMismatch {
                        path: address_path,
                        expected: material.address.to_hex(),
                        found: found.to_hex(),
                    });
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                fs::write(&address_path, material.address.to_hex())
                    .map_err(|e| CryptoError::io(&address_path, e))?;
            }
            Err(e) => return Err(CryptoError::io(&address_path, e)),
        }

        let public_key_path = dir.join(PUBLIC_KEY_FILE);
        if !public_key_path.is_file() {
            fs::write(&public_key_path, material.public_key.to_hex())
                .map_err(|e| CryptoError::io(&public_key_path, e))?;
        }

        Ok(material)
    }

    /// Reuse the key in `dir` if present, otherwise generate and persist one.
    ///
    /// Returns the material and whether it was freshly generated.
    pub fn load_or_generate(dir: &Path) -> Result<(Self, bool), CryptoError> {
        if Self::exists(dir) {
            let material = Self::load(dir)?;
            debug!(dir = %dir.display(), address = %material.address, "Reusing existing key material");
            return Ok((material, false));
        }
        let material = Self::generate();
        material.write_to(dir)?;
        info!(dir = %dir.display(), address = %material.address, "Generated node key material");
        Ok((material, true))
    }
}

/// Read just the public key artifact of a node directory.
pub fn read_public_key(dir: &Path) -> Result<NodePublicKey, CryptoError> {
    let path = dir.join(PUBLIC_KEY_FILE);
    let raw = fs::read_to_string(&path).map_err(|e| CryptoError::io(&path, e))?;
    NodePublicKey::from_hex(&raw)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), CryptoError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| CryptoError::io(path, e))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), CryptoError> {
    Ok(())
}
