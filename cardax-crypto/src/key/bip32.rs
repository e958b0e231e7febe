//! Ed25519-BIP32 hierarchical-deterministic key derivation.
//!
//! A thin, typed wrapper around the [`ed25519_bip32`] crate, in the same
//! spirit as [`super::ed25519`]: newtypes over the wire byte layout, with
//! construction, derivation, signing and chain-code access exposed through
//! inherent methods instead of the upstream crate's own surface directly.

use crate::key::ed25519::{self, SecretKeyExtended};
use ed25519_bip32::{DerivationError, DerivationScheme, PrivateKeyError, XPrv, XPub};
use thiserror::Error;

const DERIVATION_SCHEME: DerivationScheme = DerivationScheme::V2;

/// PBKDF2-HMAC-SHA512 iteration count used to stretch BIP39 entropy into a
/// 96-byte extended master key.
const MASTER_KEY_PBKDF2_ITERATIONS: u32 = 4096;

/// Index at and above which a derivation is "hardened": it requires the
/// parent private key and cannot be replicated from the parent public key
/// alone.
pub const HARDENED_INDEX_START: u32 = 0x8000_0000;

/// A 96-byte extended Ed25519 private key: scalar (32) ‖ nonce (32) ‖ chain
/// code (32).
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedPrivateKey(XPrv);

/// A 64-byte extended Ed25519 public key: curve point (32) ‖ chain code
/// (32).
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedPublicKey(XPub);

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid size for an extended bip32 private key, expecting {}", ExtendedPrivateKey::SIZE)]
    InvalidPrivateKeySize,
    #[error("invalid size for an extended bip32 public key, expecting {}", ExtendedPublicKey::SIZE)]
    InvalidPublicKeySize,
    #[error("extended private key failed validation: {0}")]
    InvalidPrivateKey(PrivateKeyError),
    #[error("hardened index passed to public-only derivation: {0}")]
    InvalidDerivationIndex(DerivationError),
}

impl From<DerivationError> for Error {
    fn from(value: DerivationError) -> Self {
        Error::InvalidDerivationIndex(value)
    }
}

impl ExtendedPrivateKey {
    pub const SIZE: usize = 96;

    /// Derive a master extended private key from BIP39 entropy and an
    /// optional passphrase, via PBKDF2-HMAC-SHA512 (4096 iterations,
    /// matching the Cardano-Byron/Icarus master-key derivation).
    pub fn from_entropy(entropy: &[u8], passphrase: &[u8]) -> Self {
        use cryptoxide::{hmac::Hmac, pbkdf2::pbkdf2, sha2::Sha512};

        let mut out = [0u8; Self::SIZE];
        let mut mac = Hmac::new(Sha512::new(), passphrase);
        pbkdf2(&mut mac, entropy, MASTER_KEY_PBKDF2_ITERATIONS, &mut out);

        ExtendedPrivateKey(XPrv::normalize_bytes_force3rd(out))
    }

    /// Construct from raw bytes, validating clamping/structure.
    pub fn from_bytes(bytes: [u8; Self::SIZE]) -> Result<Self, Error> {
        XPrv::from_bytes_verified(bytes)
            .map(ExtendedPrivateKey)
            .map_err(Error::InvalidPrivateKey)
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(self.0.as_ref());
        out
    }

    /// Derive a child key at `index`. Hardened when `index >=
    /// [`HARDENED_INDEX_START`].
    pub fn derive(&self, index: u32) -> Self {
        ExtendedPrivateKey(self.0.derive(DERIVATION_SCHEME, index))
    }

    pub fn public(&self) -> ExtendedPublicKey {
        ExtendedPublicKey(self.0.public())
    }

    pub fn chain_code(&self) -> [u8; 32] {
        *self.0.chain_code()
    }

    /// The underlying scalar+nonce pair, usable for signing directly.
    ///
    /// # Safety
    ///
    /// Constructing [`SecretKeyExtended`] this way skips its own bit-tweak
    /// check; this is sound here because the bytes already passed
    /// [`XPrv`]'s own validation on construction/derivation.
    pub fn secret_key_extended(&self) -> SecretKeyExtended {
        let mut scalar_and_nonce = [0u8; 64];
        scalar_and_nonce.copy_from_slice(&self.0.as_ref()[0..64]);
        unsafe { SecretKeyExtended::from_bytes_unchecked(scalar_and_nonce) }
    }

    pub fn sign<T: AsRef<[u8]>>(&self, msg: T) -> ed25519::Signature {
        self.secret_key_extended().sign(msg)
    }
}

impl ExtendedPublicKey {
    pub const SIZE: usize = 64;

    pub fn from_bytes(bytes: [u8; Self::SIZE]) -> Self {
        ExtendedPublicKey(XPub::from_bytes(bytes))
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(self.0.as_ref());
        out
    }

    /// Derive a child public key. Fails with
    /// [`Error::InvalidDerivationIndex`] if `index` is hardened, since a
    /// hardened child cannot be derived from a public key alone.
    pub fn derive(&self, index: u32) -> Result<Self, Error> {
        self.0
            .derive(DERIVATION_SCHEME, index)
            .map(ExtendedPublicKey)
            .map_err(Error::from)
    }

    pub fn chain_code(&self) -> [u8; 32] {
        *self.0.chain_code()
    }

    pub fn to_ed25519_public_key(&self) -> ed25519::PublicKey {
        self.0.public_key().into()
    }

    pub fn verify<T: AsRef<[u8]>>(&self, msg: T, signature: &ed25519::Signature) -> bool {
        self.to_ed25519_public_key().verify(msg, signature)
    }
}

impl std::fmt::Debug for ExtendedPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtendedPrivateKey").finish_non_exhaustive()
    }
}

impl std::fmt::Debug for ExtendedPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ExtendedPublicKey")
            .field(&hex::encode(self.0.as_ref()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_key_from_entropy_is_deterministic() {
        let entropy = [0u8; 16];
        let a = ExtendedPrivateKey::from_entropy(&entropy, b"");
        let b = ExtendedPrivateKey::from_entropy(&entropy, b"");
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn soft_derivation_public_private_agree() {
        let master = ExtendedPrivateKey::from_entropy(&[0u8; 16], b"");

        let child_priv = master.derive(0);
        let child_pub_from_priv = child_priv.public();

        let child_pub_from_pub = master.public().derive(0).unwrap();

        assert_eq!(child_pub_from_priv.to_bytes(), child_pub_from_pub.to_bytes());
    }

    #[test]
    fn hardened_index_rejected_for_public_derivation() {
        let master = ExtendedPrivateKey::from_entropy(&[0u8; 16], b"");

        let err = master.public().derive(HARDENED_INDEX_START).unwrap_err();
        assert!(matches!(err, Error::InvalidDerivationIndex(_)));
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let master = ExtendedPrivateKey::from_entropy(&[1u8; 16], b"");
        let child = master.derive(7);
        let msg = b"hello cardax";

        let signature = child.sign(msg);
        assert!(child.public().verify(msg, &signature));
    }
}
