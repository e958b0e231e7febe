pub mod bip32;
pub mod ed25519;
