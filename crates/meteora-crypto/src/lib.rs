/// Meteora Crypto Library
///
/// Canonical content encoding, content addressing (SHA-256) and Ed25519
/// signature checks shared by the relay and its clients.
///
/// The relay builds this crate without the `client` feature: it only ever
/// verifies, it never holds a signing key.

pub mod codec;
pub mod integrity;

#[cfg(feature = "client")]
pub mod keys;

pub use codec::{CodecError, decode, encode};
pub use integrity::{VerifyError, check_signature, compute_id, validate, verify};
