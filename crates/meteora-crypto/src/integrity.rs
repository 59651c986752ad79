use ed25519_dalek::{PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH, Signature, Verifier, VerifyingKey};
use meteora_types::{Content, Message};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::codec::{CodecError, encode};

/// Why a message was refused. Every variant counts as a failed verification;
/// the distinction only feeds logs.
#[derive(Debug, Error, PartialEq)]
pub enum VerifyError {
    #[error("public key is not valid hex: {0}")]
    PubkeyHex(hex::FromHexError),

    #[error("public key must be 32 bytes, got {0}")]
    PubkeyLength(usize),

    #[error("public key is not a valid Ed25519 point")]
    PubkeyInvalid,

    #[error("signature is not valid hex: {0}")]
    SigHex(hex::FromHexError),

    #[error("signature must be 64 bytes, got {0}")]
    SigLength(usize),

    #[error("signature does not match content")]
    Mismatch,

    #[error("content could not be encoded: {0}")]
    Encoding(String),

    #[error("id {got} is not the content address {expected}")]
    IdMismatch { expected: String, got: String },
}

/// Content address: lowercase hex SHA-256 of the canonical encoding.
pub fn compute_id(content: &Content) -> Result<String, CodecError> {
    Ok(hex::encode(Sha256::digest(encode(content)?)))
}

/// Check `sig_hex` over the canonical encoding of `content` with `pubkey_hex`.
pub fn check_signature(content: &Content, pubkey_hex: &str, sig_hex: &str) -> Result<(), VerifyError> {
    let pubkey_bytes: [u8; PUBLIC_KEY_LENGTH] = hex::decode(pubkey_hex)
        .map_err(VerifyError::PubkeyHex)?
        .try_into()
        .map_err(|bytes: Vec<u8>| VerifyError::PubkeyLength(bytes.len()))?;
    let key = VerifyingKey::from_bytes(&pubkey_bytes).map_err(|_| VerifyError::PubkeyInvalid)?;

    let sig_bytes: [u8; SIGNATURE_LENGTH] = hex::decode(sig_hex)
        .map_err(VerifyError::SigHex)?
        .try_into()
        .map_err(|bytes: Vec<u8>| VerifyError::SigLength(bytes.len()))?;
    let sig = Signature::from_bytes(&sig_bytes);

    let bytes = encode(content).map_err(|e| VerifyError::Encoding(e.to_string()))?;
    key.verify(&bytes, &sig).map_err(|_| VerifyError::Mismatch)
}

/// Fail-closed boolean form of [`check_signature`].
pub fn verify(content: &Content, pubkey_hex: &str, sig_hex: &str) -> bool {
    match check_signature(content, pubkey_hex, sig_hex) {
        Ok(()) => true,
        Err(e) => {
            debug!("Signature check failed: {}", e);
            false
        }
    }
}

/// Gate for an inbound message: the id must be the content address and the
/// signature must verify.
pub fn validate(message: &Message) -> Result<(), VerifyError> {
    let expected = compute_id(&message.content).map_err(|e| VerifyError::Encoding(e.to_string()))?;
    if expected != message.id {
        return Err(VerifyError::IdMismatch {
            expected,
            got: message.id.clone(),
        });
    }
    check_signature(&message.content, &message.pubkey, &message.sig)
}
