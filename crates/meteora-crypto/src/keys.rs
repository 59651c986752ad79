use ed25519_dalek::{SECRET_KEY_LENGTH, Signer, SigningKey};
use meteora_types::{Content, Message};
use rand_core::OsRng;
use thiserror::Error;

use crate::codec::{CodecError, encode};
use crate::integrity::compute_id;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("signing key is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("signing key must be 32 bytes, got {0}")]
    Length(usize),
}

/// Generate a fresh Ed25519 signing key.
pub fn generate_signing_key() -> SigningKey {
    SigningKey::generate(&mut OsRng)
}

/// Encode the 32-byte seed of a signing key as hex.
pub fn signing_key_to_hex(key: &SigningKey) -> String {
    hex::encode(key.to_bytes())
}

/// Decode a hex seed produced by [`signing_key_to_hex`].
pub fn signing_key_from_hex(encoded: &str) -> Result<SigningKey, KeyError> {
    let seed: [u8; SECRET_KEY_LENGTH] = hex::decode(encoded.trim())?
        .try_into()
        .map_err(|bytes: Vec<u8>| KeyError::Length(bytes.len()))?;
    Ok(SigningKey::from_bytes(&seed))
}

/// Hex form of the public half, as carried in `Message::pubkey`.
pub fn public_key_hex(key: &SigningKey) -> String {
    hex::encode(key.verifying_key().to_bytes())
}

/// Content stamped with the current time in epoch seconds.
pub fn content_now(text: impl Into<String>) -> Content {
    Content::new(chrono::Utc::now().timestamp(), text)
}

/// Build a ready-to-send message: content address first, then the signature
/// over the same canonical bytes.
pub fn seal(content: Content, key: &SigningKey) -> Result<Message, CodecError> {
    let sig = key.sign(&encode(&content)?);
    Ok(Message {
        id: compute_id(&content)?,
        pubkey: public_key_hex(key),
        sig: hex::encode(sig.to_bytes()),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrity::{validate, verify};

    #[test]
    fn sealed_message_validates() {
        let key = generate_signing_key();
        let message = seal(Content::new(1700000000, "hello"), &key).unwrap();
        assert_eq!(message.id, compute_id(&message.content).unwrap());
        assert!(verify(&message.content, &message.pubkey, &message.sig));
        assert!(validate(&message).is_ok());
    }

    #[test]
    fn another_key_does_not_verify() {
        let message = seal(Content::new(1, "mine"), &generate_signing_key()).unwrap();
        let other = public_key_hex(&generate_signing_key());
        assert!(!verify(&message.content, &other, &message.sig));
    }

    #[test]
    fn hex_roundtrip_keeps_key() {
        let key = generate_signing_key();
        let restored = signing_key_from_hex(&format!("{}\n", signing_key_to_hex(&key))).unwrap();
        assert_eq!(restored.to_bytes(), key.to_bytes());
    }

    #[test]
    fn bad_seed_is_rejected() {
        assert!(matches!(signing_key_from_hex("nothex"), Err(KeyError::Hex(_))));
        assert!(matches!(signing_key_from_hex("abcd"), Err(KeyError::Length(2))));
    }

    #[test]
    fn content_now_is_recent() {
        let content = content_now("tick");
        assert!(content.created_at > 1_600_000_000);
        assert_eq!(content.text, "tick");
    }
}
