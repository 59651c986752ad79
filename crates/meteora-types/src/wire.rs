//! Frame shapes exchanged over a session.
//!
//! Inbound frames are parsed into these strict shapes first and only then
//! turned into domain values, so a partially matching payload never becomes
//! a `Message`.

use serde::Deserialize;

use crate::models::{Content, Message};

// -- Submit --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitFrame {
    pub id: String,
    pub content: Content,
    pub pubkey: String,
    pub sig: String,
}

impl SubmitFrame {
    pub fn parse(raw: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(raw)
    }
}

impl From<SubmitFrame> for Message {
    fn from(frame: SubmitFrame) -> Self {
        Message {
            id: frame.id,
            content: frame.content,
            pubkey: frame.pubkey,
            sig: frame.sig,
        }
    }
}

// -- Replies --

/// Serialize a page as the JSON array sent back to a peer.
pub fn encode_page(page: &[Message]) -> serde_json::Result<String> {
    serde_json::to_string(page)
}
