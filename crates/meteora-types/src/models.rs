use serde::{Deserialize, Serialize};

/// The signed part of a message. The canonical encoding writes fields in
/// declaration order, so reordering them changes every id and signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Content {
    #[serde(rename = "timestamp")]
    pub created_at: i64,
    pub text: String,
}

impl Content {
    pub fn new(created_at: i64, text: impl Into<String>) -> Self {
        Self {
            created_at,
            text: text.into(),
        }
    }
}

/// A relayed message. `id` is the content address of `content`; `pubkey` and
/// `sig` are hex-encoded Ed25519 key and signature bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: Content,
    pub pubkey: String,
    pub sig: String,
}

/// A slice of history, newest first.
pub type Page = Vec<Message>;
