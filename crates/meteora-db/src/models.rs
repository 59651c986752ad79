use meteora_types::{Content, Message};

/// One row of the `messages` table. Flat, unlike the nested wire `Message`.
pub struct MessageRow {
    pub id: String,
    pub created_at: i64,
    pub text: String,
    pub pubkey: String,
    pub sig: String,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            content: Content {
                created_at: row.created_at,
                text: row.text,
            },
            pubkey: row.pubkey,
            sig: row.sig,
        }
    }
}
