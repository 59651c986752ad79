use meteora_types::Message;
use rusqlite::{Connection, OptionalExtension, Row, ffi};
use tracing::debug;

use crate::models::MessageRow;
use crate::{Database, Result, StoreError};

impl Database {
    // -- Writes --

    /// Insert a message. A second insert of the same id fails with
    /// `DuplicateId` and leaves the table untouched.
    pub fn insert_message(&self, message: &Message) -> Result<()> {
        self.with_conn(|conn| insert(conn, message))
    }

    /// Insert `message`, then read the newest `limit` messages, under one hold
    /// of the lock. The returned page always reflects the insert.
    pub fn submit(&self, message: &Message, limit: i64) -> Result<Vec<Message>> {
        check_range(limit, 0)?;
        self.with_conn(|conn| {
            insert(conn, message)?;
            query_page(conn, limit, 0)
        })
    }

    // -- Reads --

    /// Up to `limit` messages, newest first, skipping `offset`. Equal
    /// timestamps are ordered by id.
    pub fn select_page(&self, limit: i64, offset: i64) -> Result<Vec<Message>> {
        check_range(limit, offset)?;
        self.with_conn(|conn| query_page(conn, limit, offset))
    }

    pub fn select_by_id(&self, id: &str) -> Result<Option<Message>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, created_at, text, pubkey, sig FROM messages WHERE id = ?1",
                    [id],
                    map_row,
                )
                .optional()?;
            Ok(row.map(Message::from))
        })
    }

    pub fn count_messages(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }
}

fn check_range(limit: i64, offset: i64) -> Result<()> {
    if limit < 1 || offset < 0 {
        return Err(StoreError::InvalidRange { limit, offset });
    }
    Ok(())
}

fn insert(conn: &Connection, message: &Message) -> Result<()> {
    let inserted = conn.execute(
        "INSERT INTO messages (id, created_at, text, pubkey, sig) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            message.id,
            message.content.created_at,
            message.content.text,
            message.pubkey,
            message.sig
        ],
    );

    match inserted {
        Ok(_) => {
            debug!("Stored message {}", message.id);
            Ok(())
        }
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            Err(StoreError::DuplicateId(message.id.clone()))
        }
        Err(e) => Err(e.into()),
    }
}

fn query_page(conn: &Connection, limit: i64, offset: i64) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, created_at, text, pubkey, sig
         FROM messages
         ORDER BY created_at DESC, id ASC
         LIMIT ?1 OFFSET ?2",
    )?;

    let rows = stmt
        .query_map(rusqlite::params![limit, offset], map_row)?
        .map(|row| row.map(Message::from))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        created_at: row.get(1)?,
        text: row.get(2)?,
        pubkey: row.get(3)?,
        sig: row.get(4)?,
    })
}
