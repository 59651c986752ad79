use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            created_at  INTEGER NOT NULL,
            text        TEXT NOT NULL,
            pubkey      TEXT NOT NULL,
            sig         TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_created
            ON messages(created_at DESC, id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
