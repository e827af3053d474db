use rusqlite::{params, Connection, OptionalExtension};

// ── Session key/value ──

pub fn get_session_value(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM session WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

pub fn set_session_value(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO session (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value],
    )?;
    Ok(())
}

pub fn delete_session_value(conn: &Connection, key: &str) -> anyhow::Result<bool> {
    let rows = conn.execute("DELETE FROM session WHERE key = ?1", params![key])?;
    Ok(rows > 0)
}
