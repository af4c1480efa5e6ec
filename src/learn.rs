//! Field-frequency learning store: which field names actually show up in
//! this user's inputs, and how often. Statistics only; a failure here
//! never blocks a save.

use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;

use crate::record::ExtractedRecord;

const DB_FILE: &str = "learning.sqlite";

pub fn connect(dir: &Path) -> Result<Connection> {
    std::fs::create_dir_all(dir)?;
    let conn = Connection::open(dir.join(DB_FILE))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS field_stats (
            name       TEXT PRIMARY KEY,
            seen       INTEGER NOT NULL DEFAULT 0,
            first_seen TEXT NOT NULL DEFAULT (datetime('now')),
            last_seen  TEXT
        );
        ",
    )?;
    Ok(())
}

/// Bump the observation count for every field in the record.
pub fn record_fields(conn: &Connection, record: &ExtractedRecord) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO field_stats (name, seen, last_seen)
             VALUES (?1, 1, datetime('now'))
             ON CONFLICT(name) DO UPDATE SET
                 seen = seen + 1,
                 last_seen = datetime('now')",
        )?;
        for name in record.field_names() {
            stmt.execute(rusqlite::params![name])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub struct FieldStat {
    pub name: String,
    pub seen: i64,
    pub first_seen: String,
}

pub fn field_stats(conn: &Connection) -> Result<Vec<FieldStat>> {
    let mut stmt = conn.prepare(
        "SELECT name, seen, first_seen FROM field_stats ORDER BY seen DESC, name",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(FieldStat {
                name: row.get(0)?,
                seen: row.get(1)?,
                first_seen: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> ExtractedRecord {
        let mut r = ExtractedRecord::new();
        for f in fields {
            r.set(*f, "x");
        }
        r
    }

    #[test]
    fn counts_accumulate_across_records() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        record_fields(&conn, &record(&["Name", "Phone"])).unwrap();
        record_fields(&conn, &record(&["Name", "Gst No"])).unwrap();

        let stats = field_stats(&conn).unwrap();
        let seen = |n: &str| stats.iter().find(|s| s.name == n).map(|s| s.seen);
        assert_eq!(seen("Name"), Some(2));
        assert_eq!(seen("Phone"), Some(1));
        assert_eq!(seen("Gst No"), Some(1));
        // highest count first
        assert_eq!(stats[0].name, "Name");
    }
}
