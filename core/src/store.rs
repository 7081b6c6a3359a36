//! SQLite event log and snapshot store.
//!
//! RULE: Only store.rs talks to the database.
//! The engine calls store methods — nothing else executes SQL.
//! The store records one run for auditing and replay checks; sessions are
//! never resumed from it.

use crate::{
    error::{SimError, SimResult},
    event::EventLogEntry,
    types::Tick,
};
use rusqlite::{params, Connection, OptionalExtension};

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the event database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files; in-memory databases ignore it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests and by default).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn.execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str) -> SimResult<()> {
        let started_at = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![run_id, seed as i64, version, started_at],
        )?;
        Ok(())
    }

    pub fn run_exists(&self, run_id: &str) -> SimResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM run WHERE run_id = ?1", params![run_id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    /// Fail with `RunNotInitialized` unless `insert_run` was called for `run_id`.
    pub fn require_run(&self, run_id: &str) -> SimResult<()> {
        if self.run_exists(run_id)? {
            Ok(())
        } else {
            Err(SimError::RunNotInitialized)
        }
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, tick, subsystem, event_type, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.run_id,
                entry.tick as i64,
                entry.subsystem,
                entry.event_type,
                entry.payload,
            ],
        )?;
        Ok(())
    }

    pub fn events_for_tick(&self, run_id: &str, tick: Tick) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, tick, subsystem, event_type, payload
             FROM event_log WHERE run_id = ?1 AND tick = ?2
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id, tick as i64], |row| {
                Ok(EventLogEntry {
                    id:         Some(row.get(0)?),
                    run_id:     row.get(1)?,
                    tick:       row.get::<_, i64>(2)? as u64,
                    subsystem:  row.get(3)?,
                    event_type: row.get(4)?,
                    payload:    row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, run_id: &str, event_type: &str) -> SimResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE run_id = ?1 AND event_type = ?2",
            params![run_id, event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Snapshot ───────────────────────────────────────────────

    pub fn save_snapshot(&self, run_id: &str, tick: Tick, state_json: &str) -> SimResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO snapshot (run_id, tick, state_json) VALUES (?1, ?2, ?3)",
            params![run_id, tick as i64, state_json],
        )?;
        Ok(())
    }

    pub fn latest_snapshot_before(
        &self,
        run_id: &str,
        tick: Tick,
    ) -> SimResult<Option<(Tick, String)>> {
        let result = self
            .conn
            .query_row(
                "SELECT tick, state_json FROM snapshot
                 WHERE run_id = ?1 AND tick <= ?2
                 ORDER BY tick DESC LIMIT 1",
                params![run_id, tick as i64],
                |row| Ok((row.get::<_, i64>(0)? as u64, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SimStore {
        let store = SimStore::in_memory().unwrap();
        store.migrate().unwrap();
        store
    }

    fn entry(tick: Tick, event_type: &str) -> EventLogEntry {
        EventLogEntry {
            id: None,
            run_id: "store-test".into(),
            tick,
            subsystem: "engine".into(),
            event_type: event_type.into(),
            payload: "{}".into(),
        }
    }

    #[test]
    fn events_come_back_in_insertion_order() {
        let store = store();
        store.insert_run("store-test", 1, "test").unwrap();
        store.append_event(&entry(3, "tick_started")).unwrap();
        store.append_event(&entry(3, "tick_completed")).unwrap();
        store.append_event(&entry(4, "tick_started")).unwrap();

        let tick3 = store.events_for_tick("store-test", 3).unwrap();
        let types: Vec<_> = tick3.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(types, ["tick_started", "tick_completed"]);
        assert_eq!(store.event_count("store-test", "tick_started").unwrap(), 2);
    }

    #[test]
    fn events_require_a_registered_run() {
        let store = store();
        assert!(matches!(store.require_run("nobody"), Err(SimError::RunNotInitialized)));
        assert!(store.append_event(&entry(1, "tick_started")).is_err(), "foreign key enforced");
    }

    #[test]
    fn latest_snapshot_respects_the_tick_bound() {
        let store = store();
        store.insert_run("store-test", 1, "test").unwrap();
        store.save_snapshot("store-test", 24, "{\"day\":2}").unwrap();
        store.save_snapshot("store-test", 48, "{\"day\":3}").unwrap();
        assert_eq!(store.latest_snapshot_before("store-test", 47).unwrap().map(|s| s.0), Some(24));
        assert_eq!(store.latest_snapshot_before("store-test", 10).unwrap(), None);
    }
}
