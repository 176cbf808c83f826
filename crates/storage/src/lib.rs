#![forbid(unsafe_code)]

use rusqlite::{Connection, OptionalExtension, Transaction, params};
use serde_json::Value;
use sq_core::model::{QuestRecord, StatsRecord};
use std::path::Path;

pub const CONFIG_KEY: &str = "global_config";
pub const SUMMARY_KEY: &str = "analytics_summary";

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    Json(serde_json::Error),
    InvalidInput(&'static str),
    UnknownId,
    IdConflict,
    VersionMismatch { expected: i64, actual: i64 },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::Json(err) => write!(f, "json: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::UnknownId => write!(f, "unknown id"),
            Self::IdConflict => write!(f, "id already exists"),
            Self::VersionMismatch { expected, actual } => {
                write!(f, "version mismatch (expected={expected}, actual={actual})")
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Stored quest: canonical record plus version counter and audit metadata,
/// all stamped by this layer.
#[derive(Clone, Debug)]
pub struct QuestRow {
    pub record: QuestRecord,
    pub version: i64,
    pub created_at_ms: i64,
    pub created_by: String,
    pub updated_at_ms: i64,
    pub updated_by: String,
}

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;
        let db_path = storage_dir.join("sidequest.db");
        let conn = Connection::open(db_path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS meta (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS quests (
              id TEXT PRIMARY KEY,
              version INTEGER NOT NULL,
              is_active INTEGER NOT NULL,
              domain TEXT NOT NULL,
              doc_json TEXT NOT NULL,
              created_at_ms INTEGER NOT NULL,
              created_by TEXT NOT NULL,
              updated_at_ms INTEGER NOT NULL,
              updated_by TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS quest_stats (
              id TEXT PRIMARY KEY,
              presented INTEGER NOT NULL,
              accepted INTEGER NOT NULL,
              completed INTEGER NOT NULL,
              rating_sum REAL NOT NULL,
              rating_count INTEGER NOT NULL,
              last_presented_at_ms INTEGER
            );

            CREATE TABLE IF NOT EXISTS singleton_docs (
              key TEXT PRIMARY KEY,
              doc_json TEXT NOT NULL,
              updated_at_ms INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_quests_active ON quests(is_active);
            CREATE INDEX IF NOT EXISTS idx_quests_domain ON quests(domain);
            "#,
        )?;
        self.conn.execute(
            "INSERT OR IGNORE INTO meta(key, value) VALUES (?1, ?2)",
            params!["schema_version", "v1"],
        )?;
        Ok(())
    }

    /// Inserts a new quest at version 1 and seeds a zeroed stats row. Fails
    /// with `IdConflict` when the identifier is already taken.
    pub fn insert_quest(
        &mut self,
        record: &QuestRecord,
        actor: &str,
    ) -> Result<QuestRow, StoreError> {
        let now_ms = now_ms();
        let doc_json = serde_json::to_string(record)?;
        let tx = self.conn.transaction()?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM quests WHERE id = ?1",
                params![record.s_quest_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Err(StoreError::IdConflict);
        }

        tx.execute(
            r#"
            INSERT INTO quests(id, version, is_active, domain, doc_json,
                               created_at_ms, created_by, updated_at_ms, updated_by)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.s_quest_id,
                1i64,
                record.is_active,
                record.domain,
                doc_json,
                now_ms,
                actor,
                now_ms,
                actor
            ],
        )?;
        seed_stats_tx(&tx, &record.s_quest_id)?;

        tx.commit()?;
        Ok(QuestRow {
            record: record.clone(),
            version: 1,
            created_at_ms: now_ms,
            created_by: actor.to_string(),
            updated_at_ms: now_ms,
            updated_by: actor.to_string(),
        })
    }

    pub fn get_quest(&self, id: &str) -> Result<Option<QuestRow>, StoreError> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT doc_json, version, created_at_ms, created_by, updated_at_ms, updated_by
                FROM quests
                WHERE id = ?1
                "#,
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;
        let Some((doc_json, version, created_at_ms, created_by, updated_at_ms, updated_by)) = row
        else {
            return Ok(None);
        };
        Ok(Some(QuestRow {
            record: serde_json::from_str(&doc_json)?,
            version,
            created_at_ms,
            created_by,
            updated_at_ms,
            updated_by,
        }))
    }

    /// Replaces the stored record. `expected_version` enables an optional
    /// compare-and-swap; `None` keeps last-writer-wins. The version counter
    /// always moves by exactly 1 and `created_*` are never touched.
    pub fn update_quest(
        &mut self,
        id: &str,
        expected_version: Option<i64>,
        record: &QuestRecord,
        actor: &str,
    ) -> Result<QuestRow, StoreError> {
        if record.s_quest_id != id {
            return Err(StoreError::InvalidInput("record id must match the target id"));
        }
        let now_ms = now_ms();
        let doc_json = serde_json::to_string(record)?;
        let tx = self.conn.transaction()?;

        let row = tx
            .query_row(
                "SELECT version, created_at_ms, created_by FROM quests WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;
        let Some((version, created_at_ms, created_by)) = row else {
            return Err(StoreError::UnknownId);
        };

        if let Some(expected) = expected_version
            && expected != version
        {
            return Err(StoreError::VersionMismatch {
                expected,
                actual: version,
            });
        }

        let new_version = version + 1;
        tx.execute(
            r#"
            UPDATE quests
            SET version = ?2, is_active = ?3, domain = ?4, doc_json = ?5,
                updated_at_ms = ?6, updated_by = ?7
            WHERE id = ?1
            "#,
            params![
                id,
                new_version,
                record.is_active,
                record.domain,
                doc_json,
                now_ms,
                actor
            ],
        )?;

        tx.commit()?;
        Ok(QuestRow {
            record: record.clone(),
            version: new_version,
            created_at_ms,
            created_by,
            updated_at_ms: now_ms,
            updated_by: actor.to_string(),
        })
    }

    pub fn list_quests(
        &self,
        active: Option<bool>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<QuestRow>, StoreError> {
        match active {
            None => self.list_quests_where("1=1", params![limit as i64, offset as i64]),
            Some(active) => self.list_quests_where(
                "is_active = ?3",
                params![limit as i64, offset as i64, active],
            ),
        }
    }

    pub fn list_quests_by_domain(
        &self,
        domain: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<QuestRow>, StoreError> {
        self.list_quests_where("domain = ?3", params![limit as i64, offset as i64, domain])
    }

    fn list_quests_where(
        &self,
        filter: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<QuestRow>, StoreError> {
        let sql = format!(
            r#"
            SELECT doc_json, version, created_at_ms, created_by, updated_at_ms, updated_by
            FROM quests
            WHERE {filter}
            ORDER BY id ASC
            LIMIT ?1 OFFSET ?2
            "#
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (doc_json, version, created_at_ms, created_by, updated_at_ms, updated_by) = row?;
            out.push(QuestRow {
                record: serde_json::from_str(&doc_json)?,
                version,
                created_at_ms,
                created_by,
                updated_at_ms,
                updated_by,
            });
        }
        Ok(out)
    }

    pub fn get_stats(&self, id: &str) -> Result<Option<StatsRecord>, StoreError> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT id, presented, accepted, completed, rating_sum, rating_count, last_presented_at_ms
                FROM quest_stats
                WHERE id = ?1
                "#,
                params![id],
                stats_from_row,
            )
            .optional()?)
    }

    /// Ingestion seam for usage counters. Product events are recorded
    /// outside this core; this upsert is how they land.
    pub fn put_stats(&mut self, record: &StatsRecord) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO quest_stats(id, presented, accepted, completed, rating_sum, rating_count, last_presented_at_ms)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
              presented=excluded.presented,
              accepted=excluded.accepted,
              completed=excluded.completed,
              rating_sum=excluded.rating_sum,
              rating_count=excluded.rating_count,
              last_presented_at_ms=excluded.last_presented_at_ms
            "#,
            params![
                record.s_quest_id,
                record.presented,
                record.accepted,
                record.completed,
                record.rating_sum,
                record.rating_count,
                record.last_presented_at_ms
            ],
        )?;
        Ok(())
    }

    /// Full scan, used only by the analytics rebuild job.
    pub fn scan_stats(&self) -> Result<Vec<StatsRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, presented, accepted, completed, rating_sum, rating_count, last_presented_at_ms
            FROM quest_stats
            ORDER BY id ASC
            "#,
        )?;
        let rows = stmt.query_map([], stats_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn read_singleton(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let doc_json = self
            .conn
            .query_row(
                "SELECT doc_json FROM singleton_docs WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        match doc_json {
            Some(doc_json) => Ok(Some(serde_json::from_str(&doc_json)?)),
            None => Ok(None),
        }
    }

    /// Overwrites the whole document in one statement, so readers never see
    /// a partially-updated singleton. Returns the write timestamp.
    pub fn write_singleton(&mut self, key: &str, doc: &Value) -> Result<i64, StoreError> {
        let now_ms = now_ms();
        let doc_json = serde_json::to_string(doc)?;
        self.conn.execute(
            r#"
            INSERT INTO singleton_docs(key, doc_json, updated_at_ms)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET doc_json=excluded.doc_json, updated_at_ms=excluded.updated_at_ms
            "#,
            params![key, doc_json, now_ms],
        )?;
        Ok(now_ms)
    }
}

pub fn now_ms() -> i64 {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    now.as_millis() as i64
}

fn seed_stats_tx(tx: &Transaction<'_>, id: &str) -> Result<(), StoreError> {
    tx.execute(
        r#"
        INSERT OR IGNORE INTO quest_stats(id, presented, accepted, completed, rating_sum, rating_count, last_presented_at_ms)
        VALUES (?1, 0, 0, 0, 0.0, 0, NULL)
        "#,
        params![id],
    )?;
    Ok(())
}

fn stats_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StatsRecord> {
    Ok(StatsRecord {
        s_quest_id: row.get(0)?,
        presented: row.get(1)?,
        accepted: row.get(2)?,
        completed: row.get(3)?,
        rating_sum: row.get(4)?,
        rating_count: row.get(5)?,
        last_presented_at_ms: row.get(6)?,
    })
}
