//! Local document index backed by SQLite FTS5.
//!
//! Stores each document's enrichment payload next to its extracted text and
//! ranks matches by BM25. Used for offline deployments, demos, and tests
//! where the hosted search service is unavailable.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;
use serde::Deserialize;
use tracing::info;

use hoover_core::SearchHit;

use crate::error::SearchError;
use crate::SearchBackend;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS documents (
        id          INTEGER PRIMARY KEY,
        key         TEXT UNIQUE NOT NULL,
        content     TEXT NOT NULL DEFAULT '',
        enriched    TEXT NOT NULL,
        created_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
    );

    CREATE VIRTUAL TABLE IF NOT EXISTS documents_fts USING fts5(
        content,
        content='documents',
        content_rowid='id'
    );

    CREATE TRIGGER IF NOT EXISTS documents_ai AFTER INSERT ON documents BEGIN
        INSERT INTO documents_fts(rowid, content) VALUES (new.id, new.content);
    END;

    CREATE TRIGGER IF NOT EXISTS documents_ad AFTER DELETE ON documents BEGIN
        INSERT INTO documents_fts(documents_fts, rowid, content)
            VALUES ('delete', old.id, old.content);
    END;

    CREATE TRIGGER IF NOT EXISTS documents_au AFTER UPDATE ON documents BEGIN
        INSERT INTO documents_fts(documents_fts, rowid, content)
            VALUES ('delete', old.id, old.content);
        INSERT INTO documents_fts(rowid, content) VALUES (new.id, new.content);
    END;
";

/// One line of a JSON-lines import file.
#[derive(Debug, Deserialize)]
struct ImportRecord {
    key: String,
    enriched: serde_json::Value,
}

/// SQLite FTS5 document index.
///
/// The connection lives behind a `Mutex` since rusqlite `Connection` is not
/// `Sync`; queries run on the blocking thread pool.
#[derive(Clone)]
pub struct LocalIndex {
    conn: Arc<Mutex<Connection>>,
}

impl LocalIndex {
    /// Open (or create) an index at the given path.
    pub fn open(path: &Path) -> Result<Self, SearchError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SearchError::Storage(format!("Failed to create directory: {}", e)))?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;
        conn.execute_batch(SCHEMA)?;

        info!("Local document index opened at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory index (for testing).
    pub fn in_memory() -> Result<Self, SearchError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Execute a closure with the underlying connection.
    fn with_conn<F, T>(&self, f: F) -> Result<T, SearchError>
    where
        F: FnOnce(&Connection) -> Result<T, SearchError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SearchError::Storage(format!("Index lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Insert or replace a document.
    ///
    /// `enriched` is the enrichment payload JSON; its `/document/finalText`
    /// field is what gets indexed.
    pub fn add_document(&self, key: &str, enriched: &str) -> Result<(), SearchError> {
        let payload: serde_json::Value =
            serde_json::from_str(enriched).map_err(|e| SearchError::Decode(e.to_string()))?;
        let content = payload
            .get("/document/finalText")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO documents (key, content, enriched) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET content = excluded.content,
                                                enriched = excluded.enriched",
                rusqlite::params![key, content, enriched],
            )?;
            Ok(())
        })
    }

    /// Import documents from a JSON-lines file of `{"key": .., "enriched": ..}`.
    ///
    /// `enriched` may be the payload object itself or the payload serialized
    /// as a string. Blank lines are ignored. Returns the number imported.
    pub fn import_jsonl(&self, path: &Path) -> Result<usize, SearchError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SearchError::Storage(format!("Failed to read {}: {}", path.display(), e)))?;

        let mut count = 0;
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: ImportRecord = serde_json::from_str(line).map_err(|e| {
                SearchError::Decode(format!("{}:{}: {}", path.display(), line_no + 1, e))
            })?;
            let enriched = match record.enriched {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            self.add_document(&record.key, &enriched)?;
            count += 1;
        }

        info!(count, path = %path.display(), "Imported documents into local index");
        Ok(count)
    }

    /// Number of indexed documents.
    pub fn count(&self) -> Result<u64, SearchError> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
            Ok(n as u64)
        })
    }

    /// Run a BM25-ranked query synchronously.
    pub fn search_blocking(&self, query: &str, top: usize) -> Result<Vec<SearchHit>, SearchError> {
        let Some(fts_query) = sanitize_fts5_query(query) else {
            return Ok(Vec::new());
        };

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT d.enriched, bm25(documents_fts)
                 FROM documents_fts
                 JOIN documents d ON d.id = documents_fts.rowid
                 WHERE documents_fts MATCH ?1
                 ORDER BY bm25(documents_fts)
                 LIMIT ?2",
            )?;

            let rows = stmt.query_map(rusqlite::params![fts_query, top as i64], |row| {
                let enriched: String = row.get(0)?;
                let rank: f64 = row.get(1)?;
                Ok(SearchHit {
                    // bm25() is negative (lower = better); negate so higher is better.
                    score: -rank,
                    enriched: Some(enriched),
                })
            })?;

            let mut hits = Vec::new();
            for row in rows {
                hits.push(row?);
            }
            Ok(hits)
        })
    }
}

#[async_trait]
impl SearchBackend for LocalIndex {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn search(&self, query: &str, top: usize) -> Result<Vec<SearchHit>, SearchError> {
        let index = self.clone();
        let query = query.to_string();
        tokio::task::spawn_blocking(move || index.search_blocking(&query, top))
            .await
            .map_err(|e| SearchError::Storage(format!("search task failed: {}", e)))?
    }
}

/// Turn free user text into a safe FTS5 query.
///
/// Each word is reduced to its alphanumeric characters, quoted, and the
/// terms are OR-ed so any matching word contributes to the rank. Returns
/// `None` when nothing searchable remains.
pub fn sanitize_fts5_query(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split_whitespace()
        .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|w| !w.is_empty())
        .map(|w| format!("\"{}\"", w))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}
