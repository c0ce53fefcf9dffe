//! libSQL storage layer for extracted index entries (offline mode).
//!
//! The [`Storage`] struct wraps a local libSQL database holding one row per
//! table-of-contents entry, together with the content of its local page.
//!
//! **Access rules:**
//! - `import` and `clear`: read-write via [`Storage::open`]
//! - `list`: read-only via [`Storage::open_readonly`]

mod migrations;

use std::path::Path;

use chrono::Utc;
use libsql::{Connection, Database, params};
use tbcindex_shared::{PageRecord, Result, TbcIndexError, TocEntry};

/// Column list shared by every `SELECT` on `tbc_pages`.
const PAGE_COLUMNS: &str =
    "number, date, title, url_external, url_internal, categories, topic, content, imported_at";

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TbcIndexError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(storage_err)?;

        let conn = db.connect().map_err(storage_err)?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open an existing database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TbcIndexError::Storage(format!(
                "database not found at {}",
                path.display()
            )));
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(storage_err)?;

        let conn = db.connect().map_err(storage_err)?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        TbcIndexError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(TbcIndexError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Page operations
    // -----------------------------------------------------------------------

    /// Insert an entry, or overwrite every column of the row with the same number.
    pub async fn upsert_page(&self, entry: &TocEntry, content: &str) -> Result<()> {
        self.check_writable()?;
        let now = Utc::now().to_rfc3339();
        upsert_at(&self.conn, entry, content, &now).await
    }

    /// Upsert a batch of records sharing one import timestamp, in a single
    /// transaction. Returns the number of rows written.
    pub async fn upsert_pages(&self, records: &[PageRecord]) -> Result<usize> {
        self.check_writable()?;
        self.write_pages(records, false).await?;
        tracing::debug!(rows = records.len(), "pages upserted");
        Ok(records.len())
    }

    /// Replace the whole table with `records`. The delete and every upsert
    /// share one transaction, so a failed batch leaves the previous rows.
    /// Returns the number of rows deleted.
    pub async fn replace_pages(&self, records: &[PageRecord]) -> Result<u64> {
        self.check_writable()?;
        let deleted = self.write_pages(records, true).await?;
        tracing::info!(deleted, rows = records.len(), "pages replaced");
        Ok(deleted)
    }

    async fn write_pages(&self, records: &[PageRecord], clear: bool) -> Result<u64> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction().await.map_err(storage_err)?;

        let written = async {
            let deleted = if clear {
                tx.execute("DELETE FROM tbc_pages", params![])
                    .await
                    .map_err(storage_err)?
            } else {
                0
            };
            for record in records {
                upsert_at(&tx, &record.entry, &record.content, &now).await?;
            }
            Ok::<_, TbcIndexError>(deleted)
        }
        .await;

        match written {
            Ok(deleted) => {
                tx.commit().await.map_err(storage_err)?;
                Ok(deleted)
            }
            Err(e) => match tx.rollback().await {
                Ok(()) => Err(e),
                Err(rollback) => Err(TbcIndexError::Storage(format!(
                    "{e}; rollback failed: {rollback}"
                ))),
            },
        }
    }

    /// Get a stored entry by its TOC number.
    pub async fn get_page(&self, number: &str) -> Result<Option<PageRecord>> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM tbc_pages WHERE number = ?1");
        let mut rows = self
            .conn
            .query(&sql, params![number])
            .await
            .map_err(storage_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_page_record(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(storage_err(e)),
        }
    }

    /// List stored entries in insertion order, up to `limit` rows.
    pub async fn list_pages(&self, limit: Option<usize>) -> Result<Vec<PageRecord>> {
        let limit = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));
        let sql = format!("SELECT {PAGE_COLUMNS} FROM tbc_pages ORDER BY rowid LIMIT ?1");
        let mut rows = self
            .conn
            .query(&sql, params![limit])
            .await
            .map_err(storage_err)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(storage_err)? {
            results.push(row_to_page_record(&row)?);
        }
        Ok(results)
    }

    /// Total number of stored entries.
    pub async fn count_pages(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM tbc_pages").await
    }

    /// Number of stored entries with at least one topic.
    pub async fn count_with_topic(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM tbc_pages WHERE topic <> ''")
            .await
    }

    async fn count(&self, sql: &str) -> Result<u64> {
        let mut rows = self
            .conn
            .query(sql, params![])
            .await
            .map_err(storage_err)?;

        match rows.next().await {
            Ok(Some(row)) => {
                let n: i64 = row.get(0).map_err(storage_err)?;
                Ok(u64::try_from(n).unwrap_or(0))
            }
            Ok(None) => Ok(0),
            Err(e) => Err(storage_err(e)),
        }
    }

    /// Delete every stored entry. Returns the number of rows removed.
    pub async fn delete_all(&self) -> Result<u64> {
        self.check_writable()?;
        let deleted = self
            .conn
            .execute("DELETE FROM tbc_pages", params![])
            .await
            .map_err(storage_err)?;
        tracing::info!(deleted, "deleted all pages");
        Ok(deleted)
    }
}

async fn upsert_at(
    conn: &Connection,
    entry: &TocEntry,
    content: &str,
    imported_at: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO tbc_pages (number, date, title, url_external, url_internal, categories, topic, content, imported_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(number) DO UPDATE SET
           date = excluded.date,
           title = excluded.title,
           url_external = excluded.url_external,
           url_internal = excluded.url_internal,
           categories = excluded.categories,
           topic = excluded.topic,
           content = excluded.content,
           imported_at = excluded.imported_at",
        params![
            entry.number.as_str(),
            entry.date.as_str(),
            entry.title.as_str(),
            entry.url_external.as_str(),
            entry.url_internal.as_str(),
            entry.categories.as_str(),
            entry.topic.as_str(),
            content,
            imported_at,
        ],
    )
    .await
    .map_err(storage_err)?;
    Ok(())
}

fn storage_err(e: libsql::Error) -> TbcIndexError {
    TbcIndexError::Storage(e.to_string())
}

/// Convert a database row (in [`PAGE_COLUMNS`] order) to a [`PageRecord`].
fn row_to_page_record(row: &libsql::Row) -> Result<PageRecord> {
    let text = |idx: i32| row.get::<String>(idx).map_err(storage_err);
    Ok(PageRecord {
        entry: TocEntry {
            number: text(0)?,
            date: text(1)?,
            title: text(2)?,
            url_external: text(3)?,
            url_internal: text(4)?,
            categories: text(5)?,
            topic: text(6)?,
        },
        content: text(7)?,
        imported_at: row.get::<String>(8).ok(),
    })
}
