//! SQL migration definitions for the tbcindex database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: tbc_pages",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per table-of-contents entry
CREATE TABLE IF NOT EXISTS tbc_pages (
    number       TEXT PRIMARY KEY,
    date         TEXT NOT NULL,
    title        TEXT NOT NULL,
    url_external TEXT NOT NULL,
    url_internal TEXT NOT NULL,
    categories   TEXT NOT NULL,
    topic        TEXT NOT NULL,
    content      TEXT NOT NULL DEFAULT '',
    imported_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tbc_pages_url_external ON tbc_pages(url_external);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
