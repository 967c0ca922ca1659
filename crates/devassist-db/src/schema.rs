//! DevAssist schema and its versioned migration runner.
//!
//! Every table is SCHEMAFULL. Record keys are UUID strings, foreign
//! references (`requester_id`, `ticket_id`, `author_id`) are plain UUID
//! strings, and enum columns carry an `ASSERT ... IN [...]` guard so a bad
//! value is rejected by the database as well as by the API.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE option<string>;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['ADMIN', 'SUPPORT', 'ENGINEER'];
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD refresh_token_hash ON TABLE user TYPE option<string>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Tickets
-- =======================================================================
DEFINE TABLE ticket SCHEMAFULL;
DEFINE FIELD title ON TABLE ticket TYPE string;
DEFINE FIELD description ON TABLE ticket TYPE string;
DEFINE FIELD status ON TABLE ticket TYPE string DEFAULT 'OPEN' \
    ASSERT $value IN ['OPEN', 'IN_PROGRESS', 'BLOCKED', 'RESOLVED'];
DEFINE FIELD severity ON TABLE ticket TYPE string \
    ASSERT $value IN ['P0', 'P1', 'P2', 'P3'];
DEFINE FIELD component ON TABLE ticket TYPE string \
    ASSERT $value IN ['CLINE', 'COPILOT', 'RAG', 'CI', 'EXTENSION', \
    'OTHER'];
DEFINE FIELD requester_id ON TABLE ticket TYPE string READONLY;
DEFINE FIELD assignee_id ON TABLE ticket TYPE option<string>;
DEFINE FIELD sla_due_at ON TABLE ticket TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE ticket TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE ticket TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_ticket_status ON TABLE ticket COLUMNS status;
DEFINE INDEX idx_ticket_requester ON TABLE ticket COLUMNS requester_id;

-- =======================================================================
-- Comments (append-only)
-- =======================================================================
DEFINE TABLE comment SCHEMAFULL;
DEFINE FIELD ticket_id ON TABLE comment TYPE string;
DEFINE FIELD author_id ON TABLE comment TYPE string;
DEFINE FIELD body ON TABLE comment TYPE string;
DEFINE FIELD created_at ON TABLE comment TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_comment_ticket ON TABLE comment COLUMNS ticket_id;

-- =======================================================================
-- Knowledge-base articles
-- =======================================================================
DEFINE TABLE kb_article SCHEMAFULL;
DEFINE FIELD title ON TABLE kb_article TYPE string;
DEFINE FIELD body ON TABLE kb_article TYPE string;
DEFINE FIELD tags ON TABLE kb_article TYPE array DEFAULT [];
DEFINE FIELD tags.* ON TABLE kb_article TYPE string;
DEFINE FIELD created_at ON TABLE kb_article TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE kb_article TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Playbooks
-- =======================================================================
DEFINE TABLE playbook SCHEMAFULL;
DEFINE FIELD name ON TABLE playbook TYPE string;
DEFINE FIELD description ON TABLE playbook TYPE option<string>;
DEFINE FIELD template ON TABLE playbook TYPE string;
DEFINE FIELD tags ON TABLE playbook TYPE array DEFAULT [];
DEFINE FIELD tags.* ON TABLE playbook TYPE string;
DEFINE FIELD created_at ON TABLE playbook TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE playbook TYPE datetime \
    DEFAULT time::now();
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Apply every migration newer than the highest recorded version.
/// Safe to call on each startup.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "Migration v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query(
            "CREATE _migration SET version = $version, \
             name = $name",
        )
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!(
                "Failed to record migration v{}: {}",
                migration.version, e,
            ))
        })?;

        info!(version = migration.version, "Migration applied");
    }

    Ok(())
}
