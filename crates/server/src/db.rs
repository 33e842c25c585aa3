//! Database initialization and schema setup.

use anyhow::{Context, Result};
use aurora_db::{Aurora, FieldType};

/// Open the Aurora database and initialize the connections collection.
pub fn init_database(db_path: &str) -> Result<Aurora> {
    let db = Aurora::open(db_path).context("Failed to open database")?;

    // Connection registry - one record per open push channel. `status` is
    // always "open" for a live record; listings filter on it so the
    // broadcast scan has a filterable key.
    let _ = db.new_collection(
        "connections",
        vec![
            ("connection_id", FieldType::String, true),
            ("status", FieldType::String, false),
            ("scope", FieldType::String, false),
            ("established_at", FieldType::String, false),
            ("expires_at", FieldType::String, false),
        ],
    );

    Ok(db)
}
