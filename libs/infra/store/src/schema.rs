//! Idempotent schema management.
//!
//! Mirrors the analytic store's logical schema (§3.5): one row per analyze
//! run, per plate, per group (well/folder grouping), per image, per
//! channel, plus `Object` and `ImageStats` rows. libsql has no native map
//! column, so the `measurements`/statistic maps are normalized into child
//! tables keyed by the packed 32-bit measurement key (§6.3) rather than
//! stored as a map column.

use libsql::Connection;
use tracing::{debug, info};

use crate::errors::SinkError;

const TABLES: &[(&str, &str)] = &[
    ("analyze", r#"
        CREATE TABLE IF NOT EXISTS analyze (
            analyze_id TEXT PRIMARY KEY,
            run_id TEXT NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            settings_json TEXT NOT NULL
        );
    "#),
    ("plate", r#"
        CREATE TABLE IF NOT EXISTS plate (
            plate_id TEXT PRIMARY KEY,
            analyze_id TEXT NOT NULL REFERENCES analyze(analyze_id),
            notes TEXT
        );
    "#),
    ("grp", r#"
        CREATE TABLE IF NOT EXISTS grp (
            group_id TEXT PRIMARY KEY,
            plate_id TEXT NOT NULL REFERENCES plate(plate_id),
            well_x INTEGER NOT NULL,
            well_y INTEGER NOT NULL,
            name TEXT NOT NULL
        );
    "#),
    ("image", r#"
        CREATE TABLE IF NOT EXISTS image (
            image_id INTEGER PRIMARY KEY,
            group_id TEXT NOT NULL REFERENCES grp(group_id),
            path TEXT NOT NULL,
            width INTEGER NOT NULL,
            height INTEGER NOT NULL,
            series_count INTEGER NOT NULL
        );
    "#),
    ("image_channel", r#"
        CREATE TABLE IF NOT EXISTS image_channel (
            image_id INTEGER NOT NULL REFERENCES image(image_id),
            c_stack INTEGER NOT NULL,
            z_stack INTEGER NOT NULL,
            t_stack INTEGER NOT NULL,
            validity INTEGER NOT NULL DEFAULT 0,
            control_image_path TEXT,
            PRIMARY KEY (image_id, c_stack, z_stack, t_stack)
        );
    "#),
    ("object", r#"
        CREATE TABLE IF NOT EXISTS object (
            object_id INTEGER NOT NULL,
            image_id INTEGER NOT NULL REFERENCES image(image_id),
            class INTEGER NOT NULL,
            series_index INTEGER NOT NULL,
            c_stack INTEGER NOT NULL,
            z_stack INTEGER NOT NULL,
            t_stack INTEGER NOT NULL,
            tile_nr INTEGER NOT NULL,
            validity INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (image_id, object_id)
        );
    "#),
    ("object_measurement", r#"
        CREATE TABLE IF NOT EXISTS object_measurement (
            image_id INTEGER NOT NULL,
            object_id INTEGER NOT NULL,
            measurement_key INTEGER NOT NULL,
            value REAL NOT NULL,
            PRIMARY KEY (image_id, object_id, measurement_key),
            FOREIGN KEY (image_id, object_id) REFERENCES object(image_id, object_id)
        );
    "#),
    ("image_stats", r#"
        CREATE TABLE IF NOT EXISTS image_stats (
            image_id INTEGER NOT NULL REFERENCES image(image_id),
            c_stack INTEGER NOT NULL,
            tile_nr INTEGER NOT NULL,
            count INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (image_id, c_stack, tile_nr)
        );
    "#),
    ("image_stat_measurement", r#"
        CREATE TABLE IF NOT EXISTS image_stat_measurement (
            image_id INTEGER NOT NULL,
            c_stack INTEGER NOT NULL,
            tile_nr INTEGER NOT NULL,
            measurement_key INTEGER NOT NULL,
            statistic TEXT NOT NULL,
            value REAL NOT NULL,
            PRIMARY KEY (image_id, c_stack, tile_nr, measurement_key, statistic),
            FOREIGN KEY (image_id, c_stack, tile_nr) REFERENCES image_stats(image_id, c_stack, tile_nr)
        );
    "#),
];

const INDEXES: &[(&str, &str)] = &[
    ("idx_object_image", "CREATE INDEX IF NOT EXISTS idx_object_image ON object(image_id);"),
    (
        "idx_object_measurement_key",
        "CREATE INDEX IF NOT EXISTS idx_object_measurement_key ON object_measurement(measurement_key);",
    ),
    ("idx_image_group", "CREATE INDEX IF NOT EXISTS idx_image_group ON image(group_id);"),
];

/// Applies every table and index in order; safe to call on every startup,
/// including against an already-migrated database.
pub async fn apply_schema(connection: &Connection) -> Result<(), SinkError> {
    info!("applying store schema");
    for (name, ddl) in TABLES {
        debug!(table = name, "creating table if absent");
        connection.execute(ddl, ()).await.map_err(|e| SinkError::Schema(format!("{name}: {e}")))?;
    }
    for (name, ddl) in INDEXES {
        debug!(index = name, "creating index if absent");
        connection.execute(ddl, ()).await.map_err(|e| SinkError::Schema(format!("{name}: {e}")))?;
    }
    Ok(())
}
