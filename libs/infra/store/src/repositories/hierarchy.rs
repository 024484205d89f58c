use libsql::{params, Connection};
use tracing::instrument;

use crate::errors::SinkError;

/// Inserts the `Plate`/`Group` rows an image's `Image` row references
/// (§3.5). Both are idempotent: a run's images usually share one plate and
/// a handful of groups, so every image's processing calls these before its
/// own `ImageBatch`, and only the first call for a given id does anything.
pub struct HierarchyRepository<'a> {
    connection: &'a Connection,
}

impl<'a> HierarchyRepository<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }

    #[instrument(skip(self))]
    pub async fn ensure_plate(&self, plate_id: &str, analyze_id: &str, notes: &str) -> Result<(), SinkError> {
        self.connection
            .execute(
                "INSERT INTO plate (plate_id, analyze_id, notes)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(plate_id) DO NOTHING",
                params![plate_id, analyze_id, notes],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn ensure_group(
        &self,
        group_id: &str,
        plate_id: &str,
        well_x: i64,
        well_y: i64,
        name: &str,
    ) -> Result<(), SinkError> {
        self.connection
            .execute(
                "INSERT INTO grp (group_id, plate_id, well_x, well_y, name)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(group_id) DO NOTHING",
                params![group_id, plate_id, well_x, well_y, name],
            )
            .await?;
        Ok(())
    }
}
