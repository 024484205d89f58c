use libsql::{params, Connection};
use tracing::instrument;

use crate::errors::SinkError;

/// Inserts the single `Analyze` row for a run. An `Analyze` row is written
/// once at job start and never mutated (§3.5); `begin` is idempotent so the
/// Job Controller can call it safely even if a prior attempt partially
/// completed.
pub struct AnalyzeRepository<'a> {
    connection: &'a Connection,
}

impl<'a> AnalyzeRepository<'a> {
    pub fn new(connection: &'a Connection) -> Self {
        Self { connection }
    }

    #[instrument(skip(self, settings_json))]
    pub async fn begin(
        &self,
        analyze_id: &str,
        run_id: &str,
        name: &str,
        created_at: &str,
        settings_json: &str,
    ) -> Result<(), SinkError> {
        self.connection
            .execute(
                "INSERT INTO analyze (analyze_id, run_id, name, created_at, settings_json)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(analyze_id) DO NOTHING",
                params![analyze_id, run_id, name, created_at, settings_json],
            )
            .await?;
        Ok(())
    }
}
