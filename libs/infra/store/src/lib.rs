//! Result Sink (C6): transactional, libsql-backed persistence of analyze
//! runs, images, objects, and measurements.

pub mod client;
pub mod errors;
pub mod image_batch;
pub mod repositories;
pub mod schema;

pub use client::StoreClient;
pub use errors::SinkError;
pub use image_batch::ImageBatch;
pub use repositories::{AnalyzeRepository, HierarchyRepository};

#[cfg(test)]
mod tests {
    use imagec_domain_model::ImageId;

    use super::*;

    async fn memory_client() -> StoreClient {
        StoreClient::connect(":memory:", None).await.expect("connect")
    }

    #[tokio::test]
    async fn begin_analyze_is_idempotent() {
        let client = memory_client().await;
        let connection = client.connection().unwrap();
        let repository = AnalyzeRepository::new(&connection);
        repository.begin("analyze-1", "run-1", "demo", "2026-01-01T00:00:00Z", "{}").await.unwrap();
        repository.begin("analyze-1", "run-1", "demo", "2026-01-01T00:00:00Z", "{}").await.unwrap();

        let mut rows = connection.query("SELECT COUNT(*) FROM analyze", ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        let count: i64 = row.get(0).unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn rolled_back_batch_leaves_no_object_rows() {
        let client = memory_client().await;
        let connection = client.connection().unwrap();
        let image_id = ImageId(42);
        let batch = ImageBatch::begin(&connection, image_id).await.unwrap();
        batch.ensure_image_row("group-1", "/data/a.tiff", 512, 512, 1).await.unwrap();
        batch.rollback().await.unwrap();

        let mut rows = connection.query("SELECT COUNT(*) FROM image", ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        let count: i64 = row.get(0).unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn ensure_plate_and_group_are_idempotent() {
        let client = memory_client().await;
        let connection = client.connection().unwrap();
        let hierarchy = HierarchyRepository::new(&connection);
        hierarchy.ensure_plate("plate-1", "analyze-1", "").await.unwrap();
        hierarchy.ensure_plate("plate-1", "analyze-1", "").await.unwrap();
        hierarchy.ensure_group("group-1", "plate-1", 0, 0, "A1").await.unwrap();
        hierarchy.ensure_group("group-1", "plate-1", 0, 0, "A1").await.unwrap();

        let mut rows = connection.query("SELECT COUNT(*) FROM plate", ()).await.unwrap();
        let count: i64 = rows.next().await.unwrap().unwrap().get(0).unwrap();
        assert_eq!(count, 1);

        let mut rows = connection.query("SELECT COUNT(*) FROM grp", ()).await.unwrap();
        let count: i64 = rows.next().await.unwrap().unwrap().get(0).unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn committed_batch_persists_the_image_row() {
        let client = memory_client().await;
        let connection = client.connection().unwrap();
        let image_id = ImageId(7);
        let batch = ImageBatch::begin(&connection, image_id).await.unwrap();
        batch.ensure_image_row("group-1", "/data/a.tiff", 512, 512, 1).await.unwrap();
        batch.commit().await.unwrap();

        let mut rows = connection.query("SELECT COUNT(*) FROM image", ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        let count: i64 = row.get(0).unwrap();
        assert_eq!(count, 1);
    }
}
