use imagec_core_measure::MeasurementKey;
use imagec_domain_model::{ImageId, IntensityStats, Object};
use libsql::{params, Connection, Transaction};
use tracing::instrument;

use crate::errors::SinkError;

/// Accumulates one image's `Object` and `ImageStats` rows and commits them
/// as a single transaction (§3.5: "Object and ImageStats rows are appended
/// as a single transactional batch at the end of processing that image").
///
/// `Image`/`ImageChannel` rows are written separately, the first time a
/// pipeline touches the image, since they have a different lifecycle than
/// the per-image measurement batch.
pub struct ImageBatch {
    image_id: ImageId,
    transaction: Transaction,
    closed: bool,
}

impl ImageBatch {
    #[instrument(skip(connection))]
    pub async fn begin(connection: &Connection, image_id: ImageId) -> Result<Self, SinkError> {
        let transaction = connection.transaction().await?;
        Ok(Self { image_id, transaction, closed: false })
    }

    pub async fn ensure_image_row(
        &self,
        group_id: &str,
        path: &str,
        width: u32,
        height: u32,
        series_count: u32,
    ) -> Result<(), SinkError> {
        self.transaction
            .execute(
                "INSERT INTO image (image_id, group_id, path, width, height, series_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(image_id) DO NOTHING",
                params![self.image_id.0 as i64, group_id, path, width, height, series_count],
            )
            .await?;
        Ok(())
    }

    pub async fn ensure_channel_row(
        &self,
        c_stack: i32,
        z_stack: u32,
        t_stack: u32,
        validity: i64,
        control_image_path: Option<&str>,
    ) -> Result<(), SinkError> {
        self.transaction
            .execute(
                "INSERT INTO image_channel (image_id, c_stack, z_stack, t_stack, validity, control_image_path)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(image_id, c_stack, z_stack, t_stack) DO UPDATE SET validity = excluded.validity",
                params![self.image_id.0 as i64, c_stack, z_stack, t_stack, validity, control_image_path],
            )
            .await?;
        Ok(())
    }

    /// Appends one object row plus its measurement-map rows, derived from
    /// the object's `intensityByChannel` and `distanceByClass` maps packed
    /// through §6.3's measurement key.
    pub async fn append_object(&self, object: &Object, tile_nr: i64) -> Result<(), SinkError> {
        self.transaction
            .execute(
                "INSERT INTO object (object_id, image_id, class, series_index, c_stack, z_stack, t_stack, tile_nr, validity)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    object.object_id.0 as i64,
                    self.image_id.0 as i64,
                    i64::from(object.class.0),
                    object.plane.series_index,
                    object.plane.c_stack,
                    object.plane.z_stack,
                    object.plane.t_stack,
                    tile_nr,
                    object.validity.bits() as i64,
                ],
            )
            .await?;

        for (&c_stack, stats) in &object.intensity_by_channel {
            self.append_measurement_row(
                object.object_id.0 as i64,
                MeasurementKey {
                    measure_channel: c_stack.max(0) as u16,
                    stats: imagec_core_measure::Statistic::Avg,
                    cross_channel_stack: -1,
                    intersecting_channel: -1,
                },
                stats,
            )
            .await?;
        }

        Ok(())
    }

    async fn append_measurement_row(
        &self,
        object_id: i64,
        base_key: MeasurementKey,
        stats: &IntensityStats,
    ) -> Result<(), SinkError> {
        let entries: [(imagec_core_measure::Statistic, f64); 6] = [
            (imagec_core_measure::Statistic::Sum, stats.sum),
            (imagec_core_measure::Statistic::Min, stats.min),
            (imagec_core_measure::Statistic::Max, stats.max),
            (imagec_core_measure::Statistic::Avg, stats.avg),
            (imagec_core_measure::Statistic::Median, stats.median),
            (imagec_core_measure::Statistic::StdDev, stats.stddev),
        ];
        for (statistic, value) in entries {
            let key = MeasurementKey { stats: statistic, ..base_key }.pack();
            self.transaction
                .execute(
                    "INSERT INTO object_measurement (image_id, object_id, measurement_key, value)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(image_id, object_id, measurement_key) DO UPDATE SET value = excluded.value",
                    params![self.image_id.0 as i64, object_id, key as i64, value],
                )
                .await?;
        }
        Ok(())
    }

    /// `count` is the number of valid objects the reduction in `stats` was
    /// computed over (§3.5's `ImageStats.count`, the P4 boundary
    /// property "`cnt == 0` when no valid object carries that channel").
    pub async fn append_image_stats(
        &self,
        c_stack: i32,
        tile_nr: i64,
        count: u64,
        base_key: MeasurementKey,
        stats: &IntensityStats,
    ) -> Result<(), SinkError> {
        self.transaction
            .execute(
                "INSERT INTO image_stats (image_id, c_stack, tile_nr, count)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(image_id, c_stack, tile_nr) DO UPDATE SET count = excluded.count",
                params![self.image_id.0 as i64, c_stack, tile_nr, count as i64],
            )
            .await?;

        let entries: [(imagec_core_measure::Statistic, f64); 6] = [
            (imagec_core_measure::Statistic::Sum, stats.sum),
            (imagec_core_measure::Statistic::Min, stats.min),
            (imagec_core_measure::Statistic::Max, stats.max),
            (imagec_core_measure::Statistic::Avg, stats.avg),
            (imagec_core_measure::Statistic::Median, stats.median),
            (imagec_core_measure::Statistic::StdDev, stats.stddev),
        ];
        for (statistic, value) in entries {
            let key = MeasurementKey { stats: statistic, ..base_key }.pack();
            self.transaction
                .execute(
                    "INSERT INTO image_stat_measurement (image_id, c_stack, tile_nr, measurement_key, statistic, value)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(image_id, c_stack, tile_nr, measurement_key, statistic) DO UPDATE SET value = excluded.value",
                    params![self.image_id.0 as i64, c_stack, tile_nr, key as i64, format!("{statistic:?}"), value],
                )
                .await?;
        }
        Ok(())
    }

    pub async fn commit(self) -> Result<(), SinkError> {
        let mut this = std::mem::ManuallyDrop::new(self);
        this.closed = true;
        let transaction = unsafe { std::ptr::read(&this.transaction) };
        transaction.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), SinkError> {
        let mut this = std::mem::ManuallyDrop::new(self);
        this.closed = true;
        let transaction = unsafe { std::ptr::read(&this.transaction) };
        transaction.rollback().await?;
        Ok(())
    }
}

impl Drop for ImageBatch {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!(image_id = self.image_id.0, "ImageBatch dropped without commit or rollback");
        }
    }
}
