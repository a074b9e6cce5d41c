use anyhow::Result;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::Metric;

/// One (timestamp, kWh) sample of a single metric.
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct MetricSample {
    pub ts: OffsetDateTime,
    pub kwh: f64,
}

/// Fetch a user's full history of one metric, oldest first.
///
/// Values stay in kWh; unit conversion belongs to the caller.
pub async fn metric_series(pool: &PgPool, user_id: Uuid, metric: Metric) -> Result<Vec<MetricSample>> {
    // The column comes from a closed enum, never from request input.
    let sql = format!(
        r#"
        SELECT
            ts,
            {column}::DOUBLE PRECISION AS kwh
        FROM energy_readings
        WHERE user_id = $1
        ORDER BY ts
        "#,
        column = metric.column()
    );

    let rows = sqlx::query_as::<_, MetricSample>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
