use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::access::ScopePrefix;
use crate::bulletin::{Bulletin, DeactivationSchedule, NewBulletin};
use crate::database::DatabaseError;

const BULLETIN_COLUMNS: &str =
    "id, location_code, meeting, title, body, bulletin_date, is_active, created_at, deactivate_at";

#[derive(Clone)]
pub struct BulletinRepository {
    pool: PgPool,
}

impl BulletinRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a bulletin with its deactivation due time already persisted.
    pub async fn create(&self, new: &NewBulletin, schedule: DeactivationSchedule) -> Result<Bulletin, DatabaseError> {
        let created_at = Utc::now();
        let sql = format!(
            "INSERT INTO bulletins (id, location_code, meeting, title, body, bulletin_date, is_active, created_at, deactivate_at) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8) \
             RETURNING {BULLETIN_COLUMNS}"
        );
        let id = Uuid::new_v4();
        sqlx::query_as::<_, Bulletin>(&sql)
            .bind(id)
            .bind(new.location_code.as_str())
            .bind(&new.meeting)
            .bind(&new.title)
            .bind(&new.body)
            .bind(new.bulletin_date)
            .bind(created_at)
            .bind(schedule.due_at(created_at))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_insert(e, &id.to_string()))
    }

    /// Re-schedule an existing bulletin to deactivate `schedule.delay` after creation.
    pub async fn schedule(&self, id: Uuid, schedule: DeactivationSchedule) -> Result<Bulletin, DatabaseError> {
        let sql = format!(
            "UPDATE bulletins SET deactivate_at = created_at + make_interval(secs => $2) \
             WHERE id = $1 \
             RETURNING {BULLETIN_COLUMNS}"
        );
        sqlx::query_as::<_, Bulletin>(&sql)
            .bind(id)
            .bind(schedule.delay.num_seconds() as f64)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::classify)?
            .ok_or_else(|| DatabaseError::NotFound(format!("bulletin {}", id)))
    }

    /// Flip every overdue bulletin to inactive. Returns how many changed.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<u64, DatabaseError> {
        let result = sqlx::query("UPDATE bulletins SET is_active = FALSE WHERE is_active AND deactivate_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::classify)?;
        let swept = result.rows_affected();
        if swept > 0 {
            info!("Deactivated {} overdue bulletins", swept);
        }
        Ok(swept)
    }

    /// Active bulletins inside `scope`. Filters on the due time as well as the
    /// flag, so a missed sweep never shows stale rows.
    pub async fn list_active(
        &self,
        scope: &ScopePrefix,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Bulletin>, DatabaseError> {
        let sql = format!(
            "SELECT {BULLETIN_COLUMNS} FROM bulletins \
             WHERE is_active AND deactivate_at > $3 \
               AND (upper(location_code) = upper($1) OR location_code ILIKE $2) \
             ORDER BY bulletin_date DESC, created_at DESC \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Bulletin>(&sql)
            .bind(scope.as_str())
            .bind(scope.like_pattern())
            .bind(now)
            .bind(limit)
            .bind(offset.max(0))
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::classify)
    }
}
