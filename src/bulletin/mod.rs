// Weekly information bulletins and their deferred deactivation.
//
// Deactivation is a persisted due time (`deactivate_at`), never an in-process
// timer: reads compare against `now` and the sweep flips the flag in storage.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::location::LocationCode;

pub const DEFAULT_ACTIVE_DAYS: i64 = 10;
/// Upper bound on a configured delay, ten years.
pub const MAX_ACTIVE_DAYS: i64 = 3650;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bulletin {
    pub id: Uuid,
    pub location_code: String,
    pub meeting: String,
    pub title: String,
    pub body: serde_json::Value,
    pub bulletin_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub deactivate_at: DateTime<Utc>,
}

impl Bulletin {
    /// Active until the due instant; the flag alone is not trusted.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && now < self.deactivate_at
    }
}

/// Input for a new bulletin.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBulletin {
    pub location_code: LocationCode,
    pub meeting: String,
    pub title: String,
    #[serde(default)]
    pub body: serde_json::Value,
    pub bulletin_date: NaiveDate,
}

/// When a bulletin created at `created_at` should stop being active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeactivationSchedule {
    pub delay: Duration,
}

impl DeactivationSchedule {
    /// `None` unless `days` is within `0..=MAX_ACTIVE_DAYS`.
    pub fn days(days: i64) -> Option<Self> {
        if !(0..=MAX_ACTIVE_DAYS).contains(&days) {
            return None;
        }
        Duration::try_days(days).map(|delay| Self { delay })
    }

    pub fn due_at(&self, created_at: DateTime<Utc>) -> DateTime<Utc> {
        created_at + self.delay
    }
}

impl Default for DeactivationSchedule {
    fn default() -> Self {
        Self {
            delay: Duration::days(DEFAULT_ACTIVE_DAYS),
        }
    }
}
