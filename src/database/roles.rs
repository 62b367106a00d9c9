use sqlx::{FromRow, PgPool};

use crate::access::{RoleEntry, RoleRegistry};
use crate::database::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct RoleScoreRow {
    pub role_name: String,
    pub score: i16,
}

impl TryFrom<RoleScoreRow> for RoleEntry {
    type Error = DatabaseError;

    fn try_from(row: RoleScoreRow) -> Result<Self, Self::Error> {
        let score = u8::try_from(row.score).map_err(|_| {
            DatabaseError::InvalidData(format!("role '{}' has out-of-range score {}", row.role_name, row.score))
        })?;
        Ok(RoleEntry {
            name: row.role_name,
            score,
        })
    }
}

/// Build the registry from the `role_scores` table.
pub async fn load_registry(pool: &PgPool) -> Result<RoleRegistry, DatabaseError> {
    let rows: Vec<RoleScoreRow> = sqlx::query_as("SELECT role_name, score FROM role_scores ORDER BY score, role_name")
        .fetch_all(pool)
        .await
        .map_err(DatabaseError::classify)?;

    let entries = rows
        .into_iter()
        .map(RoleEntry::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    RoleRegistry::from_entries(entries).map_err(|e| DatabaseError::InvalidData(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_scores() {
        let row = RoleScoreRow { role_name: "Odd".into(), score: 300 };
        assert!(matches!(RoleEntry::try_from(row), Err(DatabaseError::InvalidData(_))));

        let row = RoleScoreRow { role_name: "Usher".into(), score: 1 };
        assert_eq!(RoleEntry::try_from(row).unwrap().score, 1);
    }
}
