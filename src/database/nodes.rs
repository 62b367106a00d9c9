use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::access::{escape_like, ScopePrefix};
use crate::database::DatabaseError;
use crate::location::{Level, LocationCode};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NodeRecord {
    pub id: Uuid,
    pub code: String,
    pub parent_code: Option<String>,
    pub level: i16,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl NodeRecord {
    pub fn location_code(&self) -> Result<LocationCode, DatabaseError> {
        LocationCode::parse(&self.code).map_err(|e| DatabaseError::InvalidData(e.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct NewNode {
    pub code: LocationCode,
    pub name: String,
}

impl NewNode {
    pub fn level(&self) -> Level {
        self.code.level()
    }
}

/// Optional filters for scoped listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeQuery {
    pub level: Option<Level>,
    pub name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// What the allocator needs from storage.
#[async_trait]
pub trait NodeStore: Send + Sync {
    async fn find(&self, code: &LocationCode) -> Result<Option<NodeRecord>, DatabaseError>;

    /// Codes of the direct children of `parent`.
    async fn child_codes(&self, parent: &LocationCode) -> Result<Vec<String>, DatabaseError>;

    /// Insert, failing with `UniqueViolation` when the code is taken.
    async fn insert(&self, node: &NewNode) -> Result<NodeRecord, DatabaseError>;
}

#[derive(Clone)]
pub struct PgNodeStore {
    pool: PgPool,
}

const NODE_COLUMNS: &str = "id, code, parent_code, level, name, created_at";

impl PgNodeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Nodes at or below `scope`, filtered and paged.
    pub async fn list_scoped(&self, scope: &ScopePrefix, query: &NodeQuery, limit: i64) -> Result<Vec<NodeRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {NODE_COLUMNS} FROM hierarchy_nodes \
             WHERE (upper(code) = upper($1) OR code ILIKE $2) \
               AND ($3::smallint IS NULL OR level = $3) \
               AND ($4::text IS NULL OR name ILIKE '%' || $4 || '%') \
             ORDER BY code \
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, NodeRecord>(&sql)
            .bind(scope.as_str())
            .bind(scope.like_pattern())
            .bind(query.level.map(|l| l.depth() as i16))
            .bind(query.name.as_deref().map(escape_like))
            .bind(limit)
            .bind(query.offset.unwrap_or(0).max(0))
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::classify)
    }

    /// Every node in scope, for tree rendering.
    pub async fn list_subtree(&self, scope: &ScopePrefix) -> Result<Vec<NodeRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {NODE_COLUMNS} FROM hierarchy_nodes \
             WHERE upper(code) = upper($1) OR code ILIKE $2 \
             ORDER BY code"
        );
        sqlx::query_as::<_, NodeRecord>(&sql)
            .bind(scope.as_str())
            .bind(scope.like_pattern())
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::classify)
    }
}

#[async_trait]
impl NodeStore for PgNodeStore {
    async fn find(&self, code: &LocationCode) -> Result<Option<NodeRecord>, DatabaseError> {
        let sql = format!("SELECT {NODE_COLUMNS} FROM hierarchy_nodes WHERE upper(code) = upper($1)");
        sqlx::query_as::<_, NodeRecord>(&sql)
            .bind(code.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::classify)
    }

    async fn child_codes(&self, parent: &LocationCode) -> Result<Vec<String>, DatabaseError> {
        sqlx::query_scalar::<_, String>("SELECT code FROM hierarchy_nodes WHERE upper(parent_code) = upper($1)")
            .bind(parent.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::classify)
    }

    async fn insert(&self, node: &NewNode) -> Result<NodeRecord, DatabaseError> {
        let sql = format!(
            "INSERT INTO hierarchy_nodes (id, code, parent_code, level, name) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {NODE_COLUMNS}"
        );
        sqlx::query_as::<_, NodeRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(node.code.as_str())
            .bind(node.code.parent().map(String::from))
            .bind(node.level().depth() as i16)
            .bind(&node.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_insert(e, node.code.as_str()))
    }
}
