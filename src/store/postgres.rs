use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::model::{Id, Instance};
use crate::store::traits::EntityStore;

const CREATE_ENTITIES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS entities (
        class_id TEXT NOT NULL,
        id TEXT NOT NULL,
        data JSONB NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (class_id, id)
    )
"#;

/// Stores every instance as one JSONB document keyed by (class_id, id)
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the entities table if it does not exist yet
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(CREATE_ENTITIES_TABLE)
            .execute(&self.pool)
            .await
            .context("Failed to create entities table")?;
        Ok(())
    }
}

fn instance_from_row(row: &sqlx::postgres::PgRow) -> Result<Instance> {
    let data: serde_json::Value = row.try_get("data").context("Missing entity data column")?;
    serde_json::from_value(data).context("Failed to deserialize entity data")
}

#[async_trait::async_trait]
impl EntityStore for PostgresStore {
    async fn find_one(&self, class_id: &Id, id: &Id) -> Result<Option<Instance>> {
        let row = sqlx::query("SELECT data FROM entities WHERE class_id = $1 AND id = $2")
            .bind(class_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch entity")?;

        let Some(row) = row else {
            return Ok(None);
        };

        instance_from_row(&row).map(Some)
    }

    async fn save(&self, instance: Instance) -> Result<Instance> {
        let data = serde_json::to_value(&instance).context("Failed to serialize entity data")?;

        sqlx::query(
            r#"
            INSERT INTO entities (class_id, id, data, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (class_id, id) DO UPDATE SET
                data = EXCLUDED.data,
                updated_at = NOW()
            "#,
        )
        .bind(&instance.class_id)
        .bind(&instance.id)
        .bind(data)
        .execute(&self.pool)
        .await
        .context("Failed to save entity")?;

        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entities_table_is_keyed_by_class_and_id() {
        assert!(CREATE_ENTITIES_TABLE.contains("PRIMARY KEY (class_id, id)"));
        assert!(CREATE_ENTITIES_TABLE.contains("IF NOT EXISTS"));
    }
}
