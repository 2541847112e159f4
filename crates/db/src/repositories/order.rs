use chrono::{DateTime, Utc};
use sqlx::Row;

use intake_core::domain::order::{CompletedOrder, OrderId, PersistedOrder};

use super::{OrderRepository, RepositoryError};
use crate::DbPool;

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_order(row: &sqlx::sqlite::SqliteRow) -> Result<PersistedOrder, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let customer_name: String =
        row.try_get("customer_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let phone: String = row.try_get("phone").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let dish_name: String =
        row.try_get("dish_name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let comments: String =
        row.try_get("comments").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at_str: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("invalid created_at `{created_at_str}`: {e}")))?;

    Ok(PersistedOrder {
        id: OrderId(id),
        order: CompletedOrder { customer_name, phone, dish_name, comments },
        created_at,
    })
}

#[async_trait::async_trait]
impl OrderRepository for SqlOrderRepository {
    async fn append(&self, order: &CompletedOrder) -> Result<OrderId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO orders (customer_name, phone, dish_name, comments, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&order.customer_name)
        .bind(&order.phone)
        .bind(&order.dish_name)
        .bind(&order.comments)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        if id <= 0 {
            return Err(RepositoryError::Decode(format!("store assigned non-positive id {id}")));
        }
        Ok(OrderId(id))
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<PersistedOrder>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, customer_name, phone, dish_name, comments, created_at
             FROM orders WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_order(r)?)),
            None => Ok(None),
        }
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM orders").fetch_one(&self.pool).await?;
        u64::try_from(count).map_err(|e| RepositoryError::Decode(e.to_string()))
    }
}
