use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::database::store::{Document, Store};
use crate::filter::Filter;

/// Postgres-backed document store. Each collection is a table holding the
/// system columns next to a `jsonb` body (see `migrations/`).
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, DatabaseError> {
        let sql = filter.to_sql();
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let rows = q.fetch_all(&self.pool).await?;
        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            documents.push(row.try_get::<Value, _>("doc")?);
        }
        Ok(documents)
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Value>, DatabaseError> {
        let filter = filter.clone().limit(1)?;
        Ok(self.find(&filter).await?.into_iter().next())
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<(), DatabaseError> {
        // Reuse the filter's identifier validation for the table name
        let table = Filter::new(collection)?;
        let query = format!(
            "INSERT INTO \"{}\" (\"id\", \"owner_id\", \"created_at\", \"updated_at\", \"doc\") VALUES ($1, $2, $3, $4, $5)",
            table.table_name()
        );
        sqlx::query(&query)
            .bind(document.id)
            .bind(document.owner_id)
            .bind(document.created_at)
            .bind(document.updated_at)
            .bind(document.body)
            .execute(&self.pool)
            .await
            .map_err(map_unique_violation)?;
        Ok(())
    }

    async fn replace_one(&self, filter: &Filter, document: Document) -> Result<bool, DatabaseError> {
        // $1 and $2 are the new values; the filter placeholders follow
        let where_sql = filter.to_where_sql(2);
        let query = format!(
            "UPDATE \"{}\" SET \"updated_at\" = $1, \"doc\" = $2 WHERE {}",
            filter.table_name(),
            where_sql.query
        );
        let mut q = sqlx::query(&query).bind(document.updated_at).bind(document.body);
        for p in where_sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let result = q.execute(&self.pool).await.map_err(map_unique_violation)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_one(&self, filter: &Filter) -> Result<Option<Value>, DatabaseError> {
        let sql = filter.to_delete_sql();
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(Some(row.try_get::<Value, _>("doc")?)),
            None => Ok(None),
        }
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn map_unique_violation(err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            return DatabaseError::Duplicate(constraint);
        }
    }
    DatabaseError::Sqlx(err)
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.clone()),
        // Containment probes and arrays travel as JSONB
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}
