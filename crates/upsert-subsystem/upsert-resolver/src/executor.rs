// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_trait::async_trait;
use tokio_postgres::types::ToSql;
use tracing::instrument;

use upsert_sql::{DatabaseClient, DatabasePool, database_error::DatabaseError};

/// Runs a statement whose single column is JSON text, returning one value per row.
#[async_trait]
pub trait UpsertExecutor: Send + Sync {
    async fn query_json(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<serde_json::Value>, DatabaseError>;
}

#[async_trait]
impl UpsertExecutor for DatabaseClient {
    #[instrument(name = "DatabaseClient::query_json", skip_all)]
    async fn query_json(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<serde_json::Value>, DatabaseError> {
        let rows = self.query(sql, params).await?;

        rows.iter()
            .map(|row| {
                let text: String = row.try_get(0)?;
                serde_json::from_str(&text).map_err(|e| DatabaseError::BoxedError(Box::new(e)))
            })
            .collect()
    }
}

/// Borrows one pooled connection for the statement.
#[async_trait]
impl UpsertExecutor for DatabasePool {
    async fn query_json(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<serde_json::Value>, DatabaseError> {
        let client = self.get_client().await?;
        client.query_json(sql, params).await
    }
}
