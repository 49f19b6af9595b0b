// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::ops::Deref;

use tokio_postgres::NoTls;

use crate::database_error::DatabaseError;

/// A connection borrowed from the pool, or one opened directly (tools and tests).
pub enum DatabaseClient {
    Pooled(deadpool_postgres::Client),
    Direct(tokio_postgres::Client),
}

impl DatabaseClient {
    /// Open a dedicated connection. The connection task is spawned onto the current runtime.
    pub async fn connect(url: &str) -> Result<Self, DatabaseError> {
        let (client, connection) = tokio_postgres::connect(url, NoTls).await.map_err(|e| {
            DatabaseError::Delegate(e).with_context("Failed to connect to PostgreSQL".into())
        })?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("Database connection error: {}", e);
            }
        });

        Ok(DatabaseClient::Direct(client))
    }
}

impl Deref for DatabaseClient {
    type Target = tokio_postgres::Client;

    fn deref(&self) -> &Self::Target {
        match self {
            DatabaseClient::Pooled(client) => client,
            DatabaseClient::Direct(client) => client,
        }
    }
}
