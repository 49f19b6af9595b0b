// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::str::FromStr;

use common::{config::DatabaseConfig, env_const::EXO_POSTGRES_URL};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::{Config, NoTls};

use crate::database_error::DatabaseError;

use super::database_client::DatabaseClient;

pub struct DatabasePool {
    pool: Pool,
}

impl DatabasePool {
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let url = config.url.as_deref().ok_or_else(|| {
            DatabaseError::Config(format!("Env {EXO_POSTGRES_URL} must be provided"))
        })?;

        let mut pg_config = Config::from_str(url).map_err(|e| {
            DatabaseError::Delegate(e)
                .with_context("Failed to parse PostgreSQL connection string".into())
        })?;

        if let Some(user) = &config.user {
            pg_config.user(user);
        }
        if let Some(password) = &config.password {
            pg_config.password(password);
        }

        let db = Self::from_pg_config(pg_config, config.pool_size)?;

        if config.check_connection_on_startup {
            let _ = db.get_client().await?;
        }

        Ok(db)
    }

    /// A pool over already-resolved connection settings. Connections open lazily.
    pub fn from_pg_config(pg_config: Config, pool_size: usize) -> Result<Self, DatabaseError> {
        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let manager = Manager::from_config(pg_config, NoTls, manager_config);

        let pool = Pool::builder(manager)
            .max_size(pool_size)
            .build()
            .map_err(|e| DatabaseError::Config(format!("Failed to create DB pool: {e}")))?;

        Ok(Self { pool })
    }

    pub async fn get_client(&self) -> Result<DatabaseClient, DatabaseError> {
        Ok(DatabaseClient::Pooled(self.pool.get().await?))
    }
}
