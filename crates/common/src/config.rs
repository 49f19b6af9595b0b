// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use upsert_env::{EnvError, Environment, parse_number};

use crate::env_const::{
    EXO_CHECK_CONNECTION_ON_STARTUP, EXO_CONNECTION_POOL_SIZE, EXO_POSTGRES_PASSWORD,
    EXO_POSTGRES_URL, EXO_POSTGRES_USER, EXO_UPSERT_CONFLICT_TUNING, EXO_UPSERT_SCHEMAS,
};

const DEFAULT_POOL_SIZE: usize = 10;
const DEFAULT_SCHEMA: &str = "public";

/// Connection settings for the database being introspected and written to.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub pool_size: usize,
    pub check_connection_on_startup: bool,
}

/// Everything the upsert generator reads from its environment.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertConfig {
    pub database: DatabaseConfig,
    /// Adds the `onConflict` argument to every upsert mutation.
    pub enable_conflict_tuning: bool,
    /// Schemas whose tables are considered for upsert generation.
    pub schemas: Vec<String>,
}

impl UpsertConfig {
    pub fn from_env(env: &dyn Environment) -> Result<Self, EnvError> {
        let database = DatabaseConfig {
            url: env.get(EXO_POSTGRES_URL),
            user: env.get(EXO_POSTGRES_USER),
            password: env.get(EXO_POSTGRES_PASSWORD),
            pool_size: parse_number(env, EXO_CONNECTION_POOL_SIZE)?.unwrap_or(DEFAULT_POOL_SIZE),
            check_connection_on_startup: env.enabled(EXO_CHECK_CONNECTION_ON_STARTUP, true)?,
        };

        Ok(Self {
            database,
            enable_conflict_tuning: env.enabled(EXO_UPSERT_CONFLICT_TUNING, false)?,
            schemas: env.get_list(EXO_UPSERT_SCHEMAS, vec![DEFAULT_SCHEMA.to_string()]),
        })
    }
}

#[cfg(test)]
mod tests {
    use upsert_env::MapEnvironment;

    use super::*;

    #[test]
    fn defaults() {
        let config = UpsertConfig::from_env(&MapEnvironment::new()).unwrap();

        assert_eq!(config.database.url, None);
        assert_eq!(config.database.pool_size, 10);
        assert!(config.database.check_connection_on_startup);
        assert!(!config.enable_conflict_tuning);
        assert_eq!(config.schemas, vec!["public".to_string()]);
    }

    #[test]
    fn explicit_values() {
        let env = MapEnvironment::from([
            (EXO_POSTGRES_URL, "postgres://localhost/bikes"),
            (EXO_CONNECTION_POOL_SIZE, "2"),
            (EXO_CHECK_CONNECTION_ON_STARTUP, "false"),
            (EXO_UPSERT_CONFLICT_TUNING, "true"),
            (EXO_UPSERT_SCHEMAS, "public,inventory"),
        ]);
        let config = UpsertConfig::from_env(&env).unwrap();

        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://localhost/bikes")
        );
        assert_eq!(config.database.pool_size, 2);
        assert!(!config.database.check_connection_on_startup);
        assert!(config.enable_conflict_tuning);
        assert_eq!(
            config.schemas,
            vec!["public".to_string(), "inventory".to_string()]
        );
    }

    #[test]
    fn invalid_pool_size() {
        let env = MapEnvironment::from([(EXO_CONNECTION_POOL_SIZE, "many")]);

        assert!(matches!(
            UpsertConfig::from_env(&env),
            Err(EnvError::InvalidNumber { .. })
        ));
    }
}
