// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Live-database fixtures for tests.
//!
//! Each fixture creates a fresh database on the server named by `EXO_TEST_POSTGRES_URL`, runs
//! the init script, hands a client (and optionally a pool) to the test, and drops the database
//! afterwards. Without that variable the fixture returns `None` and the test is skipped.

use std::future::Future;
use std::str::FromStr;

use common::env_const::EXO_TEST_POSTGRES_URL;
use tokio_postgres::Config;
use upsert_env::{Environment, SystemEnvironment};

use crate::{DatabaseClient, DatabasePool};

pub fn test_server_url() -> Option<String> {
    SystemEnvironment.get(EXO_TEST_POSTGRES_URL)
}

fn database_url(server_url: &str, database_name: &str) -> Config {
    let mut config = Config::from_str(server_url).unwrap();
    config.dbname(database_name);
    config
}

async fn connect(config: &Config) -> DatabaseClient {
    let (client, connection) = config.connect(tokio_postgres::NoTls).await.unwrap();
    tokio::spawn(async move {
        let _ = connection.await;
    });
    DatabaseClient::Direct(client)
}

/// Run `f` against a fresh database, passing its connection settings.
async fn with_database<Fut, T>(f: impl FnOnce(Config) -> Fut) -> Option<T>
where
    Fut: Future<Output = T>,
{
    let Some(server_url) = test_server_url() else {
        eprintln!("{EXO_TEST_POSTGRES_URL} is not set; skipping database test");
        return None;
    };

    let database_name = format!("upsert_test_{}", uuid::Uuid::new_v4().simple());

    let admin_config = Config::from_str(&server_url).unwrap();
    let admin = connect(&admin_config).await;
    admin
        .batch_execute(&format!("CREATE DATABASE \"{database_name}\""))
        .await
        .unwrap();

    let result = f(database_url(&server_url, &database_name)).await;

    admin
        .batch_execute(&format!(
            "DROP DATABASE IF EXISTS \"{database_name}\" WITH (FORCE)"
        ))
        .await
        .unwrap();

    Some(result)
}

pub async fn with_client<Fut, T>(f: impl FnOnce(DatabaseClient) -> Fut) -> Option<T>
where
    Fut: Future<Output = T>,
{
    with_database(|config| async move { f(connect(&config).await).await }).await
}

pub async fn with_init_script<Fut, T>(
    init_script: &str,
    f: impl FnOnce(DatabaseClient) -> Fut,
) -> Option<T>
where
    Fut: Future<Output = T>,
{
    let init_script = init_script.to_string();
    with_client(|client| async move {
        client.batch_execute(&init_script).await.unwrap();

        f(client).await
    })
    .await
}

/// Like [`with_init_script`], also handing over a pool on the same database.
pub async fn with_pool_init_script<Fut, T>(
    init_script: &str,
    f: impl FnOnce(DatabaseClient, DatabasePool) -> Fut,
) -> Option<T>
where
    Fut: Future<Output = T>,
{
    let init_script = init_script.to_string();
    with_database(|config| async move {
        let client = connect(&config).await;
        client.batch_execute(&init_script).await.unwrap();

        let pool = DatabasePool::from_pg_config(config, 2).unwrap();
        f(client, pool).await
    })
    .await
}
