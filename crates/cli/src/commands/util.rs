// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{
    fs::File,
    io::{Write, stdout},
    path::Path,
};

use anyhow::Result;
use clap::ArgMatches;
use common::config::UpsertConfig;
use tracing::info;
use upsert_builder::build;
use upsert_env::Environment;
use upsert_model::{
    policy::SmartTagPolicy,
    subsystem::{BuildOptions, UpsertSubsystem},
};
use upsert_sql::{DatabasePool, schema::CatalogSpec};

use super::command::get;

/// Configuration from the environment, overridden by whatever the command line supplies.
pub(crate) fn upsert_config(matches: &ArgMatches, env: &dyn Environment) -> Result<UpsertConfig> {
    let mut config = UpsertConfig::from_env(env)?;

    if let Some(database) = get::<String>(matches, "database") {
        config.database.url = Some(database);
    }
    if let Some(schemas) = matches.get_many::<String>("schemas") {
        config.schemas = schemas
            .map(|schema| schema.trim().to_string())
            .filter(|schema| !schema.is_empty())
            .collect();
    }
    if matches.get_flag("conflict-tuning") {
        config.enable_conflict_tuning = true;
    }

    Ok(config)
}

/// Introspect the configured database and run the schema-extension pass over it.
pub(crate) async fn build_subsystem(config: &UpsertConfig) -> Result<UpsertSubsystem> {
    let pool = DatabasePool::from_config(&config.database).await?;
    let client = pool.get_client().await?;

    let catalog = CatalogSpec::from_live_database(&client, &config.schemas).await?;
    info!(tables = catalog.tables.len(), "Introspected database");

    let subsystem = build(
        &catalog,
        &SmartTagPolicy,
        &BuildOptions {
            enable_conflict_tuning: config.enable_conflict_tuning,
        },
    )?;

    Ok(subsystem)
}

pub(crate) fn open_file_for_output(output: Option<&Path>) -> Result<Box<dyn Write + Send>> {
    match output {
        Some(output) => Ok(Box::new(File::create(output)?)),
        None => Ok(Box::new(stdout())),
    }
}
