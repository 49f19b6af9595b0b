// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{io::Write, path::PathBuf, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use clap::Command;
use colored::Colorize;
use upsert_builder::print_sdl;
use upsert_env::Environment;

use super::{
    command::{CommandDefinition, conflict_tuning_arg, database_arg, get, output_arg, schemas_arg},
    util::{build_subsystem, open_file_for_output, upsert_config},
};

pub(crate) struct SchemaCommandDefinition {}

#[async_trait]
impl CommandDefinition for SchemaCommandDefinition {
    fn command(&self) -> Command {
        Command::new("schema")
            .about("Print the upsert mutations and types generated for a database")
            .arg(database_arg())
            .arg(schemas_arg())
            .arg(conflict_tuning_arg())
            .arg(output_arg())
    }

    async fn execute(&self, matches: &clap::ArgMatches, env: Arc<dyn Environment>) -> Result<()> {
        let config = upsert_config(matches, env.as_ref())?;
        let output: Option<PathBuf> = get(matches, "output");

        let subsystem = build_subsystem(&config).await?;

        if subsystem.operations.is_empty() {
            eprintln!(
                "{}",
                "No table has a primary key or unique constraint usable for upserts".yellow()
            );
        }

        let mut writer = open_file_for_output(output.as_deref())?;
        writer.write_all(print_sdl(&subsystem).as_bytes())?;

        if let Some(output) = &output {
            eprintln!(
                "{}",
                format!(
                    "Upsert schema ({} mutations) written to `{}`",
                    subsystem.operations.len(),
                    output.display()
                )
                .green()
            );
        }

        Ok(())
    }
}
