// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use anyhow::Result;
use common::logging_tracing;
use upsert_env::SystemEnvironment;

use commands::{
    command::{CommandDefinition, SubcommandDefinition},
    schema::SchemaCommandDefinition,
    sql::SqlCommandDefinition,
};

mod commands;

fn command_definition() -> SubcommandDefinition {
    SubcommandDefinition::new(
        "pgupsert",
        "Generate GraphQL upsert mutations for PostgreSQL tables",
        vec![
            Box::new(SchemaCommandDefinition {}),
            Box::new(SqlCommandDefinition {}),
        ],
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    logging_tracing::init()?;

    let subcommand_definition = command_definition();

    let command = subcommand_definition
        .command()
        .version(env!("CARGO_PKG_VERSION"));

    let matches = command.get_matches();

    subcommand_definition
        .execute(&matches, Arc::new(SystemEnvironment))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        command_definition().command().debug_assert();
    }

    #[test]
    fn schemas_are_comma_separated() {
        let matches = command_definition()
            .command()
            .try_get_matches_from([
                "pgupsert",
                "schema",
                "--schemas",
                "public,inventory",
                "--conflict-tuning",
            ])
            .unwrap();
        let (_, schema_matches) = matches.subcommand().unwrap();

        let env = upsert_env::MapEnvironment::new();
        let config = commands::util::upsert_config(schema_matches, &env).unwrap();

        assert_eq!(config.schemas, vec!["public", "inventory"]);
        assert!(config.enable_conflict_tuning);
        assert_eq!(config.database.url, None);
    }

    #[test]
    fn sql_requires_table_and_input() {
        let result = command_definition()
            .command()
            .try_get_matches_from(["pgupsert", "sql", "--input", "{}"]);

        assert!(result.is_err());
    }
}
