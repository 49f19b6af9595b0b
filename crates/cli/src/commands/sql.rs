// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use async_graphql_parser::types::TypeKind;
use async_graphql_value::{ConstValue, Name};
use async_trait::async_trait;
use clap::{Arg, Command};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use upsert_env::Environment;
use upsert_model::{policy::SmartTagPolicy, subsystem::UpsertSubsystem};
use upsert_resolver::{
    AliasGenerator, INPUT_ARGUMENT, ON_CONFLICT_ARGUMENT, UpsertResolver, ValidatedField,
    WHERE_ARGUMENT,
};

use super::{
    command::{
        CommandDefinition, conflict_tuning_arg, database_arg, get, get_required, schemas_arg,
    },
    util::{build_subsystem, upsert_config},
};

pub(crate) struct SqlCommandDefinition {}

#[async_trait]
impl CommandDefinition for SqlCommandDefinition {
    fn command(&self) -> Command {
        Command::new("sql")
            .about("Show the statement an upsert would run, without running it")
            .arg(
                Arg::new("table")
                    .help("The table to upsert into (`name` or `schema.name`)")
                    .long("table")
                    .required(true)
                    .num_args(1),
            )
            .arg(
                Arg::new("where")
                    .help("The `where` argument as a JSON object, such as '{\"id\": 1}'")
                    .long("where")
                    .required(false)
                    .num_args(1),
            )
            .arg(
                Arg::new("input")
                    .help("The row to upsert as a JSON object, keyed by GraphQL field names")
                    .long("input")
                    .required(true)
                    .num_args(1),
            )
            .arg(
                Arg::new("on-conflict")
                    .help("The `onConflict` argument as a JSON object (requires --conflict-tuning)")
                    .long("on-conflict")
                    .required(false)
                    .num_args(1),
            )
            .arg(database_arg())
            .arg(schemas_arg())
            .arg(conflict_tuning_arg())
    }

    async fn execute(&self, matches: &clap::ArgMatches, env: Arc<dyn Environment>) -> Result<()> {
        let config = upsert_config(matches, env.as_ref())?;
        let table: String = get_required(matches, "table")?;
        let where_json: Option<String> = get(matches, "where");
        let input_json: String = get_required(matches, "input")?;
        let on_conflict_json: Option<String> = get(matches, "on-conflict");

        let subsystem = build_subsystem(&config).await?;
        let resolver = UpsertResolver::new(subsystem, Arc::new(SmartTagPolicy));

        let field = upsert_field(
            resolver.subsystem(),
            &table,
            where_json.as_deref(),
            &input_json,
            on_conflict_json.as_deref(),
        )?;

        let prepared = resolver
            .prepare(&field, &mut AliasGenerator::new())
            .map_err(|e| anyhow!(e.user_error_message()))?
            .ok_or_else(|| anyhow!("`{}` is not an upsert mutation", field.name))?;

        println!("{}", prepared.sql);
        for (index, param) in prepared.params.iter().enumerate() {
            println!("${} = {:?}", index + 1, param);
        }

        Ok(())
    }
}

/// The `upsert<T>` field a client would send for `table`, selecting every readable column of the
/// upserted row.
fn upsert_field(
    subsystem: &UpsertSubsystem,
    table: &str,
    where_json: Option<&str>,
    input_json: &str,
    on_conflict_json: Option<&str>,
) -> Result<ValidatedField> {
    let (operation_name, upsert_table) = subsystem
        .operations
        .iter()
        .map(|(name, operation)| (name, subsystem.table(operation)))
        .find(|(_, upsert_table)| {
            let name = &upsert_table.table.name;
            name.name == table || format!("{}.{}", name.schema, name.name) == table
        })
        .ok_or_else(|| anyhow!("Table `{table}` has no upsert mutation"))?;

    let mut arguments = IndexMap::new();

    if let Some(where_json) = where_json {
        arguments.insert(WHERE_ARGUMENT.to_string(), parse_json("--where", where_json)?);
    }

    let row: Value = serde_json::from_str(input_json).context("Invalid JSON for --input")?;
    let mut input = Map::new();
    input.insert(upsert_table.field_name.clone(), row);
    arguments.insert(
        INPUT_ARGUMENT.to_string(),
        ConstValue::from_json(Value::Object(input))?,
    );

    if let Some(on_conflict_json) = on_conflict_json {
        arguments.insert(
            ON_CONFLICT_ARGUMENT.to_string(),
            parse_json("--on-conflict", on_conflict_json)?,
        );
    }

    let row_fields = match subsystem.get_type(&upsert_table.type_name).map(|typ| &typ.kind) {
        Some(TypeKind::Object(object)) => object
            .fields
            .iter()
            .map(|field| selected(field.node.name.node.clone(), vec![]))
            .collect(),
        _ => vec![],
    };

    Ok(ValidatedField {
        alias: None,
        name: Name::new(operation_name),
        arguments,
        subfields: vec![selected(Name::new(&upsert_table.field_name), row_fields)],
    })
}

fn parse_json(arg: &str, json: &str) -> Result<ConstValue> {
    let value: Value =
        serde_json::from_str(json).with_context(|| format!("Invalid JSON for {arg}"))?;
    Ok(ConstValue::from_json(value)?)
}

fn selected(name: Name, subfields: Vec<ValidatedField>) -> ValidatedField {
    ValidatedField {
        alias: None,
        name,
        arguments: IndexMap::new(),
        subfields,
    }
}
