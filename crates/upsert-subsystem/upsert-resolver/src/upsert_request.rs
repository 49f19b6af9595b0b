// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The arguments of one `upsert<Type>` call, checked against the operation's shape.

use async_graphql_value::{ConstValue, Name};
use indexmap::IndexMap;

use upsert_model::{
    naming::{
        do_update_type_name, table_input_type_name, upsert_input_type_name, where_type_name,
    },
    subsystem::{UpsertOperation, UpsertTable},
    update_action::UpdateAction,
};

use crate::error::UpsertExecutionError;

pub const WHERE_ARGUMENT: &str = "where";
pub const INPUT_ARGUMENT: &str = "input";
pub const ON_CONFLICT_ARGUMENT: &str = "onConflict";
pub const CLIENT_MUTATION_ID: &str = "clientMutationId";

const DO_NOTHING_FIELD: &str = "doNothing";
const DO_UPDATE_FIELD: &str = "doUpdate";

pub type ValueMap = IndexMap<Name, ConstValue>;

#[derive(Debug)]
pub struct UpsertRequest<'a> {
    /// `None` when `where` is absent (or `null`)
    pub where_values: Option<&'a ValueMap>,
    /// The row payload (`input.<tableField>`)
    pub row: &'a ValueMap,
    /// Echoed back as is
    pub client_mutation_id: Option<&'a ConstValue>,
    pub tuning: ConflictTuning,
}

/// The caller's `onConflict` choices.
#[derive(Debug, Default, PartialEq)]
pub struct ConflictTuning {
    pub do_nothing: bool,
    /// Per-column actions keyed by field name
    pub actions: IndexMap<String, UpdateAction>,
}

impl<'a> UpsertRequest<'a> {
    pub fn from_arguments(
        arguments: &'a IndexMap<String, ConstValue>,
        operation: &UpsertOperation,
        table: &UpsertTable,
        enable_conflict_tuning: bool,
    ) -> Result<Self, UpsertExecutionError> {
        let has_where = !operation.where_fields.is_empty();

        for name in arguments.keys() {
            let known = (name == WHERE_ARGUMENT && has_where)
                || name == INPUT_ARGUMENT
                || (name == ON_CONFLICT_ARGUMENT && enable_conflict_tuning);
            if !known {
                return Err(UpsertExecutionError::Validation(
                    name.clone(),
                    format!("Unknown argument to '{}'", operation.name),
                ));
            }
        }

        let where_values = match arguments.get(WHERE_ARGUMENT) {
            None | Some(ConstValue::Null) => None,
            Some(value) => {
                let where_values = expect_object(WHERE_ARGUMENT, value)?;
                ensure_known_fields(
                    WHERE_ARGUMENT,
                    where_values,
                    &operation.where_fields,
                    &where_type_name(&table.type_name),
                )?;
                Some(where_values)
            }
        };

        let input = match arguments.get(INPUT_ARGUMENT) {
            None | Some(ConstValue::Null) => {
                return Err(UpsertExecutionError::MissingArgument(
                    INPUT_ARGUMENT.to_string(),
                ));
            }
            Some(value) => expect_object(INPUT_ARGUMENT, value)?,
        };

        for key in input.keys() {
            if key.as_str() != CLIENT_MUTATION_ID && key.as_str() != table.field_name {
                return Err(UpsertExecutionError::Validation(
                    format!("{INPUT_ARGUMENT}.{key}"),
                    format!("Not a field of '{}'", upsert_input_type_name(&table.type_name)),
                ));
            }
        }

        let row_path = format!("{INPUT_ARGUMENT}.{}", table.field_name);
        let row = match input.get(table.field_name.as_str()) {
            None | Some(ConstValue::Null) => {
                return Err(UpsertExecutionError::MissingArgument(row_path));
            }
            Some(value) => expect_object(&row_path, value)?,
        };
        ensure_known_fields(
            &row_path,
            row,
            &operation.input_fields,
            &table_input_type_name(&table.type_name),
        )?;

        let tuning = match arguments.get(ON_CONFLICT_ARGUMENT) {
            None | Some(ConstValue::Null) => ConflictTuning::default(),
            Some(value) => conflict_tuning(value, operation, table)?,
        };

        Ok(UpsertRequest {
            where_values,
            row,
            client_mutation_id: input.get(CLIENT_MUTATION_ID),
            tuning,
        })
    }

    /// The keys of the row payload, in the order given.
    pub fn row_keys(&self) -> Vec<String> {
        self.row.keys().map(|key| key.to_string()).collect()
    }
}

fn conflict_tuning(
    value: &ConstValue,
    operation: &UpsertOperation,
    table: &UpsertTable,
) -> Result<ConflictTuning, UpsertExecutionError> {
    let on_conflict = expect_object(ON_CONFLICT_ARGUMENT, value)?;
    let mut tuning = ConflictTuning::default();
    let mut has_do_update = false;

    for (key, value) in on_conflict {
        match (key.as_str(), value) {
            (DO_NOTHING_FIELD | DO_UPDATE_FIELD, ConstValue::Null) => {}
            (DO_NOTHING_FIELD, ConstValue::Boolean(do_nothing)) => tuning.do_nothing = *do_nothing,
            (DO_UPDATE_FIELD, value) => {
                let path = format!("{ON_CONFLICT_ARGUMENT}.{DO_UPDATE_FIELD}");
                let do_update = expect_object(&path, value)?;
                ensure_known_fields(
                    &path,
                    do_update,
                    &operation.do_update_fields,
                    &do_update_type_name(&table.type_name),
                )?;

                for (field, action) in do_update {
                    let action = match action {
                        ConstValue::Enum(name) => UpdateAction::from_graphql_name(name.as_str()),
                        ConstValue::String(name) => UpdateAction::from_graphql_name(name),
                        _ => None,
                    }
                    .ok_or_else(|| {
                        UpsertExecutionError::Validation(
                            format!("{path}.{field}"),
                            format!("Invalid update action {action}"),
                        )
                    })?;
                    tuning.actions.insert(field.to_string(), action);
                }
                has_do_update = true;
            }
            _ => {
                return Err(UpsertExecutionError::Validation(
                    format!("{ON_CONFLICT_ARGUMENT}.{key}"),
                    format!("Unexpected value {value}"),
                ));
            }
        }
    }

    if tuning.do_nothing && has_do_update {
        return Err(UpsertExecutionError::Validation(
            ON_CONFLICT_ARGUMENT.to_string(),
            "Provide at most one of `doNothing` and `doUpdate`".to_string(),
        ));
    }

    Ok(tuning)
}

fn expect_object<'a>(
    path: &str,
    value: &'a ConstValue,
) -> Result<&'a ValueMap, UpsertExecutionError> {
    match value {
        ConstValue::Object(object) => Ok(object),
        _ => Err(UpsertExecutionError::Validation(
            path.to_string(),
            format!("Expected an object, got {value}"),
        )),
    }
}

fn ensure_known_fields(
    path: &str,
    object: &ValueMap,
    fields: &[String],
    type_name: &str,
) -> Result<(), UpsertExecutionError> {
    match object
        .keys()
        .find(|key| !fields.iter().any(|field| field == key.as_str()))
    {
        Some(unknown) => Err(UpsertExecutionError::Validation(
            format!("{path}.{unknown}"),
            format!("Not a field of '{type_name}'"),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use upsert_builder::build;
    use upsert_model::{
        policy::SmartTagPolicy,
        subsystem::{BuildOptions, UpsertSubsystem},
        test_fixtures::test_catalog,
    };

    use super::*;

    fn subsystem(enable_conflict_tuning: bool) -> UpsertSubsystem {
        build(
            &test_catalog(),
            &SmartTagPolicy,
            &BuildOptions {
                enable_conflict_tuning,
            },
        )
        .unwrap()
    }

    fn arguments(json: serde_json::Value) -> IndexMap<String, ConstValue> {
        match ConstValue::from_json(json).unwrap() {
            ConstValue::Object(object) => object
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            _ => panic!("Expected an object"),
        }
    }

    fn request_error(
        subsystem: &UpsertSubsystem,
        operation: &str,
        json: serde_json::Value,
    ) -> String {
        let operation = subsystem.operation(operation).unwrap();
        let arguments = arguments(json);
        UpsertRequest::from_arguments(
            &arguments,
            operation,
            subsystem.table(operation),
            subsystem.options.enable_conflict_tuning,
        )
        .unwrap_err()
        .to_string()
    }

    #[test]
    fn extracts_parts() {
        let subsystem = subsystem(true);
        let operation = subsystem.operation("upsertRole").unwrap();
        let arguments = arguments(serde_json::json!({
            "where": {"projectName": "sales", "title": "director"},
            "input": {"clientMutationId": "m1", "role": {"name": "jerry", "rank": 1}},
            "onConflict": {"doUpdate": {"name": "ignore", "updated": "current_timestamp"}}
        }));

        let request =
            UpsertRequest::from_arguments(&arguments, operation, subsystem.table(operation), true)
                .unwrap();

        assert_eq!(request.where_values.map(|values| values.len()), Some(2));
        assert_eq!(request.row_keys(), vec!["name", "rank"]);
        assert_eq!(
            request.client_mutation_id,
            Some(&ConstValue::String("m1".into()))
        );
        assert!(!request.tuning.do_nothing);
        assert_eq!(
            request.tuning.actions.get("updated"),
            Some(&UpdateAction::CurrentTimestamp)
        );
    }

    #[test]
    fn null_where_is_absent() {
        let subsystem = subsystem(false);
        let operation = subsystem.operation("upsertBike").unwrap();
        let arguments = arguments(serde_json::json!({
            "where": null,
            "input": {"bike": {"make": "kona"}}
        }));

        let request =
            UpsertRequest::from_arguments(&arguments, operation, subsystem.table(operation), false)
                .unwrap();
        assert!(request.where_values.is_none());
        assert!(request.client_mutation_id.is_none());
    }

    #[test]
    fn rejects_malformed_arguments() {
        let subsystem = subsystem(false);

        assert_eq!(
            request_error(&subsystem, "upsertBike", serde_json::json!({})),
            "Missing argument 'input'"
        );
        assert_eq!(
            request_error(
                &subsystem,
                "upsertBike",
                serde_json::json!({"input": {"clientMutationId": "x"}})
            ),
            "Missing argument 'input.bike'"
        );
        assert_eq!(
            request_error(
                &subsystem,
                "upsertBike",
                serde_json::json!({"input": {"bike": {"colour": "red"}}})
            ),
            "Invalid field 'input.bike.colour': Not a field of 'BikeInput'"
        );
        assert_eq!(
            request_error(
                &subsystem,
                "upsertBike",
                serde_json::json!({"where": {"make": "kona"}, "input": {"bike": {}}})
            ),
            "Invalid field 'where.make': Not a field of 'UpsertBikeWhere'"
        );
    }

    #[test]
    fn on_conflict_requires_tuning() {
        assert_eq!(
            request_error(
                &subsystem(false),
                "upsertBike",
                serde_json::json!({"input": {"bike": {}}, "onConflict": {"doNothing": true}})
            ),
            "Invalid field 'onConflict': Unknown argument to 'upsertBike'"
        );

        assert_eq!(
            request_error(
                &subsystem(true),
                "upsertBike",
                serde_json::json!({
                    "input": {"bike": {}},
                    "onConflict": {"doNothing": true, "doUpdate": {"make": "ignore"}}
                })
            ),
            "Invalid field 'onConflict': Provide at most one of `doNothing` and `doUpdate`"
        );

        assert_eq!(
            request_error(
                &subsystem(true),
                "upsertBike",
                serde_json::json!({
                    "input": {"bike": {}},
                    "onConflict": {"doUpdate": {"make": "overwrite"}}
                })
            ),
            "Invalid field 'onConflict.doUpdate.make': Invalid update action \"overwrite\""
        );
    }
}
