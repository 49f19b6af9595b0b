// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Build the types and the mutation field of `upsert<Type>`:
//!
//! ```graphql
//! upsertBike(where: UpsertBikeWhere, input: UpsertBikeInput!, onConflict: UpsertBikeOnConflict): UpsertBikePayload
//! ```

use async_graphql_parser::types::{FieldDefinition, TypeDefinition};

use upsert_model::{
    error::ModelBuildingError,
    naming::{
        do_update_type_name, on_conflict_type_name, payload_type_name, table_input_type_name,
        upsert_input_type_name, upsert_operation_name, where_type_name,
    },
    policy::{OmitAction, PolicyLookup},
    subsystem::UpsertTable,
    type_normalization::{
        field_definition, input_object_type, input_value, named_type, object_type,
    },
    update_action::UPDATE_ACTION_TYPE_NAME,
};

pub(super) const CLIENT_MUTATION_ID_FIELD: &str = "clientMutationId";

/// A field of the `Upsert<Type>Where` input.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct WhereField {
    pub name: String,
    pub scalar: &'static str,
}

/// One field per column taking part in a unique constraint, in constraint order and deduplicated
/// by name. Constraints with a column hidden from reads are left out entirely.
pub(super) fn where_fields(
    upsert_table: &UpsertTable,
    policy: &dyn PolicyLookup,
) -> Result<Vec<WhereField>, ModelBuildingError> {
    let table = &upsert_table.table;
    let mut fields: Vec<WhereField> = vec![];

    for constraint in &table.constraints {
        let columns = constraint
            .column_nums
            .iter()
            .map(|num| {
                table
                    .column_by_num(*num)
                    .ok_or_else(|| ModelBuildingError::MissingAttribute {
                        table: table.name.to_string(),
                        column_num: *num,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if columns
            .iter()
            .any(|column| policy.omit_column(table, column, OmitAction::Read))
        {
            continue;
        }

        for column in columns {
            let (_, field) = upsert_table
                .column_fields()
                .find(|(candidate, _)| candidate.num == column.num)
                .ok_or_else(|| ModelBuildingError::MissingAttribute {
                    table: table.name.to_string(),
                    column_num: column.num,
                })?;

            let scalar = field
                .scalar
                .ok_or_else(|| ModelBuildingError::MissingInputType {
                    column: column.name.clone(),
                    type_name: upsert_table.type_name.clone(),
                })?;

            if !fields.iter().any(|existing| existing.name == field.field_name) {
                fields.push(WhereField {
                    name: field.field_name.clone(),
                    scalar,
                });
            }
        }
    }

    Ok(fields)
}

pub(super) fn where_type_definition(
    upsert_table: &UpsertTable,
    fields: &[WhereField],
) -> TypeDefinition {
    let type_name = &upsert_table.type_name;

    input_object_type(
        &where_type_name(type_name),
        Some(format!("Where conditions for the upsert `{type_name}` mutation.")),
        fields
            .iter()
            .map(|field| input_value(&field.name, named_type(field.scalar, true), None))
            .collect(),
    )
}

pub(super) fn upsert_input_type_definition(upsert_table: &UpsertTable) -> TypeDefinition {
    let type_name = &upsert_table.type_name;

    input_object_type(
        &upsert_input_type_name(type_name),
        Some(format!("All input for the upsert `{type_name}` mutation.")),
        vec![
            input_value(
                CLIENT_MUTATION_ID_FIELD,
                named_type("String", true),
                Some("An arbitrary string value with no semantic meaning. Will be included in the payload verbatim. May be used to track mutations by the client.".into()),
            ),
            input_value(
                &upsert_table.field_name,
                named_type(&table_input_type_name(type_name), false),
                Some(format!("The `{type_name}` to be upserted by this mutation.")),
            ),
        ],
    )
}

pub(super) fn payload_type_definition(upsert_table: &UpsertTable) -> TypeDefinition {
    let type_name = &upsert_table.type_name;

    object_type(
        &payload_type_name(type_name),
        Some(format!("The output of our upsert `{type_name}` mutation.")),
        vec![
            field_definition(
                CLIENT_MUTATION_ID_FIELD,
                named_type("String", true),
                vec![],
                Some("The exact same `clientMutationId` that was provided in the mutation input, unchanged and unused. May be used by a client to track mutations.".into()),
            ),
            field_definition(
                &upsert_table.field_name,
                named_type(type_name, true),
                vec![],
                Some(format!("The `{type_name}` that was upserted by this mutation.")),
            ),
        ],
    )
}

pub(super) fn on_conflict_type_definition(upsert_table: &UpsertTable) -> TypeDefinition {
    let type_name = &upsert_table.type_name;

    input_object_type(
        &on_conflict_type_name(type_name),
        Some(format!(
            "Conflict resolution for the upsert `{type_name}` mutation. Provide at most one of `doNothing` and `doUpdate`."
        )),
        vec![
            input_value(
                "doNothing",
                named_type("Boolean", true),
                Some("Leave a conflicting row untouched.".into()),
            ),
            input_value(
                "doUpdate",
                named_type(&do_update_type_name(type_name), true),
                Some("Per-column action on the conflicting row.".into()),
            ),
        ],
    )
}

/// One `UpsertUpdateAction` field per updatable column. Returns the type along with its field
/// names.
pub(super) fn do_update_type_definition(
    upsert_table: &UpsertTable,
    policy: &dyn PolicyLookup,
) -> (TypeDefinition, Vec<String>) {
    let table = &upsert_table.table;

    let field_names: Vec<String> = upsert_table
        .column_fields()
        .filter(|(column, field)| {
            field.scalar.is_some() && !policy.omit_column(table, column, OmitAction::Update)
        })
        .map(|(_, field)| field.field_name.clone())
        .collect();

    let definition = input_object_type(
        &do_update_type_name(&upsert_table.type_name),
        None,
        field_names
            .iter()
            .map(|name| input_value(name, named_type(UPDATE_ACTION_TYPE_NAME, true), None))
            .collect(),
    );

    (definition, field_names)
}

pub(super) fn mutation_field(
    upsert_table: &UpsertTable,
    has_where: bool,
    enable_conflict_tuning: bool,
) -> FieldDefinition {
    let type_name = &upsert_table.type_name;

    let mut arguments = vec![];
    if has_where {
        arguments.push(input_value(
            "where",
            named_type(&where_type_name(type_name), true),
            None,
        ));
    }
    arguments.push(input_value(
        "input",
        named_type(&upsert_input_type_name(type_name), false),
        None,
    ));
    if enable_conflict_tuning {
        arguments.push(input_value(
            "onConflict",
            named_type(&on_conflict_type_name(type_name), true),
            None,
        ));
    }

    field_definition(
        &upsert_operation_name(type_name),
        named_type(&payload_type_name(type_name), true),
        arguments,
        Some(format!("Upserts a single `{type_name}`.")),
    )
}
