// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Shape the upserted row per the caller's selection.
//!
//! The statement selects one JSON object keyed by the output names of the row field(s) in the
//! payload selection, e.g. `json_build_object('bike', json_build_object('id', "upserted_1"."id"))`.
//! Everything else in the payload (`clientMutationId`, `__typename`) is filled in here.

use serde_json::{Map, Value};

use upsert_model::{
    policy::{OmitAction, PolicyLookup},
    subsystem::UpsertTable,
};
use upsert_sql::{Column, JsonObject, JsonObjectElement};

use crate::{
    error::UpsertExecutionError,
    upsert_request::{CLIENT_MUTATION_ID, UpsertRequest},
    validated_field::ValidatedField,
};

const TYPENAME_FIELD: &str = "__typename";

pub(crate) fn payload_selection<'a>(
    table: &'a UpsertTable,
    payload_type_name: &str,
    field: &ValidatedField,
    alias: &str,
    policy: &dyn PolicyLookup,
) -> Result<JsonObject<'a>, UpsertExecutionError> {
    let mut elements = vec![];

    for subfield in &field.subfields {
        match subfield.name.as_str() {
            CLIENT_MUTATION_ID | TYPENAME_FIELD => {}
            name if name == table.field_name => {
                elements.push(JsonObjectElement::new(
                    subfield.output_name(),
                    Column::JsonObject(row_selection(table, subfield, alias, policy)?),
                ));
            }
            name => {
                return Err(UpsertExecutionError::Validation(
                    name.to_string(),
                    format!("Not a field of '{payload_type_name}'"),
                ));
            }
        }
    }

    Ok(JsonObject(elements))
}

fn row_selection<'a>(
    table: &'a UpsertTable,
    row_field: &ValidatedField,
    alias: &str,
    policy: &dyn PolicyLookup,
) -> Result<JsonObject<'a>, UpsertExecutionError> {
    let mut elements = vec![];

    for subfield in &row_field.subfields {
        let name = subfield.name.as_str();
        if name == TYPENAME_FIELD {
            continue;
        }

        let column = table
            .column_fields()
            .find(|(column, field)| {
                field.field_name == name
                    && field.scalar.is_some()
                    && !policy.omit_column(&table.table, column, OmitAction::Read)
            })
            .map(|(column, _)| column)
            .ok_or_else(|| {
                UpsertExecutionError::Validation(
                    name.to_string(),
                    format!("Not a field of '{}'", table.type_name),
                )
            })?;

        if !subfield.subfields.is_empty() {
            return Err(UpsertExecutionError::Validation(
                name.to_string(),
                "Scalar fields take no selection".to_string(),
            ));
        }

        elements.push(JsonObjectElement::new(
            subfield.output_name(),
            Column::Physical {
                table_name: alias.to_string(),
                column,
            },
        ));
    }

    Ok(JsonObject(elements))
}

/// Assemble the payload. `row` is the object selected by the statement, or `None` if the statement
/// returned no row (a conflict resolved with `DO NOTHING`).
pub(crate) fn payload_response(
    table: &UpsertTable,
    payload_type_name: &str,
    field: &ValidatedField,
    request: &UpsertRequest,
    row: Option<Value>,
) -> Result<Value, UpsertExecutionError> {
    let mut payload = Map::new();

    for subfield in &field.subfields {
        let value = match subfield.name.as_str() {
            CLIENT_MUTATION_ID => match request.client_mutation_id {
                Some(value) => value.clone().into_json().map_err(|e| {
                    UpsertExecutionError::Generic(format!("Invalid clientMutationId: {e}"))
                })?,
                None => Value::Null,
            },
            TYPENAME_FIELD => Value::String(payload_type_name.to_string()),
            _ => match row
                .as_ref()
                .and_then(|row| row.get(subfield.output_name()))
            {
                Some(Value::Object(selected)) => row_response(table, subfield, selected),
                _ => Value::Null,
            },
        };

        payload.insert(subfield.output_name(), value);
    }

    Ok(Value::Object(payload))
}

fn row_response(
    table: &UpsertTable,
    row_field: &ValidatedField,
    selected: &Map<String, Value>,
) -> Value {
    let row = row_field
        .subfields
        .iter()
        .map(|subfield| {
            let output_name = subfield.output_name();
            let value = if subfield.name.as_str() == TYPENAME_FIELD {
                Value::String(table.type_name.clone())
            } else {
                selected.get(&output_name).cloned().unwrap_or(Value::Null)
            };
            (output_name, value)
        })
        .collect();

    Value::Object(row)
}
