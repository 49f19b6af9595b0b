// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Decide how an upsert request maps onto `INSERT ... ON CONFLICT`.
//!
//! The decision is made in three steps:
//! 1. Pick the conflict target: the first unique constraint (in catalog order) whose columns are
//!    all keys of `where`. Without `where`, the first one whose columns are all keys of the row
//!    payload, falling back to the primary key.
//! 2. Reconcile `where` with the row payload column by column. A value given in both places must
//!    agree; a value given only in `where` is inserted as well; a column given in neither is left
//!    to its default.
//! 3. Derive the update set from the inserted columns, minus those the policy or the caller's
//!    `onConflict` keep out of the update.

use async_graphql_value::ConstValue;

use upsert_model::{
    policy::{OmitAction, PolicyLookup},
    subsystem::UpsertTable,
    update_action::UpdateAction,
};
use upsert_sql::{
    Column, ColumnType, ConflictAction, ConflictAssignment, PhysicalColumn, UniqueConstraint,
};

use crate::{
    error::UpsertExecutionError,
    upsert_request::{UpsertRequest, ValueMap},
};

#[derive(Debug)]
pub struct ConflictPlan<'a> {
    pub constraint: &'a UniqueConstraint,
    /// Columns to insert with their values, in column order
    pub values: Vec<(&'a PhysicalColumn, &'a ConstValue)>,
    pub action: ConflictAction<'a>,
}

pub fn plan<'a>(
    table: &'a UpsertTable,
    request: &UpsertRequest<'a>,
    policy: &dyn PolicyLookup,
) -> Result<ConflictPlan<'a>, UpsertExecutionError> {
    let constraint = select_constraint(table, request)?;
    let values = reconcile(table, request)?;
    let action = conflict_action(table, &values, request, policy)?;

    Ok(ConflictPlan {
        constraint,
        values,
        action,
    })
}

fn select_constraint<'a>(
    table: &'a UpsertTable,
    request: &UpsertRequest<'a>,
) -> Result<&'a UniqueConstraint, UpsertExecutionError> {
    let selected = match request.where_values {
        Some(where_values) => first_covered_constraint(table, where_values)?,
        None => match first_covered_constraint(table, request.row)? {
            Some(constraint) => Some(constraint),
            None => table.table.primary_key(),
        },
    };

    selected.ok_or_else(|| UpsertExecutionError::NoMatchingConstraint(request.row_keys()))
}

/// The first constraint, in catalog order, whose columns all have a value in `values`.
fn first_covered_constraint<'a>(
    table: &'a UpsertTable,
    values: &ValueMap,
) -> Result<Option<&'a UniqueConstraint>, UpsertExecutionError> {
    for constraint in &table.table.constraints {
        let field_names = constraint_field_names(table, constraint)?;
        if field_names.iter().all(|name| values.contains_key(*name)) {
            return Ok(Some(constraint));
        }
    }

    Ok(None)
}

fn constraint_field_names<'a>(
    table: &'a UpsertTable,
    constraint: &UniqueConstraint,
) -> Result<Vec<&'a str>, UpsertExecutionError> {
    table
        .constraint_columns(constraint)
        .and_then(|columns| {
            columns
                .into_iter()
                .map(|column| table.field_name_of(column))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| {
            UpsertExecutionError::Generic(
                "Consistency error: could not find an attribute!".to_string(),
            )
        })
}

fn reconcile<'a>(
    table: &'a UpsertTable,
    request: &UpsertRequest<'a>,
) -> Result<Vec<(&'a PhysicalColumn, &'a ConstValue)>, UpsertExecutionError> {
    let mut values = vec![];

    for (column, field) in table.column_fields() {
        let field_name = field.field_name.as_str();
        let where_value = request
            .where_values
            .and_then(|where_values| where_values.get(field_name));
        let input_value = request.row.get(field_name);

        match (input_value, where_value) {
            (Some(input_value), Some(where_value))
                if !same_value(column, input_value, where_value) =>
            {
                return Err(UpsertExecutionError::WhereMismatch(field_name.to_string()));
            }
            (Some(value), _) | (None, Some(value)) => values.push((column, value)),
            (None, None) => {}
        }
    }

    Ok(values)
}

/// Structural equality, except that numbers compare by value (`20` matches `20.0`). For int8 and
/// numeric columns, which also accept their value as a string, `"5"` matches `5`.
fn same_value(column: &PhysicalColumn, left: &ConstValue, right: &ConstValue) -> bool {
    match (left, right) {
        (ConstValue::Number(left), ConstValue::Number(right)) => {
            left == right || (left.as_f64().is_some() && left.as_f64() == right.as_f64())
        }
        (ConstValue::Number(number), ConstValue::String(text))
        | (ConstValue::String(text), ConstValue::Number(number)) => {
            column.typ.project_as_text() && same_number(column, number, text.trim())
        }
        _ => left == right,
    }
}

fn same_number(column: &PhysicalColumn, number: &serde_json::Number, text: &str) -> bool {
    match column.typ {
        ColumnType::Int { .. } => text
            .parse::<i64>()
            .is_ok_and(|parsed| number.as_i64() == Some(parsed)),
        _ => text
            .parse::<f64>()
            .is_ok_and(|parsed| number.as_f64() == Some(parsed)),
    }
}

fn conflict_action<'a>(
    table: &'a UpsertTable,
    values: &[(&'a PhysicalColumn, &'a ConstValue)],
    request: &UpsertRequest<'a>,
    policy: &dyn PolicyLookup,
) -> Result<ConflictAction<'a>, UpsertExecutionError> {
    if request.tuning.do_nothing {
        return Ok(ConflictAction::DoNothing);
    }

    let mut assignments = vec![];

    for (column, field) in table.column_fields() {
        if policy.omit_column(&table.table, column, OmitAction::UpdateOnConflict) {
            continue;
        }

        let action = request
            .tuning
            .actions
            .get(&field.field_name)
            .copied()
            .unwrap_or(UpdateAction::Update);

        match action {
            UpdateAction::Update => {
                if values.iter().any(|(inserted, _)| inserted.num == column.num) {
                    assignments.push(ConflictAssignment::excluded(column));
                }
            }
            UpdateAction::Ignore => {}
            UpdateAction::CurrentTimestamp => {
                if !column.typ.accepts_current_timestamp() {
                    return Err(UpsertExecutionError::Validation(
                        field.field_name.clone(),
                        format!(
                            "`current_timestamp` cannot be assigned to a column of type {}",
                            column.type_name
                        ),
                    ));
                }
                assignments.push(ConflictAssignment {
                    column,
                    value: Column::CurrentTimestamp,
                });
            }
        }
    }

    if assignments.is_empty() {
        Ok(ConflictAction::DoNothing)
    } else {
        Ok(ConflictAction::DoUpdate(assignments))
    }
}
