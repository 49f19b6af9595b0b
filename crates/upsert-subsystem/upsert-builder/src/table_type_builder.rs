// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Build the standard object type (`<Type>`) and insert input type (`<Type>Input`) of a table.

use async_graphql_parser::types::TypeDefinition;
use tracing::warn;

use upsert_model::{
    naming::{ToGraphQLName, table_field_name, table_input_type_name},
    policy::{OmitAction, PolicyLookup},
    scalar::graphql_scalar,
    subsystem::{UpsertColumn, UpsertTable},
    type_normalization::{
        field_definition, input_object_type, input_value, named_type, object_type,
    },
};
use upsert_sql::PhysicalTable;

/// Resolve the GraphQL names of a table and its columns.
pub(super) fn upsert_table(table: &PhysicalTable) -> UpsertTable {
    let type_name = table.name.name.table_type_name();
    let field_name = table_field_name(&type_name);

    let columns = table
        .columns
        .iter()
        .map(|column| UpsertColumn {
            field_name: column.name.field_name(),
            scalar: graphql_scalar(&column.typ),
        })
        .collect();

    UpsertTable {
        table: table.clone(),
        type_name,
        field_name,
        columns,
    }
}

pub(super) fn object_type_definition(
    upsert_table: &UpsertTable,
    policy: &dyn PolicyLookup,
) -> TypeDefinition {
    let table = &upsert_table.table;

    let fields = upsert_table
        .column_fields()
        .filter(|(column, _)| !policy.omit_column(table, column, OmitAction::Read))
        .filter_map(|(column, field)| match field.scalar {
            Some(scalar) => Some(field_definition(
                &field.field_name,
                named_type(scalar, column.nullable),
                vec![],
                None,
            )),
            None => {
                warn!(
                    "Skipping column '{}' of '{}': no GraphQL type for '{}'",
                    column.name, table.name, column.type_name
                );
                None
            }
        })
        .collect();

    object_type(
        &upsert_table.type_name,
        Some(format!("A row of the `{}` table.", table.name)),
        fields,
    )
}

/// The input shape of a row. Returns the type along with the names of its fields.
///
/// A field is required only when the column is non-null, has no default, and cannot be
/// back-filled from the `where` argument.
pub(super) fn input_type_definition(
    upsert_table: &UpsertTable,
    where_fields: &[String],
    policy: &dyn PolicyLookup,
) -> (TypeDefinition, Vec<String>) {
    let table = &upsert_table.table;

    let fields: Vec<_> = upsert_table
        .column_fields()
        .filter(|(column, _)| !policy.omit_column(table, column, OmitAction::Create))
        .filter_map(|(column, field)| {
            let scalar = field.scalar?;
            let required =
                !column.nullable && !column.has_default && !where_fields.contains(&field.field_name);

            Some(input_value(&field.field_name, named_type(scalar, !required), None))
        })
        .collect();

    let field_names = fields
        .iter()
        .map(|field| field.name.node.to_string())
        .collect();

    let type_name = table_input_type_name(&upsert_table.type_name);
    let definition = input_object_type(
        &type_name,
        Some(format!("An input for mutations affecting `{}`", upsert_table.type_name)),
        fields,
    );

    (definition, field_names)
}
