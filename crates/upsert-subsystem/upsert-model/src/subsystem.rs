// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::types::{FieldDefinition, TypeDefinition};
use indexmap::IndexMap;

use upsert_sql::{PhysicalColumn, PhysicalTable, UniqueConstraint};

/// Options that shape the generated schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Adds the `onConflict` argument to every upsert mutation.
    pub enable_conflict_tuning: bool,
}

/// The result of the schema-extension pass: everything request resolution needs, captured once.
#[derive(Debug, Default)]
pub struct UpsertSubsystem {
    pub options: BuildOptions,
    pub tables: Vec<UpsertTable>,
    /// Keyed by operation name (`upsertBike`)
    pub operations: IndexMap<String, UpsertOperation>,
    /// Generated types, in generation order
    pub types: Vec<TypeDefinition>,
}

impl UpsertSubsystem {
    pub fn operation(&self, name: &str) -> Option<&UpsertOperation> {
        self.operations.get(name)
    }

    pub fn table(&self, operation: &UpsertOperation) -> &UpsertTable {
        &self.tables[operation.table_index]
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.types
            .iter()
            .find(|typ| typ.name.node.as_str() == name)
    }

    /// The fields to add to the `Mutation` type.
    pub fn mutation_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.operations
            .values()
            .map(|operation| &operation.field_definition)
    }
}

/// An eligible table with its GraphQL naming resolved.
#[derive(Debug, Clone)]
pub struct UpsertTable {
    pub table: PhysicalTable,
    /// `Bike`
    pub type_name: String,
    /// `bike`
    pub field_name: String,
    /// Parallel to `table.columns`
    pub columns: Vec<UpsertColumn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpsertColumn {
    /// `serialNumber`
    pub field_name: String,
    /// `None` when the column type has no GraphQL counterpart
    pub scalar: Option<&'static str>,
}

impl UpsertTable {
    pub fn column_fields(&self) -> impl Iterator<Item = (&PhysicalColumn, &UpsertColumn)> {
        self.table.columns.iter().zip(self.columns.iter())
    }

    pub fn column_by_field_name(&self, field_name: &str) -> Option<&PhysicalColumn> {
        self.column_fields()
            .find(|(_, field)| field.field_name == field_name)
            .map(|(column, _)| column)
    }

    pub fn field_name_of(&self, column: &PhysicalColumn) -> Option<&str> {
        self.column_fields()
            .find(|(candidate, _)| candidate.num == column.num)
            .map(|(_, field)| field.field_name.as_str())
    }

    /// The columns of a constraint, or `None` if any of them is not in the catalog.
    pub fn constraint_columns(&self, constraint: &UniqueConstraint) -> Option<Vec<&PhysicalColumn>> {
        constraint
            .column_nums
            .iter()
            .map(|num| self.table.column_by_num(*num))
            .collect()
    }
}

/// One `upsert<Type>` mutation.
#[derive(Debug, Clone)]
pub struct UpsertOperation {
    /// `upsertBike`
    pub name: String,
    pub table_index: usize,
    /// Fields accepted by the `where` argument
    pub where_fields: Vec<String>,
    /// Fields accepted inside the `input.<tableField>` row
    pub input_fields: Vec<String>,
    /// Fields accepted by `onConflict.doUpdate` (empty unless conflict tuning is enabled)
    pub do_update_fields: Vec<String>,
    pub payload_type_name: String,
    pub field_definition: FieldDefinition,
}
