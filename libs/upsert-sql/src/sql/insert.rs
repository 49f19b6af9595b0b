// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{
    ExpressionBuilder, SQLBuilder, column::Column, physical_column::PhysicalColumn,
    physical_table::PhysicalTable,
};

/// A single-row insert, optionally with an `ON CONFLICT` clause.
#[derive(Debug)]
pub struct Insert<'a> {
    /// The table to insert into.
    pub table: &'a PhysicalTable,
    /// The columns to insert into such as `(weight, make)`
    pub columns: Vec<&'a PhysicalColumn>,
    /// The values to insert, one per column
    pub values: Vec<Column<'a>>,
    pub on_conflict: Option<OnConflict<'a>>,
    /// The columns to return.
    pub returning: Vec<Column<'a>>,
}

/// The `ON CONFLICT` clause of an insert.
#[derive(Debug, PartialEq)]
pub enum OnConflict<'a> {
    /// `ON CONFLICT DO NOTHING`: any conflict leaves the existing row untouched
    DoNothing,
    /// `ON CONFLICT ON CONSTRAINT <constraint> DO UPDATE SET ...`
    DoUpdate {
        constraint: String,
        assignments: Vec<ConflictAssignment<'a>>,
    },
}

/// The action part of a conflict clause, before it is tied to a constraint.
#[derive(Debug, PartialEq)]
pub enum ConflictAction<'a> {
    DoNothing,
    DoUpdate(Vec<ConflictAssignment<'a>>),
}

impl<'a> ConflictAction<'a> {
    /// An update with no assignments is not valid SQL, so it degrades to `DO NOTHING`.
    pub fn on_constraint(self, constraint: &str) -> OnConflict<'a> {
        match self {
            ConflictAction::DoUpdate(assignments) if !assignments.is_empty() => {
                OnConflict::DoUpdate {
                    constraint: constraint.to_string(),
                    assignments,
                }
            }
            _ => OnConflict::DoNothing,
        }
    }
}

/// `"col" = <value>` inside `DO UPDATE SET`.
#[derive(Debug, PartialEq)]
pub struct ConflictAssignment<'a> {
    pub column: &'a PhysicalColumn,
    pub value: Column<'a>,
}

impl<'a> ConflictAssignment<'a> {
    /// `"col" = excluded."col"`
    pub fn excluded(column: &'a PhysicalColumn) -> Self {
        Self {
            column,
            value: Column::Excluded(column),
        }
    }
}

impl ExpressionBuilder for ConflictAssignment<'_> {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_identifier(&self.column.name);
        builder.push_str(" = ");
        self.value.build(builder);
    }
}

impl ExpressionBuilder for OnConflict<'_> {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("ON CONFLICT ");
        match self {
            OnConflict::DoNothing => builder.push_str("DO NOTHING"),
            OnConflict::DoUpdate {
                constraint,
                assignments,
            } => {
                builder.push_str("ON CONSTRAINT ");
                builder.push_identifier(constraint);
                builder.push_str(" DO UPDATE SET ");
                builder.push_elems(assignments, ", ");
            }
        }
    }
}

impl ExpressionBuilder for Insert<'_> {
    /// Build the insert statement for the form `INSERT INTO <table> (<columns>) VALUES (<values>)
    /// ON CONFLICT ... RETURNING <returning-columns>`.
    ///
    /// Without columns the statement uses `DEFAULT VALUES` and carries no conflict clause.
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("INSERT INTO ");
        self.table.build(builder);

        if self.columns.is_empty() {
            builder.push_str(" DEFAULT VALUES");
        } else {
            builder.push_str(" (");
            builder.without_fully_qualified_column_names(|builder| {
                builder.push_elems(&self.columns, ", ");
            });
            builder.push_str(") VALUES (");
            builder.push_elems(&self.values, ", ");
            builder.push(')');

            if let Some(on_conflict) = &self.on_conflict {
                builder.push_space();
                on_conflict.build(builder);
            }
        }

        if !self.returning.is_empty() {
            builder.push_str(" RETURNING ");
            builder.push_elems(&self.returning, ", ")
        }
    }
}
