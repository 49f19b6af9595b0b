// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Render a [`ConflictPlan`] as a single statement:
//!
//! ```sql
//! WITH "upserted_1" AS (
//!     INSERT INTO "public"."bikes" ("weight", "serial_number") VALUES ($1, $2)
//!     ON CONFLICT ON CONSTRAINT "serial_weight_unique" DO UPDATE SET ...
//!     RETURNING *
//! ) SELECT json_build_object(...)::text FROM "upserted_1"
//! ```

use upsert_model::subsystem::UpsertTable;
use upsert_sql::{Column, CteExpression, Insert, JsonObject, Select, WithQuery};

use crate::{
    conflict_resolver::ConflictPlan, error::UpsertExecutionError, value_encoder::ValueEncoder,
};

/// Hands out fresh relation aliases. Scoped to one request, so aliases never collide within a
/// statement.
#[derive(Debug, Default)]
pub struct AliasGenerator {
    issued: usize,
}

impl AliasGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_alias(&mut self, prefix: &str) -> String {
        self.issued += 1;
        format!("{prefix}_{}", self.issued)
    }
}

pub fn upsert_statement<'a>(
    table: &'a UpsertTable,
    plan: ConflictPlan<'a>,
    selection: JsonObject<'a>,
    alias: String,
    encoder: &dyn ValueEncoder,
) -> Result<WithQuery<'a>, UpsertExecutionError> {
    let (columns, values): (Vec<_>, Vec<_>) = plan
        .values
        .iter()
        .map(|(column, value)| {
            encoder
                .encode(value, column)
                .map(|encoded| (*column, encoded))
                .map_err(|e| {
                    let field_name = table.field_name_of(column).unwrap_or(&column.name);
                    UpsertExecutionError::from(e).with_context(format!("for field '{field_name}'"))
                })
        })
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .unzip();

    // Without columns the insert uses DEFAULT VALUES, which takes no conflict clause
    let on_conflict = if columns.is_empty() {
        None
    } else {
        Some(plan.action.on_constraint(&plan.constraint.name))
    };

    Ok(WithQuery {
        expressions: vec![CteExpression {
            name: alias.clone(),
            operation: Insert {
                table: &table.table,
                columns,
                values,
                on_conflict,
                returning: vec![Column::Star],
            },
        }],
        select: Select {
            columns: vec![Column::JsonObject(selection)],
            from: alias,
            top_level_selection: true,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_unique_per_generator() {
        let mut aliases = AliasGenerator::new();
        assert_eq!(aliases.next_alias("upserted"), "upserted_1");
        assert_eq!(aliases.next_alias("upserted"), "upserted_2");

        assert_eq!(AliasGenerator::new().next_alias("upserted"), "upserted_1");
    }
}
