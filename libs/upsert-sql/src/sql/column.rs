// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{
    ExpressionBuilder, SQLBuilder, SQLParamContainer, json_object::JsonObject,
    physical_column::PhysicalColumn,
};

/// A value-producing expression: a column reference, a bound parameter, or a SQL built-in.
#[derive(Debug, PartialEq)]
pub enum Column<'a> {
    /// A column of the named table (or CTE alias) such as `"upserted_1"."weight"`
    Physical {
        table_name: String,
        column: &'a PhysicalColumn,
    },
    /// The proposed row of an `ON CONFLICT DO UPDATE` such as `excluded."weight"`
    Excluded(&'a PhysicalColumn),
    Param(SQLParamContainer),
    /// A text parameter converted by the database, such as `$1::text::"numeric"`
    Cast {
        param: SQLParamContainer,
        type_name: String,
    },
    Null,
    CurrentTimestamp,
    /// All columns (`*`), as used in `RETURNING *`
    Star,
    JsonObject(JsonObject<'a>),
}

impl ExpressionBuilder for Column<'_> {
    fn build(&self, builder: &mut SQLBuilder) {
        match self {
            Column::Physical { table_name, column } => {
                builder.push_column(table_name, &column.name);
            }
            Column::Excluded(column) => {
                builder.push_str("excluded.");
                builder.push_identifier(&column.name);
            }
            Column::Param(param) => builder.push_param(param.param()),
            Column::Cast { param, type_name } => {
                builder.push_param(param.param());
                builder.push_str("::text::");
                builder.push_identifier(type_name);
            }
            Column::Null => builder.push_str("NULL"),
            Column::CurrentTimestamp => builder.push_str("CURRENT_TIMESTAMP"),
            Column::Star => builder.push('*'),
            Column::JsonObject(obj) => obj.build(builder),
        }
    }
}
