// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{ExpressionBuilder, SQLBuilder, insert::Insert, select::Select};

/// A `WITH <expressions> <select>` statement.
#[derive(Debug)]
pub struct WithQuery<'a> {
    pub expressions: Vec<CteExpression<'a>>,
    pub select: Select<'a>,
}

/// A named data-modifying CTE such as `"upserted_1" AS (INSERT ... RETURNING *)`.
#[derive(Debug)]
pub struct CteExpression<'a> {
    pub name: String,
    pub operation: Insert<'a>,
}

impl ExpressionBuilder for WithQuery<'_> {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("WITH ");
        builder.push_elems(&self.expressions, ", ");
        builder.push_space();
        self.select.build(builder);
    }
}

impl ExpressionBuilder for CteExpression<'_> {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_identifier(&self.name);
        builder.push_str(" AS (");
        self.operation.build(builder);
        builder.push(')');
    }
}
