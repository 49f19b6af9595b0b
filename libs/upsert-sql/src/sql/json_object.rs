// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{ExpressionBuilder, SQLBuilder, column::Column};

/// A `json_build_object(...)` expression.
#[derive(Debug, PartialEq)]
pub struct JsonObject<'a>(pub Vec<JsonObjectElement<'a>>);

#[derive(Debug, PartialEq)]
pub struct JsonObjectElement<'a> {
    pub key: String,
    pub value: Column<'a>,
}

impl<'a> JsonObjectElement<'a> {
    pub fn new(key: String, value: Column<'a>) -> Self {
        Self { key, value }
    }
}

impl ExpressionBuilder for JsonObject<'_> {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("json_build_object(");
        builder.push_elems(&self.0, ", ");
        builder.push(')');
    }
}

/// Build an element of a JSON object as `'<key>', <value>`. 64-bit integers and numerics are
/// rendered as text, since JSON numbers would lose precision.
impl ExpressionBuilder for JsonObjectElement<'_> {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_literal(&self.key);
        builder.push_str(", ");

        self.value.build(builder);

        if let Column::Physical { column, .. } = &self.value {
            if column.typ.project_as_text() {
                builder.push_str("::text");
            }
        }
    }
}
