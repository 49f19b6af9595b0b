// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{ExpressionBuilder, SQLBuilder, column_type::ColumnType};

/// A column as recorded in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalColumn {
    /// `pg_attribute.attnum`; constraints refer to columns by this number
    pub num: i16,
    pub name: String,
    pub typ: ColumnType,
    /// `pg_type.typname`, kept for messages and types the mapping does not know
    pub type_name: String,
    pub type_modifier: i32,
    pub nullable: bool,
    pub has_default: bool,
    pub comment: Option<String>,
}

impl PhysicalColumn {
    pub fn new(num: i16, name: impl Into<String>, type_name: &str) -> Self {
        Self {
            num,
            name: name.into(),
            typ: ColumnType::from_pg_type_name(type_name),
            type_name: type_name.to_string(),
            type_modifier: -1,
            nullable: true,
            has_default: false,
            comment: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Renders the bare column name, as needed in an INSERT column list.
impl ExpressionBuilder for PhysicalColumn {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_identifier(&self.name);
    }
}
