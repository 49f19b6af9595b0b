// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::SchemaObjectName;

use super::{ExpressionBuilder, SQLBuilder, physical_column::PhysicalColumn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Primary,
    Unique,
}

/// A primary key or unique constraint. Columns are referenced by `attnum`, in key order.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueConstraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub column_nums: Vec<i16>,
}

impl UniqueConstraint {
    pub fn primary(name: impl Into<String>, column_nums: Vec<i16>) -> Self {
        Self {
            name: name.into(),
            kind: ConstraintKind::Primary,
            column_nums,
        }
    }

    pub fn unique(name: impl Into<String>, column_nums: Vec<i16>) -> Self {
        Self {
            name: name.into(),
            kind: ConstraintKind::Unique,
            column_nums,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.kind == ConstraintKind::Primary
    }
}

/// Privileges the current role holds on a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TablePrivileges {
    pub select: bool,
    pub insert: bool,
    pub update: bool,
}

impl TablePrivileges {
    pub fn all() -> Self {
        Self {
            select: true,
            insert: true,
            update: true,
        }
    }
}

/// A table along with the catalog facts upsert generation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalTable {
    pub name: SchemaObjectName,
    /// Ordered by `attnum`
    pub columns: Vec<PhysicalColumn>,
    /// In catalog declaration order
    pub constraints: Vec<UniqueConstraint>,
    pub privileges: TablePrivileges,
    pub comment: Option<String>,
}

impl PhysicalTable {
    pub fn new(name: SchemaObjectName) -> Self {
        Self {
            name,
            columns: vec![],
            constraints: vec![],
            privileges: TablePrivileges::all(),
            comment: None,
        }
    }

    pub fn column_by_num(&self, num: i16) -> Option<&PhysicalColumn> {
        self.columns.iter().find(|column| column.num == num)
    }

    pub fn get_column(&self, name: &str) -> Option<&PhysicalColumn> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn primary_key(&self) -> Option<&UniqueConstraint> {
        self.constraints.iter().find(|constraint| constraint.is_primary())
    }
}

impl ExpressionBuilder for PhysicalTable {
    /// Build the table name as `"schema"."name"`.
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_identifier(&self.name.schema);
        builder.push('.');
        builder.push_identifier(&self.name.name);
    }
}
