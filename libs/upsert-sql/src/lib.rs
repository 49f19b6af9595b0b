// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! SQL expression tree, database access, and catalog introspection for upsert generation.
//!
//! The expression tree renders through [`SQLBuilder`], which produces the SQL text along with the
//! list of parameters bound to its `$n` placeholders.

mod schema_object;
mod sql;

pub mod database_error;
pub mod schema;

#[cfg(any(feature = "test-support", test))]
pub mod testing;

pub use schema_object::SchemaObjectName;

pub use sql::{
    ExpressionBuilder, SQLBuilder, SQLParam, SQLParamContainer,
    column::Column,
    column_type::{ColumnType, FloatBits, IntBits},
    connect::{database_client::DatabaseClient, database_pool::DatabasePool},
    cte::{CteExpression, WithQuery},
    insert::{ConflictAction, ConflictAssignment, Insert, OnConflict},
    json_object::{JsonObject, JsonObjectElement},
    physical_column::PhysicalColumn,
    physical_table::{ConstraintKind, PhysicalTable, TablePrivileges, UniqueConstraint},
    select::Select,
};
