// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Hand-built catalog snapshots mirroring the tables used throughout the tests:
//!
//! ```sql
//! CREATE TABLE bikes (
//!     id serial PRIMARY KEY,
//!     weight real,
//!     make varchar,
//!     model varchar,
//!     serial_number varchar,
//!     trim varchar DEFAULT 'standard',
//!     CONSTRAINT serial_weight_unique UNIQUE (serial_number, weight)
//! );
//! CREATE TABLE roles (
//!     id serial PRIMARY KEY,
//!     project_name varchar,
//!     title varchar,
//!     name varchar,
//!     rank integer,
//!     updated timestamptz,
//!     UNIQUE (project_name, title)
//! );
//! COMMENT ON COLUMN roles.rank IS E'@omit updateOnConflict';
//! CREATE TABLE no_primary_keys (name text);
//! ```

use upsert_sql::{
    PhysicalColumn, PhysicalTable, SchemaObjectName, UniqueConstraint, schema::CatalogSpec,
};

pub fn bikes_table() -> PhysicalTable {
    let mut table = PhysicalTable::new(SchemaObjectName::public("bikes"));
    table.columns = vec![
        PhysicalColumn::new(1, "id", "int4").not_null().with_default(),
        PhysicalColumn::new(2, "weight", "float4"),
        PhysicalColumn::new(3, "make", "varchar"),
        PhysicalColumn::new(4, "model", "varchar"),
        PhysicalColumn::new(5, "serial_number", "varchar"),
        PhysicalColumn::new(6, "trim", "varchar").with_default(),
    ];
    table.constraints = vec![
        UniqueConstraint::primary("bikes_pkey", vec![1]),
        UniqueConstraint::unique("serial_weight_unique", vec![5, 2]),
    ];
    table
}

pub fn roles_table() -> PhysicalTable {
    let mut table = PhysicalTable::new(SchemaObjectName::public("roles"));
    table.columns = vec![
        PhysicalColumn::new(1, "id", "int4").not_null().with_default(),
        PhysicalColumn::new(2, "project_name", "varchar"),
        PhysicalColumn::new(3, "title", "varchar"),
        PhysicalColumn::new(4, "name", "varchar"),
        PhysicalColumn::new(5, "rank", "int4").with_comment("@omit updateOnConflict"),
        PhysicalColumn::new(6, "updated", "timestamptz"),
    ];
    table.constraints = vec![
        UniqueConstraint::primary("roles_pkey", vec![1]),
        UniqueConstraint::unique("roles_project_name_title_key", vec![2, 3]),
    ];
    table
}

pub fn no_primary_keys_table() -> PhysicalTable {
    let mut table = PhysicalTable::new(SchemaObjectName::public("no_primary_keys"));
    table.columns = vec![PhysicalColumn::new(1, "name", "text")];
    table
}

pub fn test_catalog() -> CatalogSpec {
    CatalogSpec::new(vec![bikes_table(), no_primary_keys_table(), roles_table()])
}
