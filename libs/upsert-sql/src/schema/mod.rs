// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Catalog introspection: reads tables, columns, and unique constraints from a live database
//! into a [`CatalogSpec`] snapshot.

mod catalog_spec;
mod column_spec;
mod constraint_spec;
mod table_spec;

pub use catalog_spec::CatalogSpec;
