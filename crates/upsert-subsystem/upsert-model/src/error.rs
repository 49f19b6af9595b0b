// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelBuildingError {
    #[error("{0}")]
    Generic(String),

    /// A constraint refers to a column the catalog does not list
    #[error("Consistency error: could not find an attribute!")]
    MissingAttribute { table: String, column_num: i16 },

    #[error("Could not find input type for key '{column}' on type '{type_name}'")]
    MissingInputType { column: String, type_name: String },

    #[error("Duplicate type '{0}' (two tables map to the same GraphQL name)")]
    DuplicateType(String),
}
