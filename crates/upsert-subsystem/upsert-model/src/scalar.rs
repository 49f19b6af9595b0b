// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use upsert_sql::{ColumnType, FloatBits, IntBits};

/// Scalars defined by GraphQL itself; everything else needs a `scalar` declaration.
pub const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// The GraphQL scalar used for a column type, if there is one.
pub fn graphql_scalar(typ: &ColumnType) -> Option<&'static str> {
    let scalar = match typ {
        ColumnType::Int {
            bits: IntBits::_16 | IntBits::_32,
        } => "Int",
        ColumnType::Int { bits: IntBits::_64 } => "BigInt",
        ColumnType::Float {
            bits: FloatBits::_24 | FloatBits::_53,
        } => "Float",
        ColumnType::Numeric => "BigFloat",
        ColumnType::Boolean => "Boolean",
        ColumnType::String => "String",
        ColumnType::Uuid => "UUID",
        ColumnType::Json { .. } => "JSON",
        ColumnType::Timestamp { .. } => "Datetime",
        ColumnType::Date => "Date",
        ColumnType::Time { .. } => "Time",
        ColumnType::Other(_) => return None,
    };

    Some(scalar)
}

pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars() {
        assert_eq!(
            graphql_scalar(&ColumnType::from_pg_type_name("float4")),
            Some("Float")
        );
        assert_eq!(
            graphql_scalar(&ColumnType::from_pg_type_name("int8")),
            Some("BigInt")
        );
        assert_eq!(
            graphql_scalar(&ColumnType::from_pg_type_name("timestamptz")),
            Some("Datetime")
        );
        assert_eq!(graphql_scalar(&ColumnType::from_pg_type_name("point")), None);
        assert!(is_builtin_scalar("Int"));
        assert!(!is_builtin_scalar("Datetime"));
    }
}
