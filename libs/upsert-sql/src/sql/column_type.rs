// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntBits {
    _16,
    _32,
    _64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatBits {
    _24,
    _53,
}

/// The storage type of a column, as far as encoding and projection care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Int { bits: IntBits },
    Float { bits: FloatBits },
    Numeric,
    Boolean,
    String,
    Uuid,
    Json { binary: bool },
    Timestamp { timezone: bool },
    Date,
    Time { timezone: bool },
    /// Anything else (domains, enums, arrays, geometric types, ...), keyed by the type name.
    Other(String),
}

impl ColumnType {
    /// Map a `pg_type.typname` to a column type.
    pub fn from_pg_type_name(type_name: &str) -> Self {
        match type_name {
            "int2" => ColumnType::Int { bits: IntBits::_16 },
            "int4" => ColumnType::Int { bits: IntBits::_32 },
            "int8" => ColumnType::Int { bits: IntBits::_64 },
            "float4" => ColumnType::Float {
                bits: FloatBits::_24,
            },
            "float8" => ColumnType::Float {
                bits: FloatBits::_53,
            },
            "numeric" => ColumnType::Numeric,
            "bool" => ColumnType::Boolean,
            "text" | "varchar" | "bpchar" | "char" | "name" | "citext" => ColumnType::String,
            "uuid" => ColumnType::Uuid,
            "json" => ColumnType::Json { binary: false },
            "jsonb" => ColumnType::Json { binary: true },
            "timestamp" => ColumnType::Timestamp { timezone: false },
            "timestamptz" => ColumnType::Timestamp { timezone: true },
            "date" => ColumnType::Date,
            "time" => ColumnType::Time { timezone: false },
            "timetz" => ColumnType::Time { timezone: true },
            other => ColumnType::Other(other.to_string()),
        }
    }

    /// Types for which `CURRENT_TIMESTAMP` is an acceptable value.
    pub fn accepts_current_timestamp(&self) -> bool {
        matches!(
            self,
            ColumnType::Timestamp { .. } | ColumnType::Date | ColumnType::Time { .. }
        )
    }

    /// Types whose JSON projection must go through text to avoid losing precision.
    pub fn project_as_text(&self) -> bool {
        matches!(
            self,
            ColumnType::Int {
                bits: IntBits::_64
            } | ColumnType::Numeric
        )
    }
}
