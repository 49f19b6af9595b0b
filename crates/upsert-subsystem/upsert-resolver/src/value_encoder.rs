// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Conversion of GraphQL input values into bound statement parameters.

use async_graphql_value::{ConstValue, Number};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use thiserror::Error;

use upsert_sql::{Column, ColumnType, FloatBits, IntBits, PhysicalColumn, SQLParamContainer};

const NAIVE_DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_TIME_FORMAT: &str = "%H:%M:%S%.f";

#[derive(Debug, Error)]
pub enum CastError {
    #[error("{0}")]
    Generic(String),

    #[error("{0}")]
    Date(String, #[source] chrono::format::ParseError),

    #[error("{0}")]
    Uuid(#[from] uuid::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Turns a GraphQL value into the SQL value inserted into a column.
pub trait ValueEncoder: Send + Sync {
    fn encode(
        &self,
        value: &ConstValue,
        column: &PhysicalColumn,
    ) -> Result<Column<'static>, CastError>;
}

/// Binds each value with the Rust type the driver maps to the column type. Types the driver cannot
/// bind directly (`numeric`, `timetz`, and unmapped types) are sent as text and cast by the
/// database.
#[derive(Debug, Default, Clone, Copy)]
pub struct CastingValueEncoder;

impl ValueEncoder for CastingValueEncoder {
    fn encode(
        &self,
        value: &ConstValue,
        column: &PhysicalColumn,
    ) -> Result<Column<'static>, CastError> {
        if let ConstValue::Null = value {
            return Ok(Column::Null);
        }

        let param = match &column.typ {
            ColumnType::Int { bits } => cast_int(value, bits)?,
            ColumnType::Float { bits } => cast_float(value, bits)?,
            ColumnType::Numeric => {
                let text = match value {
                    ConstValue::Number(number) => number.to_string(),
                    ConstValue::String(string) => string.clone(),
                    _ => return Err(unexpected(value, column)),
                };
                return Ok(text_cast(text, "numeric"));
            }
            ColumnType::Boolean => match value {
                ConstValue::Boolean(b) => SQLParamContainer::new(*b),
                _ => return Err(unexpected(value, column)),
            },
            ColumnType::String => match value {
                ConstValue::String(string) => SQLParamContainer::new(string.clone()),
                _ => return Err(unexpected(value, column)),
            },
            ColumnType::Uuid => {
                let uuid = uuid::Uuid::parse_str(string_value(value, column)?)?;
                SQLParamContainer::new(uuid)
            }
            ColumnType::Json { .. } => SQLParamContainer::new(value.clone().into_json()?),
            ColumnType::Timestamp { timezone } => {
                cast_timestamp(string_value(value, column)?, *timezone)?
            }
            ColumnType::Date => {
                let string = string_value(value, column)?;
                let date = NaiveDate::parse_from_str(string, NAIVE_DATE_FORMAT).map_err(|e| {
                    CastError::Date(format!("Could not parse {string} as a valid date"), e)
                })?;
                SQLParamContainer::new(date)
            }
            ColumnType::Time { timezone: false } => {
                let string = string_value(value, column)?;
                let time = NaiveTime::parse_from_str(string, NAIVE_TIME_FORMAT).map_err(|e| {
                    CastError::Date(format!("Could not parse {string} as a valid time"), e)
                })?;
                SQLParamContainer::new(time)
            }
            ColumnType::Time { timezone: true } => {
                return Ok(text_cast(string_value(value, column)?.to_string(), "timetz"));
            }
            ColumnType::Other(type_name) => {
                return Ok(text_cast(string_value(value, column)?.to_string(), type_name));
            }
        };

        Ok(Column::Param(param))
    }
}

fn text_cast(text: String, type_name: &str) -> Column<'static> {
    Column::Cast {
        param: SQLParamContainer::new(text),
        type_name: type_name.to_string(),
    }
}

fn unexpected(value: &ConstValue, column: &PhysicalColumn) -> CastError {
    CastError::Generic(format!(
        "Unexpected value {value} for column '{}' of type {}",
        column.name, column.type_name
    ))
}

fn string_value<'a>(value: &'a ConstValue, column: &PhysicalColumn) -> Result<&'a str, CastError> {
    match value {
        ConstValue::String(string) => Ok(string),
        _ => Err(unexpected(value, column)),
    }
}

fn cast_int(value: &ConstValue, bits: &IntBits) -> Result<SQLParamContainer, CastError> {
    let int_value = match value {
        ConstValue::Number(number) => cast_to_i64(number)?,
        // Big integers travel as strings
        ConstValue::String(string) if *bits == IntBits::_64 => string
            .parse::<i64>()
            .map_err(|_| CastError::Generic(format!("Failed to cast {string} to an integer")))?,
        _ => {
            return Err(CastError::Generic(format!(
                "Failed to cast {value} to an integer"
            )));
        }
    };

    let param = match bits {
        IntBits::_16 => SQLParamContainer::new(i16::try_from(int_value).map_err(|_| {
            CastError::Generic(format!(
                "Integer overflow: {int_value} is out of range for a 16-bit integer"
            ))
        })?),
        IntBits::_32 => SQLParamContainer::new(i32::try_from(int_value).map_err(|_| {
            CastError::Generic(format!(
                "Integer overflow: {int_value} is out of range for a 32-bit integer"
            ))
        })?),
        IntBits::_64 => SQLParamContainer::new(int_value),
    };

    Ok(param)
}

fn cast_to_i64(number: &Number) -> Result<i64, CastError> {
    number
        .as_i64()
        .ok_or_else(|| CastError::Generic(format!("Failed to cast {number} to an integer")))
}

fn cast_float(value: &ConstValue, bits: &FloatBits) -> Result<SQLParamContainer, CastError> {
    let float_value = match value {
        ConstValue::Number(number) => number
            .as_f64()
            .ok_or_else(|| CastError::Generic(format!("Failed to cast {number} to a float")))?,
        _ => {
            return Err(CastError::Generic(format!(
                "Failed to cast {value} to a float"
            )));
        }
    };

    let param = match bits {
        FloatBits::_24 => {
            if float_value.is_finite() && float_value.abs() > f32::MAX as f64 {
                return Err(CastError::Generic(format!(
                    "Float overflow: {float_value} is out of range for a 32-bit float"
                )));
            }
            SQLParamContainer::new(float_value as f32)
        }
        FloatBits::_53 => SQLParamContainer::new(float_value),
    };

    Ok(param)
}

/// Accepts an RFC 3339 timestamp or a naive `YYYY-MM-DDTHH:MM:SS[.f]` one. A naive value bound to
/// a `timestamptz` column is taken as UTC; the offset of a value bound to a `timestamp` column is
/// dropped.
fn cast_timestamp(string: &str, timezone: bool) -> Result<SQLParamContainer, CastError> {
    let datetime = DateTime::parse_from_rfc3339(string);
    let naive_datetime =
        NaiveDateTime::parse_from_str(string, &format!("{NAIVE_DATE_FORMAT}T{NAIVE_TIME_FORMAT}"));

    let param = match (datetime, naive_datetime) {
        (Ok(datetime), _) if timezone => SQLParamContainer::new(datetime.with_timezone(&Utc)),
        (Ok(datetime), _) => SQLParamContainer::new(datetime.naive_local()),
        (_, Ok(naive_datetime)) if timezone => SQLParamContainer::new(
            DateTime::<Utc>::from_naive_utc_and_offset(naive_datetime, Utc),
        ),
        (_, Ok(naive_datetime)) => SQLParamContainer::new(naive_datetime),
        (Err(e), Err(_)) => {
            return Err(CastError::Date(
                format!("Could not parse {string} as a valid timestamp format"),
                e,
            ));
        }
    };

    Ok(param)
}
