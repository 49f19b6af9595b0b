// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;
use tracing::error;

use upsert_sql::database_error::DatabaseError;

use crate::value_encoder::CastError;

#[derive(Error, Debug)]
pub enum UpsertExecutionError {
    #[error("{0}")]
    Generic(String),

    #[error("Invalid field '{0}': {1}")]
    Validation(String, String),

    #[error("Missing argument '{0}'")]
    MissingArgument(String),

    /// Neither `where` nor the row payload covers a unique constraint. Carries the payload keys.
    #[error(
        "Unable to determine upsert unique constraint for given upserted columns: {}",
        .0.join(", ")
    )]
    NoMatchingConstraint(Vec<String>),

    #[error("Value passed in the input for {0} does not match the where clause value.")]
    WhereMismatch(String),

    #[error("{0}")]
    Cast(#[from] CastError),

    #[error("{0}")]
    Postgres(#[from] DatabaseError),

    #[error("Result has {0} entries; expected only zero or one")]
    NonUniqueResult(usize),

    #[error("{0} {1}")]
    WithContext(String, #[source] Box<UpsertExecutionError>),
}

impl UpsertExecutionError {
    pub fn with_context(self, context: String) -> UpsertExecutionError {
        UpsertExecutionError::WithContext(context, Box::new(self))
    }

    /// The `message` reported to the caller.
    pub fn user_error_message(&self) -> String {
        match self {
            UpsertExecutionError::Generic(_)
            | UpsertExecutionError::Validation(_, _)
            | UpsertExecutionError::MissingArgument(_)
            | UpsertExecutionError::NoMatchingConstraint(_)
            | UpsertExecutionError::WhereMismatch(_) => self.to_string(),
            UpsertExecutionError::Cast(error) => {
                format!("Unable to convert input to the expected type: {error}")
            }
            // Statement failures are reported as the database phrased them
            UpsertExecutionError::Postgres(error) => database_error_message(error),
            UpsertExecutionError::WithContext(context, e) => {
                format!("{}: {}", e.user_error_message(), context)
            }
            UpsertExecutionError::NonUniqueResult(_) => {
                error!("Upsert failed: {:?}", self);
                "Operation failed".to_string()
            }
        }
    }
}

fn database_error_message(error: &DatabaseError) -> String {
    match error {
        DatabaseError::Delegate(e) => match e.as_db_error() {
            Some(db_error) => db_error.message().to_string(),
            None => e.to_string(),
        },
        DatabaseError::WithContext(_, e) => database_error_message(e),
        _ => error.to_string(),
    }
}
