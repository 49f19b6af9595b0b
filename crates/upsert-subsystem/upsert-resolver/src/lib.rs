// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Resolution of `upsert<T>` mutations: pick the conflict target, reconcile `where` with the row
//! payload, and run a single `INSERT ... ON CONFLICT` statement.

mod conflict_resolver;
mod error;
mod executor;
mod projection;
mod resolver;
mod upsert_request;
mod upsert_statement;
mod validated_field;
mod value_encoder;

pub use conflict_resolver::{ConflictPlan, plan};
pub use error::UpsertExecutionError;
pub use executor::UpsertExecutor;
pub use resolver::{PreparedUpsert, UpsertResolver};
pub use upsert_request::{
    CLIENT_MUTATION_ID, ConflictTuning, INPUT_ARGUMENT, ON_CONFLICT_ARGUMENT, UpsertRequest,
    WHERE_ARGUMENT,
};
pub use upsert_statement::{AliasGenerator, upsert_statement};
pub use validated_field::{ValidatedField, parse_mutation};
pub use value_encoder::{CastError, CastingValueEncoder, ValueEncoder};
